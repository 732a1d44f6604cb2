use crate::error::CompileError;
use crate::ir::ast;

/// Кодогенератор - внешний потребитель AST.
/// Кадр под локальные переменные берётся из program.stack_size.
pub trait Backend {
    /// Выдать код для одного top-level statement
    fn emit(&mut self, stmt: &ast::Stmt) -> Result<(), CompileError>;
}

/// Прогоняет программу через backend, по одному statement за раз
pub fn compile(backend: &mut dyn Backend, program: &ast::Program) -> Result<(), CompileError> {
    for stmt in &program.statements {
        backend.emit(stmt)?;
    }
    Ok(())
}
