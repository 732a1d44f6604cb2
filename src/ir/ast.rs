/// Программа - top-level statement'ы в порядке исходника
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
    /// Размер кадра стека: по 8 байт на каждую уникальную переменную
    pub stack_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// выражение-statement, например: a = 1;
    Expr(Expr),
    /// return a + 1;
    Return(Expr),
    /// if (cond) then [else els]
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// while (cond) body - тело всегда один statement
    While { cond: Expr, body: Box<Stmt> },
    /// for (init; cond; inc) body - объявлен, грамматикой пока не порождается
    For {
        init: Option<Expr>,
        cond: Option<Expr>,
        inc: Option<Expr>,
        body: Box<Stmt>,
    },
    /// { ... } - объявлен, грамматикой пока не порождается
    Block(Vec<Stmt>),
    /// определение функции - объявлено, грамматикой пока не порождается
    FuncDef { name: String, body: Vec<Stmt> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// 10, 42
    Num(i64),
    /// локальная переменная по смещению в кадре стека
    LVar { offset: usize },
    /// a + b, a < b
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// a = значение
    Assign { lhs: Box<Expr>, rhs: Box<Expr> },
    /// вызов функции - объявлен, грамматикой пока не порождается
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Eq,  // ==
    Ne,  // !=
    Lt,  // < (также > с переставленными операндами)
    Le,  // <= (также >= с переставленными операндами)
}
