use super::lexer::{Token, TokenKind};
use crate::error::CompileError;
use crate::ir::ast::{BinaryOp, Expr, Program, Stmt};

/// Слово стека под одну локальную переменную
const WORD_SIZE: usize = 8;

pub fn parse_tokens(tokens: Vec<Token>, source: &str) -> Result<Program, CompileError> {
    let mut parser = Parser::new(tokens, source);
    parser.parse_program()
}

/// Локальная переменная и её смещение в кадре стека
struct LVar {
    name: String,
    offset: usize,
}

struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    source: &'a str,
    locals: Vec<LVar>,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self {
            tokens,
            position: 0,
            source,
            locals: Vec::new(),
        }
    }

    fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            statements,
            stack_size: self.locals.len() * WORD_SIZE,
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        if self.consume_kind(TokenKind::While) {
            self.expect("(")?;
            let cond = self.parse_expression()?;
            self.expect(")")?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Stmt::While { cond, body });
        }

        if self.consume_kind(TokenKind::If) {
            self.expect("(")?;
            let cond = self.parse_expression()?;
            self.expect(")")?;
            let then_branch = Box::new(self.parse_statement()?);
            let else_branch = if self.consume_kind(TokenKind::Else) {
                Some(Box::new(self.parse_statement()?))
            } else {
                None
            };
            return Ok(Stmt::If {
                cond,
                then_branch,
                else_branch,
            });
        }

        let stmt = if self.consume_kind(TokenKind::Return) {
            Stmt::Return(self.parse_expression()?)
        } else {
            Stmt::Expr(self.parse_expression()?)
        };
        self.expect(";")?;
        Ok(stmt)
    }

    fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        self.parse_assign()
    }

    /// Присваивание правоассоциативно: a = b = 1 это a = (b = 1)
    fn parse_assign(&mut self) -> Result<Expr, CompileError> {
        let node = self.parse_equality()?;
        if self.consume("=") {
            let value = self.parse_assign()?;
            return Ok(Expr::Assign {
                lhs: Box::new(node),
                rhs: Box::new(value),
            });
        }
        Ok(node)
    }

    fn parse_equality(&mut self) -> Result<Expr, CompileError> {
        let mut node = self.parse_relational()?;

        loop {
            if self.consume("==") {
                node = binary(BinaryOp::Eq, node, self.parse_relational()?);
            } else if self.consume("!=") {
                node = binary(BinaryOp::Ne, node, self.parse_relational()?);
            } else {
                return Ok(node);
            }
        }
    }

    /// У > и >= нет собственных узлов: операнды переставляются,
    /// в дереве остаются только Lt и Le
    fn parse_relational(&mut self) -> Result<Expr, CompileError> {
        let mut node = self.parse_add()?;

        loop {
            if self.consume("<") {
                node = binary(BinaryOp::Lt, node, self.parse_add()?);
            } else if self.consume("<=") {
                node = binary(BinaryOp::Le, node, self.parse_add()?);
            } else if self.consume(">") {
                node = binary(BinaryOp::Lt, self.parse_add()?, node);
            } else if self.consume(">=") {
                node = binary(BinaryOp::Le, self.parse_add()?, node);
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_add(&mut self) -> Result<Expr, CompileError> {
        let mut node = self.parse_mul()?;

        loop {
            if self.consume("+") {
                node = binary(BinaryOp::Add, node, self.parse_mul()?);
            } else if self.consume("-") {
                node = binary(BinaryOp::Sub, node, self.parse_mul()?);
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_mul(&mut self) -> Result<Expr, CompileError> {
        let mut node = self.parse_unary()?;

        loop {
            if self.consume("*") {
                node = binary(BinaryOp::Mul, node, self.parse_unary()?);
            } else if self.consume("/") {
                node = binary(BinaryOp::Div, node, self.parse_unary()?);
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        if self.consume("+") {
            return self.parse_primary();
        }
        if self.consume("-") {
            // Унарный минус переписывается в 0 - x
            let rhs = self.parse_primary()?;
            return Ok(binary(BinaryOp::Sub, Expr::Num(0), rhs));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let token = self.peek();

        match token.kind {
            TokenKind::Num(val) => {
                self.position += 1;
                Ok(Expr::Num(val))
            }
            TokenKind::Ident => {
                self.position += 1;
                let offset = self.resolve_lvar(token.span.text(self.source));
                Ok(Expr::LVar { offset })
            }
            _ => {
                if self.consume("(") {
                    let node = self.parse_expression()?;
                    if self.consume(")") {
                        return Ok(node);
                    }
                    return Err(self.syntax_error("Expected ')' to close '('"));
                }
                Err(self.syntax_error("Expected number, variable, or '('"))
            }
        }
    }

    /// Поиск с конца цепочки - последняя привязка затеняет более ранние.
    /// Промах заводит новую переменную со следующим смещением.
    fn resolve_lvar(&mut self, name: &str) -> usize {
        if let Some(var) = self.locals.iter().rev().find(|v| v.name == name) {
            return var.offset;
        }
        let offset = self.locals.last().map_or(0, |v| v.offset) + WORD_SIZE;
        self.locals.push(LVar {
            name: name.to_string(),
            offset,
        });
        offset
    }

    // Вспомогательные методы

    /// Токенизатор всегда завершает поток Eof, а за Eof курсор не уходит
    fn peek(&self) -> Token {
        self.tokens[self.position]
    }

    fn consume(&mut self, op: &str) -> bool {
        if let TokenKind::Punct(p) = self.peek().kind {
            if p == op {
                self.position += 1;
                return true;
            }
        }
        false
    }

    fn consume_kind(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.position += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, op: &str) -> Result<(), CompileError> {
        if self.consume(op) {
            Ok(())
        } else {
            Err(self.syntax_error(format!("Expected '{}'", op)))
        }
    }

    fn syntax_error(&self, message: impl Into<String>) -> CompileError {
        CompileError::SyntaxError {
            pos: self.peek().span.start,
            message: message.into(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn parse_one(source: &str) -> Stmt {
        let program = parse(source).unwrap();
        assert_eq!(program.statements.len(), 1, "source: {}", source);
        program.statements.into_iter().next().unwrap()
    }

    fn expr_of(stmt: Stmt) -> Expr {
        match stmt {
            Stmt::Expr(e) => e,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = expr_of(parse_one("1+2*3;"));
        assert_eq!(
            expr,
            binary(
                BinaryOp::Add,
                Expr::Num(1),
                binary(BinaryOp::Mul, Expr::Num(2), Expr::Num(3)),
            )
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = expr_of(parse_one("(1+2)*3;"));
        assert_eq!(
            expr,
            binary(
                BinaryOp::Mul,
                binary(BinaryOp::Add, Expr::Num(1), Expr::Num(2)),
                Expr::Num(3),
            )
        );
    }

    #[test]
    fn addition_folds_to_the_left() {
        let expr = expr_of(parse_one("1-2+3;"));
        assert_eq!(
            expr,
            binary(
                BinaryOp::Add,
                binary(BinaryOp::Sub, Expr::Num(1), Expr::Num(2)),
                Expr::Num(3),
            )
        );
    }

    #[test]
    fn unary_minus_rewrites_to_zero_minus() {
        let expr = expr_of(parse_one("-5*2;"));
        assert_eq!(
            expr,
            binary(
                BinaryOp::Mul,
                binary(BinaryOp::Sub, Expr::Num(0), Expr::Num(5)),
                Expr::Num(2),
            )
        );
    }

    #[test]
    fn unary_plus_is_a_no_op() {
        assert_eq!(expr_of(parse_one("+7;")), Expr::Num(7));
    }

    #[test]
    fn greater_than_swaps_operands() {
        let expr = expr_of(parse_one("1>2;"));
        assert_eq!(expr, binary(BinaryOp::Lt, Expr::Num(2), Expr::Num(1)));

        let expr = expr_of(parse_one("1>=2;"));
        assert_eq!(expr, binary(BinaryOp::Le, Expr::Num(2), Expr::Num(1)));
    }

    #[test]
    fn equality_level_sits_above_relational() {
        let expr = expr_of(parse_one("1<2==3<4;"));
        assert_eq!(
            expr,
            binary(
                BinaryOp::Eq,
                binary(BinaryOp::Lt, Expr::Num(1), Expr::Num(2)),
                binary(BinaryOp::Lt, Expr::Num(3), Expr::Num(4)),
            )
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = expr_of(parse_one("a=b=1;"));
        let Expr::Assign { lhs, rhs } = expr else {
            panic!("expected assignment");
        };
        assert_eq!(*lhs, Expr::LVar { offset: 8 });
        assert_eq!(
            *rhs,
            Expr::Assign {
                lhs: Box::new(Expr::LVar { offset: 16 }),
                rhs: Box::new(Expr::Num(1)),
            }
        );
    }

    #[test]
    fn repeated_identifier_reuses_first_offset() {
        let program = parse("a=1; a=a+1; return a;").unwrap();
        assert_eq!(program.statements.len(), 3);
        assert_eq!(program.stack_size, 8);

        let mut offsets = Vec::new();
        for stmt in &program.statements {
            collect_offsets(stmt, &mut offsets);
        }
        assert!(!offsets.is_empty());
        assert!(offsets.iter().all(|&o| o == offsets[0]));
    }

    fn collect_offsets(stmt: &Stmt, out: &mut Vec<usize>) {
        fn walk(expr: &Expr, out: &mut Vec<usize>) {
            match expr {
                Expr::LVar { offset } => out.push(*offset),
                Expr::Binary { lhs, rhs, .. } | Expr::Assign { lhs, rhs } => {
                    walk(lhs, out);
                    walk(rhs, out);
                }
                Expr::Num(_) | Expr::Call { .. } => {}
            }
        }
        match stmt {
            Stmt::Expr(e) | Stmt::Return(e) => walk(e, out),
            _ => {}
        }
    }

    #[test]
    fn distinct_identifiers_get_increasing_offsets() {
        let program = parse("a=1; b=2; c=3;").unwrap();
        assert_eq!(program.stack_size, 24);

        let first = expr_of(program.statements[0].clone());
        let Expr::Assign { lhs, .. } = first else {
            panic!("expected assignment");
        };
        assert_eq!(*lhs, Expr::LVar { offset: 8 });

        let third = expr_of(program.statements[2].clone());
        let Expr::Assign { lhs, .. } = third else {
            panic!("expected assignment");
        };
        assert_eq!(*lhs, Expr::LVar { offset: 24 });
    }

    #[test]
    fn if_else_fills_all_three_children() {
        let stmt = parse_one("if (1) return 1; else return 2;");
        let Stmt::If {
            cond,
            then_branch,
            else_branch,
        } = stmt
        else {
            panic!("expected if");
        };
        assert_eq!(cond, Expr::Num(1));
        assert_eq!(*then_branch, Stmt::Return(Expr::Num(1)));
        assert_eq!(else_branch.as_deref(), Some(&Stmt::Return(Expr::Num(2))));
    }

    #[test]
    fn if_without_else_leaves_else_empty() {
        let stmt = parse_one("if (a<1) a=1;");
        let Stmt::If { else_branch, .. } = stmt else {
            panic!("expected if");
        };
        assert!(else_branch.is_none());
    }

    #[test]
    fn while_body_is_a_single_statement() {
        let stmt = parse_one("while (a<10) a=a+1;");
        let Stmt::While { cond, body } = stmt else {
            panic!("expected while");
        };
        assert!(matches!(cond, Expr::Binary { op: BinaryOp::Lt, .. }));
        assert!(matches!(*body, Stmt::Expr(Expr::Assign { .. })));
    }

    #[test]
    fn empty_source_parses_to_empty_program() {
        let program = parse("").unwrap();
        assert!(program.statements.is_empty());
        assert_eq!(program.stack_size, 0);
    }

    #[test]
    fn unmatched_paren_reports_position_after_expression() {
        let err = parse("(1+2;").unwrap_err();
        match err {
            CompileError::SyntaxError { pos, .. } => assert_eq!(pos, 4),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let err = parse("return 1").unwrap_err();
        match err {
            CompileError::SyntaxError { pos, .. } => assert_eq!(pos, 8),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn missing_operand_is_a_syntax_error() {
        assert!(matches!(
            parse("1+;").unwrap_err(),
            CompileError::SyntaxError { .. }
        ));
    }

    #[test]
    fn if_requires_parenthesized_condition() {
        let err = parse("if 1 return 2;").unwrap_err();
        match err {
            CompileError::SyntaxError { pos, .. } => assert_eq!(pos, 3),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }
}
