use crate::error::CompileError;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    // Ключевые слова
    Return,
    If,
    Else,
    While,
    /// Знак пунктуации или оператор из фиксированного набора
    Punct(&'static str),
    /// Идентификатор - текст восстанавливается по span
    Ident,
    /// Целочисленный литерал
    Num(i64),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

const KEYWORDS: [(&str, TokenKind); 4] = [
    ("while", TokenKind::While),
    ("else", TokenKind::Else),
    ("if", TokenKind::If),
    ("return", TokenKind::Return),
];

const TWO_CHAR_OPS: [&str; 4] = ["==", "!=", "<=", ">="];
const ONE_CHAR_OPS: [&str; 10] = ["+", "-", "*", "/", "(", ")", "<", ">", ";", "="];

pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    'outer: while pos < bytes.len() {
        let ch = bytes[pos];

        if ch.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        // Ключевое слово не должно оказаться префиксом более длинного идентификатора
        for (kw, kind) in KEYWORDS {
            if source[pos..].starts_with(kw) && !is_alnum(bytes.get(pos + kw.len()).copied()) {
                tokens.push(Token {
                    kind,
                    span: Span::new(pos, pos + kw.len()),
                });
                pos += kw.len();
                continue 'outer;
            }
        }

        // Двухсимвольные операторы проверяются раньше односимвольных,
        // иначе == распался бы на два =
        for op in TWO_CHAR_OPS {
            if source[pos..].starts_with(op) {
                tokens.push(Token {
                    kind: TokenKind::Punct(op),
                    span: Span::new(pos, pos + 2),
                });
                pos += 2;
                continue 'outer;
            }
        }

        for op in ONE_CHAR_OPS {
            if source[pos..].starts_with(op) {
                tokens.push(Token {
                    kind: TokenKind::Punct(op),
                    span: Span::new(pos, pos + 1),
                });
                pos += 1;
                continue 'outer;
            }
        }

        if ch.is_ascii_digit() {
            let start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            let span = Span::new(start, pos);
            let val = span
                .text(source)
                .parse::<i64>()
                .map_err(|_| CompileError::LexerError {
                    pos: start,
                    message: format!("Integer literal too large: {}", span.text(source)),
                })?;
            tokens.push(Token {
                kind: TokenKind::Num(val),
                span,
            });
            continue;
        }

        if ch.is_ascii_lowercase() {
            let start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_lowercase() {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                span: Span::new(start, pos),
            });
            continue;
        }

        let bad = source[pos..].chars().next().unwrap_or('\u{FFFD}');
        return Err(CompileError::LexerError {
            pos,
            message: format!("Unexpected character: '{}'", bad),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(bytes.len(), bytes.len()),
    });
    Ok(tokens)
}

fn is_alnum(b: Option<u8>) -> bool {
    matches!(b, Some(b) if b.is_ascii_alphanumeric() || b == b'_')
}
