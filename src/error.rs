use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Syntax error at byte {pos}: {message}")]
    SyntaxError { pos: usize, message: String },

    #[error("Lexer error at byte {pos}: {message}")]
    LexerError { pos: usize, message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CompileError {
    /// Байтовая позиция ошибки, если она привязана к исходнику
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::SyntaxError { pos, .. } | Self::LexerError { pos, .. } => Some(*pos),
            Self::IoError { .. } => None,
        }
    }
}

/// Строка исходника с кареткой под ошибочной позицией
pub fn render_caret(source: &str, pos: usize) -> String {
    let pos = pos.min(source.len());
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[pos..].find('\n').map_or(source.len(), |i| pos + i);
    let column = pos - line_start;
    format!("{}\n{}^", &source[line_start..line_end], " ".repeat(column))
}
