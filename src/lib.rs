pub mod codegen;
pub mod error;
pub mod ir;
pub mod parser;
pub mod span;
