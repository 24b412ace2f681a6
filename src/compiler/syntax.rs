pub mod ast;
pub mod number;
pub mod parser;
