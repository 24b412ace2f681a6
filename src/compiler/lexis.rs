pub mod lexer;
pub mod text;
pub mod token;
