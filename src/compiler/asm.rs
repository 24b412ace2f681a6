pub mod arm64;
pub mod builtin;
pub mod generator;
pub mod instruction;
