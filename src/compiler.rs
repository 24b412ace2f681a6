pub mod asm;
pub mod context;
pub mod err;
pub mod lexis;
pub mod position;
pub mod scope;
pub mod semantics;
pub mod syntax;
