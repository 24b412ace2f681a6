pub mod linker;
pub mod operations;
pub mod type_inferrer;
