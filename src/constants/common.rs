use const_format::formatcp;

pub const BOLT: &str = "bolt";
pub const BOLT_EXT: &str = formatcp!(".{BOLT}");

pub const SYMBOL_PREFIX: &str = "_";
pub const MAIN_FUNCTION: &str = "main";
pub const ENTRY_SYMBOL: &str = formatcp!("{SYMBOL_PREFIX}{MAIN_FUNCTION}");

pub const PRINT_BUILTIN: &str = "print";
pub const PRINT_SYMBOL: &str = formatcp!("{SYMBOL_PREFIX}{PRINT_BUILTIN}");

pub const ANONYMOUS_PREFIX: &str = "anonymous";
pub const STRING_LABEL_PREFIX: &str = "str";

/// Largest integer an `f64` represents exactly.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Bytes reserved on the stack for one spilled operand; keeps `sp` 16-byte aligned.
pub const STACK_SLOT: i32 = 16;
