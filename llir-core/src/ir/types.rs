//! IR Type Tokens
//!
//! Types are carried as opaque strings exactly as written in the source
//! (`i32`, `i8*`, `[6 x i8]`, `i32 (i8*, ...)*`). Only the handful of
//! questions the parser and renderer need answered are decided here.

/// Type of a basic block reference
pub const LABEL: &str = "label";

/// Result type of instructions that produce nothing
pub const VOID: &str = "void";

/// Type carried by metadata operands
pub const METADATA: &str = "metadata";

/// Whether a function (or function pointer) type takes variadic arguments
pub fn is_variadic(ty: &str) -> bool {
    ty.contains("...")
}
