//! LLIR - Common Types and Utilities
//! 
//! This crate contains the error type and source locations shared by the
//! parser, the IR model, the graph builders and the driver.

pub mod error;
pub mod source_loc;

pub use error::{IrError, IrResult};
pub use source_loc::SourceLocation;
