//! LLIR - Core
//!
//! This crate provides the in-memory IR and the passes working on it:
//! - IR: module, function, block, instruction and value model
//! - Parser: builds a module from LLVM-assembly-like text, one line at a time
//! - Renderer: serializes a module back into the text the parser accepts
//! - Phi elimination: rewrites phis into predecessor copies

pub mod ir;
pub mod parser;

pub use ir::{
    eliminate_phis, verify_module, BasicBlock, Function, GlobalVariable, Instruction, InstrRef,
    Module, Opcode, RenderOptions, Renderer, Value,
};
pub use parser::{parse_module, IrParser, ParseError, ParserOptions};
