//! In-memory model of LLVM-assembly-like IR
//!
//! A module owns functions and global variables, a function owns its basic
//! blocks, and a block owns its instructions. Values that name other
//! entities (temporaries, labels) are plain names resolved through lookup
//! tables on the owning function, so nothing in the tree holds a pointer
//! back to its parent.
//!
//! ## Architecture
//!
//! - `types` - Opaque type tokens and helpers
//! - `values` - Operand values
//! - `ops` - Opcodes, binary/cast operations and comparison predicates
//! - `instructions` - The instruction record and its def/use queries
//! - `blocks` - Basic blocks
//! - `function` - Functions, parameters and control-flow queries
//! - `module` - Module and global variables
//! - `builder` - Programmatic IR construction
//! - `render` - Text serialization
//! - `phi` - Phi elimination
//! - `verify` - SSA invariant checks

// Public exports - clean API surface
pub use self::values::Value;
pub use self::ops::{Opcode, BinaryOp, CastOp, IcmpPredicate};
pub use self::instructions::Instruction;
pub use self::blocks::BasicBlock;
pub use self::function::{Function, Parameter, ParamAttr, InstrRef};
pub use self::module::{Module, GlobalVariable, Linkage};
pub use self::builder::IrBuilder;
pub use self::render::{Renderer, RenderOptions};
pub use self::phi::{eliminate_phis, eliminate_function_phis};
pub use self::verify::{verify_function, verify_module};

// Internal modules
pub mod types;
mod values;
mod ops;
mod instructions;
mod blocks;
mod function;
mod module;
mod builder;
mod render;
mod phi;
mod verify;
