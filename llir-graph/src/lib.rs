//! LLIR - Graphs
//!
//! Graph views computed from a function's successor and def/use queries:
//! - `cfg`: instruction-level and block-level control-flow graphs
//! - `liveness`: per-instruction live-in and live-out sets
//! - `interference`: which SSA names are live at the same time, with
//!   greedy colouring for register assignment

pub mod cfg;
pub mod liveness;
pub mod interference;

pub use cfg::{BlockGraph, ControlFlowGraph, EdgeKind};
pub use interference::InterferenceGraph;
pub use liveness::Liveness;
