//! Basic Block Management
//!
//! Defines basic blocks - sequences of instructions with single entry/exit points.

use serde::{Deserialize, Serialize};
use crate::ir::Instruction;

/// Basic Block - a labelled sequence of instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Label, unique within the owning function
    pub label: String,
    pub instructions: Vec<Instruction>,
    /// Comment trailing the label line
    pub comment: Option<String>,
}

impl BasicBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: Vec::new(),
            comment: None,
        }
    }

    pub fn add_instruction(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Copy of the instruction list, for iterating while the block changes
    pub fn snapshot(&self) -> Vec<Instruction> {
        self.instructions.clone()
    }

    /// Instruction defining `name` in this block
    pub fn instruction(&self, name: &str) -> Option<&Instruction> {
        self.instructions.iter().find(|instr| instr.name.as_deref() == Some(name))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.instructions.iter().position(|instr| instr.name.as_deref() == Some(name))
    }

    /// Last terminator in the block; phi copies may trail it
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.iter().rev().find(|instr| instr.is_terminator())
    }

    pub fn has_terminator(&self) -> bool {
        self.terminator().is_some()
    }

    /// Whether the label was synthesized (numbered) rather than written
    pub fn has_numeric_label(&self) -> bool {
        !self.label.is_empty() && self.label.chars().all(|c| c.is_ascii_digit())
    }
}
