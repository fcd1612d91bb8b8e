//! Function Definitions
//!
//! Defines IR functions with their parameters, blocks and attribute flags,
//! plus the control-flow queries that need the whole function in view.
//! Instructions are addressed by [`InstrRef`] handles (block index plus
//! position in the block) and labels are resolved through
//! [`Function::label_table`], never through stored references.

use llir_common::{IrError, IrResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use crate::ir::{BasicBlock, Instruction, Opcode};

/// Position of an instruction inside its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrRef {
    pub block: usize,
    pub index: usize,
}

impl InstrRef {
    pub fn new(block: usize, index: usize) -> Self {
        Self { block, index }
    }
}

impl fmt::Display for InstrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.block, self.index)
    }
}

/// Parameter attribute flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamAttr {
    NoCapture,
}

impl ParamAttr {
    pub fn from_token(token: &str) -> Option<ParamAttr> {
        match token {
            "nocapture" => Some(ParamAttr::NoCapture),
            _ => None,
        }
    }
}

impl fmt::Display for ParamAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamAttr::NoCapture => write!(f, "nocapture"),
        }
    }
}

/// Function parameter; declarations may leave parameters unnamed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Option<String>,
    pub ty: String,
    #[serde(default)]
    pub attributes: Vec<ParamAttr>,
}

impl Parameter {
    pub fn new(name: Option<String>, ty: impl Into<String>) -> Self {
        Self {
            name,
            ty: ty.into(),
            attributes: Vec::new(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        for attr in &self.attributes {
            write!(f, " {attr}")?;
        }
        if let Some(name) = &self.name {
            write!(f, " %{name}")?;
        }
        Ok(())
    }
}

/// Function in IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub blocks: Vec<BasicBlock>,
    pub is_declaration: bool,
    /// `nounwind`
    pub does_not_throw: bool,
    pub readonly: bool,
    pub is_variadic: bool,
    /// Header modifiers kept verbatim (`#0`, `uwtable`, ...)
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Comment trailing the header line
    pub comment: Option<String>,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            blocks: Vec::new(),
            is_declaration: false,
            does_not_throw: false,
            readonly: false,
            is_variadic: false,
            modifiers: Vec::new(),
            comment: None,
        }
    }

    /// Body-less function, rendered with `declare`
    pub fn declaration(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        let mut function = Self::new(name, return_type);
        function.is_declaration = true;
        function
    }

    pub fn add_parameter(&mut self, name: Option<String>, ty: impl Into<String>) {
        self.parameters.push(Parameter::new(name, ty));
    }

    pub fn add_block(&mut self, block: BasicBlock) {
        self.blocks.push(block);
    }

    pub fn is_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name.as_deref() == Some(name))
    }

    pub fn get_block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    pub fn block_index(&self, label: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.label == label)
    }

    /// Label -> block index lookup table
    pub fn label_table(&self) -> HashMap<&str, usize> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(idx, block)| (block.label.as_str(), idx))
            .collect()
    }

    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }


    pub fn instruction(&self, at: InstrRef) -> Option<&Instruction> {
        self.blocks.get(at.block)?.instructions.get(at.index)
    }

    /// All instructions in program order, ignoring block boundaries
    pub fn instructions(&self) -> impl Iterator<Item = (InstrRef, &Instruction)> + '_ {
        self.blocks.iter().enumerate().flat_map(|(b, block)| {
            block
                .instructions
                .iter()
                .enumerate()
                .map(move |(i, instr)| (InstrRef::new(b, i), instr))
        })
    }

    /// Instruction defining the temporary `name`
    pub fn find_definition(&self, name: &str) -> Option<InstrRef> {
        self.blocks
            .iter()
            .enumerate()
            .find_map(|(idx, block)| block.position(name).map(|pos| InstrRef::new(idx, pos)))
    }

    pub fn resolve_label(&self, label: &str) -> IrResult<usize> {
        self.block_index(label)
            .ok_or_else(|| IrError::unresolved(&self.name, label))
    }

    /// Control-flow successors of the instruction at `at`
    ///
    /// `ret` and `unreachable` have none; branches yield the first
    /// instruction of each target block in (true, false) order; anything else
    /// falls through to the next instruction, crossing into the next block
    /// when it is the last one in its block.
    pub fn successors(&self, at: InstrRef) -> IrResult<Vec<InstrRef>> {
        let instr = self.instruction(at).ok_or_else(|| {
            IrError::invalid(&self.name, format!("no instruction at position {at}"))
        })?;
        match instr.opcode {
            Opcode::Ret | Opcode::Unreachable => Ok(Vec::new()),
            Opcode::Br | Opcode::BrIcmp => instr
                .branch_targets()
                .into_iter()
                .map(|label| self.resolve_label(label).map(|b| InstrRef::new(b, 0)))
                .collect(),
            _ => {
                let block = &self.blocks[at.block];
                if at.index + 1 < block.len() {
                    Ok(vec![InstrRef::new(at.block, at.index + 1)])
                } else if at.block + 1 < self.blocks.len() {
                    Ok(vec![InstrRef::new(at.block + 1, 0)])
                } else {
                    Ok(Vec::new())
                }
            }
        }
    }

    /// Instruction indices of block `idx` in the order they execute
    ///
    /// Phi elimination appends copies after the block's terminator; those
    /// copies run before it, on the way out of the block.
    pub fn execution_order(&self, idx: usize) -> Vec<usize> {
        let Some(block) = self.blocks.get(idx) else {
            return Vec::new();
        };
        let len = block.len();
        match block.instructions.iter().rposition(Instruction::is_terminator) {
            Some(term) if term + 1 < len => (0..term).chain(term + 1..len).chain([term]).collect(),
            _ => (0..len).collect(),
        }
    }

    /// First instruction to execute in block `idx`
    pub fn block_entry(&self, idx: usize) -> InstrRef {
        let first = self.execution_order(idx).first().copied().unwrap_or(0);
        InstrRef::new(idx, first)
    }

    /// First instruction to execute in the function
    pub fn entry_point(&self) -> Option<InstrRef> {
        self.entry_block().map(|_| self.block_entry(0))
    }

    /// Successors in execution order
    ///
    /// Same edges as [`Function::successors`] for code in SSA form. After
    /// phi elimination, trailing copies run before their block's terminator,
    /// and the terminator leaves the block once they are done.
    pub fn flow_successors(&self, at: InstrRef) -> IrResult<Vec<InstrRef>> {
        let order = self.execution_order(at.block);
        let pos = order.iter().position(|&i| i == at.index).ok_or_else(|| {
            IrError::invalid(&self.name, format!("no instruction at position {at}"))
        })?;
        if let Some(&next) = order.get(pos + 1) {
            return Ok(vec![InstrRef::new(at.block, next)]);
        }
        Ok(self
            .successors(at)?
            .into_iter()
            .map(|succ| self.block_entry(succ.block))
            .collect())
    }

    /// Block-level successors of block `idx`
    pub fn successor_blocks(&self, idx: usize) -> IrResult<Vec<usize>> {
        let block = self.blocks.get(idx).ok_or_else(|| {
            IrError::invalid(&self.name, format!("no block at index {idx}"))
        })?;
        match block.terminator() {
            Some(term) if matches!(term.opcode, Opcode::Br | Opcode::BrIcmp) => term
                .branch_targets()
                .into_iter()
                .map(|label| self.resolve_label(label))
                .collect(),
            Some(_) => Ok(Vec::new()),
            None if idx + 1 < self.blocks.len() => Ok(vec![idx + 1]),
            None => Ok(Vec::new()),
        }
    }

    /// Blocks with an edge into block `idx`
    pub fn predecessor_blocks(&self, idx: usize) -> IrResult<Vec<usize>> {
        let mut preds = Vec::new();
        for candidate in 0..self.blocks.len() {
            if self.successor_blocks(candidate)?.contains(&idx) {
                preds.push(candidate);
            }
        }
        Ok(preds)
    }
}

/// Header line, without the opening brace of a definition
impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_declaration { "declare" } else { "define" };
        write!(f, "{keyword} {} @{}(", self.return_type, self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{param}")?;
        }
        if self.is_variadic {
            if !self.parameters.is_empty() { write!(f, ", ")?; }
            write!(f, "...")?;
        }
        write!(f, ")")?;
        if self.does_not_throw {
            write!(f, " nounwind")?;
        }
        if self.readonly {
            write!(f, " readonly")?;
        }
        for modifier in &self.modifiers {
            write!(f, " {modifier}")?;
        }
        Ok(())
    }
}
