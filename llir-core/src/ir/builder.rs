//! IR Builder
//!
//! Provides utilities for constructing IR programmatically, for producers
//! that already hold a compiled representation and bypass the text parser.
//! Unnamed results get fresh per-function numeric names, so every value
//! the builder hands out can be referenced by name.

use llir_common::{IrError, IrResult};
use crate::ir::{
    types, BasicBlock, BinaryOp, Function, IcmpPredicate, Instruction, Opcode, Value,
};

/// Builder for constructing IR
pub struct IrBuilder {
    current_function: Option<Function>,
    current_block: Option<usize>,
    next_temp_id: u32,
    next_label_id: u32,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self {
            current_function: None,
            current_block: None,
            next_temp_id: 0,
            next_label_id: 0,
        }
    }

    pub fn new_temp(&mut self) -> String {
        let temp = self.next_temp_id;
        self.next_temp_id += 1;
        temp.to_string()
    }

    pub fn new_label(&mut self) -> String {
        let label = self.next_label_id;
        self.next_label_id += 1;
        format!("bb{label}")
    }

    pub fn create_function(&mut self, name: &str, return_type: &str) -> &mut Function {
        // Temporaries and labels are numbered per function
        self.next_temp_id = 0;
        self.next_label_id = 0;
        self.current_block = None;
        self.current_function.insert(Function::new(name, return_type))
    }

    /// Add a named parameter and return a reference to it
    pub fn add_parameter(&mut self, name: &str, ty: &str) -> IrResult<Value> {
        let function = self.function_mut()?;
        function.add_parameter(Some(name.to_string()), ty);
        Ok(Value::argument(name, ty))
    }

    /// Append a block and make it the insertion point
    pub fn create_block(&mut self, label: &str) -> IrResult<()> {
        let function = self.function_mut()?;
        if function.block_index(label).is_some() {
            return Err(IrError::invalid(&function.name, format!("duplicate block label %{label}")));
        }
        function.add_block(BasicBlock::new(label));
        let idx = function.blocks.len() - 1;
        self.current_block = Some(idx);
        Ok(())
    }

    /// Move the insertion point to an existing block
    pub fn position_at_end(&mut self, label: &str) -> IrResult<()> {
        let function = self.function_mut()?;
        let idx = function.resolve_label(label)?;
        self.current_block = Some(idx);
        Ok(())
    }

    pub fn build_binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value, ty: &str) -> IrResult<Value> {
        self.build_valued(Opcode::Binary(op), ty, vec![lhs, rhs])
    }

    pub fn build_icmp(&mut self, pred: IcmpPredicate, lhs: Value, rhs: Value) -> IrResult<Value> {
        let ty = lhs.ty().to_string();
        let name = self.new_temp();
        let mut instr = Instruction::new(Opcode::Icmp, Some(name.clone()), Some(ty), vec![lhs, rhs]);
        instr.predicate = Some(pred);
        self.add_instruction(instr)?;
        Ok(Value::temp(name, "i1"))
    }

    pub fn build_load(&mut self, ptr: Value, result_type: &str) -> IrResult<Value> {
        let name = self.new_temp();
        self.add_instruction(Instruction::new(Opcode::Load, Some(name.clone()), None, vec![ptr]))?;
        Ok(Value::temp(name, result_type))
    }

    pub fn build_store(&mut self, value: Value, ptr: Value) -> IrResult<()> {
        self.add_instruction(Instruction::new(Opcode::Store, None, None, vec![value, ptr]))
    }

    pub fn build_alloca(&mut self, alloc_type: &str) -> IrResult<Value> {
        let name = self.new_temp();
        let instr = Instruction::new(Opcode::Alloca, Some(name.clone()), Some(alloc_type.to_string()), Vec::new());
        self.add_instruction(instr)?;
        Ok(Value::temp(name, format!("{alloc_type}*")))
    }

    pub fn build_gep(&mut self, ptr: Value, indices: Vec<Value>, inbounds: bool, result_type: &str) -> IrResult<Value> {
        let name = self.new_temp();
        let mut operands = vec![ptr];
        operands.extend(indices);
        let mut instr = Instruction::new(Opcode::GetElementPtr, Some(name.clone()), None, operands);
        instr.inbounds = inbounds;
        self.add_instruction(instr)?;
        Ok(Value::temp(name, result_type))
    }

    /// Call `callee`; void calls produce no value
    pub fn build_call(&mut self, callee: Value, args: Vec<Value>, result_type: &str) -> IrResult<Option<Value>> {
        let name = if result_type == types::VOID {
            None
        } else {
            Some(self.new_temp())
        };
        let mut operands = args;
        operands.push(callee);
        let instr = Instruction::new(Opcode::Call, name.clone(), Some(result_type.to_string()), operands);
        self.add_instruction(instr)?;
        Ok(name.map(|n| Value::temp(n, result_type)))
    }

    pub fn build_phi(&mut self, ty: &str, incoming: Vec<(Value, String)>) -> IrResult<Value> {
        let name = self.new_temp();
        let mut instr = Instruction::new(Opcode::Phi, Some(name.clone()), Some(ty.to_string()), Vec::new());
        instr.incoming = incoming;
        self.add_instruction(instr)?;
        Ok(Value::temp(name, ty))
    }

    pub fn build_copy(&mut self, name: &str, value: Value) -> IrResult<()> {
        self.add_instruction(Instruction::copy(name, None, value))
    }

    pub fn build_return(&mut self, value: Option<Value>) -> IrResult<()> {
        let instr = match value {
            Some(value) => {
                let ty = value.ty().to_string();
                Instruction::new(Opcode::Ret, None, Some(ty), vec![value])
            }
            None => Instruction::new(Opcode::Ret, None, Some(types::VOID.to_string()), Vec::new()),
        };
        self.add_instruction(instr)
    }

    pub fn build_branch(&mut self, label: &str) -> IrResult<()> {
        self.add_instruction(Instruction::branch(label))
    }

    pub fn build_branch_cond(&mut self, condition: Value, true_label: &str, false_label: &str) -> IrResult<()> {
        self.add_instruction(Instruction::cond_branch(condition, true_label, false_label))
    }

    pub fn build_br_icmp(
        &mut self,
        pred: IcmpPredicate,
        lhs: Value,
        rhs: Value,
        true_label: &str,
        false_label: &str,
    ) -> IrResult<()> {
        let ty = lhs.ty().to_string();
        self.add_instruction(Instruction::br_icmp(pred, &ty, lhs, rhs, true_label, false_label))
    }

    pub fn current_block_has_terminator(&self) -> bool {
        match (&self.current_function, self.current_block) {
            (Some(function), Some(idx)) => function.blocks.get(idx).is_some_and(BasicBlock::has_terminator),
            _ => false,
        }
    }

    pub fn finish_function(&mut self) -> Option<Function> {
        self.current_block = None;
        self.current_function.take()
    }

    fn build_valued(&mut self, opcode: Opcode, ty: &str, operands: Vec<Value>) -> IrResult<Value> {
        let name = self.new_temp();
        let instr = Instruction::new(opcode, Some(name.clone()), Some(ty.to_string()), operands);
        self.add_instruction(instr)?;
        Ok(Value::temp(name, ty))
    }

    fn function_mut(&mut self) -> IrResult<&mut Function> {
        self.current_function
            .as_mut()
            .ok_or_else(|| IrError::invalid("<builder>", "no current function".to_string()))
    }

    fn add_instruction(&mut self, instr: Instruction) -> IrResult<()> {
        let block_idx = self.current_block;
        let function = self.function_mut()?;
        match block_idx.and_then(|idx| function.blocks.get_mut(idx)) {
            Some(block) => {
                block.add_instruction(instr);
                Ok(())
            }
            None => Err(IrError::invalid(&function.name, "no current block".to_string())),
        }
    }
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}
