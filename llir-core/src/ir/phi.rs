//! Phi Elimination
//!
//! Rewrites every `%x = phi ty [v1, %b1], [v2, %b2], ...` into one
//! `%x = mov ty vN` appended to the end of each predecessor `%bN`, then
//! deletes the phi. The result is no longer in SSA form: `%x` has one
//! definition per predecessor.

use llir_common::{IrError, IrResult};
use log::debug;
use crate::ir::{Function, Instruction, Module};

/// Eliminate phis in every defined function, returning how many were removed
pub fn eliminate_phis(module: &mut Module) -> IrResult<usize> {
    let mut total = 0;
    for function in module.functions.iter_mut().filter(|f| !f.is_declaration) {
        total += eliminate_function_phis(function)?;
    }
    debug!("Eliminated {total} phi instruction(s) in module");
    Ok(total)
}

/// Eliminate phis in one function
///
/// Every predecessor label is resolved before anything is modified, so an
/// unresolved label leaves the function untouched.
pub fn eliminate_function_phis(function: &mut Function) -> IrResult<usize> {
    let labels = function.label_table();
    let mut copies: Vec<(usize, Instruction)> = Vec::new();
    let mut phi_count = 0;

    for block in &function.blocks {
        for phi in block.snapshot().into_iter().filter(Instruction::is_phi) {
            let name = phi.name.as_deref().ok_or_else(|| {
                IrError::invalid(&function.name, format!("phi without a result in block %{}", block.label))
            })?;
            for (value, pred_label) in &phi.incoming {
                let pred = *labels
                    .get(pred_label.as_str())
                    .ok_or_else(|| IrError::unresolved(&function.name, pred_label))?;
                copies.push((pred, Instruction::copy(name, phi.ty.clone(), value.clone())));
            }
            phi_count += 1;
        }
    }

    for (pred, copy) in copies {
        function.blocks[pred].add_instruction(copy);
    }
    for block in &mut function.blocks {
        block.instructions.retain(|instr| !instr.is_phi());
    }

    if phi_count > 0 {
        debug!("@{}: replaced {phi_count} phi(s) with predecessor copies", function.name);
    }
    Ok(phi_count)
}
