//! SSA invariant checks
//!
//! Verifies the structural invariants a parsed function in SSA form must
//! satisfy. Run it before phi elimination: the copies that pass introduces
//! define the same name once per predecessor.

use llir_common::{IrError, IrResult};
use std::collections::{HashMap, HashSet};
use crate::ir::{Function, Module};

pub fn verify_module(module: &Module) -> IrResult<()> {
    for function in &module.functions {
        verify_function(function)?;
    }
    Ok(())
}

pub fn verify_function(function: &Function) -> IrResult<()> {
    if function.is_declaration {
        if !function.blocks.is_empty() {
            return Err(IrError::invalid(&function.name, "declaration has a body".to_string()));
        }
        return Ok(());
    }
    if function.blocks.is_empty() {
        return Err(IrError::invalid(&function.name, "defined function has no blocks".to_string()));
    }

    let mut labels = HashSet::new();
    for block in &function.blocks {
        if !labels.insert(block.label.as_str()) {
            return Err(IrError::invalid(
                &function.name,
                format!("duplicate block label %{}", block.label),
            ));
        }
    }

    let mut defined: HashMap<&str, usize> = HashMap::new();
    for param in &function.parameters {
        if let Some(name) = &param.name {
            *defined.entry(name.as_str()).or_default() += 1;
        }
    }
    for (_, instr) in function.instructions() {
        if let Some(name) = &instr.name {
            *defined.entry(name.as_str()).or_default() += 1;
        }
    }
    if let Some((name, _)) = defined.iter().find(|(_, count)| **count > 1) {
        return Err(IrError::invalid(
            &function.name,
            format!("%{name} is defined more than once"),
        ));
    }

    for (at, instr) in function.instructions() {
        for used in instr.uses() {
            if !defined.contains_key(used.as_str()) {
                return Err(IrError::invalid(
                    &function.name,
                    format!("%{used} used at {at} has no definition"),
                ));
            }
        }
        for label in instr.branch_targets() {
            function.resolve_label(label)?;
        }
        for (_, label) in &instr.incoming {
            function.resolve_label(label)?;
        }
    }
    Ok(())
}
