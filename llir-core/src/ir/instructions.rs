//! IR Instructions
//!
//! A single record type covers every opcode. The operand list is ordered
//! per opcode, and opcode-specific details (predicate, alignment, phi
//! incoming pairs, ...) live in dedicated fields.
//!
//! Two-label branches keep their labels in (false, true) order:
//! `br i1 %c, label %T, label %F` is stored as `[%c, %F, %T]`, and
//! `bricmp eq i32 %a, %b, label %T, label %F` as `[%a, %b, %F, %T]`.
//! [`Instruction::branch_targets`] undoes the swap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use crate::ir::{types, IcmpPredicate, Opcode, Value};

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Result name; `None` for instructions producing no value
    pub name: Option<String>,
    pub opcode: Opcode,
    /// Declared type shared by untyped operands (or the call type)
    pub ty: Option<String>,
    pub operands: Vec<Value>,
    /// `icmp` / `bricmp` predicate
    pub predicate: Option<IcmpPredicate>,
    /// Phi incoming (value, predecessor label) pairs
    #[serde(default)]
    pub incoming: Vec<(Value, String)>,
    pub alignment: Option<u32>,
    pub metadata: Option<String>,
    #[serde(default)]
    pub inbounds: bool,
    /// `load getelementptr ...` form: load from a computed offset
    #[serde(default)]
    pub offset_load: bool,
    #[serde(default)]
    pub tail: bool,
    /// Wrap flags of binary ops (`nsw`, `nuw`, `exact`) or call-site
    /// attributes following the argument list
    #[serde(default)]
    pub flags: Vec<String>,
    /// Destination type of a cast
    pub cast_to: Option<String>,
    /// Trailing comment, including its leading whitespace
    pub comment: Option<String>,
}

impl Instruction {
    pub fn new(opcode: Opcode, name: Option<String>, ty: Option<String>, operands: Vec<Value>) -> Self {
        Self {
            name,
            opcode,
            ty,
            operands,
            predicate: None,
            incoming: Vec::new(),
            alignment: None,
            metadata: None,
            inbounds: false,
            offset_load: false,
            tail: false,
            flags: Vec::new(),
            cast_to: None,
            comment: None,
        }
    }

    /// `%name = mov <ty> <value>`
    pub fn copy(name: &str, ty: Option<String>, value: Value) -> Self {
        let ty = ty.or_else(|| Some(value.ty().to_string()));
        Self::new(Opcode::Copy, Some(name.to_string()), ty, vec![value])
    }

    /// Unconditional `br label %target`
    pub fn branch(target: &str) -> Self {
        Self::new(
            Opcode::Br,
            None,
            Some(types::LABEL.to_string()),
            vec![Value::label(target)],
        )
    }

    /// Two-way `br` on `condition`
    pub fn cond_branch(condition: Value, true_label: &str, false_label: &str) -> Self {
        let ty = condition.ty().to_string();
        Self::new(
            Opcode::Br,
            None,
            Some(ty),
            vec![condition, Value::label(false_label), Value::label(true_label)],
        )
    }

    /// Fused `bricmp <pred> <ty> lhs, rhs, label %true, label %false`
    pub fn br_icmp(pred: IcmpPredicate, ty: &str, lhs: Value, rhs: Value, true_label: &str, false_label: &str) -> Self {
        let mut instr = Self::new(
            Opcode::BrIcmp,
            None,
            Some(ty.to_string()),
            vec![lhs, rhs, Value::label(false_label), Value::label(true_label)],
        );
        instr.predicate = Some(pred);
        instr
    }

    /// Names this instruction defines: its result name, if any
    pub fn defines(&self) -> BTreeSet<String> {
        self.name.iter().cloned().collect()
    }

    /// Function-local SSA names read by this instruction
    ///
    /// Globals, constants and labels are not uses. Phi incoming values count
    /// as uses at the phi itself.
    pub fn uses(&self) -> BTreeSet<String> {
        self.operands
            .iter()
            .chain(self.incoming.iter().map(|(value, _)| value))
            .filter_map(|value| value.local_name())
            .map(str::to_string)
            .collect()
    }

    /// Branch target labels in semantic order: (true, false) for two-way
    /// branches, the single target for `br label %x`, nothing otherwise
    pub fn branch_targets(&self) -> Vec<&str> {
        let labels: Vec<&Value> = match (self.opcode, self.operands.len()) {
            (Opcode::Br, 1) => vec![&self.operands[0]],
            (Opcode::Br, 3) => vec![&self.operands[2], &self.operands[1]],
            (Opcode::BrIcmp, 4) => vec![&self.operands[3], &self.operands[2]],
            _ => Vec::new(),
        };
        labels.into_iter().filter_map(Value::label_name).collect()
    }

    pub fn is_terminator(&self) -> bool {
        self.opcode.is_terminator()
    }

    pub fn is_phi(&self) -> bool {
        self.opcode == Opcode::Phi
    }

    fn ty_str(&self) -> &str {
        self.ty.as_deref().unwrap_or(types::VOID)
    }

    fn write_suffix(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(align) = self.alignment {
            write!(f, ", align {align}")?;
        }
        if let Some(metadata) = &self.metadata {
            write!(f, ", {metadata}")?;
        }
        Ok(())
    }
}

fn write_untyped(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 { write!(f, ", ")?; }
        write!(f, "{value}")?;
    }
    Ok(())
}

fn write_typed<'a>(f: &mut fmt::Formatter<'_>, values: impl IntoIterator<Item = &'a Value>) -> fmt::Result {
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 { write!(f, ", ")?; }
        write!(f, "{}", value.typed())?;
    }
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "%{name} = ")?;
        }
        let ty = self.ty_str();
        match self.opcode {
            Opcode::Load => {
                write!(f, "load ")?;
                if self.offset_load {
                    write!(f, "getelementptr ")?;
                }
                write_typed(f, &self.operands)?;
            }
            Opcode::Store => {
                write!(f, "store ")?;
                write_typed(f, &self.operands)?;
            }
            Opcode::GetElementPtr => {
                write!(f, "getelementptr ")?;
                if self.inbounds {
                    write!(f, "inbounds ")?;
                }
                write_typed(f, &self.operands)?;
            }
            Opcode::Icmp => {
                write!(f, "icmp ")?;
                if let Some(pred) = self.predicate {
                    write!(f, "{pred} ")?;
                }
                write!(f, "{ty} ")?;
                write_untyped(f, &self.operands)?;
            }
            Opcode::BrIcmp => {
                write!(f, "bricmp ")?;
                if let Some(pred) = self.predicate {
                    write!(f, "{pred} ")?;
                }
                write!(f, "{ty} ")?;
                if self.operands.len() == 4 {
                    write_untyped(f, &self.operands[..2])?;
                    write!(f, ", ")?;
                    write_typed(f, [&self.operands[3], &self.operands[2]])?;
                } else {
                    write_untyped(f, &self.operands)?;
                }
            }
            Opcode::Phi => {
                write!(f, "phi {ty} ")?;
                for (i, (value, label)) in self.incoming.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "[ {value}, %{label} ]")?;
                }
            }
            Opcode::Call => {
                if self.tail {
                    write!(f, "tail ")?;
                }
                match self.operands.split_last() {
                    Some((callee, args)) => {
                        // Variadic calls must spell out the callee's full function type
                        let call_ty = if types::is_variadic(callee.ty()) { callee.ty() } else { ty };
                        write!(f, "call {call_ty} {callee}(")?;
                        write_typed(f, args)?;
                        write!(f, ")")?;
                    }
                    None => write!(f, "call {ty}")?,
                }
                for flag in &self.flags {
                    write!(f, " {flag}")?;
                }
            }
            Opcode::Br => {
                write!(f, "br ")?;
                if self.operands.len() == 3 {
                    write_typed(f, [&self.operands[0], &self.operands[2], &self.operands[1]])?;
                } else {
                    write_typed(f, &self.operands)?;
                }
            }
            Opcode::Ret => {
                if self.operands.is_empty() {
                    write!(f, "ret {ty}")?;
                } else {
                    write!(f, "ret ")?;
                    write_typed(f, &self.operands)?;
                }
            }
            Opcode::Alloca => {
                write!(f, "alloca {ty}")?;
                for value in &self.operands {
                    write!(f, ", {}", value.typed())?;
                }
            }
            Opcode::Unreachable => write!(f, "unreachable")?,
            Opcode::Copy => {
                write!(f, "mov {ty} ")?;
                write_untyped(f, &self.operands)?;
            }
            Opcode::Binary(op) => {
                write!(f, "{op} ")?;
                for flag in &self.flags {
                    write!(f, "{flag} ")?;
                }
                write!(f, "{ty} ")?;
                write_untyped(f, &self.operands)?;
            }
            Opcode::Cast(op) => {
                write!(f, "{op} {ty} ")?;
                write_untyped(f, &self.operands)?;
                if let Some(to) = &self.cast_to {
                    write!(f, " to {to}")?;
                }
            }
        }
        self.write_suffix(f)
    }
}
