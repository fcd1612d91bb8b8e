//! IR Value Representations
//!
//! Defines values that can be used as operands in IR instructions:
//! parameter and temporary references, globals, constants, labels and
//! constant expressions. Every value carries its type token.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::types;

/// IR Value - represents operands in IR instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Reference to a parameter of the enclosing function
    Argument { name: String, ty: String },

    /// Global symbol reference (variable or function)
    Global { name: String, ty: String },

    /// Constant integer
    ConstantInt { value: i64, ty: String },

    /// Constant data array, kept as written (`c"hello\00"`)
    ConstantDataArray { literal: String, ty: String },

    /// Result of an instruction in the same function
    Temp { name: String, ty: String },

    /// Basic block label
    Label(String),

    /// Constant expression such as `getelementptr inbounds (...)`
    ConstantExpr {
        opcode: String,
        operands: Vec<Value>,
        ty: String,
    },

    /// Opaque metadata tag (`!0`, `!dbg !12`)
    Metadata(String),
}

impl Value {
    pub fn temp(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Value::Temp { name: name.into(), ty: ty.into() }
    }

    pub fn argument(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Value::Argument { name: name.into(), ty: ty.into() }
    }

    pub fn global(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Value::Global { name: name.into(), ty: ty.into() }
    }

    pub fn int(value: i64, ty: impl Into<String>) -> Self {
        Value::ConstantInt { value, ty: ty.into() }
    }

    pub fn label(name: impl Into<String>) -> Self {
        Value::Label(name.into())
    }

    /// Type token of this value
    pub fn ty(&self) -> &str {
        match self {
            Value::Argument { ty, .. }
            | Value::Global { ty, .. }
            | Value::ConstantInt { ty, .. }
            | Value::ConstantDataArray { ty, .. }
            | Value::Temp { ty, .. }
            | Value::ConstantExpr { ty, .. } => ty,
            Value::Label(_) => types::LABEL,
            Value::Metadata(_) => types::METADATA,
        }
    }

    /// Function-local SSA name referenced by this value, if any
    pub fn local_name(&self) -> Option<&str> {
        match self {
            Value::Argument { name, .. } | Value::Temp { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Label name if this value refers to a basic block
    pub fn label_name(&self) -> Option<&str> {
        match self {
            Value::Label(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Value::ConstantInt { .. } | Value::ConstantDataArray { .. } | Value::ConstantExpr { .. }
        )
    }

    /// Display adapter rendering the value preceded by its type
    pub fn typed(&self) -> Typed<'_> {
        Typed(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Argument { name, .. } | Value::Temp { name, .. } => write!(f, "%{name}"),
            Value::Global { name, .. } => write!(f, "@{name}"),
            Value::ConstantInt { value, .. } => write!(f, "{value}"),
            Value::ConstantDataArray { literal, .. } => write!(f, "{literal}"),
            Value::Label(name) => write!(f, "%{name}"),
            Value::ConstantExpr { opcode, operands, .. } => {
                write!(f, "{opcode} (")?;
                for (i, op) in operands.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", op.typed())?;
                }
                write!(f, ")")
            }
            Value::Metadata(tag) => write!(f, "{tag}"),
        }
    }
}

/// `<type> <value>` rendering of an operand
pub struct Typed<'a>(&'a Value);

impl fmt::Display for Typed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Metadata(tag) => write!(f, "{tag}"),
            value => write!(f, "{} {}", value.ty(), value),
        }
    }
}
