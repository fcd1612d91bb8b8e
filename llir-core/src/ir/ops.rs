//! IR Operations
//!
//! Defines the closed set of opcodes the parser recognizes, together with
//! the binary and cast operation families and integer comparison predicates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Load,
    Store,
    Icmp,
    Phi,
    Call,
    GetElementPtr,
    Br,
    /// Fused compare-and-branch
    BrIcmp,
    Ret,
    Alloca,
    Unreachable,
    /// Register copy, produced by phi elimination
    Copy,
    Binary(BinaryOp),
    Cast(CastOp),
}

impl Opcode {
    /// Look up the opcode spelled by `token`
    pub fn from_token(token: &str) -> Option<Opcode> {
        let opcode = match token {
            "load" => Opcode::Load,
            "store" => Opcode::Store,
            "icmp" => Opcode::Icmp,
            "phi" => Opcode::Phi,
            "call" => Opcode::Call,
            "getelementptr" => Opcode::GetElementPtr,
            "br" => Opcode::Br,
            "bricmp" => Opcode::BrIcmp,
            "ret" => Opcode::Ret,
            "alloca" => Opcode::Alloca,
            "unreachable" => Opcode::Unreachable,
            "mov" => Opcode::Copy,
            _ => {
                if let Some(op) = BinaryOp::from_token(token) {
                    Opcode::Binary(op)
                } else {
                    Opcode::Cast(CastOp::from_token(token)?)
                }
            }
        };
        Some(opcode)
    }

    /// Instructions that end a block and never fall through
    pub fn is_terminator(&self) -> bool {
        matches!(self, Opcode::Br | Opcode::BrIcmp | Opcode::Ret | Opcode::Unreachable)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Icmp => "icmp",
            Opcode::Phi => "phi",
            Opcode::Call => "call",
            Opcode::GetElementPtr => "getelementptr",
            Opcode::Br => "br",
            Opcode::BrIcmp => "bricmp",
            Opcode::Ret => "ret",
            Opcode::Alloca => "alloca",
            Opcode::Unreachable => "unreachable",
            Opcode::Copy => "mov",
            Opcode::Binary(op) => return write!(f, "{op}"),
            Opcode::Cast(op) => return write!(f, "{op}"),
        };
        write!(f, "{op_str}")
    }
}

/// Binary operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add, Sub, Mul,
    UDiv, SDiv,    // Unsigned/signed division
    URem, SRem,    // Unsigned/signed remainder

    // Bitwise
    Shl, LShr, AShr, // Logical/arithmetic shift right
    And, Or, Xor,

    // Floating point
    FAdd, FSub, FMul, FDiv, FRem,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<BinaryOp> {
        let op = match token {
            "add" => BinaryOp::Add,
            "sub" => BinaryOp::Sub,
            "mul" => BinaryOp::Mul,
            "udiv" => BinaryOp::UDiv,
            "sdiv" => BinaryOp::SDiv,
            "urem" => BinaryOp::URem,
            "srem" => BinaryOp::SRem,
            "shl" => BinaryOp::Shl,
            "lshr" => BinaryOp::LShr,
            "ashr" => BinaryOp::AShr,
            "and" => BinaryOp::And,
            "or" => BinaryOp::Or,
            "xor" => BinaryOp::Xor,
            "fadd" => BinaryOp::FAdd,
            "fsub" => BinaryOp::FSub,
            "fmul" => BinaryOp::FMul,
            "fdiv" => BinaryOp::FDiv,
            "frem" => BinaryOp::FRem,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::UDiv => "udiv",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::URem => "urem",
            BinaryOp::SRem => "srem",
            BinaryOp::Shl => "shl",
            BinaryOp::LShr => "lshr",
            BinaryOp::AShr => "ashr",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::FAdd => "fadd",
            BinaryOp::FSub => "fsub",
            BinaryOp::FMul => "fmul",
            BinaryOp::FDiv => "fdiv",
            BinaryOp::FRem => "frem",
        };
        write!(f, "{op_str}")
    }
}

/// Conversion operations: `<op> <ty> <value> to <ty2>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastOp {
    Trunc,
    ZExt,     // Zero extend
    SExt,     // Sign extend
    BitCast,
    PtrToInt, // Pointer to integer cast
    IntToPtr, // Integer to pointer cast
}

impl CastOp {
    pub fn from_token(token: &str) -> Option<CastOp> {
        let op = match token {
            "trunc" => CastOp::Trunc,
            "zext" => CastOp::ZExt,
            "sext" => CastOp::SExt,
            "bitcast" => CastOp::BitCast,
            "ptrtoint" => CastOp::PtrToInt,
            "inttoptr" => CastOp::IntToPtr,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            CastOp::Trunc => "trunc",
            CastOp::ZExt => "zext",
            CastOp::SExt => "sext",
            CastOp::BitCast => "bitcast",
            CastOp::PtrToInt => "ptrtoint",
            CastOp::IntToPtr => "inttoptr",
        };
        write!(f, "{op_str}")
    }
}

/// Integer comparison predicates shared by `icmp` and `bricmp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IcmpPredicate {
    Eq, Ne,
    Ugt, Uge, Ult, Ule, // Unsigned comparisons
    Sgt, Sge, Slt, Sle, // Signed comparisons
}

impl IcmpPredicate {
    pub fn from_token(token: &str) -> Option<IcmpPredicate> {
        let pred = match token {
            "eq" => IcmpPredicate::Eq,
            "ne" => IcmpPredicate::Ne,
            "ugt" => IcmpPredicate::Ugt,
            "uge" => IcmpPredicate::Uge,
            "ult" => IcmpPredicate::Ult,
            "ule" => IcmpPredicate::Ule,
            "sgt" => IcmpPredicate::Sgt,
            "sge" => IcmpPredicate::Sge,
            "slt" => IcmpPredicate::Slt,
            "sle" => IcmpPredicate::Sle,
            _ => return None,
        };
        Some(pred)
    }
}

impl fmt::Display for IcmpPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pred_str = match self {
            IcmpPredicate::Eq => "eq",
            IcmpPredicate::Ne => "ne",
            IcmpPredicate::Ugt => "ugt",
            IcmpPredicate::Uge => "uge",
            IcmpPredicate::Ult => "ult",
            IcmpPredicate::Ule => "ule",
            IcmpPredicate::Sgt => "sgt",
            IcmpPredicate::Sge => "sge",
            IcmpPredicate::Slt => "slt",
            IcmpPredicate::Sle => "sle",
        };
        write!(f, "{pred_str}")
    }
}
