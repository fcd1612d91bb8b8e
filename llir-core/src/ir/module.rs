//! Module and Global Variables
//!
//! Defines the top-level module structure and global variable management.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{Function, Value};

/// Linkage types for global symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Linkage {
    #[default]
    External,  // Default linkage, not spelled out
    Private,
    Internal,
    LinkOnce,
    Weak,
    Common,
}

impl Linkage {
    pub fn from_token(token: &str) -> Option<Linkage> {
        let linkage = match token {
            "private" => Linkage::Private,
            "internal" => Linkage::Internal,
            "linkonce" => Linkage::LinkOnce,
            "weak" => Linkage::Weak,
            "common" => Linkage::Common,
            _ => return None,
        };
        Some(linkage)
    }

    /// Keyword as written in IR text; empty for the default linkage
    pub fn keyword(&self) -> &'static str {
        match self {
            Linkage::External => "",
            Linkage::Private => "private",
            Linkage::Internal => "internal",
            Linkage::LinkOnce => "linkonce",
            Linkage::Weak => "weak",
            Linkage::Common => "common",
        }
    }
}

/// Global variable definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: String,
    /// Type of the initializer (the value type, not the pointer type)
    pub ty: String,
    pub initializer: Option<Value>,
    pub linkage: Linkage,
    pub alignment: Option<u32>,
    pub is_constant: bool,
    pub unnamed_addr: bool,
    /// `external` globals have no initializer
    pub is_declaration: bool,
    pub comment: Option<String>,
}

impl GlobalVariable {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            initializer: None,
            linkage: Linkage::External,
            alignment: None,
            is_constant: false,
            unnamed_addr: false,
            is_declaration: false,
            comment: None,
        }
    }
}

impl fmt::Display for GlobalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} =", self.name)?;
        if self.is_declaration {
            write!(f, " external")?;
        }
        let linkage = self.linkage.keyword();
        if !linkage.is_empty() {
            write!(f, " {linkage}")?;
        }
        if self.unnamed_addr {
            write!(f, " unnamed_addr")?;
        }
        let kind = if self.is_constant { "constant" } else { "global" };
        write!(f, " {kind} {}", self.ty)?;
        if let Some(init) = &self.initializer {
            write!(f, " {init}")?;
        }
        if let Some(align) = self.alignment {
            write!(f, ", align {align}")?;
        }
        Ok(())
    }
}

/// IR Module - the root owner of one parsed compilation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// `; ModuleID = '...'` line
    pub module_id: Option<String>,
    pub functions: Vec<Function>,
    pub globals: Vec<GlobalVariable>,
    /// `target ...` / `source_filename ...` lines, verbatim
    pub target_info: Vec<String>,
    /// `!...` / `attributes ...` lines, verbatim
    pub metadata: Vec<String>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declarations stay ahead of definitions, matching rendered order
    pub fn add_function(&mut self, function: Function) {
        if function.is_declaration {
            let at = self
                .functions
                .iter()
                .position(|f| !f.is_declaration)
                .unwrap_or(self.functions.len());
            self.functions.insert(at, function);
        } else {
            self.functions.push(function);
        }
    }

    pub fn add_global(&mut self, global: GlobalVariable) {
        self.globals.push(global);
    }

    pub fn function(&self, idx: usize) -> Option<&Function> {
        self.functions.get(idx)
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn get_global(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| f.is_declaration)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| !f.is_declaration)
    }
}
