//! IR Text Parser
//!
//! Builds a [`Module`] from LLVM-assembly-like text. The grammar is line
//! oriented: every line is a module-level construct (target info, global,
//! function header, metadata), a block label, an instruction or `}`. A
//! `;` starts a comment anywhere outside a string literal.
//!
//! The parser is a two-state machine: module scope and function body. All
//! state lives in [`IrParser`]; nothing is shared between parses.

pub mod errors;
mod lines;
mod values;
mod instructions;
mod globals;
mod functions;

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use llir_common::{IrResult, SourceLocation};
use crate::ir::{BasicBlock, Function, Module};

pub use errors::ParseError;
use errors::PResult;

/// `; <label>:N` comment lines open block `N`
static LABEL_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^;\s*<label>:([0-9]+)(\s*;.*)?\s*$").expect("label comment pattern")
});

const MODULE_ID_PREFIX: &str = "; ModuleID = ";

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Name reported in error locations
    pub filename: String,
}

impl ParserOptions {
    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self { filename: filename.into() }
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::with_filename("<input>")
    }
}

/// Function currently being parsed
pub(crate) struct FunctionState {
    pub(crate) function: Function,
    /// Next label for blocks opened without one
    next_label: u32,
}

/// Line-oriented IR parser
pub struct IrParser {
    options: ParserOptions,
    module: Module,
    pub(crate) current: Option<FunctionState>,
    line_no: u32,
}

/// Parse a whole module with default options
pub fn parse_module(text: &str) -> IrResult<Module> {
    IrParser::new(ParserOptions::default()).parse_str(text)
}

impl IrParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            module: Module::new(),
            current: None,
            line_no: 0,
        }
    }

    pub fn parse_str(self, text: &str) -> IrResult<Module> {
        self.parse_lines(text.lines())
    }

    /// Consume `lines` and return the finished module
    pub fn parse_lines<I, S>(mut self, lines: I) -> IrResult<Module>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line_no += 1;
            let raw = line.as_ref();
            self.parse_line(raw)
                .map_err(|err| err.at(self.location(), raw.trim()))?;
        }
        if let Some(state) = &self.current {
            return Err(ParseError::UnterminatedFunction(state.function.name.clone()).at(self.location(), ""));
        }
        debug!(
            "Parsed {} function(s) and {} global(s) from {}",
            self.module.functions.len(),
            self.module.globals.len(),
            self.options.filename
        );
        Ok(self.module)
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(&self.options.filename, self.line_no)
    }

    fn parse_line(&mut self, raw: &str) -> PResult<()> {
        let (code, comment) = lines::split_comment(raw);
        let code = code.trim();
        if code.is_empty() {
            return self.parse_comment_line(comment.unwrap_or_default().trim());
        }
        if self.current.is_some() {
            self.parse_body_line(code, comment)
        } else {
            self.parse_module_line(raw.trim(), code, comment)
        }
    }

    fn parse_comment_line(&mut self, comment: &str) -> PResult<()> {
        if self.current.is_some() {
            if let Some(caps) = LABEL_COMMENT.captures(comment) {
                let rest = caps.get(2).map(|m| m.as_str().trim_end());
                return self.open_block(&caps[1], rest);
            }
        } else if comment.starts_with(MODULE_ID_PREFIX) {
            self.module.module_id = Some(comment.to_string());
        }
        Ok(())
    }

    fn parse_module_line(&mut self, line: &str, code: &str, comment: Option<&str>) -> PResult<()> {
        let comment = comment.map(str::to_string);
        if code.starts_with("target ") || code.starts_with("source_filename") {
            trace!("target info: {line}");
            self.module.target_info.push(line.to_string());
        } else if code.starts_with('!') || code.starts_with("attributes ") {
            trace!("metadata: {line}");
            self.module.metadata.push(line.to_string());
        } else if code.starts_with('@') {
            let mut global = self.parse_global(code)?;
            global.comment = comment;
            self.module.add_global(global);
        } else if let Some(header) = code.strip_prefix("define ") {
            let mut function = self.parse_function_header(header, true)?;
            function.comment = comment;
            debug!("Entering function @{}", function.name);
            self.current = Some(FunctionState { function, next_label: 0 });
        } else if let Some(header) = code.strip_prefix("declare ") {
            let mut function = self.parse_function_header(header, false)?;
            function.comment = comment;
            trace!("declaration @{}", function.name);
            self.module.add_function(function);
        } else {
            return Err(ParseError::UnexpectedConstruct(format!("`{code}` at module scope")));
        }
        Ok(())
    }

    fn parse_body_line(&mut self, code: &str, comment: Option<&str>) -> PResult<()> {
        if code == "}" {
            if let Some(state) = self.current.take() {
                debug!(
                    "Leaving function @{} ({} block(s))",
                    state.function.name,
                    state.function.blocks.len()
                );
                self.module.add_function(state.function);
            }
            return Ok(());
        }
        if let Some(label) = code.strip_suffix(':') {
            return self.open_block(label.trim(), comment);
        }

        let mut instr = self.parse_instruction(code)?;
        instr.comment = comment.map(str::to_string);
        let state = self.function_state()?;
        if state.function.blocks.is_empty() {
            let label = state.next_label.to_string();
            state.next_label += 1;
            trace!("implicit block %{label}");
            state.function.add_block(BasicBlock::new(label));
        }
        if let Some(block) = state.function.blocks.last_mut() {
            block.add_instruction(instr);
        }
        Ok(())
    }

    fn open_block(&mut self, label: &str, comment: Option<&str>) -> PResult<()> {
        if !lines::is_identifier(label) {
            return Err(ParseError::UnknownArgumentSyntax(format!("{label}:")));
        }
        let state = self.function_state()?;
        if state.function.block_index(label).is_some() {
            return Err(ParseError::DuplicateLabel(label.to_string()));
        }
        trace!("block %{label}");
        let mut block = BasicBlock::new(label);
        block.comment = comment.filter(|c| !c.is_empty()).map(str::to_string);
        state.function.add_block(block);
        Ok(())
    }

    fn function_state(&mut self) -> PResult<&mut FunctionState> {
        self.current
            .as_mut()
            .ok_or_else(|| ParseError::UnexpectedConstruct("instruction outside a function".to_string()))
    }
}
