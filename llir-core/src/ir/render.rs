//! IR Text Renderer
//!
//! Serializes a module back into the grammar the parser accepts:
//! module id and target lines, declarations, global variables, function
//! bodies and finally module metadata. Rendering then parsing yields a
//! module equal to the one rendered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use crate::ir::{BasicBlock, Function, Module};

const INDENT: &str = "  ";

/// Renderer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Render numeric block labels as `; <label>:N` comment lines
    pub implicit_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { implicit_labels: true }
    }
}

/// Module to text serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Display adapter for `module`
    pub fn display<'a>(&'a self, module: &'a Module) -> RenderedModule<'a> {
        RenderedModule { renderer: self, module }
    }

    pub fn render_to_string(&self, module: &Module) -> String {
        self.display(module).to_string()
    }

    /// Write the rendered module; only the writer's own errors surface
    pub fn render<W: io::Write>(&self, module: &Module, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.display(module))
    }

    pub fn write_module<W: fmt::Write>(&self, out: &mut W, module: &Module) -> fmt::Result {
        if let Some(id) = &module.module_id {
            writeln!(out, "{id}")?;
        }
        if !module.target_info.is_empty() {
            for line in &module.target_info {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
        }

        let mut any_declarations = false;
        for function in module.declarations() {
            self.write_header(out, function)?;
            writeln!(out)?;
            any_declarations = true;
        }
        if any_declarations {
            writeln!(out)?;
        }

        if !module.globals.is_empty() {
            for global in &module.globals {
                write!(out, "{global}")?;
                if let Some(comment) = &global.comment {
                    write!(out, "{comment}")?;
                }
                writeln!(out)?;
            }
            writeln!(out)?;
        }

        for (i, function) in module.definitions().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            self.write_function(out, function)?;
        }

        if !module.metadata.is_empty() {
            writeln!(out)?;
            for line in &module.metadata {
                writeln!(out, "{line}")?;
            }
        }
        Ok(())
    }

    fn write_header<W: fmt::Write>(&self, out: &mut W, function: &Function) -> fmt::Result {
        write!(out, "{function}")?;
        if function.is_declaration {
            if let Some(comment) = &function.comment {
                write!(out, "{comment}")?;
            }
        }
        Ok(())
    }

    fn write_function<W: fmt::Write>(&self, out: &mut W, function: &Function) -> fmt::Result {
        write!(out, "{function} {{")?;
        if let Some(comment) = &function.comment {
            write!(out, "{comment}")?;
        }
        writeln!(out)?;
        for (i, block) in function.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            self.write_block(out, block)?;
        }
        writeln!(out, "}}")
    }

    fn write_block<W: fmt::Write>(&self, out: &mut W, block: &BasicBlock) -> fmt::Result {
        let comment = block.comment.as_deref().unwrap_or("");
        if block.has_numeric_label() && self.options.implicit_labels {
            writeln!(out, "; <label>:{}{comment}", block.label)?;
        } else {
            writeln!(out, "{}:{comment}", block.label)?;
        }
        for instr in &block.instructions {
            write!(out, "{INDENT}{instr}")?;
            if let Some(comment) = &instr.comment {
                write!(out, "{comment}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// A module paired with the renderer that formats it
pub struct RenderedModule<'a> {
    renderer: &'a Renderer,
    module: &'a Module,
}

impl fmt::Display for RenderedModule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.renderer.write_module(f, self.module)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::default().write_module(f, self)
    }
}
