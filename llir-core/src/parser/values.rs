//! Operand parsing
//!
//! Operands are written either bare, taking the type the instruction
//! declared once (`add i32 %a, 1`), or typed (`store i32 %a, i32* %p`).

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::ir::{types, ParamAttr, Parameter, Value};
use crate::parser::errors::{PResult, ParseError};
use crate::parser::lines::{is_identifier, next_token, split_top_level, take_type};
use crate::parser::IrParser;

/// `getelementptr inbounds (...)` and friends in operand position
static CONSTANT_EXPR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]+(?:\s+[a-z]+)*)\s*\((.*)\)$").expect("constant expression pattern")
});

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("integer pattern"));

impl IrParser {
    /// Parse a bare operand whose type `ty` is known from context
    pub(crate) fn parse_value(&self, text: &str, ty: &str) -> PResult<Value> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::MissingOperand(format!("expected a {ty} value")));
        }
        if text.starts_with('!') {
            return Ok(Value::Metadata(text.to_string()));
        }
        if let Some(label) = text.strip_prefix("label ") {
            return self.parse_label(label.trim());
        }
        match text {
            "true" => return Ok(Value::int(1, ty)),
            "false" => return Ok(Value::int(0, ty)),
            _ => {}
        }
        if INTEGER.is_match(text) {
            let value = text
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidInteger(text.to_string()))?;
            return Ok(Value::int(value, ty));
        }
        if let Some(name) = text.strip_prefix('%') {
            if !is_identifier(name) {
                return Err(ParseError::UnknownArgumentSyntax(text.to_string()));
            }
            if ty == types::LABEL {
                return Ok(Value::label(name));
            }
            if self.is_argument(name) {
                return Ok(Value::argument(name, ty));
            }
            return Ok(Value::temp(name, ty));
        }
        if let Some(name) = text.strip_prefix('@') {
            if !is_identifier(name) {
                return Err(ParseError::UnknownArgumentSyntax(text.to_string()));
            }
            return Ok(Value::global(name, ty));
        }
        if text.starts_with("c\"") {
            return Ok(Value::ConstantDataArray {
                literal: text.to_string(),
                ty: ty.to_string(),
            });
        }
        if let Some(caps) = CONSTANT_EXPR.captures(text) {
            let operands = self.parse_typed_values(&caps[2])?;
            trace!("constant expression `{}` with {} operand(s)", &caps[1], operands.len());
            return Ok(Value::ConstantExpr {
                opcode: caps[1].split_whitespace().collect::<Vec<_>>().join(" "),
                operands,
                ty: ty.to_string(),
            });
        }
        Err(ParseError::UnknownArgumentSyntax(text.to_string()))
    }

    /// `%name` in a label position
    pub(crate) fn parse_label(&self, text: &str) -> PResult<Value> {
        match text.strip_prefix('%') {
            Some(name) if is_identifier(name) => Ok(Value::label(name)),
            _ => Err(ParseError::UnknownArgumentSyntax(format!("label {text}"))),
        }
    }

    /// Parse `<type> <value>`
    ///
    /// Operand attributes are only meaningful on parameters and are
    /// rejected here.
    pub(crate) fn parse_typed_value(&self, text: &str) -> PResult<Value> {
        let text = text.trim();
        if text.starts_with('!') {
            return Ok(Value::Metadata(text.to_string()));
        }
        let (ty, rest) = take_type(text)?;
        if rest.is_empty() {
            return Err(ParseError::MissingOperand(format!("no value after type in `{text}`")));
        }
        if !rest.starts_with("c\"") && !CONSTANT_EXPR.is_match(rest) {
            let (word, value) = next_token(rest);
            if !value.is_empty() && ty != types::LABEL {
                return Err(ParseError::UnsupportedAttribute(word.to_string()));
            }
        }
        self.parse_value(rest, ty)
    }

    pub(crate) fn parse_typed_values(&self, text: &str) -> PResult<Vec<Value>> {
        split_top_level(text)?
            .into_iter()
            .map(|part| self.parse_typed_value(part))
            .collect()
    }

    /// Parse `<type> [attrs] [%name]` from a function header
    pub(crate) fn parse_parameter(&self, text: &str, require_name: bool) -> PResult<Parameter> {
        let (ty, rest) = take_type(text)?;
        let mut param = Parameter::new(None, ty);
        for word in rest.split_whitespace() {
            if param.name.is_some() {
                return Err(ParseError::MalformedDefinition(format!("unexpected `{word}` after parameter name")));
            }
            if let Some(name) = word.strip_prefix('%') {
                if !is_identifier(name) {
                    return Err(ParseError::UnknownArgumentSyntax(word.to_string()));
                }
                param.name = Some(name.to_string());
            } else if let Some(attr) = ParamAttr::from_token(word) {
                param.attributes.push(attr);
            } else {
                return Err(ParseError::UnsupportedAttribute(word.to_string()));
            }
        }
        if require_name && param.name.is_none() {
            return Err(ParseError::MalformedDefinition(format!("parameter `{}` has no name", text.trim())));
        }
        Ok(param)
    }

    fn is_argument(&self, name: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|state| state.function.is_parameter(name))
    }
}
