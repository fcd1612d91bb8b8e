//! Global variable parsing
//!
//! `@name = [external] [linkage] [unnamed_addr] global|constant <ty> [init][, align N]`

use log::trace;
use crate::ir::{GlobalVariable, Linkage};
use crate::parser::errors::{PResult, ParseError};
use crate::parser::lines::{is_identifier, next_token, split_top_level};
use crate::parser::IrParser;

impl IrParser {
    pub(crate) fn parse_global(&self, code: &str) -> PResult<GlobalVariable> {
        let (lhs, rhs) = code
            .split_once('=')
            .ok_or_else(|| ParseError::MalformedGlobal(format!("missing `=` in `{code}`")))?;
        let name = lhs
            .trim()
            .strip_prefix('@')
            .filter(|name| is_identifier(name))
            .ok_or_else(|| ParseError::MalformedGlobal(format!("bad name `{}`", lhs.trim())))?;

        let mut parts = split_top_level(rhs)?.into_iter();
        let mut rest = parts.next().unwrap_or_default();
        let mut var = GlobalVariable::new(name, "");
        for suffix in parts {
            let align = suffix
                .strip_prefix("align ")
                .ok_or_else(|| ParseError::MalformedGlobal(format!("unexpected `{suffix}`")))?
                .trim();
            var.alignment = Some(align.parse().map_err(|_| ParseError::InvalidInteger(align.to_string()))?);
        }

        loop {
            let (word, after) = next_token(rest);
            match word {
                "external" => var.is_declaration = true,
                "unnamed_addr" => var.unnamed_addr = true,
                "global" | "constant" => {
                    var.is_constant = word == "constant";
                    rest = after;
                    break;
                }
                _ => match Linkage::from_token(word) {
                    Some(linkage) => var.linkage = linkage,
                    None => {
                        return Err(ParseError::MalformedGlobal(format!(
                            "expected `global` or `constant`, found `{word}`"
                        )))
                    }
                },
            }
            rest = after;
        }

        if var.is_declaration {
            if rest.is_empty() {
                return Err(ParseError::MalformedGlobal("external global without a type".to_string()));
            }
            var.ty = rest.to_string();
        } else {
            let init = self.parse_typed_value(rest)?;
            var.ty = init.ty().to_string();
            var.initializer = Some(init);
        }
        trace!("global @{} : {}", var.name, var.ty);
        Ok(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Value;
    use crate::parser::ParserOptions;
    use pretty_assertions::assert_eq;

    fn parse(code: &str) -> PResult<GlobalVariable> {
        IrParser::new(ParserOptions::default()).parse_global(code)
    }

    #[test]
    fn test_common_global() {
        let var = parse("@g = common global i32 0").unwrap();
        assert_eq!(var.name, "g");
        assert_eq!(var.linkage, Linkage::Common);
        assert_eq!(var.ty, "i32");
        assert_eq!(var.initializer, Some(Value::int(0, "i32")));
        assert!(!var.is_constant);
        assert_eq!(var.to_string(), "@g = common global i32 0");
    }

    #[test]
    fn test_string_constant() {
        let line = r#"@.str = private unnamed_addr constant [6 x i8] c"a, b\0A\00", align 1"#;
        let var = parse(line).unwrap();
        assert_eq!(var.name, ".str");
        assert_eq!(var.linkage, Linkage::Private);
        assert!(var.unnamed_addr);
        assert!(var.is_constant);
        assert_eq!(var.ty, "[6 x i8]");
        assert_eq!(var.alignment, Some(1));
        assert_eq!(var.to_string(), line);
    }

    #[test]
    fn test_external_global() {
        let var = parse("@stdout = external global i8*").unwrap();
        assert!(var.is_declaration);
        assert_eq!(var.initializer, None);
        assert_eq!(var.ty, "i8*");
        assert_eq!(var.to_string(), "@stdout = external global i8*");
    }

    #[test]
    fn test_malformed_globals() {
        assert!(matches!(parse("@g common global i32 0"), Err(ParseError::MalformedGlobal(_))));
        assert!(matches!(parse("@g = common i32 0"), Err(ParseError::MalformedGlobal(_))));
        assert!(matches!(parse("@g = global i32 0, section \"x\""), Err(ParseError::MalformedGlobal(_))));
    }
}
