//! Function header parsing
//!
//! `define <ret> @<name>(<params>) <mods> {` and
//! `declare <ret> @<name>(<params>) <mods>`.

use crate::ir::Function;
use crate::parser::errors::{PResult, ParseError};
use crate::parser::lines::{find_top_level, is_identifier, matching_close, split_top_level};
use crate::parser::IrParser;

impl IrParser {
    /// Parse a header; `header` excludes the leading keyword
    pub(crate) fn parse_function_header(&self, header: &str, is_definition: bool) -> PResult<Function> {
        let malformed = |reason: &str| ParseError::MalformedDefinition(format!("{reason} in `{}`", header.trim()));

        let at = find_top_level(header, '@').ok_or_else(|| malformed("missing function name"))?;
        let return_type = header[..at].trim();
        if return_type.is_empty() {
            return Err(malformed("missing return type"));
        }
        let after = &header[at + 1..];
        let open = after.find('(').ok_or_else(|| malformed("missing parameter list"))?;
        let name = after[..open].trim();
        if !is_identifier(name) {
            return Err(malformed("bad function name"));
        }
        let close = matching_close(after, open)?;

        let mut function = if is_definition {
            Function::new(name, return_type)
        } else {
            Function::declaration(name, return_type)
        };
        for param in split_top_level(&after[open + 1..close - 1])? {
            if param == "..." {
                function.is_variadic = true;
            } else if function.is_variadic {
                return Err(malformed("parameter after `...`"));
            } else {
                function.parameters.push(self.parse_parameter(param, is_definition)?);
            }
        }

        let mut mods = after[close..].trim();
        if is_definition {
            mods = mods
                .strip_suffix('{')
                .ok_or_else(|| malformed("expected `{` at end of definition"))?
                .trim_end();
        } else if mods.ends_with('{') {
            return Err(malformed("declaration with a body"));
        }
        for word in mods.split_whitespace() {
            match word {
                "nounwind" => function.does_not_throw = true,
                "readonly" => function.readonly = true,
                other => function.modifiers.push(other.to_string()),
            }
        }
        Ok(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ParamAttr;
    use crate::parser::ParserOptions;
    use pretty_assertions::assert_eq;

    fn parser() -> IrParser {
        IrParser::new(ParserOptions::default())
    }

    #[test]
    fn test_definition_header() {
        let f = parser()
            .parse_function_header("i32 @strlen(i8* nocapture %s) nounwind readonly uwtable {", true)
            .unwrap();
        assert_eq!(f.name, "strlen");
        assert_eq!(f.return_type, "i32");
        assert_eq!(f.parameters.len(), 1);
        assert_eq!(f.parameters[0].attributes, vec![ParamAttr::NoCapture]);
        assert!(f.does_not_throw);
        assert!(f.readonly);
        assert_eq!(f.modifiers, vec!["uwtable".to_string()]);
        assert!(!f.is_declaration);
        assert_eq!(f.to_string(), "define i32 @strlen(i8* nocapture %s) nounwind readonly uwtable");
    }

    #[test]
    fn test_variadic_declaration() {
        let f = parser().parse_function_header("i32 @printf(i8*, ...) #1", false).unwrap();
        assert!(f.is_declaration);
        assert!(f.is_variadic);
        assert_eq!(f.parameters[0].name, None);
        assert_eq!(f.modifiers, vec!["#1".to_string()]);
        assert_eq!(f.to_string(), "declare i32 @printf(i8*, ...) #1");
    }

    #[test]
    fn test_aggregate_return_type() {
        let f = parser().parse_function_header("{ i32, i8* } @pair() {", true).unwrap();
        assert_eq!(f.return_type, "{ i32, i8* }");
        assert!(f.parameters.is_empty());
    }

    #[test]
    fn test_missing_brace() {
        let err = parser().parse_function_header("i32 @main()", true).unwrap_err();
        assert!(matches!(err, ParseError::MalformedDefinition(_)));
    }

    #[test]
    fn test_unnamed_definition_parameter() {
        let err = parser().parse_function_header("void @f(i32) {", true).unwrap_err();
        assert!(matches!(err, ParseError::MalformedDefinition(_)));
    }
}
