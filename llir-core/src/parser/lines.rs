//! Line-level lexing helpers
//!
//! IR text is never tokenized up front: each sub-grammar slices the line it
//! was handed. These helpers track string literals and bracket nesting, so
//! commas, semicolons and `@` inside aggregates or `c"..."` literals are not
//! taken for separators.

use crate::parser::errors::{PResult, ParseError};

/// Split `line` into code and trailing comment
///
/// The comment starts at the first `;` outside a string literal and keeps
/// the whitespace that preceded it.
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                let code_end = line[..i].trim_end().len();
                return (&line[..code_end], Some(&line[code_end..]));
            }
            _ => {}
        }
    }
    (line, None)
}

fn opens(c: char) -> bool {
    matches!(c, '(' | '[' | '{' | '<')
}

fn closes(c: char) -> bool {
    matches!(c, ')' | ']' | '}' | '>')
}

/// Byte offset of the first `target` at nesting depth zero, outside quotes
pub fn find_top_level(s: &str, target: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if c == target && depth == 0 {
            return Some(i);
        }
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth -= 1;
        }
    }
    None
}

/// Offset just past the bracket matching the one at `open`
pub fn matching_close(s: &str, open: usize) -> PResult<usize> {
    let mut depth = 0i32;
    let mut in_quotes = false;
    for (i, c) in s[open..].char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth -= 1;
            if depth == 0 {
                return Ok(open + i + c.len_utf8());
            }
        }
    }
    Err(ParseError::UnbalancedBrackets(s.to_string()))
}

/// Split at commas on nesting depth zero; pieces are trimmed
pub fn split_top_level(s: &str) -> PResult<Vec<&str>> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            c if opens(c) => depth += 1,
            c if closes(c) => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnbalancedBrackets(s.to_string()));
                }
            }
            _ => {}
        }
    }
    if depth != 0 || in_quotes {
        return Err(ParseError::UnbalancedBrackets(s.to_string()));
    }
    parts.push(s[start..].trim());
    Ok(parts)
}

/// First whitespace-delimited token and the rest
pub fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn star_len(s: &str) -> usize {
    s.len() - s.trim_start_matches('*').len()
}

/// Split a leading type off `s`
///
/// Handles aggregates (`[6 x i8]`, `{ i32, i8* }`, `<4 x i32>`), pointer
/// stars and function types (`i32 (i8*, ...)*`).
pub fn take_type(s: &str) -> PResult<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return Err(ParseError::MissingOperand("expected a type".to_string()));
    }
    let mut end = if s.starts_with(['[', '{', '<']) {
        matching_close(s, 0)?
    } else {
        s.find(|c: char| c.is_whitespace() || c == ',').unwrap_or(s.len())
    };
    end += star_len(&s[end..]);

    let rest = s[end..].trim_start();
    if rest.starts_with('(') {
        let close = matching_close(s, s.len() - rest.len())?;
        end = close + star_len(&s[close..]);
    }
    Ok((&s[..end], s[end..].trim_start()))
}

/// Whether `name` is a bare local or global identifier
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '$' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_comment_keeps_leading_whitespace() {
        assert_eq!(split_comment("  ret void  ; done"), ("  ret void", Some("  ; done")));
        assert_eq!(split_comment("; ModuleID = 'a.c'"), ("", Some("; ModuleID = 'a.c'")));
        assert_eq!(split_comment("ret void"), ("ret void", None));
    }

    #[test]
    fn test_split_comment_ignores_quoted_semicolon() {
        let line = r#"@s = constant [3 x i8] c"a;\00" ; tail"#;
        let (code, comment) = split_comment(line);
        assert_eq!(code, r#"@s = constant [3 x i8] c"a;\00""#);
        assert_eq!(comment, Some(" ; tail"));
    }

    #[test]
    fn test_split_top_level() {
        let parts = split_top_level("i32 %a, { i32, i8* } %s, [ %x, %bb ]").unwrap();
        assert_eq!(parts, vec!["i32 %a", "{ i32, i8* } %s", "[ %x, %bb ]"]);
        assert!(split_top_level("  ").unwrap().is_empty());
        assert!(matches!(split_top_level("[ %x, %bb"), Err(ParseError::UnbalancedBrackets(_))));
    }

    #[test]
    fn test_take_type() {
        assert_eq!(take_type("i32 %x").unwrap(), ("i32", "%x"));
        assert_eq!(take_type("[6 x i8]* @s").unwrap(), ("[6 x i8]*", "@s"));
        assert_eq!(take_type("{ i32, i8 } %v").unwrap(), ("{ i32, i8 }", "%v"));
        assert_eq!(take_type("i32 (i8*, ...)* @printf(i8* %f)").unwrap(), ("i32 (i8*, ...)*", "@printf(i8* %f)"));
        assert_eq!(take_type("i1, label %a").unwrap(), ("i1", ", label %a"));
    }

    #[test]
    fn test_find_top_level() {
        assert_eq!(find_top_level("{ i8* } @f(i32 %x)", '@'), Some(8));
        assert_eq!(find_top_level("[1 x i8] c\"@\"", '@'), None);
    }

    #[test]
    fn test_next_token() {
        assert_eq!(next_token("  add nsw i32"), ("add", "nsw i32"));
        assert_eq!(next_token("ret"), ("ret", ""));
    }
}
