//! Instruction parsing
//!
//! One instruction per line: `[%name =] [tail] <opcode> <rest>`. The shape
//! of `<rest>` depends on the opcode; most opcodes declare one type that
//! every operand shares, while memory and call operands carry their own.

use log::trace;
use crate::ir::{types, IcmpPredicate, Instruction, Opcode, Value};
use crate::parser::errors::{PResult, ParseError};
use crate::parser::lines::{find_top_level, is_identifier, matching_close, next_token, split_top_level, take_type};
use crate::parser::IrParser;

const WRAP_FLAGS: [&str; 3] = ["nsw", "nuw", "exact"];

impl IrParser {
    /// Parse an instruction line with its comment already split off
    pub(crate) fn parse_instruction(&self, code: &str) -> PResult<Instruction> {
        let (name, rhs) = split_result_name(code)?;

        let (mut token, mut rest) = next_token(rhs);
        let mut tail = false;
        if token == "tail" {
            tail = true;
            (token, rest) = next_token(rest);
        }
        let opcode = Opcode::from_token(token).ok_or_else(|| ParseError::UnsupportedOpcode(token.to_string()))?;
        trace!("instruction `{opcode}` defining {name:?}");

        let mut instr = Instruction::new(opcode, name, None, Vec::new());
        instr.tail = tail;
        match opcode {
            Opcode::Icmp | Opcode::BrIcmp => self.parse_compare(&mut instr, rest)?,
            Opcode::Load => {
                if let Some(after) = rest.strip_prefix("getelementptr ") {
                    instr.offset_load = true;
                    rest = after;
                }
                let args = strip_suffixes(&mut instr, split_top_level(rest)?)?;
                instr.operands = self.typed_operands(&args)?;
                // `load getelementptr` carries its offsets inline
                if instr.offset_load {
                    expect_at_least_one_operand(&instr)?;
                } else {
                    expect_operands(&instr, 1)?;
                }
            }
            Opcode::Store => {
                let args = strip_suffixes(&mut instr, split_top_level(rest)?)?;
                instr.operands = self.typed_operands(&args)?;
                expect_operands(&instr, 2)?;
            }
            Opcode::GetElementPtr => {
                if let Some(after) = rest.strip_prefix("inbounds ") {
                    instr.inbounds = true;
                    rest = after;
                }
                let args = strip_suffixes(&mut instr, split_top_level(rest)?)?;
                instr.operands = self.typed_operands(&args)?;
                expect_at_least_one_operand(&instr)?;
            }
            Opcode::Phi => self.parse_phi(&mut instr, rest)?,
            Opcode::Call => self.parse_call(&mut instr, rest)?,
            Opcode::Br => {
                let ty = self.parse_shared_type_operands(&mut instr, rest)?;
                match instr.operands.len() {
                    1 => {}
                    // `br i1 %c, label %T, label %F` is stored as [%c, %F, %T]
                    3 => instr.operands.swap(1, 2),
                    n => return Err(ParseError::MissingOperand(format!("`br {ty}` takes 1 or 3 operands, found {n}"))),
                }
            }
            Opcode::Ret => {
                let (ty, args) = take_type(rest)?;
                instr.ty = Some(ty.to_string());
                if ty == types::VOID {
                    let suffixes = match args.strip_prefix(',') {
                        Some(after) => split_top_level(after)?,
                        None if args.is_empty() => Vec::new(),
                        None => return Err(ParseError::UnexpectedConstruct(format!("`{args}` after ret void"))),
                    };
                    if let Some(extra) = strip_suffixes(&mut instr, suffixes)?.first() {
                        return Err(ParseError::UnexpectedConstruct(format!("`{extra}` after ret void")));
                    }
                } else {
                    self.parse_shared_type_operands(&mut instr, rest)?;
                    expect_operands(&instr, 1)?;
                }
            }
            Opcode::Alloca => {
                let (ty, args) = take_type(rest)?;
                instr.ty = Some(ty.to_string());
                if let Some(counts) = args.strip_prefix(',') {
                    let counts = strip_suffixes(&mut instr, split_top_level(counts)?)?;
                    instr.operands = self.typed_operands(&counts)?;
                } else if !args.is_empty() {
                    return Err(ParseError::UnexpectedConstruct(format!("`{args}` after alloca type")));
                }
            }
            Opcode::Unreachable => {
                if !rest.is_empty() {
                    return Err(ParseError::UnexpectedConstruct(format!("`{rest}` after unreachable")));
                }
            }
            Opcode::Copy => {
                self.parse_shared_type_operands(&mut instr, rest)?;
                expect_operands(&instr, 1)?;
            }
            Opcode::Binary(_) => {
                loop {
                    let (word, after) = next_token(rest);
                    if !WRAP_FLAGS.contains(&word) {
                        break;
                    }
                    instr.flags.push(word.to_string());
                    rest = after;
                }
                self.parse_shared_type_operands(&mut instr, rest)?;
                expect_operands(&instr, 2)?;
            }
            Opcode::Cast(op) => {
                let (ty, args) = take_type(rest)?;
                instr.ty = Some(ty.to_string());
                let args = strip_suffixes(&mut instr, split_top_level(args)?)?;
                let [cast] = args.as_slice() else {
                    return Err(ParseError::UnexpectedConstruct(format!("`{op}` takes one operand")));
                };
                let (value, to) = cast
                    .rsplit_once(" to ")
                    .ok_or_else(|| ParseError::MissingOperand(format!("`{op}` needs a destination type")))?;
                instr.operands = vec![self.parse_value(value, ty)?];
                instr.cast_to = Some(to.trim().to_string());
            }
        }
        Ok(instr)
    }

    /// `<pred> <ty> a, b` and, for `bricmp`, `, label %T, label %F`
    fn parse_compare(&self, instr: &mut Instruction, rest: &str) -> PResult<()> {
        let (pred, rest) = next_token(rest);
        instr.predicate = Some(
            IcmpPredicate::from_token(pred).ok_or_else(|| ParseError::UnknownPredicate(pred.to_string()))?,
        );
        self.parse_shared_type_operands(instr, rest)?;
        if instr.opcode == Opcode::BrIcmp {
            expect_operands(instr, 4)?;
            instr.operands.swap(2, 3);
        } else {
            expect_operands(instr, 2)?;
        }
        Ok(())
    }

    /// `<ty> v1, v2, ...` where every operand has type `ty`
    fn parse_shared_type_operands<'a>(&self, instr: &mut Instruction, rest: &'a str) -> PResult<&'a str> {
        let (ty, args) = take_type(rest)?;
        instr.ty = Some(ty.to_string());
        let args = strip_suffixes(instr, split_top_level(args)?)?;
        instr.operands = args
            .iter()
            .map(|arg| self.parse_value(arg, ty))
            .collect::<PResult<Vec<_>>>()?;
        Ok(ty)
    }

    /// `<ty> [ v1, %b1 ], [ v2, %b2 ], ...`
    fn parse_phi(&self, instr: &mut Instruction, rest: &str) -> PResult<()> {
        let (ty, pairs) = take_type(rest)?;
        instr.ty = Some(ty.to_string());
        let pairs = strip_suffixes(instr, split_top_level(pairs)?)?;
        for pair in pairs {
            let inner = pair
                .strip_prefix('[')
                .and_then(|p| p.strip_suffix(']'))
                .ok_or_else(|| ParseError::UnknownArgumentSyntax(pair.to_string()))?;
            let parts = split_top_level(inner)?;
            let [value, label] = parts.as_slice() else {
                return Err(ParseError::UnknownArgumentSyntax(pair.to_string()));
            };
            let label = label
                .strip_prefix('%')
                .filter(|l| is_identifier(l))
                .ok_or_else(|| ParseError::UnknownArgumentSyntax(label.to_string()))?;
            instr.incoming.push((self.parse_value(value, ty)?, label.to_string()));
        }
        if instr.incoming.is_empty() {
            return Err(ParseError::MissingOperand("phi without incoming values".to_string()));
        }
        Ok(())
    }

    /// `<ty> <callee>(<typed args>) [attrs][, suffixes]`
    ///
    /// The callee is stored as the last operand, typed with the call type.
    fn parse_call(&self, instr: &mut Instruction, rest: &str) -> PResult<()> {
        let (ty, rest) = take_type(rest)?;
        instr.ty = Some(ty.to_string());
        let open = find_top_level(rest, '(')
            .ok_or_else(|| ParseError::MissingOperand("call without an argument list".to_string()))?;
        let callee_text = rest[..open].trim();
        if !callee_text.starts_with(['@', '%']) {
            return Err(ParseError::UnknownArgumentSyntax(callee_text.to_string()));
        }
        let close = matching_close(rest, open)?;
        let mut operands = self.typed_operands(&split_top_level(&rest[open + 1..close - 1])?)?;
        operands.push(self.parse_value(callee_text, ty)?);
        instr.operands = operands;

        let trailing = rest[close..].trim();
        let (attrs, suffixes) = match find_top_level(trailing, ',') {
            Some(comma) => (&trailing[..comma], Some(&trailing[comma + 1..])),
            None => (trailing, None),
        };
        instr.flags = attrs.split_whitespace().map(str::to_string).collect();
        if let Some(suffixes) = suffixes {
            let leftover = strip_suffixes(instr, split_top_level(suffixes)?)?;
            if let Some(extra) = leftover.first() {
                return Err(ParseError::UnexpectedConstruct(format!("`{extra}` after call")));
            }
        }
        Ok(())
    }

    fn typed_operands(&self, args: &[&str]) -> PResult<Vec<Value>> {
        args.iter().map(|arg| self.parse_typed_value(arg)).collect()
    }
}

/// Split `%name = <rest>`; only lines starting with `%` define a result
fn split_result_name(code: &str) -> PResult<(Option<String>, &str)> {
    if !code.starts_with('%') {
        return Ok((None, code));
    }
    let (lhs, rhs) = code
        .split_once('=')
        .ok_or_else(|| ParseError::UnexpectedConstruct(format!("`{code}`")))?;
    let name = lhs.trim().trim_start_matches('%');
    if !is_identifier(name) {
        return Err(ParseError::UnknownArgumentSyntax(lhs.trim().to_string()));
    }
    Ok((Some(name.to_string()), rhs.trim()))
}

/// Strip a trailing `!metadata` operand, then a trailing `align N`
fn strip_suffixes<'a>(instr: &mut Instruction, mut args: Vec<&'a str>) -> PResult<Vec<&'a str>> {
    if let Some(last) = args.last().filter(|a| a.starts_with('!')) {
        instr.metadata = Some(last.to_string());
        args.pop();
    }
    if let Some(align) = args.last().and_then(|a| a.strip_prefix("align ")) {
        let align = align.trim();
        instr.alignment = Some(
            align
                .parse::<u32>()
                .map_err(|_| ParseError::InvalidInteger(align.to_string()))?,
        );
        args.pop();
    }
    Ok(args)
}

fn expect_at_least_one_operand(instr: &Instruction) -> PResult<()> {
    if instr.operands.is_empty() {
        return Err(ParseError::MissingOperand(format!("`{}` takes at least one operand", instr.opcode)));
    }
    Ok(())
}

fn expect_operands(instr: &Instruction, count: usize) -> PResult<()> {
    if instr.operands.len() != count {
        return Err(ParseError::MissingOperand(format!(
            "`{}` takes {count} operand(s), found {}",
            instr.opcode,
            instr.operands.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BinaryOp, CastOp};
    use crate::parser::ParserOptions;
    use pretty_assertions::assert_eq;

    fn parse(code: &str) -> Instruction {
        IrParser::new(ParserOptions::default()).parse_instruction(code).unwrap()
    }

    fn parse_err(code: &str) -> ParseError {
        IrParser::new(ParserOptions::default()).parse_instruction(code).unwrap_err()
    }

    #[test]
    fn test_binary_with_flags() {
        let instr = parse("%sum = add nsw i32 %a, 1");
        assert_eq!(instr.name.as_deref(), Some("sum"));
        assert_eq!(instr.opcode, Opcode::Binary(BinaryOp::Add));
        assert_eq!(instr.flags, vec!["nsw".to_string()]);
        assert_eq!(instr.operands, vec![Value::temp("a", "i32"), Value::int(1, "i32")]);
        assert_eq!(instr.to_string(), "%sum = add nsw i32 %a, 1");
    }

    #[test]
    fn test_load_suffixes() {
        let instr = parse("%v = load i32* %p, align 4, !tbaa !1");
        assert_eq!(instr.alignment, Some(4));
        assert_eq!(instr.metadata.as_deref(), Some("!tbaa !1"));
        assert_eq!(instr.operands, vec![Value::temp("p", "i32*")]);
        assert_eq!(instr.to_string(), "%v = load i32* %p, align 4, !tbaa !1");
    }

    #[test]
    fn test_offset_load() {
        let instr = parse("%v = load getelementptr i32* %p");
        assert!(instr.offset_load);
        assert_eq!(instr.operands.len(), 1);

        let line = "%w = load getelementptr i32* %p, i32 4, align 4";
        let instr = parse(line);
        assert_eq!(instr.operands, vec![Value::temp("p", "i32*"), Value::int(4, "i32")]);
        assert_eq!(instr.alignment, Some(4));
        assert_eq!(instr.to_string(), line);
        assert!(matches!(parse_err("%w = load getelementptr align 4"), ParseError::MissingOperand(_)));
        assert!(matches!(parse_err("%w = load i32* %p, i32 4"), ParseError::MissingOperand(_)));
    }

    #[test]
    fn test_store() {
        let instr = parse("store i32 0, i32* %retval");
        assert_eq!(instr.name, None);
        assert_eq!(instr.operands, vec![Value::int(0, "i32"), Value::temp("retval", "i32*")]);
    }

    #[test]
    fn test_conditional_branch_stores_false_label_first() {
        let instr = parse("br i1 %cmp, label %then, label %else");
        assert_eq!(
            instr.operands,
            vec![Value::temp("cmp", "i1"), Value::label("else"), Value::label("then")]
        );
        assert_eq!(instr.branch_targets(), vec!["then", "else"]);
        assert_eq!(instr.to_string(), "br i1 %cmp, label %then, label %else");
    }

    #[test]
    fn test_unconditional_branch() {
        let instr = parse("br label %exit");
        assert_eq!(instr.operands, vec![Value::label("exit")]);
        assert_eq!(instr, Instruction::branch("exit"));
    }

    #[test]
    fn test_bricmp() {
        let instr = parse("bricmp slt i32 %i, 10, label %body, label %done");
        assert_eq!(instr.predicate, Some(IcmpPredicate::Slt));
        assert_eq!(instr.operands[2], Value::label("done"));
        assert_eq!(instr.operands[3], Value::label("body"));
        assert_eq!(instr.to_string(), "bricmp slt i32 %i, 10, label %body, label %done");
    }

    #[test]
    fn test_phi() {
        let instr = parse("%x = phi i32 [ 0, %entry ], [ %next, %loop ]");
        assert_eq!(
            instr.incoming,
            vec![
                (Value::int(0, "i32"), "entry".to_string()),
                (Value::temp("next", "i32"), "loop".to_string()),
            ]
        );
        assert_eq!(instr.to_string(), "%x = phi i32 [ 0, %entry ], [ %next, %loop ]");
    }

    #[test]
    fn test_variadic_call() {
        let line = "%call = tail call i32 (i8*, ...)* @printf(i8* getelementptr inbounds ([4 x i8]* @.str, i32 0, i32 0), i32 %n) nounwind";
        let instr = parse(line);
        assert!(instr.tail);
        assert_eq!(instr.flags, vec!["nounwind".to_string()]);
        assert_eq!(instr.operands.last(), Some(&Value::global("printf", "i32 (i8*, ...)*")));
        assert_eq!(instr.operands.len(), 3);
        assert_eq!(instr.to_string(), line);
    }

    #[test]
    fn test_void_call() {
        let instr = parse("call void @exit(i32 1) noreturn");
        assert_eq!(instr.name, None);
        assert_eq!(instr.to_string(), "call void @exit(i32 1) noreturn");
    }

    #[test]
    fn test_gep_inbounds() {
        let instr = parse("%arrayidx = getelementptr inbounds i32* %a, i64 %idx");
        assert!(instr.inbounds);
        assert_eq!(instr.to_string(), "%arrayidx = getelementptr inbounds i32* %a, i64 %idx");
    }

    #[test]
    fn test_ret_forms() {
        let void = parse("ret void");
        assert!(void.operands.is_empty());
        assert_eq!(void.to_string(), "ret void");
        let value = parse("ret i32 %r");
        assert_eq!(value.operands, vec![Value::temp("r", "i32")]);

        let tagged = parse("ret void, !dbg !1");
        assert!(tagged.operands.is_empty());
        assert_eq!(tagged.metadata.as_deref(), Some("!dbg !1"));
        assert_eq!(tagged.to_string(), "ret void, !dbg !1");
        assert!(matches!(parse_err("ret void %x"), ParseError::UnexpectedConstruct(_)));
        assert!(matches!(parse_err("ret void, i32 1"), ParseError::UnexpectedConstruct(_)));
    }

    #[test]
    fn test_alloca_and_cast() {
        let alloca = parse("%p = alloca i32, align 4");
        assert_eq!(alloca.ty.as_deref(), Some("i32"));
        assert_eq!(alloca.alignment, Some(4));
        assert_eq!(alloca.to_string(), "%p = alloca i32, align 4");

        let cast = parse("%w = sext i32 %n to i64");
        assert_eq!(cast.opcode, Opcode::Cast(CastOp::SExt));
        assert_eq!(cast.cast_to.as_deref(), Some("i64"));
        assert_eq!(cast.to_string(), "%w = sext i32 %n to i64");

        let tagged = parse("%w = sext i32 %n to i64, !dbg !3");
        assert_eq!(tagged.cast_to.as_deref(), Some("i64"));
        assert_eq!(tagged.metadata.as_deref(), Some("!dbg !3"));
        assert_eq!(tagged.to_string(), "%w = sext i32 %n to i64, !dbg !3");
        assert!(matches!(parse_err("%w = sext i32 %n, %m to i64"), ParseError::UnexpectedConstruct(_)));
    }

    #[test]
    fn test_copy_round_trips() {
        let instr = parse("%x = mov i32 %a");
        assert_eq!(instr, Instruction::copy("x", Some("i32".to_string()), Value::temp("a", "i32")));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_err("%x = frobnicate i32 1"), ParseError::UnsupportedOpcode("frobnicate".to_string()));
        assert_eq!(parse_err("%c = icmp wat i32 %a, %b"), ParseError::UnknownPredicate("wat".to_string()));
        assert!(matches!(parse_err("br i1 %c, label %a"), ParseError::MissingOperand(_)));
        assert!(matches!(parse_err("%x = add i32 %a"), ParseError::MissingOperand(_)));
        assert!(matches!(parse_err("%x = phi i32 [ 0, %a"), ParseError::UnbalancedBrackets(_)));
    }
}
