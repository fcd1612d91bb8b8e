use indoc::indoc;
use llir_common::IrError;
use llir_core::ir::{eliminate_phis, Opcode};
use llir_core::parse_module;
use pretty_assertions::assert_eq;

const SUM: &str = include_str!("data/sum.ll");

#[test]
fn test_two_way_phi_becomes_two_copies() {
    let mut module = parse_module(indoc! {"
        define i32 @pick(i1 %c) {
        entry:
          br i1 %c, label %then, label %else
        then:
          br label %join
        else:
          br label %join
        join:
          %x = phi i32 [ 1, %then ], [ 2, %else ]
          ret i32 %x
        }
    "})
    .unwrap();
    assert_eq!(eliminate_phis(&mut module).unwrap(), 1);

    let f = module.get_function("pick").unwrap();
    let then = f.get_block("then").unwrap();
    assert_eq!(then.instructions.last().unwrap().to_string(), "%x = mov i32 1");
    let other = f.get_block("else").unwrap();
    assert_eq!(other.instructions.last().unwrap().to_string(), "%x = mov i32 2");

    let join = f.get_block("join").unwrap();
    assert_eq!(join.instructions.len(), 1);
    assert_eq!(join.instructions[0].opcode, Opcode::Ret);
}

#[test]
fn test_module_without_phis_is_unchanged() {
    let source = indoc! {"
        define i32 @id(i32 %a) {
          ret i32 %a
        }
    "};
    let mut module = parse_module(source).unwrap();
    let before = module.clone();
    assert_eq!(eliminate_phis(&mut module).unwrap(), 0);
    assert_eq!(module, before);
}

#[test]
fn test_loop_phis_render() {
    let mut module = parse_module(SUM).unwrap();
    assert_eq!(eliminate_phis(&mut module).unwrap(), 3);
    let expected = indoc! {r#"
        ; ModuleID = 'sum.c'
        target datalayout = "e-p:64:64:64"
        target triple = "x86_64-unknown-linux-gnu"

        declare i32 @printf(i8* nocapture, ...) nounwind

        @.str = private unnamed_addr constant [4 x i8] c"%d\0A\00", align 1
        @g = common global i32 0, align 4

        define i32 @sum(i32 %n) nounwind readonly {
        entry:
          %cmp4 = icmp sgt i32 %n, 0
          br i1 %cmp4, label %for.body, label %for.end
          %i.06 = mov i32 0
          %s.05 = mov i32 0
          %s.0.lcssa = mov i32 0

        for.body:  ; preds = %entry, %for.body
          %add = add nsw i32 %s.05, %i.06
          %inc = add nsw i32 %i.06, 1
          %exitcond = icmp eq i32 %inc, %n
          br i1 %exitcond, label %for.end, label %for.body
          %i.06 = mov i32 %inc
          %s.05 = mov i32 %add
          %s.0.lcssa = mov i32 %add

        for.end:  ; preds = %for.body, %entry
          ret i32 %s.0.lcssa
        }

        define i32 @main() nounwind {
        ; <label>:0
          %1 = call i32 @sum(i32 10)
          %2 = tail call i32 (i8*, ...)* @printf(i8* getelementptr inbounds ([4 x i8]* @.str, i64 0, i64 0), i32 %1) nounwind
          store i32 %1, i32* @g, align 4
          ret i32 0
        }

        !0 = metadata !{metadata !"clang version 3.0"}
    "#};
    assert_eq!(module.to_string(), expected);

    // Copies parse back as `mov`
    let reparsed = parse_module(expected).unwrap();
    assert_eq!(reparsed, module);
}

#[test]
fn test_unresolved_predecessor() {
    let mut module = parse_module(indoc! {"
        define i32 @f() {
        entry:
          br label %join
        join:
          %x = phi i32 [ 1, %entry ], [ 2, %missing ]
          ret i32 %x
        }
    "})
    .unwrap();
    let before = module.clone();
    let err = eliminate_phis(&mut module).unwrap_err();
    assert_eq!(err, IrError::unresolved("f", "missing"));
    assert_eq!(module, before);
}
