use indoc::indoc;
use llir_core::ir::{IrBuilder, RenderOptions, Renderer};
use llir_core::{parse_module, Module};
use pretty_assertions::assert_eq;

const SUM: &str = include_str!("data/sum.ll");

fn round_trip(module: &Module) -> Module {
    parse_module(&module.to_string()).unwrap()
}

#[test]
fn test_parse_render_parse_is_identity() {
    let module = parse_module(SUM).unwrap();
    assert_eq!(round_trip(&module), module);
}

#[test]
fn test_declaration_after_definition_round_trips() {
    let source = indoc! {r#"
        define i32 @main() {
          %1 = call i32 @puts(i8* @msg)
          ret i32 0
        }

        declare i32 @puts(i8* nocapture) nounwind
    "#};
    let module = parse_module(source).unwrap();
    let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["puts", "main"]);
    assert_eq!(round_trip(&module), module);
}

#[test]
fn test_render_is_a_fixed_point() {
    let once = parse_module(SUM).unwrap().to_string();
    let twice = parse_module(&once).unwrap().to_string();
    assert_eq!(twice, once);
}

#[test]
fn test_explicit_labels_round_trip() {
    let module = parse_module(SUM).unwrap();
    let renderer = Renderer::new(RenderOptions { implicit_labels: false });
    let text = renderer.render_to_string(&module);
    assert!(text.contains("\n0:\n"));
    assert_eq!(parse_module(&text).unwrap(), module);
}

#[test]
fn test_rendered_text() {
    let source = indoc! {r#"
        @g = common global i32 0

        define void @touch(i32* %p) {
        entry:
          %arrayidx = getelementptr inbounds i32* %p, i64 1
          %v = load i32* %arrayidx, align 4
          %w = sext i32 %v to i64
          store i32 %v, i32* @g
          ret void
        }
    "#};
    let module = parse_module(source).unwrap();
    assert_eq!(module.to_string(), source);
}

#[test]
fn test_gep_inbounds_survives_rendering() {
    let module = parse_module(indoc! {"
        define i8* @at(i8* %base) {
          %p = getelementptr inbounds i8* %base, i32 4
          ret i8* %p
        }
    "})
    .unwrap();
    let text = module.to_string();
    assert!(text.contains("%p = getelementptr inbounds i8* %base, i32 4"));
    let reparsed = parse_module(&text).unwrap();
    let gep = &reparsed.get_function("at").unwrap().blocks[0].instructions[0];
    assert!(gep.inbounds);
}

#[test]
fn test_builder_output_round_trips() {
    let mut builder = IrBuilder::new();
    builder.create_function("double", "i32");
    let x = builder.add_parameter("x", "i32").unwrap();
    let entry = builder.new_label();
    builder.create_block(&entry).unwrap();
    let slot = builder.build_alloca("i32").unwrap();
    builder.build_store(x.clone(), slot.clone()).unwrap();
    let loaded = builder.build_load(slot, "i32").unwrap();
    let sum = builder
        .build_binary(llir_core::ir::BinaryOp::Add, loaded, x, "i32")
        .unwrap();
    builder.build_return(Some(sum)).unwrap();

    let mut module = Module::new();
    module.add_function(builder.finish_function().unwrap());
    assert_eq!(
        module.to_string(),
        indoc! {"
            define i32 @double(i32 %x) {
            bb0:
              %0 = alloca i32
              store i32 %x, i32* %0
              %1 = load i32* %0
              %2 = add i32 %1, %x
              ret i32 %2
            }
        "}
    );
    assert_eq!(round_trip(&module), module);
}

#[test]
fn test_comments_are_kept() {
    let module = parse_module(indoc! {"
        @g = global i32 1 ; counter

        define void @f() { ; entry point
        top:  ; no preds
          ret void ; done
        }
    "})
    .unwrap();
    assert_eq!(module.globals[0].comment.as_deref(), Some(" ; counter"));
    let f = module.get_function("f").unwrap();
    assert_eq!(f.comment.as_deref(), Some(" ; entry point"));
    assert_eq!(f.blocks[0].comment.as_deref(), Some("  ; no preds"));
    assert_eq!(f.blocks[0].instructions[0].comment.as_deref(), Some(" ; done"));
    assert_eq!(round_trip(&module), module);
}

#[test]
fn test_json_model_matches_parsed_module() {
    let module = parse_module(SUM).unwrap();
    let json = serde_json::to_string(&module).unwrap();
    let decoded: Module = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, module);
    assert_eq!(decoded.to_string(), module.to_string());
}
