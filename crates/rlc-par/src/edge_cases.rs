//! End-to-end parser scenarios over full source files.

use rlc_lex::{group, scan};
use rlc_util::Reporter;

use crate::ast::*;
use crate::{Parser, TypeKind};

fn compile(source: &str) -> (Module, Vec<String>) {
    let reporter = Reporter::new();
    let tree = group("main.rl", scan(source), &reporter);
    let mut parser = Parser::new("main.rl", &reporter);
    let module = parser.parse_module(&tree);
    let messages = reporter.faults().into_iter().map(|f| f.message).collect();
    (module, messages)
}

fn compile_clean(source: &str) -> Module {
    let (module, messages) = compile(source);
    assert!(messages.is_empty(), "unexpected faults: {:?}", messages);
    module
}

#[test]
fn hello_world() {
    let module = compile_clean("module main;\nfn main() {\n    writeln(\"Hello\");\n}\n");

    assert_eq!(module.name, "main");
    assert_eq!(module.functions.len(), 1);

    let main = &module.functions[0];
    assert_eq!(main.name, "main");
    assert_eq!(main.return_type.base, "void");

    let body = main.body.as_ref().expect("main has a body");
    assert_eq!(body.len(), 1);
    match &body[0] {
        ScopeItem::Call(call) => {
            assert_eq!(call.identifier, "writeln");
            assert_eq!(call.arguments.len(), 1);
            assert_eq!(call.arguments[0].raw, "\"Hello\"");
        },
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn chained_call_hangs_off_degenerate_root() {
    let module = compile_clean("module m;\nfn f() {\n    a.b().c(1,2).d();\n}\n");

    let body = module.functions[0].body.as_ref().unwrap();
    match &body[0] {
        ScopeItem::Call(call) => {
            assert_eq!(call.identifier, "a");
            assert!(call.arguments.is_empty());
            let chain: Vec<&str> = call.chain.iter().map(|c| c.identifier.as_str()).collect();
            assert_eq!(chain, vec!["b", "c", "d"]);
            assert_eq!(call.chain[1].arguments.len(), 2);
        },
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn bad_operator_mode_in_if_condition() {
    let (_, messages) = compile("module m;\nfn f() {\n    if x + y { }\n}\n");
    assert_eq!(messages, vec!["Illegal symbol '+' found in expression."]);
}

#[test]
fn unbalanced_brackets_drop_the_variable() {
    let (module, messages) = compile("module m;\nvar x = (1 + 2;\n");
    assert_eq!(messages, vec!["Missing ')' from expression."]);
    assert!(module.variables.is_empty());
}

#[test]
fn associative_array_literal() {
    let module = compile_clean("module m;\nvar map = [\"a\": 1, \"b\": 2];\n");

    let literal = module.variables[0]
        .expression
        .as_ref()
        .unwrap()
        .as_array()
        .expect("array literal");
    assert!(literal.is_associative);
    assert_eq!(literal.values.len(), 2);
    assert_eq!(literal.values[0].len(), 2);
    assert_eq!(literal.values[1].len(), 2);
}

#[test]
fn do_while_pairs_with_trailing_while() {
    let module = compile_clean("module m;\nfn f() {\n    do { i++; } while i < 10;\n}\n");

    let body = module.functions[0].body.as_ref().unwrap();
    assert_eq!(body.len(), 1);
    match &body[0] {
        ScopeItem::While(while_loop) => {
            assert!(while_loop.is_do);
            assert!(matches!(while_loop.body[0], ScopeItem::Assignment(_)));
        },
        other => panic!("expected do-while, got {:?}", other),
    }
}

#[test]
fn do_without_while_is_a_fault() {
    let (_, messages) = compile("module m;\nfn f() {\n    do { i++; }\n}\n");
    assert_eq!(messages, vec!["Missing while statement from do-while declaration."]);
}

#[test]
fn duplicate_module_statement_faults_once() {
    let (module, messages) = compile("module x;\nmodule x;\n");
    assert_eq!(module.name, "x");
    assert_eq!(messages, vec!["Only one module statement is allowed per module."]);
}

#[test]
fn composite_type_declaration() {
    let module = compile_clean("module m;\nvar ptr:int[10]:const foo;\n");

    let info = module.variables[0].ty.as_ref().unwrap();
    assert!(info.is_pointer);
    assert_eq!(info.base, "int");
    assert_eq!(info.kind, TypeKind::StaticArray(10));
    assert_eq!(info.mutability, Some(crate::Mutability::Const));
    assert_eq!(info.name, "foo");
}

#[test]
fn faults_appear_in_source_order() {
    let (_, messages) = compile(
        "module m;\nvar a = (1;\nfn f() {\n    if x + y { }\n}\nvar b = (2;\n",
    );
    assert_eq!(
        messages,
        vec![
            "Missing ')' from expression.",
            "Illegal symbol '+' found in expression.",
            "Missing ')' from expression.",
        ]
    );
}

#[test]
fn invalid_input_always_faults() {
    for source in [
        "fn 5bad() { }",
        "var = 1;",
        "import ;",
        "include nope;",
        "enum ;",
        "fn f() { break; }",
        "module a; module b;",
    ] {
        let (_, messages) = compile(source);
        assert!(!messages.is_empty(), "no fault for {:?}", source);
    }
}

#[test]
fn break_legality_tracks_handler_nesting() {
    // Legal in the loop, illegal again after it.
    let (_, messages) = compile(
        "module m;\nfn f() {\n    while x == 1 { break; }\n    break;\n}\n",
    );
    assert_eq!(messages, vec!["'break' is not allowed in this scope."]);
}

#[test]
fn module_collects_every_declaration_kind() {
    let module = compile_clean(
        "module app;\n\
         import io : writeln;\n\
         include \"stdio.h\";\n\
         alias Buffer = ptr:byte[];\n\
         enum limit : int = 64;\n\
         var int counter = 0;\n\
         internal fn int peek(int offset);\n\
         fn main() {\n\
             counter = counter + 1;\n\
         }\n",
    );

    assert_eq!(module.name, "app");
    assert_eq!(module.imports.len(), 1);
    assert_eq!(module.includes.len(), 1);
    assert_eq!(module.aliases.len(), 1);
    assert_eq!(module.enums.len(), 1);
    assert_eq!(module.variables.len(), 1);
    assert_eq!(module.internal_functions.len(), 1);
    assert_eq!(module.functions.len(), 1);
}

#[test]
fn attributes_buffer_across_declarations() {
    let module = compile_clean(
        "module m;\npublic: var int shared_counter;\nvar int plain;\n",
    );

    assert_eq!(module.variables[0].attributes.len(), 1);
    assert!(module.variables[1].attributes.is_empty());
}

#[test]
fn nested_control_flow() {
    let module = compile_clean(
        "module m;\n\
         fn f() {\n\
             foreach i , 0 .. 10 {\n\
                 if i == 5 {\n\
                     continue;\n\
                 }\n\
                 switch i {\n\
                     case 1, 2; { writeln(i); }\n\
                     default; { break; }\n\
                 }\n\
             }\n\
         }\n",
    );

    let body = module.functions[0].body.as_ref().unwrap();
    match &body[0] {
        ScopeItem::Foreach(foreach) => {
            assert_eq!(foreach.body.len(), 2);
            assert!(matches!(foreach.body[0], ScopeItem::If(_)));
            assert!(matches!(foreach.body[1], ScopeItem::Switch(_)));
        },
        other => panic!("expected foreach, got {:?}", other),
    }
}
