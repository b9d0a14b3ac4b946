//! Parser benchmarks.
//!
//! Run with: `cargo bench --package rlc-par`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rlc_lex::{group, scan};
use rlc_par::Parser;
use rlc_util::Reporter;

fn parse_declaration_count(source: &str) -> usize {
    let reporter = Reporter::new();
    let tree = group("bench.rl", scan(source), &reporter);
    let mut parser = Parser::new("bench.rl", &reporter);
    let module = parser.parse_module(&tree);
    module.functions.len() + module.variables.len()
}

fn bench_parser_declarations(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let source = "module main;\nfn main() {\n    writeln(\"Hello\");\n}\n";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("hello_world", |b| {
        b.iter(|| parse_declaration_count(black_box(source)))
    });

    group.bench_function("typed_variables", |b| {
        b.iter(|| {
            parse_declaration_count(black_box(
                "module m;\nvar int a = 1;\nvar ptr:byte[] buffer;\nvar string[int] names;\n",
            ))
        })
    });

    group.finish();
}

fn bench_parser_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_expressions");

    group.bench_function("arithmetic", |b| {
        b.iter(|| {
            parse_declaration_count(black_box("module m;\nvar x = 1 + 2 * 3 - 4 / 5 % 6;\n"))
        })
    });

    group.bench_function("chained_calls", |b| {
        b.iter(|| {
            parse_declaration_count(black_box(
                "module m;\nfn f() {\n    a.b().c(1,2).d();\n}\n",
            ))
        })
    });

    group.bench_function("associative_array", |b| {
        b.iter(|| {
            parse_declaration_count(black_box(
                "module m;\nvar table = [\"a\": 1, \"b\": 2, \"c\": 3];\n",
            ))
        })
    });

    group.finish();
}

fn bench_parser_control_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_control_flow");

    let source = r#"
        module demo;

        fn main() {
            for var i = 0 , i < 100 , i++ {
                switch i {
                    case 0 .. 10; { writeln(i); }
                    case 11, 12, 13; { break; }
                    default; { continue; }
                }
            }
        }
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("loops_and_switch", |b| {
        b.iter(|| parse_declaration_count(black_box(source)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parser_declarations,
    bench_parser_expressions,
    bench_parser_control_flow
);
criterion_main!(benches);
