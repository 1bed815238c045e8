//! Benchmarks for the front half of the pipeline.
//!
//! - Parse only, parse + resolve, and the full pipeline through code
//!   generation for every target
//! - Synthetic programs of growing size: each class adds fields, a virtual
//!   method chain and a loop-heavy static method

use std::fmt::Write;
use std::hint::black_box;

use bumpalo::Bump;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use portc::{DefineSet, Input, Options, Session, Target};
use portc_parser::ParseSession;

/// A program of `classes` classes, each deriving from the previous one.
fn synthetic_program(classes: usize) -> String {
    let mut src = String::from("public enum Mode { Idle, Run = 3, Stop }\n");
    for i in 0..classes {
        let base = if i == 0 { String::new() } else { format!(" : C{}", i - 1) };
        let modifier = if i == 0 { "virtual" } else { "override" };
        let _ = write!(
            src,
            "public class C{i}{base} {{
    protected int f{i};
    private int[8] cells{i};
    public const int K{i} = {i} * 4 + 1;

    public {modifier} int Step(int n) {{
        int total = 0;
        for (int k = 0; k < n; k++) {{
            if (k % 3 == 0) {{ total += k * K{i}; }} else {{ total -= 1; }}
        }}
        return total + f{i};
    }}

    public static long Sum{i}(int[] values, int count) {{
        long acc = 0;
        int j = 0;
        while (j < count) {{
            acc += values[j];
            j++;
        }}
        return acc;
    }}
}}
"
        );
    }
    src
}

fn parse_and_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/resolve");
    for classes in [4, 32, 128] {
        let source = synthetic_program(classes);
        group.throughput(Throughput::Bytes(source.len() as u64));

        group.bench_with_input(BenchmarkId::new("parse", classes), &source, |b, source| {
            b.iter(|| {
                let arena = Bump::new();
                let mut session = ParseSession::new(&arena, DefineSet::new());
                let script = session.parse_file("bench.pc", black_box(source)).unwrap();
                black_box(script.items().len())
            });
        });

        group.bench_with_input(BenchmarkId::new("resolve", classes), &source, |b, source| {
            b.iter(|| {
                let arena = Bump::new();
                let mut session = ParseSession::new(&arena, DefineSet::new());
                let script = session.parse_file("bench.pc", black_box(source)).unwrap();
                let program = portc_resolver::resolve(&[script]).unwrap();
                black_box(program.methods().len())
            });
        });
    }
    group.finish();
}

fn generate_targets(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/generate");
    let inputs = vec![Input::new("bench.pc", synthetic_program(32))];
    for target in Target::ALL {
        let session = Session::new(Options::new(target, "bench.out", Vec::new()));
        group.bench_function(target.flag(), |b| {
            b.iter(|| {
                let compilation = session.compile(black_box(&inputs));
                black_box(compilation.result.map(|files| files.len()).unwrap_or_default())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, parse_and_resolve, generate_targets);
criterion_main!(benches);
