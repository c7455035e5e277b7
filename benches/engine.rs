//! Analysis throughput benchmarks
//!
//! Measures a full pass (parse, bind, rule evaluation) over generated C# and
//! Visual Basic sources of increasing size, plus the parse step alone.
//!
//! Run with: cargo bench --bench engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use secscan_engine::{analyze_source, Analyzer, CSharpTree, RuleCatalog, SurfaceSyntax, VbTree};

/// Method counts per generated source
const SIZES: &[usize] = &[10, 100, 500];

/// A class with `methods` members; every fourth one hardcodes a password
fn csharp_source(methods: usize) -> String {
    let mut source = String::from("using System;\nusing System.Net;\n\nnamespace Bench\n{\n    class Generated\n    {\n");
    for i in 0..methods {
        let password = if i % 4 == 0 {
            format!("\"secret{}\"", i)
        } else {
            "input".to_string()
        };
        source.push_str(&format!(
            "        void Method{i}(string input)\n        {{\n            var total = input.Length + {i};\n            var c = new NetworkCredential(Guid.NewGuid().ToString(), {password});\n            c.Domain = \"corp\";\n        }}\n\n"
        ));
    }
    source.push_str("    }\n}\n");
    source
}

fn vb_source(methods: usize) -> String {
    let mut source = String::from("Imports System\nImports System.Net\n\nNamespace Bench\n    Class Generated\n");
    for i in 0..methods {
        let password = if i % 4 == 0 {
            format!("\"secret{}\"", i)
        } else {
            "input".to_string()
        };
        source.push_str(&format!(
            "        Sub Method{i}(input As String)\n            Dim total = input.Length + {i}\n            Dim c = New NetworkCredential(Guid.NewGuid().ToString(), {password})\n            c.Domain = \"corp\"\n        End Sub\n\n"
        ));
    }
    source.push_str("    End Class\nEnd Namespace\n");
    source
}

fn source_for(syntax: SurfaceSyntax, methods: usize) -> String {
    match syntax {
        SurfaceSyntax::CSharp => csharp_source(methods),
        SurfaceSyntax::VisualBasic => vb_source(methods),
    }
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    group.measurement_time(Duration::from_secs(10));

    let analyzer = Analyzer::new(RuleCatalog::builtin());

    for syntax in [SurfaceSyntax::CSharp, SurfaceSyntax::VisualBasic] {
        for &methods in SIZES {
            let source = source_for(syntax, methods);
            group.throughput(Throughput::Bytes(source.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(syntax.name(), methods),
                &source,
                |b, source| {
                    b.iter(|| {
                        let found = analyze_source(black_box(source), syntax, "Bench", &analyzer)
                            .expect("analysis failed");
                        assert_eq!(found.len(), methods.div_ceil(4));
                        found
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for &methods in SIZES {
        let cs = csharp_source(methods);
        group.throughput(Throughput::Bytes(cs.len() as u64));
        group.bench_with_input(BenchmarkId::new("csharp", methods), &cs, |b, source| {
            b.iter(|| CSharpTree::parse(black_box(source)).expect("parse failed"));
        });

        let vb = vb_source(methods);
        group.throughput(Throughput::Bytes(vb.len() as u64));
        group.bench_with_input(BenchmarkId::new("vb", methods), &vb, |b, source| {
            b.iter(|| VbTree::parse(black_box(source)).expect("parse failed"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_parse);
criterion_main!(benches);
