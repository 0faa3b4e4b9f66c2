use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use javelin_engine::parser::Lexer;

fn bench_keywords(c: &mut Criterion) {
    let source = "function class interface type enum const let if else for while return implements";

    c.bench_function("lex_keywords", |b| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });
}

fn bench_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("numbers");

    let integers = "42 123 0 999 1_000_000 0xFF 0o17 0b1010";
    group.bench_with_input(BenchmarkId::new("integers", "mixed radix"), &integers, |b, source| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });

    let floats = "3.14 2.718 1.0 .5 123.456e10 1.23e-5 10n";
    group.bench_with_input(BenchmarkId::new("floats", "with bigint"), &floats, |b, source| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });

    group.finish();
}

fn bench_strings_and_templates(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings");

    let escapes = r#""line1\nline2" 'tab\there' "quote\"test""#;
    group.bench_with_input(BenchmarkId::new("escapes", "basic"), &escapes, |b, source| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });

    let templates = r#"`Hello, ${name}!` `${a} + ${b} = ${a + b}`"#;
    group.bench_with_input(BenchmarkId::new("templates", "holes"), &templates, |b, source| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });

    group.finish();
}

fn bench_real_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("real_code");

    let class_def = r#"
        export class Account implements Named {
            private balance: number = 0;

            constructor(public name: string, private limit: number = 100) {}

            deposit(amount: number): void {
                this.balance += amount;
            }

            canWithdraw(amount: number): boolean {
                return this.balance - amount >= -this.limit;
            }
        }
    "#;

    group.throughput(Throughput::Bytes(class_def.len() as u64));
    group.bench_with_input(BenchmarkId::new("class", "with_methods"), &class_def, |b, source| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });

    let mut source = String::new();
    for i in 0..100 {
        source.push_str(&format!(
            r#"
            export function scale{i}(values: number[], factor: number = 2): number[] {{
                const result: number[] = [];
                for (const v of values) {{
                    result.push(v * factor);
                }}
                return result;
            }}
        "#
        ));
    }

    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_with_input(
        BenchmarkId::new("100_functions", format!("{} bytes", source.len())),
        &source,
        |b, source| {
            b.iter(|| {
                let lexer = Lexer::new(black_box(source));
                lexer.tokenize().unwrap()
            });
        },
    );

    group.finish();
}

criterion_group!(
    benches,
    bench_keywords,
    bench_numbers,
    bench_strings_and_templates,
    bench_real_code
);

criterion_main!(benches);
