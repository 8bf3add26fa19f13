use criterion::*;
use talos_regex::RegExp;

const PATTERN: &str = "(ab|cd[e-m]+)*&~(\"forbidden\")|x{2,7}(<10-42>|[^qz])?";

fn parse_pattern(pattern: &str) {
    let re = RegExp::new(pattern).expect("pattern parses");
    black_box(re);
}

fn compile_pattern(pattern: &str) {
    let re = RegExp::new(pattern).expect("pattern parses");
    let automaton = re.to_automaton().expect("pattern compiles");
    black_box(automaton);
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", move |b| b.iter(|| parse_pattern(PATTERN)));
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile", move |b| b.iter(|| compile_pattern(PATTERN)));
}

criterion_group!(benches, bench_parse, bench_compile);
criterion_main!(benches);
