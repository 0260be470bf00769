use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ebrc::{Config, Interpreter, Session};

/// A config with `n` of each rule kind and one looping function per rule.
fn make_config(n: usize) -> String {
    let mut src = String::new();
    for i in 0..n {
        src.push_str(&format!("nojs=ads{i}.tracker.net\n"));
        src.push_str(&format!("novs=host{i}.intranet.\n"));
        src.push_str(&format!("proxy=http cache{i}.example.com 3128\n"));
        src.push_str(&format!("function+f{i}{{\nloop(3){{\nb page{i}\nif(?){{\nq\n}}\n}}\n}}\n"));
    }
    src.push_str("function:spin{\nloop(1000){\nstep ~1\n}\n}\n");
    src
}

fn bench_load(c: &mut Criterion) {
    let small = make_config(10);
    let large = make_config(1000);

    let mut g = c.benchmark_group("load");
    g.bench_function("small", |b| b.iter(|| Config::load_str(black_box(&small), "bench")));
    g.bench_function("large", |b| b.iter(|| Config::load_str(black_box(&large), "bench")));
    g.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let session = Session::new(Config::load_str(&make_config(1000), "bench").unwrap_or_default());

    let mut g = c.benchmark_group("lookup");
    g.bench_function("java_ok_miss", |b| {
        b.iter(|| session.java_ok(black_box("http://www.example.org/index.html")))
    });
    g.bench_function("java_ok_last", |b| {
        b.iter(|| session.java_ok(black_box("http://ads999.tracker.net/x.js")))
    });
    g.bench_function("proxy_first", |b| {
        b.iter(|| session.find_proxy_for_url(black_box("http://www.example.org/")))
    });
    g.bench_function("function_last", |b| {
        b.iter(|| session.config.rules.function(black_box("spin")).is_some())
    });
    g.finish();
}

fn bench_run(c: &mut Criterion) {
    let mut session = Session::new(Config::load_str(&make_config(10), "bench").unwrap_or_default());
    let mut eval = |_: &mut Session, cmd: &str| !cmd.is_empty();

    c.bench_function("run_loop_1000", |b| {
        b.iter(|| Interpreter::run(&mut session, &mut eval, black_box("spin fast")))
    });
}

criterion_group!(benches, bench_load, bench_lookup, bench_run);
criterion_main!(benches);
