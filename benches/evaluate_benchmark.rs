use criterion::{Criterion, black_box, criterion_group, criterion_main};
use plot_expr::Expression;
use plot_expr::fitting::cubic_spline;

const FORMULAS: &[&str] = &[
    "x^2 + 3*x - 1",
    "sin(x)*x^2 : (-5,5) ; x+1",
    "sqrt(x*x + y*y) : [0,10] | [0,10] ; 0",
    "abs(x) : (-100, 0) ; exp(-x/10)*cos(x)",
    "fac(int(abs(x))) / (1 + x^2)",
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (i, source) in FORMULAS.iter().enumerate() {
        group.bench_function(format!("formula_{i}"), |b| {
            b.iter(|| black_box(Expression::new(black_box(source), "f")));
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let expressions: Vec<Expression> = FORMULAS
        .iter()
        .filter_map(|source| Expression::new(source, "f").ok())
        .collect();

    group.bench_function("sweep_1000_points", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for expression in &expressions {
                let mut values = vec![0.0; expression.number_of_variables().max(1)];
                for step in 0..1000 {
                    let x = -10.0 + step as f64 * 0.02;
                    values.iter_mut().for_each(|v| *v = x);
                    let y = expression.evaluate_at(black_box(&values));
                    if y.is_finite() {
                        sum += y;
                    }
                }
            }
            black_box(sum)
        });
    });

    // a spline over many knots stresses piece selection
    let knots: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, (i as f64 * 0.3).sin())).collect();
    let spline = cubic_spline(&knots).map(|fit| fit.expression).unwrap_or_default();
    group.bench_function("spline_50_knots", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for step in 0..490 {
                sum += spline.evaluate_at(black_box(&[step as f64 * 0.1]));
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_evaluate);
criterion_main!(benches);
