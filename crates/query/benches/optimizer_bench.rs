//! Benchmarks for the logical-rewrite optimizer and the cost-based
//! physical planner.
//!
//! These measure planning time, not query execution: building a bound
//! plan, running it through `Optimizer::optimize`, lowering it, and
//! searching the memoized physical-plan space. `bench_plan_cache_hit`
//! additionally measures the fingerprint-and-lookup fast path a
//! repeated query takes once it's cached.

use cynos_query::ast::{Expr, SortOrder};
use cynos_query::context::{ExecutionContext, IndexInfo, TableStats};
use cynos_query::optimizer::Optimizer;
use cynos_query::plan_cache::{compute_plan_fingerprint, PlanCache};
use cynos_query::planner::{BoundPlan, QueryPlanner};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn users_context(row_count: u64) -> ExecutionContext {
    let mut ctx = ExecutionContext::new();
    ctx.register_table(
        "users",
        TableStats {
            row_count,
            is_sorted: false,
            indexes: vec![
                IndexInfo::new("idx_id", vec!["id".into()], true),
                IndexInfo::new("idx_category", vec!["category".into()], false),
            ],
            columns: vec!["id".into(), "name".into(), "category".into()],
            pk_column: Some("id".into()),
            ..Default::default()
        },
    );
    ctx.register_table(
        "orders",
        TableStats {
            row_count: row_count * 3,
            is_sorted: false,
            indexes: vec![IndexInfo::new("idx_user_id", vec!["user_id".into()], false)],
            columns: vec!["id".into(), "user_id".into(), "description".into()],
            pk_column: Some("id".into()),
            ..Default::default()
        },
    );
    ctx
}

fn and_predicate_scan() -> BoundPlan {
    BoundPlan::filter(
        BoundPlan::scan("users"),
        Expr::and(
            Expr::gt(Expr::column("users", "id", 0), Expr::literal(100i64)),
            Expr::eq(Expr::column("users", "category", 2), Expr::literal(5i64)),
        ),
    )
}

fn simple_query(threshold: i64) -> BoundPlan {
    BoundPlan::limit(
        BoundPlan::sort(
            BoundPlan::project(
                BoundPlan::filter(
                    BoundPlan::scan("users"),
                    Expr::gt(Expr::column("users", "id", 0), Expr::literal(threshold)),
                ),
                vec![
                    Expr::column("users", "id", 0),
                    Expr::column("users", "name", 1),
                ],
            ),
            vec![(Expr::column("users", "id", 0), SortOrder::Asc)],
        ),
        10,
        0,
    )
}

fn join_with_filter() -> BoundPlan {
    BoundPlan::filter(
        BoundPlan::inner_join(
            BoundPlan::scan("users"),
            BoundPlan::scan("orders"),
            Expr::eq(
                Expr::column("users", "id", 0),
                Expr::column("orders", "user_id", 1),
            ),
        ),
        Expr::gt(Expr::column("users", "id", 0), Expr::literal(50i64)),
    )
}

fn bench_optimize_and_predicate(c: &mut Criterion) {
    let optimizer = Optimizer::new();
    c.bench_function("optimize_and_predicate", |b| {
        b.iter(|| black_box(optimizer.optimize(and_predicate_scan())))
    });
}

fn bench_optimize_join_filter_pushdown(c: &mut Criterion) {
    let optimizer = Optimizer::new();
    c.bench_function("optimize_join_filter_pushdown", |b| {
        b.iter(|| black_box(optimizer.optimize(join_with_filter())))
    });
}

fn bench_plan_point_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_point_lookup");
    for row_count in [1_000u64, 100_000, 1_000_000].iter() {
        let ctx = users_context(*row_count);
        let planner = QueryPlanner::new(ctx);
        group.bench_with_input(BenchmarkId::from_parameter(row_count), row_count, |b, _| {
            b.iter(|| {
                let plan = BoundPlan::filter(
                    BoundPlan::scan("users"),
                    Expr::eq(Expr::column("users", "id", 0), Expr::literal(42i64)),
                );
                black_box(planner.plan(plan).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_plan_simple_query(c: &mut Criterion) {
    let ctx = users_context(100_000);
    let planner = QueryPlanner::new(ctx);
    c.bench_function("plan_simple_query", |b| {
        b.iter(|| black_box(planner.plan(simple_query(50_000)).unwrap()))
    });
}

fn bench_plan_join(c: &mut Criterion) {
    let ctx = users_context(10_000);
    let planner = QueryPlanner::new(ctx);
    c.bench_function("plan_join_with_filter", |b| {
        b.iter(|| black_box(planner.plan(join_with_filter()).unwrap()))
    });
}

fn bench_plan_cache_fingerprint(c: &mut Criterion) {
    c.bench_function("plan_cache_fingerprint", |b| {
        b.iter(|| black_box(compute_plan_fingerprint(&simple_query(50_000))))
    });
}

fn bench_plan_cache_hit(c: &mut Criterion) {
    let ctx = users_context(100_000);
    let planner = QueryPlanner::new(ctx);
    let mut cache = PlanCache::default_size();
    let fp = compute_plan_fingerprint(&simple_query(50_000));
    cache.get_or_insert_with(fp, || planner.plan(simple_query(50_000)).unwrap());

    c.bench_function("plan_cache_hit", |b| {
        b.iter(|| {
            black_box(cache.get_or_insert_with(fp, || {
                planner.plan(simple_query(50_000)).unwrap()
            }))
        })
    });
}

criterion_group!(
    benches,
    bench_optimize_and_predicate,
    bench_optimize_join_filter_pushdown,
    bench_plan_point_lookup,
    bench_plan_simple_query,
    bench_plan_join,
    bench_plan_cache_fingerprint,
    bench_plan_cache_hit,
);

criterion_main!(benches);
