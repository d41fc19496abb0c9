use cim_specification::criteria::{CriteriaBuilder, CriteriaNode, CriteriaTree, Parameter, ParameterUnifier, PredicateNode};
use cim_specification::{and, InMemoryQuery, SortDirection, Specification, SpecificationEvaluator};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
struct BenchRecord {
    id: u64,
    score: u32,
    active: bool,
}

fn records(count: usize) -> Vec<BenchRecord> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count as u64)
        .map(|id| BenchRecord {
            id,
            score: rng.gen_range(0..1000),
            active: rng.gen_bool(0.7),
        })
        .collect()
}

fn deep_tree(leaves: u32) -> CriteriaTree<BenchRecord> {
    let parameter = Parameter::new();
    let mut tree = CriteriaNode::leaf(PredicateNode::new(parameter, |r: &BenchRecord| r.active));
    for threshold in 0..leaves {
        // Each leaf gets its own parameter so unification has work to do
        let leaf = CriteriaNode::leaf(PredicateNode::new(Parameter::new(), move |r: &BenchRecord| {
            r.score > threshold
        }));
        tree = CriteriaNode::combine(tree, leaf, threshold % 2 == 0);
    }
    tree
}

fn benchmark_builder_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder_compile");

    for leaves in [4u32, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(leaves), &leaves, |b, &leaves| {
            b.iter(|| {
                let builder = (0..leaves).fold(CriteriaBuilder::<BenchRecord>::new(), |builder, n| {
                    builder.or(move |r| r.score == n)
                });
                black_box(builder.build())
            });
        });
    }

    group.finish();
}

fn benchmark_unify(c: &mut Criterion) {
    let mut group = c.benchmark_group("unify_tree");

    for leaves in [16u32, 128] {
        let tree = deep_tree(leaves);
        let unifier = ParameterUnifier::new(Parameter::new());
        group.bench_with_input(BenchmarkId::from_parameter(leaves), &tree, |b, tree| {
            b.iter(|| black_box(unifier.unify_tree(tree)));
        });
    }

    group.finish();
}

fn benchmark_evaluate(c: &mut Criterion) {
    let data = records(10_000);
    let mut active = Specification::<BenchRecord>::new();
    active.filter(|r| r.active);
    let mut high = Specification::<BenchRecord>::new();
    high.filter(|r| r.score > 500).or(|r| r.id % 10 == 0);

    let Ok(mut spec) = and(&active, &high) else {
        return;
    };
    spec.order_by(|r| r.score, SortDirection::Descending).take(100);
    let evaluator = SpecificationEvaluator::default();

    c.bench_function("evaluate_10k", |b| {
        b.iter(|| black_box(evaluator.apply(&spec, InMemoryQuery::new(data.clone())).len()));
    });

    let Some(predicate) = spec.compile() else {
        return;
    };
    c.bench_function("compiled_filter_10k", |b| {
        b.iter(|| black_box(data.iter().filter(|r| predicate.matches(r)).count()));
    });
}

criterion_group!(benches, benchmark_builder_compile, benchmark_unify, benchmark_evaluate);
criterion_main!(benches);
