use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pathtab::{
    CentralDogma, Config, EdgeType, FactorAssembler, FactorGenerator, InteractionMap,
    PathwayGraph, RepressorDominatesVote,
};

fn gen_edge_types(n: usize) -> Vec<EdgeType> {
    (0..n)
        .map(|i| (if i % 3 == 0 { "negative" } else { "positive" }).to_owned())
        .collect()
}

// A chain of proteins, each activating the next and repressing the one after.
fn gen_pathway(n: usize) -> String {
    let mut pathway = String::new();
    for i in 0..n {
        pathway.push_str(&format!("protein\tg{i}\n"));
    }
    for i in 1..n {
        pathway.push_str(&format!("g{}\tg{i}\t-t>\n", i - 1));
        if i >= 2 {
            pathway.push_str(&format!("g{}\tg{i}\t-a|\n", i - 2));
        }
    }
    pathway
}

fn bench_vote(c: &mut Criterion) {
    let mut group = c.benchmark_group("repressor_dominates_vote");
    let gen = RepressorDominatesVote::new(0.001).unwrap();
    for n in [1, 3, 5, 7] {
        group.bench_with_input(BenchmarkId::new("parents", n), &n, |b, n| {
            let edge_types = gen_edge_types(*n);
            b.iter(|| gen.generate_values(&edge_types))
        });
    }
    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_assembly");
    for n in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("entities", n), &n, |b, n| {
            let graph = PathwayGraph::from_descriptions(
                &gen_pathway(*n),
                InteractionMap::builtin(),
                CentralDogma::builtin(),
                Config::new(0.001),
            )
            .unwrap();
            b.iter(|| FactorAssembler::new(&graph).factors().unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_vote, bench_assembly);
criterion_main!(benches);
