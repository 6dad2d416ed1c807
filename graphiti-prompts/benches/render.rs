use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graphiti_prompts::edges::{format_edge_lines, EdgeLine};
use graphiti_prompts::prompts::PromptContext;
use graphiti_prompts::render;

fn existing_edges(n: i64) -> String {
    let lines: Vec<EdgeLine> = (0..n)
        .map(|i| {
            EdgeLine::new(
                i,
                format!("Person{i}"),
                "WORKS_AT",
                format!("Company{i}"),
                format!("Person{i} works at Company{i}"),
            )
        })
        .collect();
    format_edge_lines(&lines)
}

fn render_benchmarks(c: &mut Criterion) {
    let edges = existing_edges(200);

    let v1 = PromptContext::new()
        .with("previous_episodes", "Person1 joined Company1 last spring.")
        .with("current_episode", "Person1 now works at Company7.")
        .with("existing_edges", edges.clone())
        .with("new_edges", existing_edges(3));
    let v2 = PromptContext::new()
        .with("existing_edges", edges)
        .with("new_edge", "Person1 now works at Company7.");

    c.bench_function("render_v1_200_edges", |b| {
        b.iter(|| render(black_box("v1"), black_box(&v1)))
    });
    c.bench_function("render_v2_200_edges", |b| {
        b.iter(|| render(black_box("v2"), black_box(&v2)))
    });
    c.bench_function("format_edge_lines_200", |b| b.iter(|| existing_edges(black_box(200))));
}

criterion_group!(benches, render_benchmarks);
criterion_main!(benches);
