use criterion::{black_box, criterion_group, criterion_main, Criterion};

use shield_core::{BlockList, Entity, UrlMatcher};

fn build_matcher(domains: usize) -> UrlMatcher {
    let entities = (0..domains)
        .map(|i| Entity {
            name: format!("Entity{i}"),
            category: "Advertising".to_owned(),
            patterns: vec![format!("tracker{i}.example.com")],
        })
        .collect();
    let matcher = UrlMatcher::new();
    matcher.load_patterns(BlockList {
        source: "bench".to_owned(),
        entities,
    });
    matcher
}

fn bench_matching(c: &mut Criterion) {
    let matcher = build_matcher(500);
    let page = "http://www.mozilla.org";

    c.bench_function("trie_hit", |b| {
        b.iter(|| {
            black_box(matcher.should_intercept(
                black_box("http://cdn.tracker250.example.com/pixel.gif"),
                false,
                Some(page),
            ))
        })
    });

    c.bench_function("trie_miss", |b| {
        b.iter(|| {
            black_box(matcher.should_intercept(
                black_box("http://static.unrelated.example.org/app.js"),
                false,
                Some(page),
            ))
        })
    });

    c.bench_function("first_party", |b| {
        b.iter(|| {
            black_box(matcher.should_intercept(
                black_box("http://www.mozilla.org/styles.css"),
                false,
                Some(page),
            ))
        })
    });
}

criterion_group!(benches, bench_matching);
criterion_main!(benches);
