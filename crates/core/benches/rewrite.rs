use std::collections::HashMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use threadkeep_core::{Document, LinkContext, LocalizeOptions, RewritePlan, SiteProfile, discover_assets, rewrite_page};
use url::Url;

const THREAD: &str = "https://www.example.com/foro/off/hilo-gatos-123";

fn page() -> String {
    std::fs::read_to_string("../../tests/fixtures/thread/page_1.html").unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let html = page();

    c.bench_function("parse", |b| b.iter(|| Document::parse(black_box(&html))));
}

fn bench_discover(c: &mut Criterion) {
    let html = page();
    let base = Url::parse(THREAD).unwrap();
    let profile = SiteProfile::default();
    let options = LocalizeOptions::default();

    c.bench_function("discover_assets", |b| {
        b.iter(|| discover_assets(black_box(&html), &base, &profile, &options))
    });
}

fn bench_rewrite(c: &mut Criterion) {
    let html = page();
    let base = Url::parse(THREAD).unwrap();
    let profile = SiteProfile::default();
    let plan = discover_assets(&html, &base, &profile, &LocalizeOptions::default()).unwrap();
    let localized: HashMap<String, String> = plan
        .assets
        .iter()
        .map(|asset| (asset.url.to_string(), asset.local_href()))
        .collect();
    let links = LinkContext {
        page_url: &base,
        thread_url: &base,
        slug: "hilo-gatos-123",
        profile: &profile,
        link_first_page: true,
    };
    let rewrite = RewritePlan { base: &base, profile: &profile, localized: &localized, links: Some(links) };

    c.bench_function("rewrite_page", |b| b.iter(|| rewrite_page(black_box(&html), &rewrite)));
}

criterion_group!(benches, bench_parse, bench_discover, bench_rewrite);
criterion_main!(benches);
