use criterion::{criterion_group, criterion_main, Criterion};
use sentra_core::config::Language;
use sentra_core::synonyms::SynonymProvider;
use sentra_core::tokenizer;

const PARAGRAPH: &str = "The lighthouse keeper climbed the spiral stairs every \
evening before dusk. Ships far out on the water depended on the beam sweeping \
the horizon. During storms the keeper stayed awake all night, trimming the \
wick and writing terse entries in the logbook. Dan ketika badai datang, \
penjaga mercusuar tetap bekerja sepanjang malam tanpa henti.";

fn bench_normalize(c: &mut Criterion) {
    let text = PARAGRAPH.repeat(50);
    c.bench_function("normalize_paragraphs", |b| {
        b.iter(|| tokenizer::normalize(&text, Language::Combined))
    });
}

fn bench_lemmatize(c: &mut Criterion) {
    let provider = SynonymProvider::default();
    let tokens = tokenizer::raw_tokens(&PARAGRAPH.repeat(10));
    c.bench_function("lemmatize_tokens", |b| {
        b.iter(|| tokenizer::lemmatize_tokens(&tokens, &provider))
    });
}

criterion_group!(benches, bench_normalize, bench_lemmatize);
criterion_main!(benches);
