use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::executor::block_on;
use futures::{stream, StreamExt};
use genrelay_core::config::RequestDefaults;
use genrelay_core::normalize::normalize_json;
use genrelay_core::stream::encode_lines;
use genrelay_core::{FragmentStream, StreamTranscoder};

fn fragments(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("token {} of the reply ", i)).collect()
}

fn source(items: Vec<String>) -> FragmentStream {
    Box::pin(stream::iter(items.into_iter().map(Ok)))
}

fn bench_transcode(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcode_and_frame");

    for count in [10usize, 100, 1000] {
        let items = fragments(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| {
                let packets = StreamTranscoder::with_stream_id("stream_bench")
                    .transcode(source(items.clone()));
                let bytes = block_on(
                    encode_lines(packets).fold(0usize, |acc, line| async move {
                        acc + line.map(|l| l.len()).unwrap_or(0)
                    }),
                );
                black_box(bytes)
            })
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let defaults = RequestDefaults::default();
    let text = br#"{"input":"Hello there","apikey":"K","temperature":0.7}"#.to_vec();

    let turns: Vec<serde_json::Value> = (0..50)
        .map(|i| {
            serde_json::json!({
                "role": if i % 2 == 0 { "user" } else { "assistant" },
                "content": format!("message number {}", i)
            })
        })
        .collect();
    let list = serde_json::to_vec(&serde_json::json!({"messageList": turns, "apikey": "K"}))
        .unwrap();

    let mut group = c.benchmark_group("normalize");
    group.bench_function("free_text", |b| {
        b.iter(|| black_box(normalize_json(black_box(&text), &defaults)))
    });
    group.bench_function("message_list_50", |b| {
        b.iter(|| black_box(normalize_json(black_box(&list), &defaults)))
    });
    group.finish();
}

criterion_group!(benches, bench_transcode, bench_normalize);
criterion_main!(benches);
