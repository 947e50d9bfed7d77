#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use scribe_markup::{
  MarkupOptions,
  MarkupTransformer,
  Transform,
  TransformCache,
};

const BODY_SMALL: &str = "# Hello\n\nA short paragraph with a [link](https://example.com).\n";

const BODY_LARGE: &str = r#"# Getting Started

Welcome! This post walks through setting things up from scratch.

<Callout emoji="💡">
Make sure you have a recent toolchain installed before you start.
</Callout>

## Installation

Run the installer, then check that everything works:

```sh
curl -sSf https://example.com/install.sh | sh
tool --version
```

## Configuration

| Key     | Default | Description          |
| ------- | ------- | -------------------- |
| `theme` | `dark`  | Colour scheme to use |
| `port`  | `8080`  | Port to listen on    |

```rust
use std::collections::HashMap;

fn main() {
    let mut settings = HashMap::new();
    settings.insert("theme", "dark");
    for (key, value) in &settings {
        println!("{key} = {value}");
    }
}
```

<ProsCard title="Why it works" pros={["fast", "small", "simple"]} />

## Further reading

- [The book](/book)
- [API docs](https://docs.example.com)
- Watch <YouTube videoId="dQw4w9WgXcQ" /> for a tour.

![Architecture diagram](/images/architecture.png)
"#;

fn bench_transform(c: &mut Criterion) {
  let mut group = c.benchmark_group("transform");

  let highlighted = MarkupTransformer::new(MarkupOptions::default());
  let plain = MarkupTransformer::new(MarkupOptions::plain());

  for (name, body) in [("small", BODY_SMALL), ("large", BODY_LARGE)] {
    group.bench_with_input(
      BenchmarkId::new("highlighted", name),
      &body,
      |b, body| {
        b.iter(|| highlighted.transform(black_box(body)).unwrap());
      },
    );

    group.bench_with_input(BenchmarkId::new("plain", name), &body, |b, body| {
      b.iter(|| plain.transform(black_box(body)).unwrap());
    });
  }

  group.finish();
}

fn bench_cache(c: &mut Criterion) {
  let mut group = c.benchmark_group("cache");

  let cache =
    TransformCache::new(MarkupTransformer::new(MarkupOptions::default()));
  cache.get_or_compute(BODY_LARGE).unwrap();

  group.bench_function("hit", |b| {
    b.iter(|| cache.get_or_compute(black_box(BODY_LARGE)).unwrap());
  });

  group.finish();
}

criterion_group!(benches, bench_transform, bench_cache);
criterion_main!(benches);
