//! Performance benchmarks for schemabridge
//!
//! These benchmarks measure the performance of key operations:
//! - Compiling descriptions of growing width and depth
//! - Extracting descriptions back from compiled validators
//! - Batch compilation of many description files in parallel
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench compile
//! cargo bench batch
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use schemabridge::batch::{BatchCompiler, FileWalker};
use schemabridge::engine::memory::MemoryEngine;
use schemabridge::{FunctionRegistry, SchemaDescription, compile, extract};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// A field description using a representative mix of directive categories
fn field(index: usize) -> Value {
    json!({
        "type": "string",
        "required": true,
        "min": 1,
        "max": {"limit": 64 + index, "encoding": "utf8"},
        "pattern": "/^[a-z0-9_]+$/i",
        "valid": ["a", "b", {"$ref": "fallback"}],
        "replace": [{"find": "\\s+", "replace": " "}],
        "description": format!("field {index}")
    })
}

/// An object description with `width` fields
fn wide_object(width: usize) -> SchemaDescription {
    let properties: serde_json::Map<String, Value> =
        (0..width).map(|i| (format!("field{i}"), field(i))).collect();
    let value = json!({
        "type": "object",
        "unknown": false,
        "and": ["field0", "field1"],
        "properties": properties
    });
    SchemaDescription::from_value(value).unwrap()
}

/// A chain of nested objects `depth` levels deep
fn deep_object(depth: usize) -> SchemaDescription {
    let mut value = field(0);
    for level in 0..depth {
        let mut properties = serde_json::Map::new();
        properties.insert(format!("level{level}"), value);
        value = json!({"type": "object", "properties": properties});
    }
    SchemaDescription::from_value(value).unwrap()
}

/// Create a temporary directory with description files
fn create_description_files(count: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..count {
        let content = wide_object(8).to_value().to_string();
        fs::write(temp_dir.path().join(format!("schema{i}.json")), content).unwrap();
    }
    temp_dir
}

// ============================================================================
// Compile / Extract Benchmarks
// ============================================================================

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let engine = MemoryEngine::new();
    let functions = FunctionRegistry::with_builtins();

    for width in [1, 10, 100].iter() {
        let description = wide_object(*width);
        group.throughput(Throughput::Elements(*width as u64));
        group.bench_with_input(BenchmarkId::new("wide", width), width, |b, _| {
            b.iter(|| black_box(compile(&engine, &description, &functions).unwrap()));
        });
    }

    for depth in [4, 16, 64].iter() {
        let description = deep_object(*depth);
        group.bench_with_input(BenchmarkId::new("deep", depth), depth, |b, _| {
            b.iter(|| black_box(compile(&engine, &description, &functions).unwrap()));
        });
    }

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let engine = MemoryEngine::new();
    let functions = FunctionRegistry::with_builtins();

    for width in [1, 10, 100].iter() {
        let validator = compile(&engine, &wide_object(*width), &functions).unwrap();
        group.throughput(Throughput::Elements(*width as u64));
        group.bench_with_input(BenchmarkId::new("wide", width), width, |b, _| {
            b.iter(|| black_box(extract(&validator)));
        });
    }

    group.finish();
}

// ============================================================================
// Batch Benchmarks
// ============================================================================

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);

    for file_count in [10, 100].iter() {
        let temp_dir = create_description_files(*file_count);
        let roots = [temp_dir.path().to_path_buf()];
        let files: Vec<PathBuf> = FileWalker::new(&roots, &[], &[])
            .unwrap()
            .walk()
            .filter_map(Result::ok)
            .collect();
        let compiler = BatchCompiler::new(MemoryEngine::new(), FunctionRegistry::with_builtins());

        group.throughput(Throughput::Elements(*file_count as u64));
        group.bench_with_input(
            BenchmarkId::new("compile_files", file_count),
            file_count,
            |b, _| {
                b.iter(|| black_box(compiler.compile_files(&files)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_extract, bench_batch);
criterion_main!(benches);
