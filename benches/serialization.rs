use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_lua_table::{
    from_str, parse_value, to_string, to_string_pretty, FieldDescriptor, FieldType, LuaFormatter,
    LuaOptions, TypeDescriptor, TypeRegistry,
};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Clone)]
struct NestedData {
    id: u32,
    metadata: Metadata,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone)]
struct Metadata {
    created: String,
    updated: String,
    version: u32,
}

fn user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn products(size: usize) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU-{:04}", i),
            name: format!("Product {}", i),
            price: 9.99 + i as f64,
            quantity: (i % 50) as u32,
        })
        .collect()
}

fn nested(size: usize) -> Vec<NestedData> {
    (0..size)
        .map(|i| NestedData {
            id: i as u32,
            metadata: Metadata {
                created: "2024-01-01T00:00:00Z".to_string(),
                updated: "2024-06-01T12:30:00Z".to_string(),
                version: (i % 7) as u32,
            },
            tags: vec!["alpha".to_string(), "beta".to_string(), format!("t{}", i)],
        })
        .collect()
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let user = user();
    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let literal = r#"{id=123, name="Alice", email="alice@example.com", active=true, }"#;
    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(literal)))
    });
}

fn benchmark_serialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_array");
    for size in [10, 50, 100, 500].iter() {
        let data = products(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| to_string(black_box(data)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_array");
    for size in [10, 50, 100, 500].iter() {
        let literal = to_string(&products(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &literal, |b, literal| {
            b.iter(|| from_str::<Vec<Product>>(black_box(literal)))
        });
    }
    group.finish();
}

fn benchmark_nested(c: &mut Criterion) {
    let data = nested(100);
    let literal = to_string_pretty(&data).unwrap();

    let mut group = c.benchmark_group("nested");
    group.bench_function("serialize_pretty", |b| {
        b.iter(|| to_string_pretty(black_box(&data)))
    });
    group.bench_function("deserialize", |b| {
        b.iter(|| from_str::<Vec<NestedData>>(black_box(&literal)))
    });
    group.bench_function("parse_value", |b| {
        b.iter(|| parse_value(black_box(&literal)))
    });
    group.finish();
}

fn benchmark_escaped_strings(c: &mut Criterion) {
    let plain = "a".repeat(1024);
    let escaped = "line\n\"quoted\" [x] \u{e9}\u{263a}\t".repeat(64);

    let mut group = c.benchmark_group("strings");
    for (name, s) in [("plain", &plain), ("escaped", &escaped)] {
        let literal = to_string(s).unwrap();
        group.bench_function(format!("serialize_{}", name), |b| {
            b.iter(|| to_string(black_box(s)))
        });
        group.bench_function(format!("deserialize_{}", name), |b| {
            b.iter(|| from_str::<String>(black_box(&literal)))
        });
    }
    group.finish();
}

fn benchmark_typed_reconstruction(c: &mut Criterion) {
    let mut registry = TypeRegistry::new();
    registry.register(
        "shop.Product",
        TypeDescriptor::record(vec![
            FieldDescriptor::new("sku", FieldType::String),
            FieldDescriptor::new("name", FieldType::String),
            FieldDescriptor::new("price", FieldType::Float),
            FieldDescriptor::new("quantity", FieldType::Integer),
        ]),
    );
    let formatter = LuaFormatter::new(LuaOptions::new().with_deserialize_type(true), registry);

    let entries: Vec<String> = (0..100)
        .map(|i| {
            format!(
                r#"{{ __type = "shop.Product", sku = "SKU-{0}", name = "P{0}", price = "{0}.5", quantity = {0} }}"#,
                i
            )
        })
        .collect();
    let literal = format!("{{ {} }}", entries.join(", "));

    c.bench_function("typed_reconstruction_100", |b| {
        b.iter(|| formatter.decode_str(black_box(&literal)))
    });
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let user = user();
    let mut group = c.benchmark_group("comparison");

    group.bench_function("lua_serialize", |b| {
        b.iter(|| serde_lua_table::to_string(black_box(&user)))
    });
    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&user)))
    });

    let lua_str = serde_lua_table::to_string(&user).unwrap();
    let json_str = serde_json::to_string(&user).unwrap();

    group.bench_function("lua_deserialize", |b| {
        b.iter(|| serde_lua_table::from_str::<User>(black_box(&lua_str)))
    });
    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<User>(black_box(&json_str)))
    });

    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let user = user();
    c.bench_function("roundtrip_simple", |b| {
        b.iter(|| {
            let serialized = to_string(black_box(&user)).unwrap();
            let _deserialized: User = from_str(black_box(&serialized)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_serialize_array,
    benchmark_deserialize_array,
    benchmark_nested,
    benchmark_escaped_strings,
    benchmark_typed_reconstruction,
    benchmark_comparison_with_json,
    benchmark_roundtrip
);
criterion_main!(benches);
