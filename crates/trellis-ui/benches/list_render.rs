use criterion::{criterion_group, criterion_main, Criterion};
use trellis_core::{location_key, Composition, MemoryApplier};
use trellis_ui::{List, ListSpec, PaginationConfig, Text};

fn paginated_list(data: &[String]) {
    List(
        ListSpec::new(data.to_vec())
            .render_item(|item: &String, _| {
                Text(item.clone());
            })
            .pagination(PaginationConfig::uncontrolled().defaults(1, 50)),
    );
}

fn recompose_paginated_list(c: &mut Criterion) {
    let data: Vec<String> = (0..1000).map(|i| format!("row-{i}")).collect();
    let mut composition = Composition::new(MemoryApplier::new());
    let key = location_key(file!(), line!(), column!());

    composition
        .render(key, || paginated_list(&data))
        .expect("initial render");

    c.bench_function("recompose_paginated_list", |b| {
        b.iter(|| {
            composition
                .render(key, || paginated_list(&data))
                .expect("render");
        });
    });
}

criterion_group!(benches, recompose_paginated_list);
criterion_main!(benches);
