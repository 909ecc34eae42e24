use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use order_intake::extract::extract;
use order_intake::group::{counts, group};
use order_intake::mapping::ColumnMapping;

fn generate_sheet(rows: usize) -> (Vec<String>, Vec<Vec<String>>) {
    let header = [
        "Order Number",
        "First Name",
        "Last Name",
        "SKU",
        "Quantity",
        "Postcode",
        "Downloaded Date",
    ]
    .map(String::from)
    .to_vec();
    let body = (0..rows)
        .map(|i| {
            let customer = i % (rows / 3).max(1);
            let order = if i % 4 == 0 { String::new() } else { format!("{}", 10_000 + i / 2) };
            let postcode = if i % 5 == 0 { format!("AB{customer}CD") } else { String::new() };
            let day = (i % 28) + 1;
            vec![
                order,
                format!("First{customer}"),
                "Buyer".to_string(),
                format!("SKU-{}", i % 97),
                ((i % 3) + 1).to_string(),
                postcode,
                format!("{day:02}/07/2024"),
            ]
        })
        .collect();
    (header, body)
}

fn bench_group(c: &mut Criterion) {
    let (header, rows) = generate_sheet(20_000);
    let mapping = ColumnMapping::default();

    c.bench_function("extract_20k_rows_for_day", |b| {
        b.iter(|| extract(&header, &rows, &mapping, Some("2024-07-05")))
    });

    let lines = extract(&header, &rows, &mapping, None).lines;
    c.bench_function("group_and_count_20k_lines", |b| {
        b.iter_batched(
            || lines.clone(),
            |lines| {
                let groups = group(&lines).expect("group");
                counts(&groups)
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_group);
criterion_main!(benches);
