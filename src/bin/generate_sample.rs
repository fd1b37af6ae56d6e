use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use control_tower::analytics::SampleRng;

/// Legacy-style header spellings, the way the upstream logistics export
/// writes them.  The loader normalizes these on the way in.
const HEADERS: [&str; 9] = [
    "Market",
    "Shipping Mode",
    "Customer Segment",
    "Order Country",
    "Sales",
    "Department Name",
    "Days for shipping (real)",
    "Days for shipment (scheduled)",
    "Late_delivery_risk",
];

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut SampleRng, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.next_f64().max(1e-15);
    let u2 = rng.next_f64();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn main() {
    let mut rng = SampleRng::new(42);

    let markets: [(&str, &[&str]); 5] = [
        ("Africa", &["Nigeria", "Egypt", "South Africa"]),
        ("Europe", &["France", "Germany", "United Kingdom", "Spain"]),
        ("LATAM", &["Mexico", "Brazil", "Argentina"]),
        ("Pacific Asia", &["Japan", "India", "Australia"]),
        ("USCA", &["United States", "Canada"]),
    ];
    // Scheduled days mirror the carrier's service levels.
    let modes: [(&str, i64); 4] = [
        ("Standard Class", 4),
        ("Second Class", 2),
        ("First Class", 1),
        ("Same Day", 0),
    ];
    let segments = ["Consumer", "Corporate", "Home Office"];
    let departments = ["Apparel", "Fan Shop", "Golf", "Footwear", "Technology"];

    let n = 2000;

    let mut all_market: Vec<String> = Vec::with_capacity(n);
    let mut all_mode: Vec<String> = Vec::with_capacity(n);
    let mut all_segment: Vec<String> = Vec::with_capacity(n);
    let mut all_country: Vec<String> = Vec::with_capacity(n);
    let mut all_sales: Vec<f64> = Vec::with_capacity(n);
    let mut all_department: Vec<String> = Vec::with_capacity(n);
    let mut all_real: Vec<i64> = Vec::with_capacity(n);
    let mut all_scheduled: Vec<i64> = Vec::with_capacity(n);
    let mut all_risk: Vec<i64> = Vec::with_capacity(n);

    for _ in 0..n {
        let (market, countries) = markets[rng.gen_range(markets.len())];
        let country = countries[rng.gen_range(countries.len())];
        let (mode, scheduled) = modes[rng.gen_range(modes.len())];
        let segment = segments[rng.gen_range(segments.len())];
        let department = departments[rng.gen_range(departments.len())];

        // Real shipping time: scheduled plus -1..=3 days of jitter, floored
        // at zero.
        let jitter = rng.gen_range(5) as i64 - 1;
        let real = (scheduled + jitter).max(0);

        // The risk flag skews towards shipments that actually ran late.
        let risk = if real > scheduled {
            rng.next_f64() < 0.7
        } else {
            rng.next_f64() < 0.15
        };

        let sales = (gauss(&mut rng, 180.0, 120.0).abs() * 100.0).round() / 100.0;

        all_market.push(market.to_string());
        all_mode.push(mode.to_string());
        all_segment.push(segment.to_string());
        all_country.push(country.to_string());
        all_sales.push(sales);
        all_department.push(department.to_string());
        all_real.push(real);
        all_scheduled.push(scheduled);
        all_risk.push(if risk { 1 } else { 0 });
    }

    // ---- CSV ----
    let csv_path = "sample_shipments.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer.write_record(HEADERS).expect("Failed to write header");
    for i in 0..n {
        let sales = all_sales[i].to_string();
        let real = all_real[i].to_string();
        let scheduled = all_scheduled[i].to_string();
        let risk = all_risk[i].to_string();
        writer
            .write_record([
                all_market[i].as_str(),
                all_mode[i].as_str(),
                all_segment[i].as_str(),
                all_country[i].as_str(),
                sales.as_str(),
                all_department[i].as_str(),
                real.as_str(),
                scheduled.as_str(),
                risk.as_str(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV");

    // ---- Parquet ----
    let market_array = StringArray::from(all_market.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    let mode_array = StringArray::from(all_mode.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    let segment_array =
        StringArray::from(all_segment.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    let country_array =
        StringArray::from(all_country.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    let sales_array = Float64Array::from(all_sales);
    let department_array =
        StringArray::from(all_department.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    let real_array = Int64Array::from(all_real);
    let scheduled_array = Int64Array::from(all_scheduled);
    let risk_array = Int64Array::from(all_risk);

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
        Field::new(HEADERS[2], DataType::Utf8, false),
        Field::new(HEADERS[3], DataType::Utf8, false),
        Field::new(HEADERS[4], DataType::Float64, false),
        Field::new(HEADERS[5], DataType::Utf8, false),
        Field::new(HEADERS[6], DataType::Int64, false),
        Field::new(HEADERS[7], DataType::Int64, false),
        Field::new(HEADERS[8], DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(market_array),
            Arc::new(mode_array),
            Arc::new(segment_array),
            Arc::new(country_array),
            Arc::new(sales_array),
            Arc::new(department_array),
            Arc::new(real_array),
            Arc::new(scheduled_array),
            Arc::new(risk_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_shipments.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {n} shipment records to {csv_path} and {parquet_path}");
}
