use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (entity, fossil base in tonnes, land-use base in tonnes, yearly growth)
    // Land-use bases can be negative: net sequestration.
    let countries: &[(&str, f64, f64, f64)] = &[
        ("China", 9.0e9, 1.1e8, 0.035),
        ("United States", 5.3e9, -8.0e7, 0.002),
        ("India", 2.2e9, 9.0e7, 0.045),
        ("Russia", 1.6e9, -2.0e8, 0.004),
        ("Japan", 1.1e9, -5.0e6, -0.005),
        ("Germany", 7.5e8, -1.5e7, -0.012),
        ("Brazil", 4.6e8, 1.1e9, 0.015),
        ("Indonesia", 5.8e8, 9.2e8, 0.040),
        ("France", 3.1e8, -1.8e7, -0.010),
        ("United Kingdom", 3.5e8, -4.0e6, -0.018),
        ("Australia", 3.9e8, 6.0e7, 0.010),
        ("Nigeria", 1.2e8, 2.4e8, 0.030),
        ("Democratic Republic of Congo", 3.0e6, 5.2e8, 0.020),
    ];
    let years = 1990..=2022;

    let mut all_entity: Vec<String> = Vec::new();
    let mut all_year: Vec<i32> = Vec::new();
    let mut all_fossil: Vec<f64> = Vec::new();
    let mut all_land: Vec<f64> = Vec::new();

    for year in years.clone() {
        let age = (year - 1990) as f64;
        let mut world_fossil = 0.0;
        let mut world_land = 0.0;

        for &(entity, fossil_base, land_base, growth) in countries {
            let fossil =
                (fossil_base * (1.0 + growth).powf(age) * (1.0 + rng.gauss(0.0, 0.03))).max(0.0);
            let land = land_base * (1.0 + rng.gauss(0.0, 0.15));

            world_fossil += fossil;
            world_land += land;

            all_entity.push(entity.to_string());
            all_year.push(year);
            all_fossil.push(fossil);
            all_land.push(land);
        }

        // Aggregate pseudo-rows, as in the real table; the viewer's grouped
        // mode must filter these out.
        all_entity.push("World".to_string());
        all_year.push(year);
        all_fossil.push(world_fossil);
        all_land.push(world_land);

        all_entity.push("Asia (GCP)".to_string());
        all_year.push(year);
        all_fossil.push(world_fossil * 0.5);
        all_land.push(world_land * 0.4);
    }

    // ---- CSV ----
    let csv_path = "sample_emissions.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record([
            "Entity",
            "Year",
            "Annual CO₂ emissions",
            "Annual CO₂ emissions from land-use change",
        ])
        .expect("Failed to write CSV header");
    for i in 0..all_entity.len() {
        let year = all_year[i].to_string();
        let fossil = format!("{:.0}", all_fossil[i]);
        let land = format!("{:.0}", all_land[i]);
        writer
            .write_record([all_entity[i].as_str(), year.as_str(), fossil.as_str(), land.as_str()])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV");

    // ---- Parquet ----
    let schema = Arc::new(Schema::new(vec![
        Field::new("Entity", DataType::Utf8, false),
        Field::new("Year", DataType::Int32, false),
        Field::new("Annual CO₂ emissions", DataType::Float64, true),
        Field::new(
            "Annual CO₂ emissions from land-use change",
            DataType::Float64,
            true,
        ),
    ]));

    let entity_array = StringArray::from(
        all_entity.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
    );
    let year_array = Int32Array::from(all_year);
    let fossil_array = Float64Array::from(all_fossil);
    let land_array = Float64Array::from(all_land);

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(entity_array),
            Arc::new(year_array),
            Arc::new(fossil_array),
            Arc::new(land_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_emissions.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} rows ({} entities × {} years + aggregates) to {csv_path} and {parquet_path}",
        all_entity.len(),
        countries.len(),
        years.count(),
    );
}
