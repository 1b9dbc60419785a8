//! Compares two report dumps saved as CSV.
//!
//! ```text
//! cargo run --example compare_periods -- position_a.csv position_b.csv
//! ```
//!
//! Without arguments a small built-in sample is used.

use period_comparison::*;
use serde_json::Value;
use std::env;
use std::fs;

const SAMPLE_A: &str = "cod_cliente,cliente,documento_cliente,vlr_total_vencidos,vlr_totalcompras,documento,data_emissao,parcela,mes_referencia
101,Mercado Sol,11.111.111/0001-11,1500.50,16000,NF-2001,02/09/2025,1/2,09/2025
310,Padaria Trigo,33.333.333/0001-33,450,900,NF-2200,01/09/2025,1/3,09/2025
";

const SAMPLE_B: &str = "cod_cliente,cliente,documento_cliente,vlr_total_vencidos,vlr_totalcompras,documento,data_emissao,parcela,mes_referencia
101,Mercado Sol,11.111.111/0001-11,900.50,7000,NF-1901,05/08/2025,1/1,08/2025
205,Auto Pecas Lima,22.222.222/0001-22,700,1500,NF-2100,20/08/2025,1/1,08/2025
";

fn read_rows(data: &str) -> std::result::Result<Vec<RawRow>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column.to_string(), Value::String(cell.to_string())))
                .collect(),
        );
    }
    Ok(rows)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (data_a, data_b) = match args.as_slice() {
        [a, b] => (fs::read_to_string(a)?, fs::read_to_string(b)?),
        _ => (SAMPLE_A.to_string(), SAMPLE_B.to_string()),
    };

    let config = ComparisonConfig::default();
    let report = compare_periods(&config, &read_rows(&data_a)?, &read_rows(&data_b)?)?;

    if !report.has_data() {
        println!("No data found for either position date.");
        return Ok(());
    }

    println!("📊 Period comparison\n");
    println!("  Customers:  {}", report.stats.total_customers);
    println!("  Increased:  {}", report.stats.increased);
    println!("  Decreased:  {}", report.stats.decreased);
    println!("  Net change: {:.2}\n", report.stats.net_variation);

    println!("Largest variations:");
    for row in &report.highlighted_variations {
        println!(
            "  {:>8} {:<24} {:>12.2} ({:.1}%)",
            row.customer_id.as_str(),
            row.customer_name,
            row.debt_delta,
            row.percent_variation
        );
    }

    println!("\nFull report:");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
