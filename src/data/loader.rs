use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::error::DataError;
use super::model::{EmissionDataset, EmissionRow};

// ---------------------------------------------------------------------------
// Source table columns
// ---------------------------------------------------------------------------

pub const COL_ENTITY: &str = "Entity";
pub const COL_YEAR: &str = "Year";
pub const COL_FOSSIL: &str = "Annual CO₂ emissions";
pub const COL_LAND_USE: &str = "Annual CO₂ emissions from land-use change";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an emissions dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the four source columns
/// * `.json`    – `[{ "Entity": ..., "Year": ..., ...}, ...]`
/// * `.parquet` – flat columns of the same names
///
/// Numeric cells are validated explicitly: a non-empty cell that fails to
/// parse aborts the load with [`DataError::MalformedRow`]; an empty emission
/// cell reads as `0.0` (missing observation).
pub fn load_file(path: &Path) -> Result<EmissionDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<EmissionDataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse an already-open CSV reader.  Split out so tests can feed in-memory
/// tables without touching the filesystem.
fn read_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<EmissionDataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let column = |name: &'static str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(DataError::MissingColumn(name))
    };
    let entity_idx = column(COL_ENTITY)?;
    let year_idx = column(COL_YEAR)?;
    let fossil_idx = column(COL_FOSSIL)?;
    let land_use_idx = column(COL_LAND_USE)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let entity = record.get(entity_idx).unwrap_or("").to_string();
        let year = parse_year(record.get(year_idx).unwrap_or(""), row_no)?;
        let fossil = parse_emission(record.get(fossil_idx).unwrap_or(""), row_no, COL_FOSSIL)?;
        let land_use =
            parse_emission(record.get(land_use_idx).unwrap_or(""), row_no, COL_LAND_USE)?;

        rows.push(EmissionRow {
            entity,
            year,
            fossil,
            land_use,
        });
    }

    Ok(EmissionDataset::from_rows(rows))
}

/// Year cells must parse as integers; an empty year is malformed because the
/// row could never match a year filter.
fn parse_year(s: &str, row: usize) -> Result<i32, DataError> {
    s.trim().parse::<i32>().map_err(|_| DataError::MalformedRow {
        row,
        column: COL_YEAR,
        value: s.to_string(),
    })
}

/// Emission cells: empty means a missing observation (0.0); anything else
/// must parse as a float.
fn parse_emission(s: &str, row: usize, column: &'static str) -> Result<f64, DataError> {
    let t = s.trim();
    if t.is_empty() {
        return Ok(0.0);
    }
    t.parse::<f64>().map_err(|_| DataError::MalformedRow {
        row,
        column,
        value: s.to_string(),
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// One record of a records-oriented JSON export.
///
/// Emission fields are nullable; a missing or null value reads as 0.0, the
/// same rule as an empty CSV cell. Extra columns ("Code", ...) are ignored.
#[derive(Debug, Deserialize)]
struct JsonRow {
    #[serde(rename = "Entity")]
    entity: String,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Annual CO₂ emissions", default)]
    fossil: Option<f64>,
    #[serde(rename = "Annual CO₂ emissions from land-use change", default)]
    land_use: Option<f64>,
}

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   {
///     "Entity": "France",
///     "Year": 2020,
///     "Annual CO₂ emissions": 277000000.0,
///     "Annual CO₂ emissions from land-use change": -1800000.0
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<EmissionDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<EmissionDataset> {
    let records: Vec<JsonRow> = serde_json::from_str(text).context("parsing JSON")?;
    let rows = records
        .into_iter()
        .map(|r| EmissionRow {
            entity: r.entity,
            year: r.year,
            fossil: r.fossil.unwrap_or(0.0),
            land_use: r.land_use.unwrap_or(0.0),
        })
        .collect();
    Ok(EmissionDataset::from_rows(rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the flat emissions schema.
///
/// Expected columns:
/// - `Entity`: Utf8 or LargeUtf8
/// - `Year`: Int32 or Int64
/// - both emission columns: Float64 or Float32, nullable
fn load_parquet(path: &Path) -> Result<EmissionDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let column = |name: &'static str| -> Result<usize, DataError> {
            schema.index_of(name).map_err(|_| DataError::MissingColumn(name))
        };
        let entity_col = batch.column(column(COL_ENTITY)?);
        let year_col = batch.column(column(COL_YEAR)?);
        let fossil_col = batch.column(column(COL_FOSSIL)?);
        let land_use_col = batch.column(column(COL_LAND_USE)?);

        let base = rows.len();
        for row in 0..batch.num_rows() {
            let entity = extract_string(entity_col, row)
                .with_context(|| format!("Row {}: failed to read '{COL_ENTITY}'", base + row))?;
            let year = extract_year(year_col, row, base + row)?;
            let fossil = extract_emission(fossil_col, row, base + row, COL_FOSSIL)?;
            let land_use = extract_emission(land_use_col, row, base + row, COL_LAND_USE)?;

            rows.push(EmissionRow {
                entity,
                year,
                fossil,
                land_use,
            });
        }
    }

    Ok(EmissionDataset::from_rows(rows))
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null entity value");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

fn extract_year(col: &Arc<dyn Array>, row: usize, row_no: usize) -> Result<i32> {
    if col.is_null(row) {
        return Err(DataError::MalformedRow {
            row: row_no,
            column: COL_YEAR,
            value: "<null>".to_string(),
        }
        .into());
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row) as i32)
        }
        other => bail!("'{COL_YEAR}' column is {other:?}, expected Int32 or Int64"),
    }
}

fn extract_emission(
    col: &Arc<dyn Array>,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<f64> {
    if col.is_null(row) {
        // Missing observation, same rule as an empty CSV cell.
        return Ok(0.0);
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            let v = arr.value(row);
            if v.is_nan() {
                return Err(DataError::MalformedRow {
                    row: row_no,
                    column,
                    value: "NaN".to_string(),
                }
                .into());
            }
            Ok(v)
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        other => bail!("'{column}' column is {other:?}, expected Float64 or Float32"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn csv_reader(text: &str) -> csv::Reader<Cursor<&[u8]>> {
        csv::Reader::from_reader(Cursor::new(text.as_bytes()))
    }

    const HEADER: &str =
        "Entity,Code,Year,Annual CO₂ emissions,Annual CO₂ emissions from land-use change";

    #[test]
    fn csv_happy_path() {
        let text = format!(
            "{HEADER}\nFrance,FRA,2020,277000000,-1800000\nBrazil,BRA,2020,466000000,1100000000\n"
        );
        let ds = read_csv(csv_reader(&text)).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[0].entity, "France");
        assert_eq!(ds.rows[0].year, 2020);
        assert_eq!(ds.rows[0].fossil, 277_000_000.0);
        assert_eq!(ds.rows[0].land_use, -1_800_000.0);
        assert_eq!(ds.years, vec![2020]);
    }

    #[test]
    fn csv_empty_emission_cell_reads_as_zero() {
        let text = format!("{HEADER}\nFrance,FRA,2020,277000000,\n");
        let ds = read_csv(csv_reader(&text)).unwrap();
        assert_eq!(ds.rows[0].land_use, 0.0);
    }

    #[test]
    fn csv_malformed_numeric_cell_fails_the_load() {
        let text = format!("{HEADER}\nFrance,FRA,2020,not-a-number,5\n");
        let err = read_csv(csv_reader(&text)).unwrap_err();
        match err.downcast_ref::<DataError>() {
            Some(DataError::MalformedRow { row, column, value }) => {
                assert_eq!(*row, 0);
                assert_eq!(*column, COL_FOSSIL);
                assert_eq!(value, "not-a-number");
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn csv_empty_year_is_malformed() {
        let text = format!("{HEADER}\nFrance,FRA,,1,2\n");
        let err = read_csv(csv_reader(&text)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::MalformedRow {
                column: COL_YEAR,
                ..
            })
        ));
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let text = "Entity,Year\nFrance,2020\n";
        let err = read_csv(csv_reader(text)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::MissingColumn(COL_FOSSIL))
        ));
    }

    #[test]
    fn json_happy_path_with_null_land_use() {
        let text = r#"[
            {"Entity": "France", "Year": 2020, "Annual CO₂ emissions": 277000000.0,
             "Annual CO₂ emissions from land-use change": null},
            {"Entity": "Brazil", "Year": 2019, "Annual CO₂ emissions": 466000000.0,
             "Annual CO₂ emissions from land-use change": 1100000000.0}
        ]"#;
        let ds = parse_json(text).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[0].land_use, 0.0);
        assert_eq!(ds.years, vec![2019, 2020]);
    }

    #[test]
    fn json_non_numeric_year_fails() {
        let text = r#"[{"Entity": "France", "Year": "twenty-twenty"}]"#;
        assert!(parse_json(text).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }
}
