use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result as AnyResult, anyhow, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, DatasetKind, TIMESTAMP};
use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file, naming it after the file stem.  Dispatch by
/// extension.
///
/// Supported formats:
/// * `.parquet` – the simulator's native output (recommended)
/// * `.csv`     – header row, one row per sample
/// * `.json`    – `[{ "timestamp": 0, "energy_usage": 10.0, ... }, ...]`
///
/// Every format must provide an integer `timestamp` column in milliseconds.
/// Non-numeric columns are dropped.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string();
    load_named(path, name)
}

/// Load a dataset as a known telemetry table and validate its columns.
pub fn load_dataset_as(path: &Path, kind: DatasetKind) -> Result<Dataset> {
    let dataset = load_named(path, kind.name().to_string())?;
    dataset.validate(kind)?;
    Ok(dataset)
}

fn load_named(path: &Path, name: String) -> Result<Dataset> {
    if !path.exists() {
        return Err(PlotError::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, name),
        "csv" => load_csv(path, name),
        "json" => load_json(path, name),
        other => Err(anyhow!("unsupported file extension: .{other}")),
    };

    let dataset = loaded.map_err(|e| PlotError::format(path, format!("{e:#}")))?;
    log::info!(
        "Loaded dataset '{}' ({} rows, columns {:?}) from {}",
        dataset.name,
        dataset.len(),
        dataset.column_names(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet table as written by the simulator's telemetry exporters.
///
/// - `timestamp`: any integer type, `Timestamp(_)` or `Date64`
/// - numeric columns (ints and floats) are widened to `f64`; nulls become NaN
/// - everything else (ids, names, states as strings) is skipped
fn load_parquet(path: &Path, name: String) -> AnyResult<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let ts_idx = schema
        .index_of(TIMESTAMP)
        .map_err(|_| anyhow!("missing '{TIMESTAMP}' column"))?;

    let numeric_cols: Vec<(usize, String)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, f)| *i != ts_idx && f.data_type().is_numeric())
        .map(|(i, f)| (i, f.name().clone()))
        .collect();

    let mut timestamps = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); numeric_cols.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        timestamps.extend(timestamp_millis(batch.column(ts_idx))?);

        for ((col_idx, col_name), out) in numeric_cols.iter().zip(values.iter_mut()) {
            let as_f64 = cast(batch.column(*col_idx), &DataType::Float64)
                .with_context(|| format!("converting '{col_name}' to f64"))?;
            out.extend(
                as_f64
                    .as_primitive::<Float64Type>()
                    .iter()
                    .map(|v| v.unwrap_or(f64::NAN)),
            );
        }
    }

    let columns = numeric_cols
        .into_iter()
        .map(|(_, col)| col)
        .zip(values)
        .collect();
    Dataset::from_columns(name, timestamps, columns)
}

/// Read a timestamp column as integer milliseconds.
fn timestamp_millis(col: &ArrayRef) -> AnyResult<Vec<i64>> {
    let normalized = match col.data_type() {
        DataType::Timestamp(TimeUnit::Millisecond, _) | DataType::Date64 => col.clone(),
        DataType::Timestamp(_, tz) => cast(
            col,
            &DataType::Timestamp(TimeUnit::Millisecond, tz.clone()),
        )?,
        dt if dt.is_integer() => col.clone(),
        other => bail!("'{TIMESTAMP}' must be integer milliseconds, got {other:?}"),
    };

    let ints = cast(&normalized, &DataType::Int64).context("converting timestamps")?;
    if ints.null_count() > 0 {
        bail!("'{TIMESTAMP}' contains null values");
    }
    Ok(ints.as_primitive::<Int64Type>().values().to_vec())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one sample per row.  A column
/// is kept when every non-empty cell parses as a number; empty cells are NaN.
fn load_csv(path: &Path, name: String) -> AnyResult<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let ts_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP)
        .with_context(|| format!("CSV missing '{TIMESTAMP}' column"))?;

    let records = reader
        .records()
        .enumerate()
        .map(|(row_no, r)| r.with_context(|| format!("CSV row {row_no}")))
        .collect::<AnyResult<Vec<_>>>()?;

    let timestamps = records
        .iter()
        .enumerate()
        .map(|(row_no, rec)| {
            let cell = rec.get(ts_idx).unwrap_or("").trim();
            cell.parse::<i64>().with_context(|| {
                format!("CSV row {row_no}: '{cell}' is not an integer timestamp")
            })
        })
        .collect::<AnyResult<Vec<_>>>()?;

    let mut columns = Vec::new();
    for (col_idx, col_name) in headers.iter().enumerate() {
        if col_idx == ts_idx {
            continue;
        }
        let parsed: Option<Vec<f64>> = records
            .iter()
            .map(|rec| parse_cell(rec.get(col_idx).unwrap_or("")))
            .collect();
        match parsed {
            Some(vals) => columns.push((col_name.clone(), vals)),
            None => log::debug!("Skipping non-numeric CSV column '{col_name}'"),
        }
    }

    Dataset::from_columns(name, timestamps, columns)
}

fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "timestamp": 0,    "energy_usage": 10.0, "host_id": "h1" },
///   { "timestamp": 1000, "energy_usage": 12.0, "host_id": "h1" }
/// ]
/// ```
fn load_json(path: &Path, name: String) -> AnyResult<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("expected top-level JSON array")?;

    let mut timestamps = Vec::with_capacity(records.len());
    let mut column_names: Vec<String> = Vec::new();
    let mut non_numeric: BTreeSet<String> = BTreeSet::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;

        let ts = obj
            .get(TIMESTAMP)
            .and_then(JsonValue::as_i64)
            .with_context(|| format!("row {i}: missing or non-integer '{TIMESTAMP}'"))?;
        timestamps.push(ts);

        for (key, val) in obj {
            if key == TIMESTAMP {
                continue;
            }
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            if !(val.is_number() || val.is_null()) {
                non_numeric.insert(key.clone());
            }
        }
    }

    let columns = column_names
        .into_iter()
        .filter(|col| !non_numeric.contains(col))
        .map(|col| {
            let vals = records
                .iter()
                .map(|rec| {
                    rec.get(&col)
                        .and_then(JsonValue::as_f64)
                        .unwrap_or(f64::NAN)
                })
                .collect();
            (col, vals)
        })
        .collect();

    Dataset::from_columns(name, timestamps, columns)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{
        Date64Array, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
    };
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn write_power_parquet(path: &Path) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("timestamp", DataType::Int64, false),
            Field::new("power_source_id", DataType::Utf8, false),
            Field::new("energy_usage", DataType::Float64, true),
            Field::new("carbon_emission", DataType::Float64, false),
            Field::new("carbon_intensity", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![0, 1000, 2000])),
                Arc::new(StringArray::from(vec!["ps0", "ps0", "ps0"])),
                Arc::new(Float64Array::from(vec![Some(10.0), None, Some(12.0)])),
                Arc::new(Float64Array::from(vec![1.0, 1.5, 2.0])),
                Arc::new(Float64Array::from(vec![100.0, 110.0, 120.0])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    /// Battery table whose timestamp column has the given Arrow type.
    fn write_battery_parquet(path: &Path, timestamps: ArrayRef) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("timestamp", timestamps.data_type().clone(), false),
            Field::new("energy_usage", DataType::Float64, false),
        ]));
        let energy: ArrayRef = Arc::new(Float64Array::from(vec![2.0, 3.0]));
        let batch = RecordBatch::try_new(schema.clone(), vec![timestamps, energy]).unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_microsecond_timestamps_become_millis() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("battery.parquet");
        write_battery_parquet(
            &path,
            Arc::new(TimestampMicrosecondArray::from(vec![0, 1_000_000])),
        );

        let ds = load_dataset_as(&path, DatasetKind::Battery).unwrap();
        assert_eq!(ds.timestamps(), [0, 1000]);
        assert_eq!(ds.column("energy_usage").unwrap(), [2.0, 3.0]);
    }

    #[test]
    fn parquet_date64_timestamps_are_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("battery.parquet");
        write_battery_parquet(
            &path,
            Arc::new(Date64Array::from(vec![0, 86_400_000])),
        );

        let ds = load_dataset_as(&path, DatasetKind::Battery).unwrap();
        assert_eq!(ds.timestamps(), [0, 86_400_000]);
    }

    #[test]
    fn parquet_keeps_numeric_columns_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("powerSource.parquet");
        write_power_parquet(&path);

        let ds = load_dataset_as(&path, DatasetKind::PowerSource).unwrap();
        assert_eq!(ds.name, "powerSource");
        assert_eq!(ds.timestamps(), [0, 1000, 2000]);
        assert_eq!(
            ds.column_names(),
            ["energy_usage", "carbon_emission", "carbon_intensity"]
        );
        let energy = ds.column("energy_usage").unwrap();
        assert_eq!(energy[0], 10.0);
        assert!(energy[1].is_nan());
        assert!(ds.column("power_source_id").is_none());
    }

    #[test]
    fn parquet_kind_validation_reports_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("battery.parquet");
        write_power_parquet(&path);

        // Battery only needs energy_usage, which is present.
        load_dataset_as(&path, DatasetKind::Battery).unwrap();

        let csv = write_file(&dir, "battery.csv", "timestamp,charge\n0,1.0\n");
        let err = load_dataset_as(&csv, DatasetKind::Battery).unwrap_err();
        assert!(matches!(
            err,
            PlotError::MissingColumn { ref column, .. } if column == "energy_usage"
        ));
    }

    #[test]
    fn nonexistent_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_dataset(&dir.path().join("nope.parquet")).unwrap_err();
        assert!(matches!(err, PlotError::DatasetNotFound { .. }));
    }

    #[test]
    fn malformed_parquet_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "host.parquet", "definitely not parquet");
        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, PlotError::DatasetFormat { .. }));
    }

    #[test]
    fn unsupported_extension_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "host.xlsx", "");
        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, PlotError::DatasetFormat { .. }));
    }

    #[test]
    fn csv_drops_text_columns_and_reads_blanks_as_nan() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "battery.csv",
            "timestamp,battery_id,energy_usage\n0,b0,2\n1000,b0,\n2000,b0,3.5\n",
        );
        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.name, "battery");
        assert_eq!(ds.column_names(), ["energy_usage"]);
        let vals = ds.column("energy_usage").unwrap();
        assert_eq!(vals[0], 2.0);
        assert!(vals[1].is_nan());
        assert_eq!(vals[2], 3.5);
    }

    #[test]
    fn csv_without_timestamp_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "host.csv", "time,energy_usage\n0,1\n");
        let err = load_dataset(&path).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn json_records_are_loaded() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "power.json",
            r#"[{"timestamp": 0, "energy_usage": 10, "host": "a"},
                {"timestamp": 1000, "energy_usage": null, "host": "a"}]"#,
        );
        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.timestamps(), [0, 1000]);
        assert_eq!(ds.column_names(), ["energy_usage"]);
        assert!(ds.column("energy_usage").unwrap()[1].is_nan());
    }

    #[test]
    fn json_with_float_timestamp_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "x.json", r#"[{"timestamp": 0.5}]"#);
        assert!(matches!(
            load_dataset(&path).unwrap_err(),
            PlotError::DatasetFormat { .. }
        ));
    }
}
