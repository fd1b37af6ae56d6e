use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, RawShipment, ShipmentRecord};
use crate::error::LoadError;

/// Column names every source must provide, after header normalization.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Market",
    "Shipping_Mode",
    "Customer_Segment",
    "Order_Country",
    "Sales",
    "Department_Name",
    "Days_for_shipping_real",
    "Days_for_shipment_scheduled",
    "Late_delivery_risk",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a shipment dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat Parquet file, one row per shipment
/// * `.json`    – `[{ "Market": "...", "Sales": 12.5, ... }, ...]`
/// * `.csv`     – header row plus one record per line, legacy single-byte
///   encodings tolerated
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Loader cache
// ---------------------------------------------------------------------------

/// Process-lifetime memoization of loaded datasets, keyed on the canonical
/// source path. Owned by the application root, one instance per process: a
/// given source is parsed at most once, and repeat opens share the `Arc`.
#[derive(Debug, Default)]
pub struct LoaderCache {
    loaded: HashMap<PathBuf, Arc<Dataset>>,
}

impl LoaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load through the cache. The key is the canonicalized path, so two
    /// spellings of the same file share one entry.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let key = path.canonicalize().map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(dataset) = self.loaded.get(&key) {
            log::debug!("loader cache hit for {}", key.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_file(&key)?);
        log::info!(
            "loaded {} records from {}",
            dataset.len(),
            key.display()
        );
        self.loaded.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Header normalization
// ---------------------------------------------------------------------------

/// Normalize a header name: spaces become underscores, parentheses are
/// dropped.  `"Days for shipping (real)"` → `"Days_for_shipping_real"`.
///
/// Idempotent (a normalized name maps to itself) and injective over the
/// expected header set.
pub fn normalize_header(name: &str) -> String {
    name.replace(' ', "_").replace(['(', ')'], "")
}

/// Indices of the required columns inside a normalized header row.
struct ColumnIndices {
    market: usize,
    shipping_mode: usize,
    customer_segment: usize,
    order_country: usize,
    sales: usize,
    department_name: usize,
    days_real: usize,
    days_scheduled: usize,
    late_delivery_risk: usize,
}

impl ColumnIndices {
    fn locate(headers: &[String]) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        Ok(ColumnIndices {
            market: find("Market")?,
            shipping_mode: find("Shipping_Mode")?,
            customer_segment: find("Customer_Segment")?,
            order_country: find("Order_Country")?,
            sales: find("Sales")?,
            department_name: find("Department_Name")?,
            days_real: find("Days_for_shipping_real")?,
            days_scheduled: find("Days_for_shipment_scheduled")?,
            late_delivery_risk: find("Late_delivery_risk")?,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_csv_bytes(&bytes)
}

/// Parse CSV bytes into a dataset.
///
/// Valid UTF-8 is taken as-is; anything else is decoded as Latin-1 (each byte
/// maps to the code point of the same value), so no byte sequence is
/// rejected.  The exported data from legacy logistics systems is routinely
/// ISO-8859-1.
pub fn load_csv_bytes(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let text: String = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let columns = ColumnIndices::locate(&headers)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let raw = RawShipment {
            market: field(columns.market).to_string(),
            shipping_mode: field(columns.shipping_mode).to_string(),
            customer_segment: field(columns.customer_segment).to_string(),
            order_country: field(columns.order_country).to_string(),
            sales: parse_f64(field(columns.sales), row_no, "Sales")?,
            department_name: field(columns.department_name).to_string(),
            days_real: parse_i64(field(columns.days_real), row_no, "Days_for_shipping_real")?,
            days_scheduled: parse_i64(
                field(columns.days_scheduled),
                row_no,
                "Days_for_shipment_scheduled",
            )?,
            late_delivery_risk: parse_flag(
                field(columns.late_delivery_risk),
                row_no,
                "Late_delivery_risk",
            )?,
        };

        records.push(ShipmentRecord::from_raw(raw));
    }

    Ok(Dataset::from_records(records))
}

fn parse_f64(s: &str, row: usize, col: &str) -> Result<f64, LoadError> {
    s.trim().parse().map_err(|_| LoadError::Malformed {
        row,
        message: format!("{col}: '{s}' is not a number"),
    })
}

fn parse_i64(s: &str, row: usize, col: &str) -> Result<i64, LoadError> {
    s.trim().parse().map_err(|_| LoadError::Malformed {
        row,
        message: format!("{col}: '{s}' is not an integer"),
    })
}

/// The risk flag keeps the source's binary encoding: 1 means high risk,
/// every other integer means low risk.
fn parse_flag(s: &str, row: usize, col: &str) -> Result<bool, LoadError> {
    let value = parse_i64(s, row, col)?;
    Ok(value == 1)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Market": "Europe",
///     "Shipping Mode": "Standard Class",
///     ...
///     "Late_delivery_risk": 1
///   },
///   ...
/// ]
/// ```
///
/// Keys run through the same header normalization as CSV, so either the raw
/// or the normalized spelling works.
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or_else(|| LoadError::Malformed {
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());

    for (row_no, value) in rows.iter().enumerate() {
        let object = value.as_object().ok_or_else(|| LoadError::Malformed {
            row: row_no,
            message: "record is not a JSON object".to_string(),
        })?;

        // Normalize keys once per record so lookups match the CSV column set.
        let fields: BTreeMap<String, &JsonValue> = object
            .iter()
            .map(|(key, val)| (normalize_header(key), val))
            .collect();

        let raw = RawShipment {
            market: json_string(&fields, row_no, "Market")?,
            shipping_mode: json_string(&fields, row_no, "Shipping_Mode")?,
            customer_segment: json_string(&fields, row_no, "Customer_Segment")?,
            order_country: json_string(&fields, row_no, "Order_Country")?,
            sales: json_f64(&fields, row_no, "Sales")?,
            department_name: json_string(&fields, row_no, "Department_Name")?,
            days_real: json_i64(&fields, row_no, "Days_for_shipping_real")?,
            days_scheduled: json_i64(&fields, row_no, "Days_for_shipment_scheduled")?,
            late_delivery_risk: json_flag(&fields, row_no, "Late_delivery_risk")?,
        };

        records.push(ShipmentRecord::from_raw(raw));
    }

    Ok(Dataset::from_records(records))
}

fn json_field<'a>(
    fields: &BTreeMap<String, &'a JsonValue>,
    row: usize,
    col: &str,
) -> Result<&'a JsonValue, LoadError> {
    fields
        .get(col)
        .copied()
        .ok_or_else(|| match row {
            0 => LoadError::MissingColumn(col.to_string()),
            _ => LoadError::Malformed {
                row,
                message: format!("missing field '{col}'"),
            },
        })
}

fn json_string(
    fields: &BTreeMap<String, &JsonValue>,
    row: usize,
    col: &str,
) -> Result<String, LoadError> {
    json_field(fields, row, col)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LoadError::Malformed {
            row,
            message: format!("{col}: expected a string"),
        })
}

fn json_f64(
    fields: &BTreeMap<String, &JsonValue>,
    row: usize,
    col: &str,
) -> Result<f64, LoadError> {
    json_field(fields, row, col)?
        .as_f64()
        .ok_or_else(|| LoadError::Malformed {
            row,
            message: format!("{col}: expected a number"),
        })
}

fn json_i64(
    fields: &BTreeMap<String, &JsonValue>,
    row: usize,
    col: &str,
) -> Result<i64, LoadError> {
    json_field(fields, row, col)?
        .as_i64()
        .ok_or_else(|| LoadError::Malformed {
            row,
            message: format!("{col}: expected an integer"),
        })
}

/// Accepts JSON `true`/`false` as well as the 0/1 integer encoding.
fn json_flag(
    fields: &BTreeMap<String, &JsonValue>,
    row: usize,
    col: &str,
) -> Result<bool, LoadError> {
    let value = json_field(fields, row, col)?;
    if let Some(b) = value.as_bool() {
        return Ok(b);
    }
    if let Some(i) = value.as_i64() {
        return Ok(i == 1);
    }
    Err(LoadError::Malformed {
        row,
        message: format!("{col}: expected a boolean or 0/1 integer"),
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, one row per shipment.
///
/// Column names run through the same normalization as CSV headers.  Numeric
/// columns may be 32- or 64-bit; the risk flag may be a Boolean column or an
/// integer 0/1 column (files written by Pandas keep the original 0/1
/// encoding).
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut row_no = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        // Normalized column name → column index, rebuilt per batch.
        let mut columns: BTreeMap<String, usize> = BTreeMap::new();
        for (idx, field) in schema.fields().iter().enumerate() {
            columns.insert(normalize_header(field.name()), idx);
        }
        for required in REQUIRED_COLUMNS {
            if !columns.contains_key(required) {
                return Err(LoadError::MissingColumn(required.to_string()));
            }
        }

        let column = |name: &str| batch.column(columns[name]);

        for row in 0..batch.num_rows() {
            let raw = RawShipment {
                market: string_at(column("Market"), row, row_no, "Market")?,
                shipping_mode: string_at(column("Shipping_Mode"), row, row_no, "Shipping_Mode")?,
                customer_segment: string_at(
                    column("Customer_Segment"),
                    row,
                    row_no,
                    "Customer_Segment",
                )?,
                order_country: string_at(column("Order_Country"), row, row_no, "Order_Country")?,
                sales: f64_at(column("Sales"), row, row_no, "Sales")?,
                department_name: string_at(
                    column("Department_Name"),
                    row,
                    row_no,
                    "Department_Name",
                )?,
                days_real: i64_at(
                    column("Days_for_shipping_real"),
                    row,
                    row_no,
                    "Days_for_shipping_real",
                )?,
                days_scheduled: i64_at(
                    column("Days_for_shipment_scheduled"),
                    row,
                    row_no,
                    "Days_for_shipment_scheduled",
                )?,
                late_delivery_risk: flag_at(
                    column("Late_delivery_risk"),
                    row,
                    row_no,
                    "Late_delivery_risk",
                )?,
            };

            records.push(ShipmentRecord::from_raw(raw));
            row_no += 1;
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn malformed(row: usize, col: &str, what: &str) -> LoadError {
    LoadError::Malformed {
        row,
        message: format!("{col}: {what}"),
    }
}

fn string_at(
    col: &Arc<dyn Array>,
    batch_row: usize,
    row: usize,
    name: &str,
) -> Result<String, LoadError> {
    if col.is_null(batch_row) {
        return Err(malformed(row, name, "null value"));
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| malformed(row, name, "expected StringArray"))?;
            Ok(arr.value(batch_row).to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            Ok(arr.value(batch_row).to_string())
        }
        other => Err(malformed(
            row,
            name,
            &format!("expected a string column, got {other:?}"),
        )),
    }
}

fn f64_at(
    col: &Arc<dyn Array>,
    batch_row: usize,
    row: usize,
    name: &str,
) -> Result<f64, LoadError> {
    if col.is_null(batch_row) {
        return Err(malformed(row, name, "null value"));
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(batch_row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(batch_row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(batch_row) as f64)
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(batch_row) as f64)
        }
        other => Err(malformed(
            row,
            name,
            &format!("expected a numeric column, got {other:?}"),
        )),
    }
}

fn i64_at(
    col: &Arc<dyn Array>,
    batch_row: usize,
    row: usize,
    name: &str,
) -> Result<i64, LoadError> {
    if col.is_null(batch_row) {
        return Err(malformed(row, name, "null value"));
    }
    match col.data_type() {
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(batch_row))
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(batch_row) as i64)
        }
        other => Err(malformed(
            row,
            name,
            &format!("expected an integer column, got {other:?}"),
        )),
    }
}

/// Boolean column or integer 0/1 column; 1 is high risk.
fn flag_at(
    col: &Arc<dyn Array>,
    batch_row: usize,
    row: usize,
    name: &str,
) -> Result<bool, LoadError> {
    if col.is_null(batch_row) {
        return Err(malformed(row, name, "null value"));
    }
    match col.data_type() {
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            Ok(arr.value(batch_row))
        }
        DataType::Int64 | DataType::Int32 => Ok(i64_at(col, batch_row, row, name)? == 1),
        other => Err(malformed(
            row,
            name,
            &format!("expected a boolean or integer column, got {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::DeliveryStatus;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\
Market,Shipping Mode,Customer Segment,Order Country,Sales,Department Name,Days for shipping (real),Days for shipment (scheduled),Late_delivery_risk
Europe,Standard Class,Consumer,France,314.64,Apparel,6,4,1
LATAM,First Class,Corporate,Mexico,91.25,Golf,2,1,0
Pacific Asia,Same Day,Home Office,Japan,153.0,Fan Shop,0,0,0
";

    #[test]
    fn normalization_strips_spaces_and_parentheses() {
        assert_eq!(
            normalize_header("Days for shipping (real)"),
            "Days_for_shipping_real"
        );
        assert_eq!(
            normalize_header("Days for shipment (scheduled)"),
            "Days_for_shipment_scheduled"
        );
        assert_eq!(normalize_header("Market"), "Market");
    }

    #[test]
    fn normalization_is_idempotent() {
        for header in ["Days for shipping (real)", "Shipping Mode", "Sales"] {
            let once = normalize_header(header);
            assert_eq!(normalize_header(&once), once);
        }
    }

    #[test]
    fn csv_loads_and_derives() {
        let dataset = load_csv_bytes(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);

        let first = &dataset.records[0];
        assert_eq!(first.market, "Europe");
        assert_eq!(first.delivery_gap, 2);
        assert_eq!(first.delivery_status, DeliveryStatus::Delayed);
        assert!(first.late_delivery_risk);

        let last = &dataset.records[2];
        assert_eq!(last.delivery_gap, 0);
        assert_eq!(last.delivery_status, DeliveryStatus::OnTime);

        assert_eq!(dataset.markets.len(), 3);
        assert_eq!(dataset.shipping_modes.len(), 3);
    }

    #[test]
    fn latin1_bytes_are_not_rejected() {
        // "M<e9>xico" with a raw ISO-8859-1 e-acute, invalid as UTF-8.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(
            b"Market,Shipping Mode,Customer Segment,Order Country,Sales,Department Name,\
Days for shipping (real),Days for shipment (scheduled),Late_delivery_risk\n",
        );
        bytes.extend_from_slice(b"LATAM,First Class,Corporate,M");
        bytes.push(0xE9);
        bytes.extend_from_slice(b"xico,10.0,Golf,2,1,0\n");

        let dataset = load_csv_bytes(&bytes).unwrap();
        assert_eq!(dataset.records[0].order_country, "M\u{e9}xico");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let csv = "\
Market,Shipping Mode,Customer Segment,Order Country,Department Name,Days for shipping (real),Days for shipment (scheduled),Late_delivery_risk
Europe,Standard Class,Consumer,France,Apparel,6,4,1
";
        let err = load_csv_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(name) if name == "Sales"));
    }

    #[test]
    fn malformed_number_carries_row_context() {
        let csv = "\
Market,Shipping Mode,Customer Segment,Order Country,Sales,Department Name,Days for shipping (real),Days for shipment (scheduled),Late_delivery_risk
Europe,Standard Class,Consumer,France,not-a-number,Apparel,6,4,1
";
        let err = load_csv_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 0, .. }));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load_file(Path::new("shipments.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn cache_parses_a_source_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipments.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();

        let mut cache = LoaderCache::new();
        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn json_records_load_with_raw_or_normalized_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipments.json");
        std::fs::write(
            &path,
            r#"[
                {
                    "Market": "Europe",
                    "Shipping Mode": "Standard Class",
                    "Customer Segment": "Consumer",
                    "Order Country": "France",
                    "Sales": 314.64,
                    "Department Name": "Apparel",
                    "Days for shipping (real)": 6,
                    "Days for shipment (scheduled)": 4,
                    "Late_delivery_risk": 1
                },
                {
                    "Market": "LATAM",
                    "Shipping_Mode": "First Class",
                    "Customer_Segment": "Corporate",
                    "Order_Country": "Mexico",
                    "Sales": 91.25,
                    "Department_Name": "Golf",
                    "Days_for_shipping_real": 2,
                    "Days_for_shipment_scheduled": 1,
                    "Late_delivery_risk": false
                }
            ]"#,
        )
        .unwrap();

        let dataset = load_file(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].delivery_status, DeliveryStatus::Delayed);
        assert!(!dataset.records[1].late_delivery_risk);
    }
}
