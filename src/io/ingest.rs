//! CSV ingest.
//!
//! This module is responsible for turning the demand CSV into an immutable
//! `Dataset` of `SalesRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **All-or-nothing**: one bad row fails the whole load, naming the line
//! - **Deterministic behavior**: years/categories/brands are exposed sorted
//! - **Separation of concerns**: no aggregation logic here

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::SalesRecord;
use crate::error::AppError;

/// Required columns, in the order they appear in the reference dataset.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Date",
    "Category",
    "Brand",
    "Price",
    "Units_Sold",
    "Stock_Levels",
    "Revenue",
];

/// Summary stats about the loaded records.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_records: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// The loaded record set.
///
/// Records are private and only handed out as a shared slice, so every
/// downstream view is a filtered/grouped copy rather than an in-place edit.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    records: Vec<SalesRecord>,
    years: Vec<i32>,
    categories: Vec<String>,
    brands: Vec<String>,
    stats: DatasetStats,
}

impl Dataset {
    /// Build a dataset from already-parsed records.
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<SalesRecord>) -> Self {
        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        let categories: Vec<String> = distinct_sorted(records.iter().map(|r| r.category.as_str()));
        let brands: Vec<String> = distinct_sorted(records.iter().map(|r| r.brand.as_str()));

        let stats = DatasetStats {
            n_records: records.len(),
            first_date: records.iter().map(|r| r.date).min(),
            last_date: records.iter().map(|r| r.date).max(),
        };

        Self {
            source: source.into(),
            years: years.into_iter().collect(),
            categories,
            brands,
            records,
            stats,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Distinct brands, sorted.
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn stats(&self) -> &DatasetStats {
        &self.stats
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.binary_search_by(|c| c.as_str().cmp(category)).is_ok()
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Load the dataset from a CSV file.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open dataset '{}': {e}", path.display()))
    })?;

    let records = read_records(file)
        .map_err(|e| AppError::input(format!("Failed to load dataset '{}': {e}", path.display())))?;

    let dataset = Dataset::from_records(path, records);
    info!(
        path = %path.display(),
        records = dataset.stats().n_records,
        years = dataset.years().len(),
        categories = dataset.categories().len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Parse every record from a CSV reader. Fails on the first bad row.
pub fn read_records<R: Read>(input: R) -> Result<Vec<SalesRecord>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read CSV headers: {e}"))?
        .clone();

    let header_map = build_header_map(&headers);
    let columns = resolve_columns(&header_map)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        let record = result.map_err(|e| format!("line {line}: CSV parse error: {e}"))?;
        let row = parse_row(&record, &columns).map_err(|e| format!("line {line}: {e}"))?;
        records.push(row);
    }

    debug!(rows = records.len(), "parsed dataset rows");
    Ok(records)
}

/// Column indices for the required schema.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    category: usize,
    brand: usize,
    price: usize,
    units_sold: usize,
    stock_levels: usize,
    revenue: usize,
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, String> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(&name.to_ascii_lowercase()))
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing required column(s): {}", missing.join(", ")));
    }

    let idx = |name: &str| header_map[&name.to_ascii_lowercase()];
    Ok(Columns {
        date: idx("Date"),
        category: idx("Category"),
        brand: idx("Brand"),
        price: idx("Price"),
        units_sold: idx("Units_Sold"),
        stock_levels: idx("Stock_Levels"),
        revenue: idx("Revenue"),
    })
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<SalesRecord, String> {
    let date = parse_date(get_required(record, columns.date, "Date")?)?;
    let category = get_required(record, columns.category, "Category")?;
    let brand = get_required(record, columns.brand, "Brand")?;

    let price = parse_non_negative(get_required(record, columns.price, "Price")?, "Price")?;
    let units_sold = parse_non_negative(get_required(record, columns.units_sold, "Units_Sold")?, "Units_Sold")?;
    let stock_levels =
        parse_non_negative(get_required(record, columns.stock_levels, "Stock_Levels")?, "Stock_Levels")?;
    let revenue = parse_f64(get_required(record, columns.revenue, "Revenue")?, "Revenue")?;

    Ok(SalesRecord::new(
        date,
        category,
        brand,
        price,
        units_sold,
        stock_levels,
        revenue,
    ))
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Parse a date field, discarding any time-of-day component.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, YYYY-MM-DD HH:MM:SS."
    ))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{name}` value '{s}'.")),
    }
}

fn parse_non_negative(s: &str, name: &str) -> Result<f64, String> {
    let v = parse_f64(s, name)?;
    if v < 0.0 {
        return Err(format!("Negative `{name}` value '{s}'."));
    }
    Ok(v)
}
