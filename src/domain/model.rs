use crate::domain::iri::Iri;
use crate::utils::error::{ModelError, Result};
use crate::utils::validation::{validate_finite, validate_positive_number, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Inclusive date interval, written as `["2024-01-01", "2024-12-31"]`.
///
/// TOML run files may also use bare date literals: `[2024-01-01, 2024-12-31]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(DateInput, DateInput)", into = "(NaiveDate, NaiveDate)")]
pub struct TemporalRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TemporalRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ModelError::InvalidTemporalRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl TryFrom<(NaiveDate, NaiveDate)> for TemporalRange {
    type Error = ModelError;

    fn try_from((start, end): (NaiveDate, NaiveDate)) -> Result<Self> {
        Self::new(start, end)
    }
}

/// A date as written in JSON (string) or TOML (string or date literal).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DateInput {
    Text(NaiveDate),
    Toml(toml::value::Datetime),
}

impl DateInput {
    fn into_date(self) -> Result<NaiveDate> {
        let datetime = match self {
            DateInput::Text(date) => return Ok(date),
            DateInput::Toml(datetime) => datetime,
        };

        let invalid = |reason: &str| ModelError::InvalidConfigValueError {
            field: "temporal_range".to_string(),
            value: datetime.to_string(),
            reason: reason.to_string(),
        };

        if datetime.time.is_some() || datetime.offset.is_some() {
            return Err(invalid("Expected a date without time of day"));
        }
        let date = datetime.date.ok_or_else(|| invalid("Expected a date"))?;
        NaiveDate::from_ymd_opt(date.year.into(), date.month.into(), date.day.into())
            .ok_or_else(|| invalid("Not a valid calendar date"))
    }
}

impl TryFrom<(DateInput, DateInput)> for TemporalRange {
    type Error = ModelError;

    fn try_from((start, end): (DateInput, DateInput)) -> Result<Self> {
        Self::new(start.into_date()?, end.into_date()?)
    }
}

impl From<TemporalRange> for (NaiveDate, NaiveDate) {
    fn from(range: TemporalRange) -> Self {
        (range.start, range.end)
    }
}

/// A request for some amount of a product, in a place and over a period.
///
/// The same shape is used for what goes into a model run and for what comes out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    pub product_iri: Iri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<serde_json::Value>>,
    pub amount: f64,
    #[serde(default)]
    pub spatial_context: Iri,
    pub temporal_range: TemporalRange,
}

impl Demand {
    pub fn new(product_iri: Iri, amount: f64, temporal_range: TemporalRange) -> Self {
        Self {
            product_iri,
            properties: None,
            amount,
            spatial_context: Iri::global(),
            temporal_range,
        }
    }

    pub fn with_spatial_context(mut self, spatial_context: Iri) -> Self {
        self.spatial_context = spatial_context;
        self
    }

    pub fn with_properties(mut self, properties: Vec<serde_json::Value>) -> Self {
        self.properties = Some(properties);
        self
    }
}

impl Validate for Demand {
    fn validate(&self) -> Result<()> {
        validate_finite("demand.amount", self.amount)?;

        if let Some(properties) = &self.properties {
            // 每個屬性約束必須是物件或純量
            for (index, property) in properties.iter().enumerate() {
                let reason = match property {
                    serde_json::Value::Null => "Property constraints cannot be null",
                    serde_json::Value::Array(_) => {
                        "Property constraints must be an object or a scalar, not an array"
                    }
                    _ => continue,
                };
                return Err(ModelError::InvalidConfigValueError {
                    field: format!("demand.properties[{}]", index),
                    value: property.to_string(),
                    reason: reason.to_string(),
                });
            }
        }

        Ok(())
    }
}

pub const DEFAULT_NUM_SAMPLES: usize = 1000;

fn default_num_samples() -> usize {
    DEFAULT_NUM_SAMPLES
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Fail `prepare` when the model flags outliers, instead of dropping them.
    #[serde(default)]
    pub outliers_raise_error: bool,
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            outliers_raise_error: false,
            num_samples: DEFAULT_NUM_SAMPLES,
        }
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("run.num_samples", self.num_samples, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(data: HashMap<String, serde_json::Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data.get(column)
    }

    pub fn columns(&self) -> BTreeSet<&str> {
        self.data.keys().map(String::as_str).collect()
    }
}

/// One tabular dataset handed to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub records: Vec<Record>,
}

impl DataTable {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names of the first record; an empty table has none.
    pub fn columns(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.columns().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Numeric values of a column, skipping records where it is missing or not a number.
    pub fn numeric_column(&self, column: &str) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.get(column).and_then(|v| v.as_f64()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIssue {
    pub table: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outlier {
    pub table: String,
    pub row: usize,
    pub reason: String,
}

/// Findings of the validity checks run during `prepare`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityReport {
    pub issues: Vec<DataIssue>,
    pub outliers: Vec<Outlier>,
}

impl ValidityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.outliers.is_empty()
    }

    pub fn add_issue(&mut self, table: &str, message: impl Into<String>) {
        self.issues.push(DataIssue {
            table: table.to_string(),
            message: message.into(),
        });
    }

    pub fn add_outlier(&mut self, table: &str, row: usize, reason: impl Into<String>) {
        self.outliers.push(Outlier {
            table: table.to_string(),
            row,
            reason: reason.into(),
        });
    }

    pub fn merge(&mut self, other: ValidityReport) {
        self.issues.extend(other.issues);
        self.outliers.extend(other.outliers);
    }
}
