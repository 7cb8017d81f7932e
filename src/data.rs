use std::{collections::HashMap, fmt, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A scalar produced by the result-set provider or by expression evaluation.
///
/// Absence is never a variant: a missing value is `None` wherever an
/// `Option<Value>` is carried, so it can't be confused with `0` or `""`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Numeric view used by arithmetic; text is accepted when it parses as a
    /// finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(f) => Some(*f),
            Value::Text(s) => parse_number(s),
            Value::Date(_) | Value::DateTime(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Parses a finite floating point literal, ignoring surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Types a raw exported field. Zero-padded integers stay text so part
/// numbers such as `00123` survive untouched.
pub fn parse_raw_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = parse_naive_date(trimmed) {
        return Some(Value::Date(date));
    }
    if let Some(dt) = parse_naive_datetime(trimmed) {
        return Some(Value::DateTime(dt));
    }
    if !is_zero_padded(trimmed) {
        if let Some(number) = parse_number(trimmed) {
            return Some(Value::Number(number));
        }
    }
    Some(Value::Text(raw.to_string()))
}

fn is_zero_padded(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

/// Lowercased field names shared by every row of one result set.
#[derive(Debug, Default)]
pub struct FieldIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FieldIndex {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = FieldIndex::default();
        for name in names {
            let lowered = name.as_ref().trim().to_lowercase();
            let position = index.names.len();
            index.positions.entry(lowered.clone()).or_insert(position);
            index.names.push(lowered);
        }
        index
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// One source row: values addressed by lowercase field name.
#[derive(Debug, Clone)]
pub struct ResultRow {
    fields: Arc<FieldIndex>,
    values: Vec<Option<Value>>,
}

impl ResultRow {
    pub fn new(fields: Arc<FieldIndex>, mut values: Vec<Option<Value>>) -> Self {
        values.resize(fields.names().len(), None);
        Self { fields, values }
    }

    /// Builds a standalone row; names are lowercased like a fetched result set.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Value>)>,
        S: AsRef<str>,
    {
        let (names, values): (Vec<String>, Vec<Option<Value>>) = pairs
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_string(), value))
            .unzip();
        Self::new(Arc::new(FieldIndex::new(names)), values)
    }

    /// True when `name` is a field of this row, even if its value is absent.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .position(name)
            .and_then(|idx| self.values.get(idx))
            .and_then(|value| value.as_ref())
    }
}

/// Ordered rows from the result-set provider, consumed read-only.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
}

impl ResultSet {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
