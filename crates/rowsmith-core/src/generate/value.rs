use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

use crate::schema::types::DataType;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// A synthesized or sampled value for one database column.
///
/// `String` uses `Cow<'static, str>` so picks from static lookup tables
/// (enum-like flags, fallback words) stay borrowed while faker output is owned.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn owned(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON rendering used in tool responses.
    ///
    /// Temporal values become strings in the same form the database accepts
    /// them (`2024-05-01`, `2024-05-01 13:45:10`, `13:45:10`).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Date(d) => serde_json::Value::String(d.format(DATE_FORMAT).to_string()),
            Value::DateTime(ts) => {
                serde_json::Value::String(ts.format(DATETIME_FORMAT).to_string())
            }
            Value::Time(t) => serde_json::Value::String(t.format(TIME_FORMAT).to_string()),
            Value::Json(j) => j.clone(),
            Value::Bytes(b) => serde_json::Value::String(hex_encode(b)),
        }
    }

    /// Key used to compare values across rows (distinct counts, FK lookups).
    pub fn to_unique_key(&self) -> String {
        match self {
            Value::Null => "__NULL__".to_string(),
            Value::Float(f) => format!("{:.10}", f),
            other => other.to_string(),
        }
    }

    /// Interpret a value read back from the database as text.
    ///
    /// Backends cast sampled values to text so that every column type can be
    /// read the same way; integer columns are turned back into numbers, all
    /// other types stay textual and are coerced by the database on insert.
    pub fn from_catalog_text(raw: String, data_type: &DataType) -> Self {
        if data_type.is_integer() {
            if let Ok(i) = raw.trim().parse::<i64>() {
                return Value::Int(i);
            }
        }
        Value::owned(raw)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(ts) => write!(f, "{}", ts.format(DATETIME_FORMAT)),
            Value::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Value::Json(j) => write!(f, "{}", j),
            Value::Bytes(b) => write!(f, "{}", hex_encode(b)),
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_json() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 3)
            .unwrap();
        let row = vec![
            Value::Int(7),
            Value::Null,
            Value::String(Cow::Borrowed("x")),
            Value::DateTime(ts),
            Value::Date(ts.date()),
            Value::Time(ts.time()),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"[7,null,"x","2024-03-09 07:05:03","2024-03-09","07:05:03"]"#
        );
    }

    #[test]
    fn test_float_json_and_nan() {
        assert_eq!(Value::Float(12.5).to_json(), serde_json::json!(12.5));
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_from_catalog_text_respects_type() {
        assert_eq!(
            Value::from_catalog_text("42".to_string(), &DataType::BigInt),
            Value::Int(42)
        );
        assert_eq!(
            Value::from_catalog_text("007".to_string(), &DataType::VarChar),
            Value::owned("007".to_string())
        );
    }

    #[test]
    fn test_unique_key_distinguishes_null() {
        assert_ne!(
            Value::Null.to_unique_key(),
            Value::owned("NULL".to_string()).to_unique_key()
        );
    }
}
