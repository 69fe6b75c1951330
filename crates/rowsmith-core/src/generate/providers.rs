//! # Value Synthesizer
//!
//! Produces one plausible value per column, following a fixed priority:
//! auto-generated columns are skipped, nullable columns are sometimes NULL,
//! a recognized column name yields a realistic value, and everything else is
//! dispatched on the declared type.

use std::borrow::Cow;

use chrono::{Datelike, Duration as ChronoDuration, NaiveDateTime, NaiveTime};
use fake::faker::address::en::*;
use fake::faker::company::en::*;
use fake::faker::internet::en::*;
use fake::faker::lorem::en::*;
use fake::faker::name::en::*;
use fake::faker::phone_number::en::*;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classify::{classify_name, NameCategory};
use crate::generate::value::Value;
use crate::schema::types::{ColumnDescriptor, DataType};

/// Text length assumed when the catalog reports none.
pub const DEFAULT_TEXT_LENGTH: u32 = 255;

/// Column names treated as 0/1 flags on narrow integer columns.
const FLAG_NAME_HINTS: &[&str] = &["published", "active", "enabled"];

/// Wrap a dynamically generated String into a Value::String.
#[inline]
fn owned(s: String) -> Value {
    Value::String(Cow::Owned(s))
}

/// Per-request value generator.
///
/// `base_time` is the pinned wall-clock timestamp for the request. Every
/// temporal value is derived from it, so a seeded synthesizer produces the
/// same output regardless of when it runs.
pub struct ValueSynthesizer {
    rng: StdRng,
    null_probability: f64,
    base_time: NaiveDateTime,
}

impl ValueSynthesizer {
    pub fn new(seed: Option<u64>, null_probability: f64, base_time: NaiveDateTime) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            null_probability: null_probability.clamp(0.0, 1.0),
            base_time,
        }
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rng.random_range(0..items.len())])
        }
    }

    /// Value for one column, or `None` when the database assigns it.
    pub fn synthesize(&mut self, column: &ColumnDescriptor) -> Option<Value> {
        if column.auto_generated {
            return None;
        }

        if column.nullable && self.rng.random_bool(self.null_probability) {
            return Some(Value::Null);
        }

        let category = if takes_free_text(&column.data_type) {
            classify_name(&column.name)
        } else {
            None
        };
        let value = match category {
            Some(category) => self.by_category(category),
            None => self.by_type(column),
        };

        Some(fit_to_length(value, column.max_length))
    }

    fn by_category(&mut self, category: NameCategory) -> Value {
        let rng = &mut self.rng;
        match category {
            NameCategory::Email => {
                let email: String = SafeEmail().fake_with_rng(rng);
                match email.split_once('@') {
                    Some((local, domain)) => {
                        let tag: u32 = rng.random_range(0..100_000);
                        owned(format!("{}.{}@{}", local, tag, domain))
                    }
                    None => owned(email),
                }
            }
            NameCategory::Phone => owned(PhoneNumber().fake_with_rng(rng)),
            NameCategory::PersonName => owned(Name().fake_with_rng(rng)),
            NameCategory::FirstName => owned(FirstName().fake_with_rng(rng)),
            NameCategory::LastName => owned(LastName().fake_with_rng(rng)),
            NameCategory::StreetAddress => {
                let number: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                owned(format!("{} {}", number, street))
            }
            NameCategory::City => owned(CityName().fake_with_rng(rng)),
            NameCategory::Country => owned(CountryName().fake_with_rng(rng)),
            NameCategory::Company => owned(CompanyName().fake_with_rng(rng)),
            NameCategory::JobTitle => owned(Profession().fake_with_rng(rng)),
            NameCategory::Description => owned(Paragraph(3..6).fake_with_rng(rng)),
            NameCategory::Url => {
                let word: String = Word().fake_with_rng(rng);
                let suffix: String = DomainSuffix().fake_with_rng(rng);
                owned(format!("https://{}.{}", word, suffix))
            }
        }
    }

    fn by_type(&mut self, column: &ColumnDescriptor) -> Value {
        match &column.data_type {
            DataType::Char | DataType::VarChar | DataType::Text => {
                // TEXT types report limits up to 4GB; build short prose and truncate.
                let max = column
                    .max_length
                    .unwrap_or(DEFAULT_TEXT_LENGTH)
                    .clamp(1, DEFAULT_TEXT_LENGTH);
                let count = max.div_ceil(20) as usize;
                let words: Vec<String> = Words(count..count + 1).fake_with_rng(&mut self.rng);
                owned(words.join(" "))
            }

            DataType::TinyInt => {
                if is_flag_column(column) {
                    Value::Int(self.rng.random_range(0..=1))
                } else {
                    Value::Int(self.rng.random_range(0..=127))
                }
            }
            DataType::SmallInt => Value::Int(self.rng.random_range(1..=i16::MAX as i64)),
            DataType::Integer | DataType::BigInt => Value::Int(self.rng.random_range(1..=1_000_000)),

            DataType::Decimal => {
                let max = decimal_upper_bound(column.numeric_precision, column.numeric_scale);
                let places = column.numeric_scale.map_or(2, |s| s.min(2));
                let raw: f64 = self.rng.random_range(0.0..max);
                Value::Float(round_to(raw, places).min(max))
            }
            DataType::Float | DataType::Double => {
                let raw: f64 = self.rng.random_range(0.0..10_000.0);
                Value::Float(round_to(raw, 2))
            }

            DataType::Date => Value::Date(self.past_datetime().date()),
            DataType::DateTime | DataType::Timestamp => Value::DateTime(self.past_datetime()),
            DataType::Time => {
                let secs: u32 = self.rng.random_range(0..86_400);
                Value::Time(NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or_default())
            }
            DataType::Year => {
                let years_ago: i64 = self.rng.random_range(0..30);
                Value::Int(self.base_time.year() as i64 - years_ago)
            }

            DataType::Boolean => Value::Int(self.rng.random_range(0..=1)),

            DataType::Json => {
                let bytes: [u8; 16] = self.rng.random();
                let id = uuid::Builder::from_random_bytes(bytes).into_uuid();
                let value: String = Word().fake_with_rng(&mut self.rng);
                let timestamp = self.past_datetime().and_utc().format("%Y-%m-%dT%H:%M:%S%.3fZ");
                Value::Json(serde_json::json!({
                    "id": id.to_string(),
                    "value": value,
                    "timestamp": timestamp.to_string(),
                }))
            }

            DataType::Enum => {
                let choices = column.enum_values.as_deref().unwrap_or_default();
                match self.pick(choices) {
                    Some(choice) => owned(choice.clone()),
                    None => self.word(),
                }
            }

            DataType::Binary => {
                let len = column.max_length.unwrap_or(16).clamp(1, 16) as usize;
                let bytes: Vec<u8> = (0..len).map(|_| self.rng.random()).collect();
                Value::Bytes(bytes)
            }

            DataType::Unknown(_) => self.word(),
        }
    }

    fn word(&mut self) -> Value {
        owned(Word().fake_with_rng(&mut self.rng))
    }

    /// A moment within the year before `base_time`, second precision.
    fn past_datetime(&mut self) -> NaiveDateTime {
        let secs_ago: i64 = self.rng.random_range(1..=365 * 86_400);
        self.base_time - ChronoDuration::seconds(secs_ago)
    }
}

/// String columns, plus untyped ones (SQLite allows a column with no type).
fn takes_free_text(data_type: &DataType) -> bool {
    data_type.is_string() || matches!(data_type, DataType::Unknown(_))
}

/// Display width 1 (`tinyint(1)`) or a flag-like column name.
fn is_flag_column(column: &ColumnDescriptor) -> bool {
    if column.display_width == Some(1) {
        return true;
    }
    let name = column.name.to_lowercase();
    FLAG_NAME_HINTS.iter().any(|hint| name.contains(hint))
}

/// Exclusive upper bound for a decimal column: 10000, narrowed to what
/// `DECIMAL(precision, scale)` can hold.
fn decimal_upper_bound(precision: Option<u32>, scale: Option<u32>) -> f64 {
    let default: f64 = 10_000.0;
    match precision {
        Some(p) => {
            let integer_digits = p.saturating_sub(scale.unwrap_or(0)) as i32;
            let cap = 10f64.powi(integer_digits);
            if cap <= 1.0 {
                // DECIMAL(2,2) and friends: only fractional values fit
                0.99
            } else {
                default.min(cap - 1.0)
            }
        }
        None => default,
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Truncate string output to the column's declared length, counted in chars.
fn fit_to_length(value: Value, max_length: Option<u32>) -> Value {
    match (value, max_length) {
        (Value::String(s), Some(max)) if s.chars().count() > max as usize => {
            owned(s.chars().take(max as usize).collect())
        }
        (value, _) => value,
    }
}
