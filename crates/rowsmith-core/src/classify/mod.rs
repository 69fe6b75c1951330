//! # Column Name Classification
//!
//! Maps a column identifier to a [`NameCategory`] by testing it against an
//! ordered table of name patterns. The first matching pattern wins, so the
//! order of [`rules::NAME_RULES`] is part of the behavior.

pub mod rules;

use serde::{Deserialize, Serialize};

pub use rules::classify_name;

/// Realistic-value categories recognized from a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCategory {
    Email,
    Phone,
    PersonName,
    FirstName,
    LastName,
    StreetAddress,
    City,
    Country,
    Company,
    JobTitle,
    Description,
    Url,
}

impl std::fmt::Display for NameCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NameCategory::Email => "email",
            NameCategory::Phone => "phone",
            NameCategory::PersonName => "person_name",
            NameCategory::FirstName => "first_name",
            NameCategory::LastName => "last_name",
            NameCategory::StreetAddress => "street_address",
            NameCategory::City => "city",
            NameCategory::Country => "country",
            NameCategory::Company => "company",
            NameCategory::JobTitle => "job_title",
            NameCategory::Description => "description",
            NameCategory::Url => "url",
        };
        write!(f, "{}", s)
    }
}
