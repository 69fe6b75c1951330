use std::sync::LazyLock;

use regex::Regex;

use crate::classify::NameCategory;

/// Name patterns in priority order. Each pattern is a case-insensitive
/// substring test against the raw column identifier.
///
/// `name` precedes `first_name` and `last_name`, so those two columns are
/// filled with full person names.
pub const NAME_RULES: &[(&str, NameCategory)] = &[
    ("email", NameCategory::Email),
    ("phone", NameCategory::Phone),
    ("name", NameCategory::PersonName),
    ("first_name", NameCategory::FirstName),
    ("last_name", NameCategory::LastName),
    ("address", NameCategory::StreetAddress),
    ("city", NameCategory::City),
    ("country", NameCategory::Country),
    ("company", NameCategory::Company),
    ("title", NameCategory::JobTitle),
    ("description", NameCategory::Description),
    ("url", NameCategory::Url),
];

/// A pre-compiled name rule.
struct CompiledRule {
    pattern: Regex,
    category: NameCategory,
}

/// Pre-compiled name rules, built once on first access.
static COMPILED_NAME_RULES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    NAME_RULES
        .iter()
        .map(|(pattern, category)| CompiledRule {
            // Patterns are escaped literals, so compilation cannot fail.
            pattern: Regex::new(&format!("(?i){}", regex::escape(pattern))).unwrap(),
            category: *category,
        })
        .collect()
});

/// Classify a column by its name. `None` means no name rule applies and
/// the value is chosen by data type instead.
pub fn classify_name(column_name: &str) -> Option<NameCategory> {
    COMPILED_NAME_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(column_name))
        .map(|rule| rule.category)
}
