//! Sort key parsing and type-aware value comparison.
//!
//! # Invariants
//! - Ascending sort is stable with respect to collection order.
//! - Descending sort is the exact reverse of ascending for the same key.
//! - The comparator is picked from the runtime types of the compared values.

use super::QueryError;
use crate::model::record::{Record, CATEGORY_FIELD};
use icu_collator::{Collator, CollatorOptions};
use serde_json::Value;
use std::cmp::Ordering;

const DESC_SUFFIX: &str = ",desc";

/// Field family a `sort` parameter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// `name` or `title`: the model label field.
    Label,
    /// `category`: the `Category` field.
    Category,
}

/// Parsed `sort` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

impl SortSpec {
    /// Parses `name`, `title` or `category`, each optionally suffixed with
    /// `,desc`. Matching is case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let lowered = raw.to_lowercase();
        let (key, descending) = match lowered.strip_suffix(DESC_SUFFIX) {
            Some(key) => (key, true),
            None => (lowered.as_str(), false),
        };

        let field = match key {
            "name" | "title" => SortField::Label,
            "category" => SortField::Category,
            _ => return Err(QueryError::UnknownSortKey(raw.to_string())),
        };

        Ok(Self { field, descending })
    }

    /// Resolves the record field this spec sorts on.
    pub fn target<'a>(&self, label_field: &'a str) -> &'a str {
        match self.field {
            SortField::Label => label_field,
            SortField::Category => CATEGORY_FIELD,
        }
    }
}

/// Sorts `records` by `field` in place.
pub fn sort_records(records: &mut [Record], field: &str, descending: bool) {
    records.sort_by(|a, b| compare_values(a.get(field), b.get(field)));
    if descending {
        records.reverse();
    }
}

/// Orders two optional field values.
///
/// Strings use [`locale_compare`], numbers numeric order, booleans
/// `false < true`. Values of different kinds order by kind rank:
/// missing/null, booleans, numbers, strings, then nested values.
pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::String(a)), Some(Value::String(b))) => locale_compare(a, b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => compare_numbers(a, b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        _ => kind_rank(left).cmp(&kind_rank(right)),
    }
}

thread_local! {
    static COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Locale-aware string ordering with the root (language-neutral) collation.
///
/// Accents and case only break ties between otherwise equal letters, so
/// `apple < Éclair < Zeta` and `a < A`. Strings the collator deems equal fall
/// back to code point order to keep the ordering total.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => fold_compare(a, b),
        })
        .then_with(|| a.cmp(b))
}

// Used only if the bundled collation data fails to load.
fn fold_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| {
            let case_a = a.chars().map(char::is_uppercase);
            let case_b = b.chars().map(char::is_uppercase);
            case_a.cmp(case_b)
        })
}

fn compare_numbers(a: &serde_json::Number, b: &serde_json::Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = a.as_f64().unwrap_or(f64::NAN);
    let y = b.as_f64().unwrap_or(f64::NAN);
    x.total_cmp(&y)
}

fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 4,
    }
}
