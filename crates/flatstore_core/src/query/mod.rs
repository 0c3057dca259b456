//! Ad-hoc query pipeline over a loaded collection.
//!
//! # Responsibility
//! - Validate query parameters and turn them into sort/filter stages.
//! - Run stages in a fixed order: multi-value check, sort, label filter,
//!   category filter, empty-result check.
//!
//! # Invariants
//! - Stages are list-in/list-out; the source collection is never mutated.
//! - Each filter keeps the relative order produced by the previous stage.
//! - `Title` is checked for single-valuedness but does not filter.

mod params;
mod sort;
mod wildcard;

use crate::model::record::{Record, CATEGORY_FIELD};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use params::{
    QueryParams, CATEGORY_PARAM, NAME_PARAM, SINGLE_VALUED_PARAMS, SORT_PARAM, TITLE_PARAM,
};
pub use sort::{compare_values, locale_compare, sort_records, SortField, SortSpec};
pub use wildcard::Wildcard;

/// Message returned when a query leaves no records.
pub const NO_RESULTS_MESSAGE: &str = "No search results found.";

pub type QueryResult<T> = Result<T, QueryError>;

/// Malformed query or empty result, in place of a record list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A single-valued parameter occurred more than once.
    MultiValued(String),
    /// `sort` names none of `name`, `title`, `category`.
    UnknownSortKey(String),
    /// The pipeline produced no records.
    NoResults,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultiValued(param) => write!(
                f,
                "Parameter '{param}' can't be an array. For example: ...?{}",
                multi_value_example(param)
            ),
            Self::UnknownSortKey(value) => write!(
                f,
                "Error: the parameter 'sort' must include a name, a title or a category (got `{value}`)."
            ),
            Self::NoResults => f.write_str(NO_RESULTS_MESSAGE),
        }
    }
}

impl Error for QueryError {}

/// Runs the query pipeline over `records`.
///
/// `label_field` is the field the `name`/`title` sort and the `Name` filter
/// target, as declared by the model.
pub fn run_query(
    records: Vec<Record>,
    params: &QueryParams,
    label_field: &str,
) -> QueryResult<Vec<Record>> {
    if let Some(param) = SINGLE_VALUED_PARAMS
        .iter()
        .find(|param| params.is_multi_valued(param))
    {
        return Err(QueryError::MultiValued((*param).to_string()));
    }

    let mut records = records;

    if let Some(raw) = params.active(SORT_PARAM) {
        let spec = SortSpec::parse(raw)?;
        sort_records(&mut records, spec.target(label_field), spec.descending);
    }

    if let Some(pattern) = params.active(NAME_PARAM) {
        records = filter_by_pattern(records, label_field, pattern);
    }

    if let Some(pattern) = params.active(CATEGORY_PARAM) {
        records = filter_by_pattern(records, CATEGORY_FIELD, pattern);
    }

    debug!(
        "event=query_run module=query status=ok results={}",
        records.len()
    );
    non_empty(records)
}

/// Maps an empty list to [`QueryError::NoResults`].
pub fn non_empty(records: Vec<Record>) -> QueryResult<Vec<Record>> {
    if records.is_empty() {
        Err(QueryError::NoResults)
    } else {
        Ok(records)
    }
}

/// Keeps records whose `field` matches the wildcard `pattern`.
pub fn filter_by_pattern(records: Vec<Record>, field: &str, pattern: &str) -> Vec<Record> {
    let Some(wildcard) = Wildcard::new(pattern) else {
        return Vec::new();
    };
    records
        .into_iter()
        .filter(|record| wildcard.matches_value(record.get(field)))
        .collect()
}

fn multi_value_example(param: &str) -> &'static str {
    match param {
        SORT_PARAM => "sort=Name&sort=Category",
        NAME_PARAM => "Name=*a&Name=b",
        CATEGORY_PARAM => "Category=ea&Category=*z*",
        _ => "Title=e&Title=*zqw*",
    }
}

#[cfg(test)]
mod tests {
    use super::{run_query, QueryError, QueryParams, NO_RESULTS_MESSAGE};
    use crate::model::record::Record;

    fn sample() -> Vec<Record> {
        vec![
            Record::new()
                .with("Id", 1)
                .with("Name", "Zeta")
                .with("Category", "x"),
            Record::new()
                .with("Id", 2)
                .with("Name", "Alpha")
                .with("Category", "y"),
            Record::new()
                .with("Id", 3)
                .with("Name", "alpine")
                .with("Category", "x"),
        ]
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().filter_map(Record::id).collect()
    }

    #[test]
    fn no_params_returns_everything_in_file_order() {
        let result = run_query(sample(), &QueryParams::new(), "Name").unwrap();
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn multi_valued_params_are_checked_in_fixed_order() {
        let params = QueryParams::new()
            .with("Title", "a")
            .with("Title", "b")
            .with("Category", "x")
            .with("Category", "y");
        let err = run_query(sample(), &params, "Name").unwrap_err();
        assert_eq!(err, QueryError::MultiValued("Category".to_string()));
        assert!(err.to_string().starts_with("Parameter 'Category' can't be an array"));
    }

    #[test]
    fn multi_valued_check_runs_before_sort_validation() {
        let params = QueryParams::new()
            .with("sort", "bogus")
            .with("Name", "a")
            .with("Name", "b");
        let err = run_query(sample(), &params, "Name").unwrap_err();
        assert_eq!(err, QueryError::MultiValued("Name".to_string()));
    }

    #[test]
    fn unknown_sort_key_is_reported() {
        let params = QueryParams::new().with("sort", "price");
        let err = run_query(sample(), &params, "Name").unwrap_err();
        assert_eq!(err, QueryError::UnknownSortKey("price".to_string()));
        assert!(err.to_string().contains("name, a title or a category"));
    }

    #[test]
    fn filters_keep_sorted_order() {
        let params = QueryParams::new()
            .with("sort", "name,desc")
            .with("Name", "al*");
        let result = run_query(sample(), &params, "Name").unwrap();
        assert_eq!(ids(&result), vec![3, 2]);
    }

    #[test]
    fn name_and_category_filters_compose() {
        let params = QueryParams::new()
            .with("Name", "AL*")
            .with("Category", "x");
        let result = run_query(sample(), &params, "Name").unwrap();
        assert_eq!(ids(&result), vec![3]);
    }

    #[test]
    fn title_param_does_not_filter() {
        let params = QueryParams::new().with("Title", "nothing-matches-this");
        let result = run_query(sample(), &params, "Name").unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn empty_param_values_skip_their_stage() {
        let params = QueryParams::new().with("sort", "").with("Name", "");
        let result = run_query(sample(), &params, "Name").unwrap();
        assert_eq!(ids(&result), vec![1, 2, 3]);
    }

    #[test]
    fn empty_result_yields_no_results_message() {
        let params = QueryParams::new().with("Name", "q*");
        let err = run_query(sample(), &params, "Name").unwrap_err();
        assert_eq!(err, QueryError::NoResults);
        assert_eq!(err.to_string(), NO_RESULTS_MESSAGE);
    }

    #[test]
    fn label_field_redirects_name_filter() {
        let records = vec![
            Record::new().with("Id", 1).with("Title", "Heat").with("Name", "zzz"),
            Record::new().with("Id", 2).with("Title", "Alien").with("Name", "heat"),
        ];
        let params = QueryParams::new().with("Name", "heat");
        let result = run_query(records, &params, "Title").unwrap();
        assert_eq!(ids(&result), vec![1]);
    }
}
