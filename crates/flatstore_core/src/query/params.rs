//! Query parameter multimap.

use std::collections::BTreeMap;

/// Sort parameter: `name`, `title` or `category`, optionally `,desc`.
pub const SORT_PARAM: &str = "sort";
/// Wildcard filter over the model label field.
pub const NAME_PARAM: &str = "Name";
/// Wildcard filter over `Category`.
pub const CATEGORY_PARAM: &str = "Category";
/// Accepted and checked for single-valuedness, but never filters.
pub const TITLE_PARAM: &str = "Title";

/// Parameters that must occur at most once, in validation order.
pub const SINGLE_VALUED_PARAMS: &[&str] = &[SORT_PARAM, NAME_PARAM, CATEGORY_PARAM, TITLE_PARAM];

/// Decoded query parameters. A key may carry several values.
///
/// Keys are case-sensitive: `Name` and `name` are different parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from already-decoded `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.push(key, value);
        }
        params
    }

    /// Builder-style [`QueryParams::push`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Appends one occurrence of `key`.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Returns the single value of `key`, or `None` when absent or repeated.
    pub fn single(&self, key: &str) -> Option<&str> {
        match self.values.get(key).map(Vec::as_slice) {
            Some([value]) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the single non-empty value of `key`.
    ///
    /// Empty values disable their pipeline stage.
    pub(crate) fn active(&self, key: &str) -> Option<&str> {
        self.single(key).filter(|value| !value.is_empty())
    }

    /// Returns every value of `key` in arrival order.
    pub fn all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns whether `key` occurred more than once.
    pub fn is_multi_valued(&self, key: &str) -> bool {
        self.all(key).len() > 1
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
