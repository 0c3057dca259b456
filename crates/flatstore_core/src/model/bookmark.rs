//! Built-in bookmark model.
//!
//! Bookmarks are keyed by `Name`, so two bookmarks cannot share a name.

use super::record::{CATEGORY_FIELD, NAME_FIELD};
use super::schema::{FieldKind, FieldSpec, SchemaModel};

/// Type name of the built-in bookmark model.
pub const BOOKMARK_TYPE: &str = "Bookmark";

/// Returns the `Bookmark` model stored in `Bookmarks.json`.
pub fn bookmark_model() -> SchemaModel {
    SchemaModel::new(BOOKMARK_TYPE)
        .field(FieldSpec::required(NAME_FIELD, FieldKind::Text))
        .field(FieldSpec::required("Url", FieldKind::Url))
        .field(FieldSpec::required(CATEGORY_FIELD, FieldKind::Text))
        .key(NAME_FIELD)
}

#[cfg(test)]
mod tests {
    use super::bookmark_model;
    use crate::model::record::Record;
    use crate::model::Model;

    #[test]
    fn bookmark_model_declares_name_key() {
        let model = bookmark_model();
        assert_eq!(model.collection_name(), "Bookmarks");
        assert_eq!(model.key_field(), Some("Name"));
        assert_eq!(model.label_field(), "Name");
    }

    #[test]
    fn bookmark_requires_all_fields() {
        let model = bookmark_model();
        let valid = Record::new()
            .with("Name", "Docs")
            .with("Url", "https://docs.rs")
            .with("Category", "rust");
        assert!(model.validate(&valid).is_ok());

        let mut missing_category = valid.clone();
        missing_category.remove("Category");
        assert!(model.validate(&missing_category).is_err());
    }
}
