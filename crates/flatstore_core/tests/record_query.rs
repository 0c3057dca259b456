use flatstore_core::{
    FieldKind, FieldSpec, Model, QueryError, QueryParams, Record, RecordRepository, SchemaModel,
    NO_RESULTS_MESSAGE,
};
use std::fs;
use tempfile::TempDir;

fn seeded(
    dir: &TempDir,
    model: SchemaModel,
    body: serde_json::Value,
) -> RecordRepository<SchemaModel> {
    let path = dir.path().join(format!("{}.json", model.collection_name()));
    fs::write(&path, body.to_string()).unwrap();
    RecordRepository::at_path(model, path)
}

fn ids(records: &[Record]) -> Vec<u64> {
    records.iter().filter_map(Record::id).collect()
}

fn zeta_alpha(dir: &TempDir) -> RecordRepository<SchemaModel> {
    seeded(
        dir,
        SchemaModel::new("Item"),
        serde_json::json!([
            {"Id": 1, "Name": "Zeta", "Category": "x"},
            {"Id": 2, "Name": "Alpha", "Category": "y"}
        ]),
    )
}

#[test]
fn end_to_end_sort_and_filters() {
    let dir = tempfile::tempdir().unwrap();
    let repo = zeta_alpha(&dir);

    let sorted = repo
        .get_all(Some(&QueryParams::new().with("sort", "name")))
        .unwrap();
    assert_eq!(ids(&sorted), vec![2, 1]);

    let by_category = repo
        .get_all(Some(&QueryParams::new().with("Category", "x")))
        .unwrap();
    assert_eq!(ids(&by_category), vec![1]);

    let err = repo
        .get_all(Some(&QueryParams::new().with("Name", "q*")))
        .unwrap_err();
    assert_eq!(err, QueryError::NoResults);
    assert_eq!(err.to_string(), "No search results found.");
}

#[test]
fn queries_do_not_reorder_the_collection() {
    let dir = tempfile::tempdir().unwrap();
    let repo = zeta_alpha(&dir);

    repo.get_all(Some(&QueryParams::new().with("sort", "name")))
        .unwrap();
    assert_eq!(ids(repo.records()), vec![1, 2]);
    assert_eq!(ids(&repo.get_all(None).unwrap()), vec![1, 2]);
}

#[test]
fn empty_collection_reports_no_results_even_without_params() {
    let dir = tempfile::tempdir().unwrap();
    let repo = RecordRepository::at_path(SchemaModel::new("Item"), dir.path().join("Items.json"));

    let err = repo.get_all(None).unwrap_err();
    assert_eq!(err.to_string(), NO_RESULTS_MESSAGE);
    let err = repo.get_all(Some(&QueryParams::new())).unwrap_err();
    assert_eq!(err, QueryError::NoResults);
}

#[test]
fn descending_sort_reverses_ascending() {
    let dir = tempfile::tempdir().unwrap();
    let repo = seeded(
        &dir,
        SchemaModel::new("Item"),
        serde_json::json!([
            {"Id": 1, "Name": "b", "Category": "k"},
            {"Id": 2, "Name": "C", "Category": "k"},
            {"Id": 3, "Name": "a", "Category": "j"},
            {"Id": 4, "Name": "B", "Category": "j"}
        ]),
    );

    let ascending = repo
        .get_all(Some(&QueryParams::new().with("sort", "category")))
        .unwrap();
    assert_eq!(ids(&ascending), vec![3, 4, 1, 2]);

    let mut descending = repo
        .get_all(Some(&QueryParams::new().with("sort", "Category,DESC")))
        .unwrap();
    descending.reverse();
    assert_eq!(descending, ascending);

    let by_name = repo
        .get_all(Some(&QueryParams::new().with("sort", "title")))
        .unwrap();
    assert_eq!(ids(&by_name), vec![3, 1, 4, 2]);
}

#[test]
fn numeric_fields_sort_numerically() {
    let dir = tempfile::tempdir().unwrap();
    let repo = seeded(
        &dir,
        SchemaModel::new("Item"),
        serde_json::json!([
            {"Id": 1, "Category": 10},
            {"Id": 2, "Category": 9},
            {"Id": 3, "Category": 100}
        ]),
    );

    let sorted = repo
        .get_all(Some(&QueryParams::new().with("sort", "category")))
        .unwrap();
    assert_eq!(ids(&sorted), vec![2, 1, 3]);
}

#[test]
fn title_models_sort_and_filter_on_title() {
    let dir = tempfile::tempdir().unwrap();
    let model = SchemaModel::new("Movie").field(FieldSpec::required("Title", FieldKind::Text));
    let repo = seeded(
        &dir,
        model,
        serde_json::json!([
            {"Id": 1, "Title": "Heat", "Name": "a", "Category": "crime"},
            {"Id": 2, "Title": "Alien", "Name": "z", "Category": "scifi"},
            {"Id": 3, "Title": "Arrival", "Name": "m", "Category": "scifi"}
        ]),
    );

    let sorted = repo
        .get_all(Some(&QueryParams::new().with("sort", "name")))
        .unwrap();
    assert_eq!(ids(&sorted), vec![2, 3, 1]);

    let filtered = repo
        .get_all(Some(
            &QueryParams::new()
                .with("sort", "title,desc")
                .with("Name", "a*")
                .with("Category", "SCI*"),
        ))
        .unwrap();
    assert_eq!(ids(&filtered), vec![3, 2]);
}

#[test]
fn malformed_queries_return_descriptive_errors() {
    let dir = tempfile::tempdir().unwrap();
    let repo = zeta_alpha(&dir);

    let params = QueryParams::from_pairs([("sort", "name"), ("sort", "category")]);
    let err = repo.get_all(Some(&params)).unwrap_err();
    assert_eq!(err, QueryError::MultiValued("sort".to_string()));
    assert_eq!(
        err.to_string(),
        "Parameter 'sort' can't be an array. For example: ...?sort=Name&sort=Category"
    );

    let params = QueryParams::from_pairs([("Title", "a"), ("Title", "b")]);
    assert_eq!(
        repo.get_all(Some(&params)).unwrap_err(),
        QueryError::MultiValued("Title".to_string())
    );

    let params = QueryParams::new().with("sort", "price,desc");
    assert!(matches!(
        repo.get_all(Some(&params)).unwrap_err(),
        QueryError::UnknownSortKey(ref value) if value == "price,desc"
    ));
}

#[test]
fn filters_see_bound_extra_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = zeta_alpha(&dir);
    repo.set_extra_data_binder(|record| {
        let mut enriched = record.clone();
        if record.id() == Some(2) {
            enriched.set("Category", "joined");
        }
        enriched
    });

    let hits = repo
        .get_all(Some(&QueryParams::new().with("Category", "join*")))
        .unwrap();
    assert_eq!(ids(&hits), vec![2]);
}

#[test]
fn unrecognized_params_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let repo = zeta_alpha(&dir);

    let hits = repo
        .get_all(Some(&QueryParams::new().with("page", "2").with("name", "nothing")))
        .unwrap();
    assert_eq!(ids(&hits), vec![1, 2]);
}

#[test]
fn accented_names_sort_alongside_their_base_letters() {
    let dir = tempfile::tempdir().unwrap();
    let repo = seeded(
        &dir,
        SchemaModel::new("Item"),
        serde_json::json!([
            {"Id": 1, "Name": "Zeta"},
            {"Id": 2, "Name": "Éclair"},
            {"Id": 3, "Name": "apple"}
        ]),
    );

    let sorted = repo
        .get_all(Some(&QueryParams::new().with("sort", "name")))
        .unwrap();
    let names: Vec<_> = sorted.iter().filter_map(|r| r.get_str("Name")).collect();
    assert_eq!(names, vec!["apple", "Éclair", "Zeta"]);
}
