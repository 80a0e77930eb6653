//! End-to-end tests of mapping, key selection, reconciliation, filtering
//! and aggregation through the public API.

use std::path::Path;

use sheet_recon::config::ReconConfig;
use sheet_recon::matching::normalize_column_name;
use sheet_recon::query::aggregate::aggregate;
use sheet_recon::reconcile::keys::{select_keys, SelectedKeySet};
use sheet_recon::reconcile::CompareError;
use sheet_recon::{
    apply_filters, compare, compare_files, reconcile, ColumnMapping, CompareRequest, Dataset,
    FilterOperator, FilterSpec, KeySource, MappingEngine, ReconcileStrategy, Side, Value,
};

fn id_value(rows: &[(i64, i64)]) -> Dataset {
    Dataset::from_rows(
        vec!["id", "v"],
        rows.iter()
            .map(|&(id, v)| vec![Value::from(id), Value::from(v)])
            .collect(),
    )
    .unwrap()
}

fn id_key() -> SelectedKeySet {
    SelectedKeySet::from_pairs([("id", "id")])
}

#[test]
fn test_product_labels_are_mapped() {
    assert_eq!(normalize_column_name("Codigo Produto"), "codigo_produto");
    assert_eq!(normalize_column_name("cod_produto"), "cod_produto");
    assert_eq!(normalize_column_name("Nome"), "nome");
    assert_eq!(normalize_column_name("nome_prod"), "nome_prod");

    let a = Dataset::from_rows(
        vec!["Codigo Produto", "Nome"],
        vec![
            vec![Value::from("P001"), Value::from("Caneta")],
            vec![Value::from("P002"), Value::from("Lapis")],
        ],
    )
    .unwrap();
    let b = Dataset::from_rows(
        vec!["cod_produto", "nome_prod"],
        vec![
            vec![Value::from("P001"), Value::from("Caneta")],
            vec![Value::from("P003"), Value::from("Borracha")],
        ],
    )
    .unwrap();

    let result = MappingEngine::new().analyze(&a, &b);
    assert_eq!(result.mapping.target("Codigo Produto"), Some("cod_produto"));
    assert_eq!(result.mapping.target("Nome"), Some("nome_prod"));
    assert!(result.mapping.is_injective());
}

#[test]
fn test_reconcile_by_id_key() {
    let a = id_value(&[(1, 10), (2, 20)]);
    let b = id_value(&[(1, 10), (3, 30)]);
    let keys = id_key();

    let result = reconcile(&a, &b, KeySource::Keys(&keys));
    assert_eq!(result.strategy, ReconcileStrategy::CompositeKey);
    assert_eq!(result.unique_a, id_value(&[(2, 20)]));
    assert_eq!(result.unique_b, id_value(&[(3, 30)]));
    assert_eq!(result.key_fields.len(), 1);
    assert!(result.key_fields[0].starts_with("id ↔ id"));
}

#[test]
fn test_greater_than_filter() {
    let a = id_value(&[(1, 10), (2, 20)]);
    let filtered = apply_filters(
        &a,
        &[FilterSpec::new("v", FilterOperator::GreaterThan, Some("15"))],
    );
    assert_eq!(filtered, id_value(&[(2, 20)]));
}

#[test]
fn test_aggregate_skips_non_numeric() {
    let ds = Dataset::from_rows(
        vec!["v"],
        vec![
            vec![Value::from(10)],
            vec![Value::from(20)],
            vec![Value::from("x")],
        ],
    )
    .unwrap();

    let totals = aggregate(&ds, &["v"]);
    assert_eq!(totals.len(), 1);
    let v = &totals[0];
    assert!(v.error.is_none());
    assert!((v.sum - 30.0).abs() < 1e-9);
    assert_eq!(v.count, 2);
    assert!((v.mean - 15.0).abs() < 1e-9);
    assert!((v.min - 10.0).abs() < 1e-9);
    assert!((v.max - 20.0).abs() < 1e-9);
}

#[test]
fn test_identical_datasets_have_no_unique_rows() {
    let a = id_value(&[(1, 10), (2, 20), (3, 30)]);
    let keys = id_key();
    let result = reconcile(&a, &a.clone(), KeySource::Keys(&keys));
    assert!(result.unique_a.is_empty());
    assert!(result.unique_b.is_empty());
}

#[test]
fn test_disjoint_keys_return_every_row() {
    let a = id_value(&[(1, 10), (2, 20)]);
    let b = id_value(&[(3, 10), (4, 20), (5, 50)]);
    let keys = id_key();
    let result = reconcile(&a, &b, KeySource::Keys(&keys));
    assert_eq!(result.unique_a, a);
    assert_eq!(result.unique_b, b);
}

#[test]
fn test_duplicate_keys_collapse_to_presence() {
    let a = id_value(&[(1, 10), (1, 11), (2, 20)]);
    let b = id_value(&[(1, 99)]);
    let keys = id_key();
    let result = reconcile(&a, &b, KeySource::Keys(&keys));
    assert_eq!(result.unique_a, id_value(&[(2, 20)]));
    assert!(result.unique_b.is_empty());
}

#[test]
fn test_reconcile_is_symmetric() {
    let a = id_value(&[(1, 10), (2, 20), (4, 40)]);
    let b = id_value(&[(1, 10), (3, 30)]);
    let keys = id_key();

    let forward = reconcile(&a, &b, KeySource::Keys(&keys));
    let backward = reconcile(&b, &a, KeySource::Keys(&keys));
    assert_eq!(forward.unique_a, backward.unique_b);
    assert_eq!(forward.unique_b, backward.unique_a);
}

#[test]
fn test_positional_fallback_without_mapping() {
    let a = Dataset::from_rows(
        vec!["x"],
        vec![vec![Value::from(1)], vec![Value::from(2)], vec![Value::from(3)]],
    )
    .unwrap();
    let b = Dataset::from_rows(vec!["y"], vec![vec![Value::from(9)]]).unwrap();

    let result = reconcile(&a, &b, KeySource::Mapping(&ColumnMapping::default()));
    assert_eq!(result.strategy, ReconcileStrategy::Positional);
    assert_eq!(result.unique_a.row_count(), 2);
    assert!(result.unique_b.is_empty());
}

#[test]
fn test_empty_filter_list_keeps_dataset() {
    let a = id_value(&[(1, 10), (2, 20)]);
    assert_eq!(apply_filters(&a, &[]), a);
}

#[test]
fn test_is_empty_partitions_rows() {
    let ds = Dataset::from_rows(
        vec!["name"],
        vec![
            vec![Value::from("Ana")],
            vec![Value::Null],
            vec![Value::from("")],
            vec![Value::from("Bia")],
            vec![Value::from("  ")],
        ],
    )
    .unwrap();

    let empty = apply_filters(&ds, &[FilterSpec::new("name", FilterOperator::IsEmpty, None)]);
    let filled = apply_filters(
        &ds,
        &[FilterSpec::new("name", FilterOperator::IsNotEmpty, None)],
    );
    assert_eq!(empty.row_count() + filled.row_count(), ds.row_count());
    assert_eq!(empty.row_count(), 2);
    assert!(empty.column("name").unwrap().values.iter().all(Value::is_blank));
    assert!(!filled.column("name").unwrap().values.iter().any(Value::is_blank));
}

#[test]
fn test_key_selection_feeds_reconciliation() {
    let a = Dataset::from_rows(
        vec!["codigo", "loja", "valor"],
        (1..=20)
            .map(|i| vec![Value::from(i), Value::from(i % 3), Value::from(f64::from(i) * 1.5)])
            .collect(),
    )
    .unwrap();
    let b = a.take_rows(&(0..18).collect::<Vec<_>>());
    let mapping =
        ColumnMapping::new([("codigo", "codigo"), ("loja", "loja"), ("valor", "valor")]).unwrap();
    let config = ReconConfig::default();

    let keys = select_keys(&mapping, &a, &b, &config.key_scoring, &config.key_selection);
    assert!(keys.len() >= config.key_selection.min_fields);
    assert_eq!(keys.fields[0].column_a, "codigo");
    for candidate in &keys.candidates {
        assert!((0.0..=100.0).contains(&candidate.combined));
    }

    let result = reconcile(&a, &b, KeySource::Keys(&keys));
    assert_eq!(result.unique_a.row_count(), 2);
    assert!(result.unique_b.is_empty());
}

#[test]
fn test_compare_with_filters_and_totals() {
    let a = id_value(&[(1, 10), (2, 20), (3, 30), (4, 40)]);
    let b = Dataset::from_rows(
        vec!["codigo", "valor"],
        vec![
            vec![Value::from(1), Value::from(10)],
            vec![Value::from(2), Value::from(20)],
            vec![Value::from(5), Value::from(50)],
        ],
    )
    .unwrap();

    let request = CompareRequest {
        mapping: Some(ColumnMapping::new([("id", "codigo"), ("v", "valor")]).unwrap()),
        filters_a: vec![FilterSpec::new("v", FilterOperator::LessThan, Some("35"))],
        total_columns: vec!["v".to_string()],
        ..CompareRequest::default()
    };

    let result = compare(&a, &b, &request, &ReconConfig::default()).unwrap();
    assert_eq!(result.dimensions.a.rows, 3);
    assert_eq!(result.dimensions.b.rows, 3);
    assert_eq!(result.filters_applied.report_a.original_rows, 4);
    assert_eq!(result.unique_rows.strategy, ReconcileStrategy::CompositeKey);
    assert_eq!(result.unique_rows.only_in_a.count, 1);
    assert_eq!(result.unique_rows.only_in_b.count, 1);

    let totals = result.totals.unwrap();
    assert_eq!(totals.columns, vec!["v"]);
    assert!((totals.a[0].sum - 60.0).abs() < 1e-9);
    assert_eq!(totals.b[0].column, "valor");
    assert!((totals.b[0].sum - 80.0).abs() < 1e-9);

    // Column sets differ, so no cell diff
    assert!(result.cell_differences.is_none());
}

#[test]
fn test_compare_rejects_unknown_mapped_column() {
    let a = id_value(&[(1, 10)]);
    let b = id_value(&[(1, 10)]);
    let request = CompareRequest {
        mapping: Some(ColumnMapping::new([("id", "missing")]).unwrap()),
        ..CompareRequest::default()
    };

    let err = compare(&a, &b, &request, &ReconConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        CompareError::UnknownColumn { side: Side::B, ref column } if column == "missing"
    ));
}

#[test]
fn test_compare_files_reports_cell_differences() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.csv");
    let path_b = dir.path().join("b.csv");
    std::fs::write(&path_a, "id,name,v\n1,Ana,10\n2,Bia,20\n3,Caio,30\n").unwrap();
    std::fs::write(&path_b, "id,name,v\n1,Ana,10\n2,Bia,25\n").unwrap();

    let result = compare_files(
        &path_a,
        &path_b,
        &CompareRequest::default(),
        &ReconConfig::default(),
    )
    .unwrap();

    let diff = result.cell_differences.unwrap();
    assert_eq!(diff.total_differences, 1);
    assert_eq!(diff.differences[0].row, 3);
    assert_eq!(diff.differences[0].column, "v");
    assert_eq!(diff.extra_rows_a, 1);
    assert_eq!(result.columns.common, vec!["id", "name", "v"]);
}

#[test]
fn test_compare_files_load_failure() {
    let err = compare_files(
        Path::new("/nonexistent/a.csv"),
        Path::new("/nonexistent/b.csv"),
        &CompareRequest::default(),
        &ReconConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CompareError::Load(_)));
}
