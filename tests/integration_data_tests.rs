//! Integration tests for loading the reference datasets and the example set
//! from disk.

mod common;

use std::fs;
use tarif_desk::core::models::Language;
use tarif_desk::error::DataError;
use tarif_desk::infra::data::{
    CATALOG_FILE, PAUSCHALEN_FILE, TARDOC_FILE, load_examples, load_reference_data,
};
use tempfile::tempdir;

#[tokio::test]
async fn test_loads_complete_data_set() {
    let dir = common::setup_data_dir();
    let loaded = load_reference_data(dir.path()).await;
    assert!(loaded.problem.is_none());
    assert_eq!(loaded.data.catalog.len(), 3);
    assert_eq!(loaded.data.tardoc.len(), 2);
    assert_eq!(loaded.data.interpretations.len(), 1);
    assert_eq!(loaded.data.pauschale_lp.len(), 1);
    assert_eq!(loaded.data.pauschalen.len(), 1);
    assert_eq!(loaded.data.pauschale_conditions.len(), 1);
    assert_eq!(loaded.data.tables.len(), 5);
    assert_eq!(loaded.data.dignities.len(), 1);
}

#[tokio::test]
async fn test_empty_directory_reports_all_critical_datasets() {
    let dir = tempdir().unwrap();
    let loaded = load_reference_data(dir.path()).await;
    match loaded.problem {
        Some(DataError::MissingData { names }) => assert_eq!(
            names,
            vec![
                "Leistungskatalog",
                "TARDOC-Daten",
                "Pauschalen",
                "Pauschalen-Bedingungen",
                "Referenz-Tabellen",
            ]
        ),
        other => panic!("unexpected problem: {:?}", other),
    }
    assert!(loaded.data.dignities.is_empty());
}

#[tokio::test]
async fn test_one_broken_file_does_not_block_the_others() {
    let dir = common::setup_data_dir();
    fs::write(dir.path().join(TARDOC_FILE), "{ not json").unwrap();
    fs::remove_file(dir.path().join(PAUSCHALEN_FILE)).unwrap();

    let loaded = load_reference_data(dir.path()).await;
    assert!(loaded.data.tardoc.is_empty());
    assert!(loaded.data.pauschalen.is_empty());
    assert_eq!(loaded.data.catalog.len(), 3);
    assert_eq!(loaded.data.tables.len(), 5);
    match loaded.problem {
        Some(DataError::MissingData { names }) => {
            assert_eq!(names, vec!["TARDOC-Daten", "Pauschalen"])
        }
        other => panic!("unexpected problem: {:?}", other),
    }
}

#[tokio::test]
async fn test_optional_dataset_missing_is_not_a_problem() {
    let dir = common::setup_data_dir();
    fs::remove_file(dir.path().join("DIGNITAETEN.json")).unwrap();
    let loaded = load_reference_data(dir.path()).await;
    assert!(loaded.problem.is_none());
    assert!(loaded.data.dignities.is_empty());
}

#[tokio::test]
async fn test_catalog_with_wrong_shape_is_empty() {
    let dir = common::setup_data_dir();
    fs::write(dir.path().join(CATALOG_FILE), r#"{"LKN": "AA.00.0010"}"#).unwrap();
    let loaded = load_reference_data(dir.path()).await;
    assert!(loaded.data.catalog.is_empty());
    assert!(matches!(
        loaded.problem,
        Some(DataError::MissingData { ref names }) if names == &vec!["Leistungskatalog"]
    ));
}

#[tokio::test]
async fn test_malformed_record_keeps_the_rest_of_the_dataset() {
    let dir = common::setup_data_dir();
    fs::write(
        dir.path().join(TARDOC_FILE),
        r#"[
            {"LKN": "AA.00.0010", "Bezeichnung": "Konsultation", "AL_(normiert)": "9,57",
             "IPL_(normiert)": 8.19, "Leistungsgruppen": null, "Dignitaeten": ["FMH05"]},
            {"LKN": "AA.00.0020", "Bezeichnung": "Zuschlag", "Dignitaeten": null,
             "Leistungsgruppen": [{"Gruppe": null, "Text": "Ohne Code"}, "kaputt"]},
            "kein Objekt"
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(CATALOG_FILE),
        r#"[{"LKN": 123, "Beschreibung": "Numerischer Code"}, {"LKN": "AA.00.0010", "Typ": null}]"#,
    )
    .unwrap();

    let loaded = load_reference_data(dir.path()).await;
    assert!(loaded.problem.is_none());
    assert_eq!(loaded.data.tardoc.len(), 2);
    assert_eq!(loaded.data.catalog.len(), 2);

    let details = loaded.data.tardoc_lookup("AA.00.0010").unwrap();
    assert_eq!(details.al, 9.57);
    assert_eq!(details.ipl, 8.19);

    let second = loaded.data.tariff_position("aa.00.0020").unwrap();
    assert!(second.dignities.is_empty());
    assert_eq!(second.groups.len(), 1);
    assert_eq!(second.groups[0].code, "");
    assert_eq!(
        loaded.data.describe_lkn("123", Language::De),
        "Numerischer Code"
    );
}

#[tokio::test]
async fn test_load_examples() {
    let dir = common::setup_data_dir();
    let examples = load_examples(&dir.path().join("baseline_results.json"))
        .await
        .unwrap();
    assert_eq!(examples.len(), 4);

    let missing = load_examples(&dir.path().join("nope.json")).await;
    assert!(matches!(missing, Err(DataError::Read { .. })));
}
