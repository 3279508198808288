mod common;

use tarif_desk::core::models::Language;
use tarif_desk::core::reference::{ReferenceData, TableCode};
use tarif_desk::infra::data::load_reference_data;

async fn fixture_data() -> ReferenceData {
    let dir = common::setup_data_dir();
    let loaded = load_reference_data(dir.path()).await;
    assert!(loaded.problem.is_none());
    loaded.data
}

#[tokio::test]
async fn test_describe_lkn_localized_with_fallbacks() {
    let data = fixture_data().await;
    assert_eq!(
        data.describe_lkn("AA.00.0010", Language::Fr),
        "Consultation, 5 premières min."
    );
    assert_eq!(
        data.describe_lkn("aa.00.0010", Language::It),
        "Consultazione, primi 5 min."
    );
    // No French text: German is used.
    assert_eq!(
        data.describe_lkn("AA.00.0020", Language::Fr),
        "Konsultation, jede weitere Min."
    );
    // Unknown: the code itself.
    assert_eq!(data.describe_lkn("ZZ.99.9999", Language::De), "ZZ.99.9999");
}

#[tokio::test]
async fn test_tardoc_lookup_reads_german_numbers() {
    let data = fixture_data().await;
    let details = data.tardoc_lookup("AA.00.0010").unwrap();
    assert!((details.al - 9.57).abs() < 1e-9);
    assert!((details.ipl - 8.19).abs() < 1e-9);
    assert_eq!(details.name, "Konsultation, erste 5 Min.");
    assert_eq!(details.rules, "Nur einmal pro Sitzung.");

    let plain = data.tardoc_lookup("AA.00.0020").unwrap();
    assert!((plain.al - 1.91).abs() < 1e-9);
    assert!((plain.ipl - 1.64).abs() < 1e-9);
    assert_eq!(plain.rules, "");

    assert!(data.tardoc_lookup("XX.00.0000").is_none());
}

#[tokio::test]
async fn test_chapter_and_group_lookups() {
    let data = fixture_data().await;
    let chapter = data.chapter("aa").unwrap();
    assert_eq!(chapter.title, Some("Grundleistungen"));
    assert_eq!(chapter.positions.len(), 2);
    assert!(data.chapter("ZZ").is_none());

    let group = data.group("LG-01").unwrap();
    assert_eq!(group.text, Some("Konsultationen"));
    assert_eq!(group.positions.len(), 2);
    assert!(data.group("LG-99").is_none());
}

#[tokio::test]
async fn test_dignity_accepts_alias_field_names() {
    let data = fixture_data().await;
    let dignity = data.dignity("fmh05").unwrap();
    assert_eq!(dignity.text.as_deref(), Some("Allgemeine Innere Medizin"));
}

#[tokio::test]
async fn test_interpretation_lookup() {
    let data = fixture_data().await;
    let interpretation = data.interpretation("AA.00.0010").unwrap();
    assert_eq!(interpretation.text(Language::Fr), Some("Le début compte."));
    assert_eq!(
        interpretation.text(Language::It),
        Some("Beginn der Konsultation zählt.")
    );
    assert!(data.interpretation("AA.00.0020").is_none());
}

#[tokio::test]
async fn test_table_content_unique_sorted_case_insensitive() {
    let data = fixture_data().await;
    let content = data.table_content("cap03, CAP04", "ICD");
    assert_eq!(
        content,
        vec![
            TableCode {
                code: "J18.9".into(),
                text: "Pneumonie".into()
            },
            TableCode {
                code: "K35.2".into(),
                text: "Akute Appendizitis mit Peritonitis".into()
            },
            TableCode {
                code: "K35.8".into(),
                text: "Akute Appendizitis".into()
            },
        ]
    );
    let services = data.table_content("CAP03", "service_catalog");
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].code, "C03.GC.0010");
    assert!(data.table_content("", "icd").is_empty());
}

#[tokio::test]
async fn test_icd_lookup() {
    let data = fixture_data().await;
    assert_eq!(data.icd("k35.2", None), "Akute Appendizitis mit Peritonitis");
    assert_eq!(data.icd("J18.9", Some("CAP04")), "Pneumonie");
    assert_eq!(data.icd("A00.0", None), "A00.0");
    assert!(data.has_icd("K35.8"));
    assert!(!data.has_icd("C03.GC.0010"));
}

#[tokio::test]
async fn test_pauschalen_for_lkn() {
    let data = fixture_data().await;
    let hits = data.pauschalen_for_lkn("c03.gc.0010");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text.as_deref(), Some("Appendektomie, laparoskopisch"));
    assert!(data.pauschalen_for_lkn("AA.00.0010").is_empty());
}

#[test]
fn test_missing_critical_names() {
    let data = ReferenceData::default();
    assert_eq!(
        data.missing_critical(),
        vec![
            "Leistungskatalog",
            "TARDOC-Daten",
            "Pauschalen",
            "Pauschalen-Bedingungen",
            "Referenz-Tabellen",
        ]
    );
}
