// Shared test helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

use tarif_desk::core::billing::TestExampleResponse;
use tarif_desk::core::models::{ExampleId, Language};
use tarif_desk::core::runner::{EventSink, ExampleTester, RunnerEvent};
use tarif_desk::error::{ApiError, ApiResult};

/// Scripted answer of the fake backend for one `(id, lang)`.
#[derive(Debug, Clone)]
pub enum Outcome {
    Pass,
    Fail(&'static str),
    Error,
}

/// Shared, ordered log of calls and events.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Fake backend. Passes everything unless scripted otherwise, records every
/// call and the highest number of concurrent calls.
pub struct FakeTester {
    outcomes: HashMap<(String, Language), Outcome>,
    calls: Mutex<Vec<(String, Language)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    log: Option<Log>,
}

impl FakeTester {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: Duration::from_millis(2),
            log: None,
        }
    }

    pub fn with_outcome(mut self, id: &str, lang: Language, outcome: Outcome) -> Self {
        self.outcomes.insert((id.to_string(), lang), outcome);
        self
    }

    pub fn with_log(mut self, log: Log) -> Self {
        self.log = Some(log);
        self
    }

    pub fn calls(&self) -> Vec<(String, Language)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExampleTester for FakeTester {
    async fn test_example(
        &self,
        id: &ExampleId,
        lang: Language,
    ) -> ApiResult<TestExampleResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push((id.to_string(), lang));
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("call {} {}", id, lang));
        }

        tokio::time::sleep(self.delay).await;

        let outcome = self
            .outcomes
            .get(&(id.to_string(), lang))
            .cloned()
            .unwrap_or(Outcome::Pass);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Outcome::Pass => Ok(TestExampleResponse {
                passed: true,
                diff: None,
            }),
            Outcome::Fail(diff) => Ok(TestExampleResponse {
                passed: false,
                diff: Some(diff.to_string()),
            }),
            Outcome::Error => Err(ApiError::Status {
                status: 503,
                body: "backend unavailable".to_string(),
            }),
        }
    }
}

/// Event sink appending `update <id> <lang>` / `row <id>` / `batch` lines.
pub fn logging_sink(log: Log) -> EventSink {
    Arc::new(move |event: &RunnerEvent| {
        let line = match event {
            RunnerEvent::CellPending { id } => format!("pending {}", id),
            RunnerEvent::CellUpdated { id, lang, .. } => format!("update {} {}", id, lang),
            RunnerEvent::RowFinished { id } => format!("row {}", id),
            RunnerEvent::BatchFinished { counters } => {
                format!("batch {}/{}", counters.passed, counters.total)
            }
        };
        log.lock().unwrap().push(line);
    })
}

pub fn ids(raw: &[&str]) -> Vec<ExampleId> {
    raw.iter().map(|id| ExampleId::from(*id)).collect()
}

const CATALOG: &str = r#"[
  {"LKN": "AA.00.0010", "Typ": "E", "Beschreibung": "Konsultation, erste 5 Min.", "Beschreibung_f": "Consultation, 5 premières min.", "Beschreibung_i": "Consultazione, primi 5 min.", "MedizinischeInterpretation": "Gilt für ärztliche Konsultationen."},
  {"LKN": "AA.00.0020", "Typ": "E", "Beschreibung": "Konsultation, jede weitere Min."},
  {"LKN": "C03.GC.0010", "Typ": "P", "Beschreibung": "Appendektomie"}
]"#;

const TARDOC: &str = r#"[
  {"LKN": "AA.00.0010", "Bezeichnung": "Konsultation, erste 5 Min.", "AL_(normiert)": "9,57", "IPL_(normiert)": "8,19", "Regeln_bezogen_auf_die_Tarifmechanik": "Nur einmal pro Sitzung.", "Kapitel": "AA", "Kapitel_Bezeichnung": "Grundleistungen", "Leistungsgruppen": [{"Gruppe": "LG-01", "Text": "Konsultationen"}], "Dignitaeten": ["FMH05"]},
  {"LKN": "AA.00.0020", "Bezeichnung": "Konsultation, jede weitere Min.", "AL_(normiert)": 1.91, "IPL_(normiert)": "1,64", "Kapitel": "AA", "Kapitel_Bezeichnung": "Grundleistungen", "Leistungsgruppen": [{"Gruppe": "LG-01", "Text": "Konsultationen"}]}
]"#;

const INTERPRETATIONS: &str = r#"[
  {"LKN": "AA.00.0010", "Interpretation": "Beginn der Konsultation zählt.", "Interpretation_f": "Le début compte."}
]"#;

const PAUSCHALE_LP: &str = r#"[
  {"Pauschale": "C03.05A", "Leistungsposition": "C03.GC.0010"}
]"#;

const PAUSCHALEN: &str = r#"[
  {"Pauschale": "C03.05A", "Pauschale_Text": "Appendektomie, laparoskopisch", "Taxpunkte": "4567.89"}
]"#;

const CONDITIONS: &str = r#"[
  {"Pauschale": "C03.05A", "Bedingungstyp": "LEISTUNGSPOSITIONEN IN LISTE", "Werte": "C03.GC.0010"}
]"#;

const TABLES: &str = r#"[
  {"Tabelle": "CAP03", "Tabelle_Typ": "icd", "Code": "K35.8", "Code_Text": "Akute Appendizitis"},
  {"Tabelle": "CAP03", "Tabelle_Typ": "icd", "Code": "K35.2", "Code_Text": "Akute Appendizitis mit Peritonitis"},
  {"Tabelle": "cap03", "Tabelle_Typ": "icd", "Code": "K35.8", "Code_Text": "Duplikat"},
  {"Tabelle": "CAP03", "Tabelle_Typ": "service_catalog", "Code": "C03.GC.0010", "Code_Text": "Appendektomie"},
  {"Tabelle": "CAP04", "Tabelle_Typ": "icd", "Code": "J18.9", "Code_Text": "Pneumonie"}
]"#;

const DIGNITIES: &str = r#"[
  {"DignitaetCode": "FMH05", "DignitaetText": "Allgemeine Innere Medizin"}
]"#;

pub const EXAMPLES: &str = r#"{
  "10": {"query": {"de": "Zehnte Anfrage", "fr": "Dixième requête", "it": "Decima richiesta"}},
  "2": {"query": {"de": "Konsultation 10 Minuten", "fr": "Consultation 10 minutes"}},
  "1": {"query": {"de": "Appendektomie laparoskopisch"}},
  "extra": {"query": {"fr": "Seulement en français"}}
}"#;

/// Writes a complete, small reference data set into `dir`.
pub fn write_reference_data(dir: &Path) {
    let files = [
        ("LKAAT_Leistungskatalog.json", CATALOG),
        ("TARDOC_Tarifpositionen.json", TARDOC),
        ("TARDOC_Interpretationen.json", INTERPRETATIONS),
        ("PAUSCHALEN_Leistungspositionen.json", PAUSCHALE_LP),
        ("PAUSCHALEN_Pauschalen.json", PAUSCHALEN),
        ("PAUSCHALEN_Bedingungen.json", CONDITIONS),
        ("PAUSCHALEN_Tabellen.json", TABLES),
        ("DIGNITAETEN.json", DIGNITIES),
        ("baseline_results.json", EXAMPLES),
    ];
    for (name, content) in files {
        fs::write(dir.join(name), content).expect("Failed to write fixture");
    }
}

/// Temporary data directory filled with [`write_reference_data`].
pub fn setup_data_dir() -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    write_reference_data(temp_dir.path());
    temp_dir
}

/// Writes a config pointing at `data_dir` and a private prefs file.
pub fn write_config(dir: &Path, data_dir: &Path) -> PathBuf {
    let path = dir.join("TarifDesk.toml");
    let content = format!(
        "language = \"de\"\nbase_url = \"http://127.0.0.1:9\"\ndata_dir = {:?}\ntimeout_secs = 2\nprefs_file = {:?}\n",
        data_dir.display().to_string(),
        dir.join("prefs.json").display().to_string()
    );
    fs::write(&path, content).expect("Failed to write config");
    path
}
