//! Integration tests of the sequential example test runner against a fake
//! backend.

mod common;

use common::{FakeTester, Outcome, ids, log_entries, logging_sink, new_log};
use std::sync::Arc;
use tarif_desk::core::models::{CellStatus, Counters, ExampleId, Language};
use tarif_desk::core::runner::{ResultBoard, RunnerPhase, TestRunner};

fn expanded(raw: &[&str]) -> Vec<(String, Language)> {
    raw.iter()
        .flat_map(|id| Language::ALL.iter().map(move |l| (id.to_string(), *l)))
        .collect()
}

#[tokio::test]
async fn test_single_row_runs_three_languages_in_order() {
    let log = new_log();
    let tester = Arc::new(FakeTester::new().with_log(log.clone()));
    let runner = TestRunner::with_events(tester.clone(), logging_sink(log.clone()));

    runner.enqueue_row(ExampleId::from("5"));

    // Cells are pending and the trigger disabled before any call is made.
    let snapshot = runner.snapshot();
    let id = ExampleId::from("5");
    for lang in Language::ALL {
        assert_eq!(snapshot.board.cell(&id, lang), Some(&CellStatus::Pending));
    }
    assert!(snapshot.board.is_row_disabled(&id));
    assert_eq!(runner.phase(), RunnerPhase::Draining);
    assert!(tester.calls().is_empty());

    runner.wait_idle().await;

    assert_eq!(tester.calls(), expanded(&["5"]));
    assert_eq!(
        log_entries(&log),
        vec![
            "pending 5",
            "call 5 de",
            "update 5 de",
            "call 5 fr",
            "update 5 fr",
            "call 5 it",
            "update 5 it",
            "row 5",
        ]
    );

    let snapshot = runner.snapshot();
    for lang in Language::ALL {
        assert_eq!(snapshot.board.cell(&id, lang), Some(&CellStatus::Pass));
    }
    assert!(!snapshot.board.is_row_disabled(&id));
    assert_eq!(runner.phase(), RunnerPhase::Idle);
    // A single row run does not touch the batch counters.
    assert_eq!(runner.counters(), Counters::default());
}

#[tokio::test]
async fn test_batch_counts_passes_and_shows_diff() {
    let tester = Arc::new(FakeTester::new().with_outcome(
        "2",
        Language::It,
        Outcome::Fail("mismatch"),
    ));
    let runner = TestRunner::new(tester.clone());

    runner.enqueue_all(&ids(&["1", "2"]));
    assert_eq!(runner.counters(), Counters { total: 6, passed: 0 });
    assert!(runner.snapshot().board.is_test_all_disabled());

    runner.wait_idle().await;

    assert_eq!(runner.counters(), Counters { total: 6, passed: 5 });
    assert_eq!(runner.counters().summary(Language::De), "Gesamt: 5 / 6 bestanden.");

    let snapshot = runner.snapshot();
    let cell = snapshot
        .board
        .cell(&ExampleId::from("2"), Language::It)
        .cloned()
        .unwrap();
    assert!(matches!(cell, CellStatus::Fail { .. }));
    assert!(cell.label(Language::De).contains("mismatch"));
    assert_eq!(
        ResultBoard::cell_id(&ExampleId::from("2"), Language::It),
        "res-2-it"
    );
    assert!(!snapshot.board.is_test_all_disabled());
    assert!(!snapshot.board.is_row_disabled(&ExampleId::from("1")));
}

#[tokio::test]
async fn test_network_error_does_not_stop_the_run() {
    let tester = Arc::new(FakeTester::new().with_outcome("3", Language::Fr, Outcome::Error));
    let runner = TestRunner::new(tester.clone());

    runner.enqueue_row(ExampleId::from("3"));
    runner.enqueue_row(ExampleId::from("4"));
    runner.wait_idle().await;

    assert_eq!(tester.calls(), expanded(&["3", "4"]));
    let snapshot = runner.snapshot();
    let cell = snapshot
        .board
        .cell(&ExampleId::from("3"), Language::Fr)
        .cloned()
        .unwrap();
    assert!(matches!(cell, CellStatus::Error { .. }));
    assert_eq!(cell.label(Language::De), "error");
    assert_eq!(
        snapshot.board.cell(&ExampleId::from("3"), Language::It),
        Some(&CellStatus::Pass)
    );
}

#[tokio::test]
async fn test_completion_order_matches_enqueue_order() {
    let tester = Arc::new(FakeTester::new());
    let runner = TestRunner::new(tester.clone());

    runner.enqueue_row(ExampleId::from("7"));
    runner.enqueue_row(ExampleId::from("1"));
    // Enqueue while the first row is still in flight.
    tokio::time::sleep(std::time::Duration::from_millis(3)).await;
    runner.enqueue_row(ExampleId::from("4"));
    runner.wait_idle().await;

    assert_eq!(tester.calls(), expanded(&["7", "1", "4"]));
}

#[tokio::test]
async fn test_never_more_than_one_call_in_flight() {
    let tester = Arc::new(FakeTester::new());
    let runner = TestRunner::new(tester.clone());

    let handles: Vec<_> = ["1", "2", "3", "4"]
        .into_iter()
        .map(|id| {
            let runner = runner.clone();
            tokio::spawn(async move { runner.enqueue_row(ExampleId::from(id)) })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }
    runner.enqueue_all(&ids(&["5", "6"]));
    runner.wait_idle().await;

    assert_eq!(tester.calls().len(), 18);
    assert_eq!(tester.max_in_flight(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_drain_on_multi_thread_runtime() {
    let tester = Arc::new(FakeTester::new());
    let runner = TestRunner::new(tester.clone());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let runner = runner.clone();
            tokio::spawn(async move { runner.enqueue_row(ExampleId::new(i.to_string())) })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }
    runner.wait_idle().await;

    assert_eq!(tester.calls().len(), 24);
    assert_eq!(tester.max_in_flight(), 1);
    // Every row's languages stay together and in order.
    for chunk in tester.calls().chunks(3) {
        assert_eq!(chunk[0].0, chunk[1].0);
        assert_eq!(chunk[1].0, chunk[2].0);
        let langs: Vec<Language> = chunk.iter().map(|c| c.1).collect();
        assert_eq!(langs, Language::ALL.to_vec());
    }
}

#[tokio::test]
async fn test_batch_passed_equals_pass_cells() {
    let tester = Arc::new(
        FakeTester::new()
            .with_outcome("e1", Language::De, Outcome::Fail("x"))
            .with_outcome("e3", Language::Fr, Outcome::Error),
    );
    let log = new_log();
    let runner = TestRunner::with_events(tester, logging_sink(log.clone()));

    let batch = ids(&["e1", "e2", "e3"]);
    runner.enqueue_all(&batch);
    runner.wait_idle().await;

    let snapshot = runner.snapshot();
    assert_eq!(snapshot.counters.total, 9);
    assert_eq!(snapshot.counters.passed, snapshot.board.count_passed(&batch));
    assert_eq!(snapshot.counters.passed, 7);
    assert_eq!(log_entries(&log).last().map(String::as_str), Some("batch 7/9"));
}

#[tokio::test]
async fn test_row_triggers_stay_disabled_until_batch_ends() {
    let log = new_log();
    let runner = TestRunner::with_events(Arc::new(FakeTester::new()), logging_sink(log.clone()));
    runner.seed_rows(&ids(&["a", "b", "c"]));

    runner.enqueue_all(&ids(&["a", "b"]));
    let snapshot = runner.snapshot();
    // Unqueued rows are disabled too while the batch runs.
    assert!(snapshot.board.is_row_disabled(&ExampleId::from("c")));

    // Wait until the first row has finished but the batch is still running.
    loop {
        if log_entries(&log).iter().any(|l| l == "row a") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    if runner.phase() == RunnerPhase::Draining {
        assert!(runner.snapshot().board.is_row_disabled(&ExampleId::from("a")));
    }

    runner.wait_idle().await;
    let snapshot = runner.snapshot();
    for id in ids(&["a", "b", "c"]) {
        assert!(!snapshot.board.is_row_disabled(&id));
    }
    assert_eq!(
        snapshot.board.cell(&ExampleId::from("c"), Language::De),
        Some(&CellStatus::Empty)
    );
}

#[tokio::test]
async fn test_enqueue_all_during_batch_extends_it() {
    let runner = TestRunner::new(Arc::new(FakeTester::new()));

    runner.enqueue_all(&ids(&["1"]));
    runner.enqueue_all(&ids(&["2", "3"]));
    assert_eq!(runner.counters().total, 9);

    runner.wait_idle().await;
    assert_eq!(runner.counters(), Counters { total: 9, passed: 9 });
}

#[tokio::test]
async fn test_wait_idle_returns_immediately_when_idle() {
    let runner = TestRunner::new(Arc::new(FakeTester::new()));
    runner.enqueue_all(&[]);
    runner.wait_idle().await;
    assert_eq!(runner.phase(), RunnerPhase::Idle);
    assert_eq!(runner.snapshot().queued, 0);
}
