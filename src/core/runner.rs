//! # Sequential Example Test Runner / 顺序示例测试运行器
//!
//! Serializes user-triggered test requests (a single row or the whole
//! example set) into one stream of backend calls. Each queued example is
//! tested in German, French and Italian, strictly one call at a time, and
//! every result is written into the [`ResultBoard`] as soon as it settles.
//!
//! 将用户触发的测试请求（单行或全部示例）串行化为单一的后端调用流。
//! 每个排队的示例依次以德语、法语、意大利语测试，任何时刻最多一个调用在进行中。
//!
//! ## Lifecycle / 生命周期
//!
//! `Idle → (enqueue) → Draining → (queue empty) → Idle`. An enqueue while
//! draining only appends to the queue. Only the drain task issues calls, and
//! a second drain is never started while one is running.
//!
//! The shared state lives behind one `std::sync::Mutex` that is never held
//! across an `.await`; the phase is published through a `watch` channel so
//! callers can wait for the runner to become idle.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::core::billing::TestExampleResponse;
use crate::core::models::{CellStatus, Counters, ExampleId, Language, TestResult};
use crate::error::ApiResult;

/// Backend seam used by the runner.
/// 运行器使用的后端接口。
#[async_trait]
pub trait ExampleTester: Send + Sync {
    async fn test_example(&self, id: &ExampleId, lang: Language)
    -> ApiResult<TestExampleResponse>;
}

/// Whether a drain task is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerPhase {
    Idle,
    Draining,
}

/// Progress notifications published while the runner works.
/// 运行器工作时发布的进度通知。
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    /// The three cells of a row were reset to pending on enqueue.
    CellPending { id: ExampleId },
    CellUpdated {
        id: ExampleId,
        lang: Language,
        status: CellStatus,
    },
    /// All three languages of a row have settled.
    RowFinished { id: ExampleId },
    BatchFinished { counters: Counters },
}

/// Callback receiving runner events. It is invoked while the runner state is
/// locked and must not call back into the runner.
pub type EventSink = Arc<dyn Fn(&RunnerEvent) + Send + Sync>;

/// One row of the quality-control table.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardRow {
    pub id: ExampleId,
    pub cells: [CellStatus; 3],
    pub trigger_disabled: bool,
}

impl BoardRow {
    fn new(id: ExampleId) -> Self {
        Self {
            id,
            cells: Default::default(),
            trigger_disabled: false,
        }
    }
}

/// Rendered state of the quality-control table: one cell per
/// `(example, language)` plus the enabled state of every trigger.
/// 质量控制表的渲染状态：每个 `(示例, 语言)` 一个单元格及各触发器的启用状态。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBoard {
    rows: Vec<BoardRow>,
    test_all_disabled: bool,
}

impl ResultBoard {
    pub fn with_rows<'a>(ids: impl IntoIterator<Item = &'a ExampleId>) -> Self {
        let mut board = Self::default();
        for id in ids {
            board.row_mut(id);
        }
        board
    }

    /// DOM-style identifier of a result cell, e.g. `res-5-de`.
    pub fn cell_id(id: &ExampleId, lang: Language) -> String {
        format!("res-{}-{}", id, lang.code())
    }

    pub fn rows(&self) -> &[BoardRow] {
        &self.rows
    }

    pub fn row(&self, id: &ExampleId) -> Option<&BoardRow> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Rows are created on first use and keep that order.
    fn row_mut(&mut self, id: &ExampleId) -> &mut BoardRow {
        let index = match self.rows.iter().position(|r| &r.id == id) {
            Some(index) => index,
            None => {
                self.rows.push(BoardRow::new(id.clone()));
                self.rows.len() - 1
            }
        };
        &mut self.rows[index]
    }

    pub fn cell(&self, id: &ExampleId, lang: Language) -> Option<&CellStatus> {
        self.row(id).map(|r| &r.cells[lang.index()])
    }

    pub fn set_cell(&mut self, id: &ExampleId, lang: Language, status: CellStatus) {
        self.row_mut(id).cells[lang.index()] = status;
    }

    pub fn mark_pending(&mut self, id: &ExampleId) {
        self.row_mut(id).cells = [CellStatus::Pending, CellStatus::Pending, CellStatus::Pending];
    }

    pub fn disable_row(&mut self, id: &ExampleId) {
        self.row_mut(id).trigger_disabled = true;
    }

    pub fn enable_row(&mut self, id: &ExampleId) {
        self.row_mut(id).trigger_disabled = false;
    }

    pub fn disable_all(&mut self) {
        self.test_all_disabled = true;
        for row in &mut self.rows {
            row.trigger_disabled = true;
        }
    }

    pub fn enable_all(&mut self) {
        self.test_all_disabled = false;
        for row in &mut self.rows {
            row.trigger_disabled = false;
        }
    }

    pub fn is_row_disabled(&self, id: &ExampleId) -> bool {
        self.row(id).is_some_and(|r| r.trigger_disabled)
    }

    pub fn is_test_all_disabled(&self) -> bool {
        self.test_all_disabled
    }

    /// Number of Pass cells among the given rows.
    pub fn count_passed(&self, ids: &[ExampleId]) -> usize {
        ids.iter()
            .filter_map(|id| self.row(id))
            .flat_map(|r| r.cells.iter())
            .filter(|c| c.is_pass())
            .count()
    }
}

/// Point-in-time copy of the runner state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerSnapshot {
    pub board: ResultBoard,
    pub counters: Counters,
    pub phase: RunnerPhase,
    pub queued: usize,
}

#[derive(Debug, Default)]
struct RunnerState {
    queue: VecDeque<ExampleId>,
    draining: bool,
    /// IDs of the running "test all" batch, if any.
    batch: Option<Vec<ExampleId>>,
    counters: Counters,
    board: ResultBoard,
}

struct Shared {
    tester: Arc<dyn ExampleTester>,
    state: Mutex<RunnerState>,
    phase: watch::Sender<RunnerPhase>,
    sink: Option<EventSink>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RunnerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: RunnerEvent) {
        if let Some(sink) = &self.sink {
            sink(&event);
        }
    }
}

/// Handle to the sequential test runner. Cloning shares the same queue.
/// 顺序测试运行器句柄，克隆后共享同一队列。
#[derive(Clone)]
pub struct TestRunner {
    shared: Arc<Shared>,
}

impl TestRunner {
    pub fn new(tester: Arc<dyn ExampleTester>) -> Self {
        Self::build(tester, None)
    }

    pub fn with_events(tester: Arc<dyn ExampleTester>, sink: EventSink) -> Self {
        Self::build(tester, Some(sink))
    }

    fn build(tester: Arc<dyn ExampleTester>, sink: Option<EventSink>) -> Self {
        let (phase, _) = watch::channel(RunnerPhase::Idle);
        Self {
            shared: Arc::new(Shared {
                tester,
                state: Mutex::new(RunnerState::default()),
                phase,
                sink,
            }),
        }
    }

    /// Registers rows up front so the board lists every example, tested or not.
    pub fn seed_rows(&self, ids: &[ExampleId]) {
        let mut state = self.shared.lock();
        for id in ids {
            state.board.row_mut(id);
        }
    }

    /// Queues a single example. Its cells are marked pending and its trigger
    /// disabled before this returns. Must be called inside a tokio runtime.
    pub fn enqueue_row(&self, id: ExampleId) {
        let mut state = self.shared.lock();
        self.push(&mut state, id);
        self.start_drain(&mut state);
    }

    /// Queues every example as one batch: counters are reset to
    /// `total = 3 × count`, all triggers are disabled until the queue drains.
    /// Calling this while a batch is running extends that batch.
    /// Must be called inside a tokio runtime.
    pub fn enqueue_all(&self, ids: &[ExampleId]) {
        if ids.is_empty() {
            tracing::debug!("enqueue_all called without examples");
            return;
        }
        let mut guard = self.shared.lock();
        let state = &mut *guard;
        let added = ids.len() * Language::ALL.len();
        match state.batch.as_mut() {
            Some(batch) => {
                batch.extend(ids.iter().cloned());
                state.counters.total += added;
            }
            None => {
                state.batch = Some(ids.to_vec());
                state.counters = Counters {
                    total: added,
                    passed: 0,
                };
            }
        }
        for id in ids {
            self.push(state, id.clone());
        }
        state.board.disable_all();
        tracing::info!("Queued {} examples for batch testing", ids.len());
        self.start_drain(state);
    }

    fn push(&self, state: &mut RunnerState, id: ExampleId) {
        state.board.mark_pending(&id);
        state.board.disable_row(&id);
        self.shared.emit(RunnerEvent::CellPending { id: id.clone() });
        state.queue.push_back(id);
    }

    fn start_drain(&self, state: &mut RunnerState) {
        if state.draining {
            return;
        }
        state.draining = true;
        self.shared.phase.send_replace(RunnerPhase::Draining);
        tokio::spawn(drain(self.shared.clone()));
    }

    /// Resolves once the queue is empty and no drain is running.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.phase.subscribe();
        let _ = rx.wait_for(|phase| *phase == RunnerPhase::Idle).await;
    }

    pub fn phase(&self) -> RunnerPhase {
        *self.shared.phase.borrow()
    }

    pub fn counters(&self) -> Counters {
        self.shared.lock().counters
    }

    pub fn snapshot(&self) -> RunnerSnapshot {
        let state = self.shared.lock();
        RunnerSnapshot {
            board: state.board.clone(),
            counters: state.counters,
            phase: *self.shared.phase.borrow(),
            queued: state.queue.len(),
        }
    }
}

/// Pops queued examples until the queue is empty. Each example is tested in
/// `[de, fr, it]` order; a failed call becomes an error cell and the loop
/// moves on.
async fn drain(shared: Arc<Shared>) {
    tracing::debug!("Drain started");
    loop {
        let next = {
            let mut state = shared.lock();
            let next = state.queue.pop_front();
            if next.is_none() {
                finish(&shared, &mut state);
            }
            next
        };
        let Some(id) = next else {
            break;
        };

        for lang in Language::ALL {
            let outcome = shared.tester.test_example(&id, lang).await;
            let status = to_result(&id, lang, outcome).status();

            let mut state = shared.lock();
            if status.is_pass() && state.batch.is_some() {
                state.counters.passed += 1;
            }
            state.board.set_cell(&id, lang, status.clone());
            shared.emit(RunnerEvent::CellUpdated {
                id: id.clone(),
                lang,
                status,
            });
        }

        let mut state = shared.lock();
        if state.batch.is_none() {
            state.board.enable_row(&id);
        }
        shared.emit(RunnerEvent::RowFinished { id });
    }
    tracing::debug!("Drain finished");
}

/// Runs with the state locked once the queue is empty.
fn finish(shared: &Shared, state: &mut RunnerState) {
    state.board.enable_all();
    if let Some(batch) = state.batch.take() {
        state.counters.passed = state.board.count_passed(&batch);
        tracing::info!(
            "Batch finished: {} / {} passed",
            state.counters.passed,
            state.counters.total
        );
        shared.emit(RunnerEvent::BatchFinished {
            counters: state.counters,
        });
    }
    state.draining = false;
    shared.phase.send_replace(RunnerPhase::Idle);
}

fn to_result(
    id: &ExampleId,
    lang: Language,
    outcome: ApiResult<TestExampleResponse>,
) -> TestResult {
    match outcome {
        Ok(response) => TestResult {
            id: id.clone(),
            lang,
            passed: response.passed,
            diff: response.diff,
            error: None,
        },
        Err(e) => {
            tracing::error!("Test call for {} ({}) failed: {}", id, lang, e);
            TestResult {
                id: id.clone(),
                lang,
                passed: false,
                diff: None,
                error: Some(e.to_string()),
            }
        }
    }
}
