//! # Concurrency Tests using Loom
//!
//! Models the drain claim of the sequential test runner: producers push onto
//! a shared queue under one lock and start a drain only when none is running;
//! the drain clears its flag under the same lock once the queue is empty.
//! Every interleaving must process each item exactly once with at most one
//! item in flight.

#[cfg(test)]
mod tests {
    use loom::sync::atomic::{AtomicUsize, Ordering};
    use loom::sync::{Arc, Mutex};
    use loom::thread;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct State {
        queue: VecDeque<usize>,
        draining: bool,
    }

    struct Shared {
        state: Mutex<State>,
        in_flight: AtomicUsize,
        processed: Mutex<Vec<usize>>,
    }

    impl Shared {
        fn new() -> Self {
            Self {
                state: Mutex::new(State::default()),
                in_flight: AtomicUsize::new(0),
                processed: Mutex::new(Vec::new()),
            }
        }
    }

    /// Mirrors `enqueue_row`: push, then claim the drain if it is free.
    /// Returns `true` when this call must run the drain.
    fn enqueue(shared: &Shared, item: usize) -> bool {
        let mut state = shared.state.lock().unwrap();
        state.queue.push_back(item);
        if state.draining {
            return false;
        }
        state.draining = true;
        true
    }

    /// Mirrors the drain loop: pop under the lock, work outside it, release
    /// the claim under the lock when nothing is left.
    fn drain(shared: &Shared) {
        loop {
            let next = {
                let mut state = shared.state.lock().unwrap();
                let next = state.queue.pop_front();
                if next.is_none() {
                    state.draining = false;
                }
                next
            };
            let Some(item) = next else {
                break;
            };
            let now = shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            assert_eq!(now, 1, "two items in flight");
            shared.processed.lock().unwrap().push(item);
            shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_single_drain_processes_every_item_once() {
        // Loom explores deeply; run the model on a thread with a larger stack.
        const STACK_SIZE: usize = 8 * 1024 * 1024; // 8 MB

        let builder = std::thread::Builder::new()
            .name("loom-test-thread".into())
            .stack_size(STACK_SIZE);

        let handle = builder
            .spawn(|| {
                loom::model(|| {
                    let shared = Arc::new(Shared::new());

                    let handles: Vec<_> = (0..2)
                        .map(|item| {
                            let shared = shared.clone();
                            thread::spawn(move || {
                                if enqueue(&shared, item) {
                                    drain(&shared);
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }

                    let mut processed = shared.processed.lock().unwrap().clone();
                    processed.sort_unstable();
                    assert_eq!(processed, vec![0, 1]);

                    let state = shared.state.lock().unwrap();
                    assert!(state.queue.is_empty());
                    assert!(!state.draining);
                });
            })
            .unwrap();

        handle.join().unwrap();
    }
}
