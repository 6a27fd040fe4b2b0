// src/mapreduce/scheduler.rs

use std::convert::Infallible;
use std::future::Future;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use super::window::Window;

/// Runs a bounded number of asynchronous transforms over a sequence and folds
/// their results into an accumulator.
///
/// The scheduler holds no state besides its window, so one instance can drive
/// any number of (sequential or concurrent) scheduling operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scheduler {
    window: Window,
}

impl Scheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    /// A scheduler that never runs two transforms at the same time.
    pub fn sequential() -> Self {
        Self::new(Window::SEQUENTIAL)
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Core fallible map/reduce.
    ///
    /// Up to `window` transforms are spawned onto the Tokio runtime straight
    /// away. Each time one completes, its result is handed to `combine` on the
    /// calling task (so `combine` calls never overlap) and one replacement
    /// element is drawn from `source`. Results are combined in completion
    /// order, not in source order.
    ///
    /// On the first failure from either a transform or `combine`:
    /// - no further elements are drawn,
    /// - every outstanding transform is aborted and waited on,
    /// - the failure is returned unchanged. Later results and failures are
    ///   discarded.
    ///
    /// A panic inside a transform is resumed on the calling task once the
    /// outstanding work has been aborted. A transform task cancelled from
    /// outside the scheduler (runtime shutdown) lost its result, so it is
    /// raised the same way rather than reported as success.
    pub async fn try_map_reduce<I, T, R, E, F, Fut, C>(
        &self,
        source: I,
        initial: R,
        transform: F,
        mut combine: C,
    ) -> Result<R, E>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        C: FnMut(&mut R, T) -> Result<(), E>,
    {
        let mut source = source.into_iter();
        let mut in_flight: JoinSet<Result<T, E>> = JoinSet::new();
        let mut accumulator = initial;
        let mut combined = 0usize;

        for element in source.by_ref().take(self.window.get()) {
            in_flight.spawn(transform(element));
        }

        debug!(
            window = self.window.get(),
            started = in_flight.len(),
            "map/reduce started"
        );

        while let Some(joined) = in_flight.join_next().await {
            let outcome = match settle(joined) {
                Ok(result) => result.and_then(|value| combine(&mut accumulator, value)),
                Err(payload) => {
                    abort_outstanding(&mut in_flight).await;
                    std::panic::resume_unwind(payload);
                }
            };

            if let Err(err) = outcome {
                debug!(
                    combined,
                    outstanding = in_flight.len(),
                    "map/reduce failed; aborting outstanding transforms"
                );
                abort_outstanding(&mut in_flight).await;
                return Err(err);
            }

            combined += 1;

            if let Some(element) = source.next() {
                in_flight.spawn(transform(element));
            }
        }

        debug!(combined, "map/reduce finished");
        Ok(accumulator)
    }

    /// Infallible map/reduce: same scheduling as [`Self::try_map_reduce`].
    pub async fn map_reduce<I, T, R, F, Fut, C>(
        &self,
        source: I,
        initial: R,
        transform: F,
        mut combine: C,
    ) -> R
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnMut(&mut R, T),
    {
        let result = self
            .try_map_reduce(
                source,
                initial,
                |element| {
                    let pending = transform(element);
                    async move { Ok::<T, Infallible>(pending.await) }
                },
                |accumulator, value| {
                    combine(accumulator, value);
                    Ok(())
                },
            )
            .await;

        match result {
            Ok(accumulator) => accumulator,
            Err(never) => match never {},
        }
    }
}

/// Result of a finished transform task, or the panic payload to resume.
fn settle<T>(joined: std::result::Result<T, JoinError>) -> std::thread::Result<T> {
    match joined {
        Ok(result) => Ok(result),
        Err(join_error) if join_error.is_panic() => Err(join_error.into_panic()),
        Err(join_error) => {
            warn!(error = %join_error, "transform cancelled outside the scheduler");
            Err(Box::new(format!("transform task cancelled: {join_error}")))
        }
    }
}

/// Abort every task still in the set and wait until all of them have wound
/// down. Their results are dropped.
async fn abort_outstanding<T: 'static>(in_flight: &mut JoinSet<T>) {
    in_flight.abort_all();
    while in_flight.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Start(u32),
        End(u32),
        Combine(u32),
    }

    #[tokio::test]
    async fn empty_source_returns_initial_without_transforms() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = Scheduler::new(Window::new(3).unwrap())
            .map_reduce(
                Vec::<u32>::new(),
                42u32,
                move |x| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async move { x }
                },
                |acc, x| *acc += x,
            )
            .await;

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sequential_window_alternates_transform_and_combine() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let transform_log = Arc::clone(&log);

        let total = Scheduler::sequential()
            .map_reduce(
                0..5u32,
                0u32,
                move |x| {
                    let log = Arc::clone(&transform_log);
                    async move {
                        log.lock().unwrap().push(Event::Start(x));
                        tokio::time::sleep(Duration::from_millis(2)).await;
                        log.lock().unwrap().push(Event::End(x));
                        x
                    }
                },
                |acc, x| {
                    log.lock().unwrap().push(Event::Combine(x));
                    *acc += x;
                },
            )
            .await;

        assert_eq!(total, 10);

        let expected: Vec<Event> = (0..5u32)
            .flat_map(|x| [Event::Start(x), Event::End(x), Event::Combine(x)])
            .collect();
        assert_eq!(*log.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn transform_failure_stops_drawing_elements() {
        let drawn = Arc::new(AtomicUsize::new(0));
        let draw_counter = Arc::clone(&drawn);
        let source = (0..10u32).inspect(move |_| {
            draw_counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut combined = Vec::new();
        let result: Result<(), String> = Scheduler::sequential()
            .try_map_reduce(
                source,
                (),
                |x| async move {
                    if x == 3 {
                        Err(format!("boom at {x}"))
                    } else {
                        Ok(x)
                    }
                },
                |_, x| {
                    combined.push(x);
                    Ok(())
                },
            )
            .await;

        assert_eq!(result, Err("boom at 3".to_string()));
        assert_eq!(combined, vec![0, 1, 2]);
        assert_eq!(drawn.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn combine_failure_is_returned_unchanged() {
        let result: Result<u32, &'static str> = Scheduler::new(Window::new(2).unwrap())
            .try_map_reduce(
                1..=6u32,
                0u32,
                |x| async move { Ok(x) },
                |acc, x| {
                    if *acc + x > 5 {
                        return Err("limit exceeded");
                    }
                    *acc += x;
                    Ok(())
                },
            )
            .await;

        assert_eq!(result, Err("limit exceeded"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn outstanding_transforms_are_aborted_after_failure() {
        let finished = Arc::new(AtomicUsize::new(0));
        let finished_counter = Arc::clone(&finished);

        let result: Result<(), u32> = Scheduler::new(Window::new(4).unwrap())
            .try_map_reduce(
                0..4u32,
                (),
                move |x| {
                    let finished = Arc::clone(&finished_counter);
                    async move {
                        if x == 0 {
                            return Err(x);
                        }
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                },
                |_, ()| Ok(()),
            )
            .await;

        assert_eq!(result, Err(0));
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_task_is_not_treated_as_success() {
        let mut set = JoinSet::new();
        set.spawn(std::future::pending::<Result<u32, ()>>());
        set.abort_all();
        let joined = set.join_next().await.unwrap();

        let payload = settle(joined).unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert!(message.starts_with("transform task cancelled"), "{message}");
    }

    #[tokio::test]
    async fn finished_task_settles_to_its_result() {
        let mut set = JoinSet::new();
        set.spawn(async { Ok::<u32, ()>(7) });
        let joined = set.join_next().await.unwrap();
        assert_eq!(settle(joined).unwrap(), Ok(7));
    }

    #[tokio::test]
    #[should_panic(expected = "transform exploded")]
    async fn transform_panic_is_resumed() {
        Scheduler::sequential()
            .map_reduce(
                [1u32],
                (),
                |x: u32| async move {
                    assert!(x != 1, "transform exploded");
                },
                |_, ()| {},
            )
            .await;
    }
}
