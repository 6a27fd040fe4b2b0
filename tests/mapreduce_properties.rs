// tests/mapreduce_properties.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;

use async_shell::mapreduce::{Scheduler, Window};
use async_shell_test_utils::probe::ConcurrencyProbe;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("building test runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_element_is_transformed_and_combined_once(
        len in 0usize..60,
        width in 1usize..8,
        delays in proptest::collection::vec(0u64..3, 60),
    ) {
        let probe = ConcurrencyProbe::new();
        let transform_probe = Arc::clone(&probe);
        let delays = Arc::new(delays);

        let mut seen = runtime().block_on(
            Scheduler::new(Window::new(width).unwrap()).map_reduce(
                0..len,
                Vec::new(),
                move |i| {
                    let probe = Arc::clone(&transform_probe);
                    let delay = delays[i];
                    async move {
                        let _guard = probe.enter();
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        i
                    }
                },
                |seen, i| seen.push(i),
            ),
        );

        seen.sort_unstable();
        prop_assert_eq!(seen, (0..len).collect::<Vec<_>>());
        prop_assert_eq!(probe.entered(), len);
        prop_assert!(probe.max() <= width);
        prop_assert_eq!(probe.current(), 0);
    }

    #[test]
    fn sequential_failure_stops_at_failing_element(
        len in 1usize..40,
        fail_seed in any::<usize>(),
    ) {
        let fail_at = fail_seed % len;
        let drawn = Arc::new(AtomicUsize::new(0));
        let draw_counter = Arc::clone(&drawn);
        let combined = Mutex::new(Vec::new());

        let result: Result<(), usize> = runtime().block_on(
            Scheduler::sequential().try_map_reduce(
                (0..len).inspect(move |_| {
                    draw_counter.fetch_add(1, Ordering::SeqCst);
                }),
                (),
                move |i| async move { if i == fail_at { Err(i) } else { Ok(i) } },
                |_, i| {
                    combined.lock().unwrap().push(i);
                    Ok(())
                },
            ),
        );

        prop_assert_eq!(result, Err(fail_at));
        prop_assert_eq!(drawn.load(Ordering::SeqCst), fail_at + 1);
        prop_assert_eq!(combined.into_inner().unwrap(), (0..fail_at).collect::<Vec<_>>());
    }

    #[test]
    fn concurrent_failure_never_combines_more_than_source(
        len in 1usize..40,
        width in 1usize..6,
        fail_seed in any::<usize>(),
    ) {
        let fail_at = fail_seed % len;
        let mut combines = 0usize;

        let result: Result<(), usize> = runtime().block_on(
            Scheduler::new(Window::new(width).unwrap()).try_map_reduce(
                0..len,
                (),
                move |i| async move { if i == fail_at { Err(i) } else { Ok(()) } },
                |_, ()| {
                    combines += 1;
                    Ok(())
                },
            ),
        );

        prop_assert_eq!(result, Err(fail_at));
        prop_assert!(combines < len);
    }
}
