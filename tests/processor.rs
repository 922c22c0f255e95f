//! Controller behavior under a paused clock.
//!
//! Every test runs with `start_paused = true`: `tokio::time` auto-advances
//! whenever all tasks are idle, so debounce windows, timeouts, and
//! multi-second waits elapse virtually and the suite finishes in
//! milliseconds of wall time.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ripple::{ProcessError, Processor};
use tokio::time;

#[tokio::test(start_paused = true)]
async fn debounce_collapses_rapid_inputs() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);
    let ctl = Processor::new(move |input: String| {
        seen.lock().unwrap().push(input.clone());
        async move { Ok::<_, Infallible>(input.to_uppercase()) }
    })
    .debounce(Duration::from_millis(250));

    ctl.submit("a".into());
    time::sleep(Duration::from_millis(50)).await;
    ctl.submit("b".into());
    time::sleep(Duration::from_millis(50)).await;
    ctl.submit("c".into());

    time::sleep(Duration::from_millis(500)).await;

    assert_eq!(calls.lock().unwrap().as_slice(), ["c"]);
    assert_eq!(ctl.output().as_deref(), Some("C"));
    assert!(!ctl.is_busy());
    assert!(ctl.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn equal_input_does_not_retrigger() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let ctl = Processor::new(move |input: String| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, Infallible>(input) }
    })
    .debounce(Duration::from_millis(10));

    ctl.submit("a".into());
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    ctl.submit("a".into());
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    ctl.submit("b".into());
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_exhausts_retries_then_surfaces() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let ctl = Processor::new(move |(): ()| {
        counter.fetch_add(1, Ordering::SeqCst);
        async {
            time::sleep(Duration::from_secs(60)).await;
            Ok::<_, Infallible>(())
        }
    })
    .debounce(Duration::from_millis(10))
    .timeout(Duration::from_secs(1))
    .retries(2);

    ctl.start();
    time::sleep(Duration::from_secs(10)).await;

    // retry limit 2 → exactly 3 attempts, then the timeout surfaces
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert!(matches!(ctl.error(), Some(ProcessError::Timeout { .. })));
    assert!(!ctl.is_busy());
    assert!(ctl.output().is_none());
}

#[tokio::test(start_paused = true)]
async fn retry_recovers_after_transient_failures() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let ctl = Processor::new(move |n: u32| {
        let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if attempt < 3 {
                Err(std::io::Error::other("transient"))
            } else {
                Ok(n * 2)
            }
        }
    })
    .debounce(Duration::from_millis(10))
    .retries(3);

    ctl.submit(21);
    time::sleep(Duration::from_secs(1)).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(ctl.output(), Some(42));
    assert!(ctl.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn failure_retains_previous_output() {
    let ctl = Processor::new(|input: String| async move {
        if input == "good" {
            Ok("payload".to_string())
        } else {
            Err(std::io::Error::other("broken"))
        }
    })
    .debounce(Duration::from_millis(10))
    .retries(1);

    ctl.submit("good".into());
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ctl.output().as_deref(), Some("payload"));

    ctl.submit("bad".into());
    time::sleep(Duration::from_secs(1)).await;

    let snapshot = ctl.snapshot();
    assert_eq!(snapshot.input.as_deref(), Some("bad"));
    assert_eq!(snapshot.output.as_deref(), Some("payload")); // retained
    assert!(matches!(snapshot.error, Some(ProcessError::Work(_))));
    assert!(!snapshot.busy);
}

#[tokio::test(start_paused = true)]
async fn newer_input_supersedes_inflight_attempt() {
    let ctl = Processor::new(|input: String| async move {
        let delay = if input == "slow" {
            Duration::from_secs(5)
        } else {
            Duration::from_millis(10)
        };
        time::sleep(delay).await;
        Ok::<_, Infallible>(input)
    })
    .debounce(Duration::from_millis(10));

    ctl.submit("slow".into());
    // let the debounce elapse so the slow attempt is actually in flight
    time::sleep(Duration::from_millis(100)).await;
    assert!(ctl.is_busy());

    ctl.submit("fast".into());
    time::sleep(Duration::from_secs(10)).await;

    // the superseded attempt was dropped; its late result can never land
    assert_eq!(ctl.output().as_deref(), Some("fast"));
    assert!(ctl.error().is_none());
    assert!(!ctl.is_busy());
}

#[tokio::test(start_paused = true)]
async fn busy_is_set_while_an_attempt_is_outstanding() {
    let ctl = Processor::new(|(): ()| async {
        time::sleep(Duration::from_secs(1)).await;
        Ok::<_, Infallible>("done")
    })
    .debounce(Duration::from_millis(10));

    ctl.start();
    time::sleep(Duration::from_millis(200)).await;
    assert!(ctl.is_busy());

    time::sleep(Duration::from_secs(2)).await;
    assert!(!ctl.is_busy());
    assert_eq!(ctl.output(), Some("done"));
}

#[tokio::test(start_paused = true)]
async fn start_forces_a_new_cycle_even_for_equal_input() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let ctl = Processor::new(move |(): ()| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, Infallible>(()) }
    })
    .debounce(Duration::from_millis(10));

    ctl.start();
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    ctl.start();
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn autostart_triggers_at_most_once() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let ctl = Processor::new(move |(): ()| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, Infallible>("ready") }
    })
    .debounce(Duration::from_millis(10));

    ctl.autostart();
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(ctl.output(), Some("ready"));

    ctl.autostart();
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn initial_delay_defers_the_first_window() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let ctl = Processor::new(move |(): ()| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, Infallible>(()) }
    })
    .debounce(Duration::from_millis(10))
    .initial_delay(Duration::from_secs(2));

    ctl.start();
    time::sleep(Duration::from_secs(1)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 0);

    time::sleep(Duration::from_secs(2)).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn subscriber_observes_ordered_snapshots() {
    // The work yields, so the busy snapshot is observable before the
    // completed one — watch coalesces updates published back-to-back.
    let ctl = Processor::new(|n: u32| async move {
        time::sleep(Duration::from_millis(5)).await;
        Ok::<_, Infallible>(n + 1)
    })
    .debounce(Duration::from_millis(10));

    let mut state = ctl.subscribe();
    ctl.submit(1);

    // First change: the cycle started (busy, input set, no output yet).
    state.changed().await.unwrap();
    {
        let snapshot = state.borrow_and_update();
        assert!(snapshot.busy);
        assert_eq!(snapshot.input, Some(1));
        assert_eq!(snapshot.output, None);
    }

    // Next change: the same cycle completed.
    state.changed().await.unwrap();
    let snapshot = state.borrow_and_update().clone();
    assert!(!snapshot.busy);
    assert_eq!(snapshot.output, Some(2));
    assert!(snapshot.error.is_none());
}
