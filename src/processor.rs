//! Asynchronous request-state controller.
//!
//! A [`Processor`] decouples "the input changed" from "a request is in
//! flight". Feed it values with [`submit`](Processor::submit); it debounces,
//! runs the work function with a timeout, retries a bounded number of
//! times, and publishes three observable facets — last output, busy flag,
//! last error — plus the input that produced them, as one consistent
//! [`Snapshot`].
//!
//! # State machine
//!
//! | State             | busy  | entered when                                   |
//! |-------------------|-------|------------------------------------------------|
//! | Idle              | false | created, or a cycle completed                  |
//! | Pending           | false | input changed; debounce window running         |
//! | Running/Retrying  | true  | debounce elapsed; an attempt is outstanding    |
//!
//! A new input value always supersedes an in-flight attempt: the attempt
//! future is dropped on the spot and the debounce window restarts. Rapid
//! successive submissions collapse — only the trailing value after a quiet
//! period ever reaches the work function.
//!
//! # Sequencing
//!
//! One driver task per controller owns every facet update, so observers see
//! a strictly ordered, non-overlapping stream of snapshots. At most one
//! attempt is outstanding at any time; retries are sequential. Submission
//! itself is thread-safe and may happen from anywhere.
//!
//! All timers run on `tokio::time`, so tests under
//! `#[tokio::test(start_paused = true)]` elapse debounce and timeout
//! windows virtually.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::work::{BoxedWork, Work};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RETRIES: u32 = 3;

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// One mutually consistent view of a controller's observable state.
///
/// All four fields are produced by the same transition — reading a snapshot
/// never mixes the output of one cycle with the error of another.
#[derive(Clone, Debug)]
pub struct Snapshot<I, O> {
    /// The input the current/last cycle ran with.
    pub input: Option<I>,
    /// Last successful output. Retained across later failures.
    pub output: Option<O>,
    /// Whether an attempt is outstanding right now.
    pub busy: bool,
    /// Last terminal failure. Cleared by the next success.
    pub error: Option<ProcessError>,
}

impl<I, O> Default for Snapshot<I, O> {
    fn default() -> Self {
        Self { input: None, output: None, busy: false, error: None }
    }
}

// ── Internals ─────────────────────────────────────────────────────────────────

/// Value carried on the trigger channel. The sequence number makes every
/// forced trigger observable even when the value itself is unchanged, and
/// tags log lines so attempts of one cycle can be correlated.
struct InputCell<I> {
    seq: u64,
    value: Option<I>,
}

impl<I> Default for InputCell<I> {
    fn default() -> Self {
        Self { seq: 0, value: None }
    }
}

#[derive(Clone)]
struct Config {
    debounce: Duration,
    timeout: Duration,
    retries: u32,
    initial_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            initial_delay: Duration::ZERO,
        }
    }
}

/// The halves the driver task takes ownership of on activation.
type Seed<I, O> = (watch::Receiver<InputCell<I>>, watch::Sender<Snapshot<I, O>>);

// ── Processor ─────────────────────────────────────────────────────────────────

/// Debounced, retrying, cancellable request-state controller.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use ripple::Processor;
///
/// # async fn demo() {
/// let search = Processor::new(|term: String| async move {
///     Ok::<_, std::io::Error>(format!("results for {term}"))
/// })
/// .debounce(Duration::from_millis(250))
/// .retries(3);
///
/// search.submit("vik".into());
/// search.submit("vikram".into()); // collapses: only "vikram" runs
///
/// let mut state = search.subscribe();
/// while state.changed().await.is_ok() {
///     let snapshot = state.borrow().clone();
///     // render snapshot.output / snapshot.busy / snapshot.error
/// }
/// # }
/// ```
///
/// Configuration methods consume `self`, so configuring is only possible
/// before the controller is shared. The driver task is spawned lazily on
/// the first trigger — on the ambient tokio runtime unless
/// [`spawn_on`](Processor::spawn_on) picked one.
pub struct Processor<I, O> {
    work: BoxedWork<I, O>,
    cfg: Config,
    handle: Option<Handle>,
    input_tx: watch::Sender<InputCell<I>>,
    state_rx: watch::Receiver<Snapshot<I, O>>,
    seed: Mutex<Option<Seed<I, O>>>,
}

impl<I, O> Processor<I, O>
where
    I: Clone + PartialEq + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Creates a controller around `work`. Nothing runs until the first
    /// trigger.
    pub fn new(work: impl Work<I, O>) -> Self {
        let (input_tx, input_rx) = watch::channel(InputCell::default());
        let (state_tx, state_rx) = watch::channel(Snapshot::default());
        Self {
            work: work.into_boxed_work(),
            cfg: Config::default(),
            handle: None,
            input_tx,
            state_rx,
            seed: Mutex::new(Some((input_rx, state_tx))),
        }
    }

    // ── Configuration (before first trigger) ──────────────────────────────────

    /// Quiet period after the last submission before work begins.
    /// Default 250 ms.
    pub fn debounce(mut self, window: Duration) -> Self {
        self.cfg.debounce = window;
        self
    }

    /// Per-attempt time limit. Default 10 s.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.cfg.timeout = limit;
        self
    }

    /// Additional attempts after a failed one. Default 3, so a cycle makes
    /// at most 4 attempts.
    pub fn retries(mut self, additional_attempts: u32) -> Self {
        self.cfg.retries = additional_attempts;
        self
    }

    /// One-time delay before the very first debounce window. Default 0.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.cfg.initial_delay = delay;
        self
    }

    /// Spawns the driver task on `handle` instead of the ambient runtime.
    /// Use this when submissions come from threads outside any runtime.
    pub fn spawn_on(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    // ── Triggers ──────────────────────────────────────────────────────────────

    /// Submits a new input value. May be called from any thread.
    ///
    /// A value equal to the last submitted one is a no-op. A new value
    /// supersedes any in-flight attempt and restarts the debounce window;
    /// of a rapid burst, only the trailing value is ever processed.
    ///
    /// # Panics
    ///
    /// The first trigger spawns the driver task and panics outside a tokio
    /// runtime unless [`spawn_on`](Processor::spawn_on) configured one.
    pub fn submit(&self, input: I) {
        let changed = self.input_tx.send_if_modified(|cell| {
            if cell.value.as_ref() == Some(&input) {
                return false;
            }
            cell.seq += 1;
            cell.value = Some(input);
            true
        });
        if changed {
            self.activate();
        }
    }

    fn force(&self, input: I) {
        self.input_tx.send_modify(|cell| {
            cell.seq += 1;
            cell.value = Some(input);
        });
        self.activate();
    }

    fn activate(&self) {
        let seed = self
            .seed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some((input_rx, state_tx)) = seed else { return };
        let driver = Driver {
            work: Arc::clone(&self.work),
            cfg: self.cfg.clone(),
            input_rx,
            state_tx,
        };
        match &self.handle {
            Some(handle) => {
                handle.spawn(driver.run());
            }
            None => {
                tokio::spawn(driver.run());
            }
        }
    }

    // ── Observation ───────────────────────────────────────────────────────────

    /// Subscribes to state changes. Each `changed()` wakeup observes the
    /// latest snapshot; intermediate snapshots may be skipped, never
    /// reordered.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<I, O>> {
        self.state_rx.clone()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot<I, O> {
        self.state_rx.borrow().clone()
    }

    /// Last successful output, if any.
    pub fn output(&self) -> Option<O> {
        self.state_rx.borrow().output.clone()
    }

    /// Last terminal failure, if any.
    pub fn error(&self) -> Option<ProcessError> {
        self.state_rx.borrow().error.clone()
    }

    /// Whether an attempt is outstanding right now.
    pub fn is_busy(&self) -> bool {
        self.state_rx.borrow().busy
    }
}

impl<I, O> Processor<I, O>
where
    I: Clone + Default + PartialEq + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    /// Forces a new cycle with the no-argument sentinel `I::default()`,
    /// regardless of input equality. For processors whose input carries no
    /// information (e.g. `()`), this is the trigger.
    pub fn start(&self) {
        self.force(I::default());
    }

    /// Like [`start`](Processor::start), but a no-op once an output exists —
    /// at most one trigger per controller lifetime unless the input changes
    /// again.
    pub fn autostart(&self) {
        if self.state_rx.borrow().output.is_none() {
            self.start();
        }
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

/// The single task that owns every facet update for one controller.
struct Driver<I, O> {
    work: BoxedWork<I, O>,
    cfg: Config,
    input_rx: watch::Receiver<InputCell<I>>,
    state_tx: watch::Sender<Snapshot<I, O>>,
}

enum Outcome<O> {
    Success(O),
    Failure(ProcessError),
    Superseded,
}

impl<I, O> Driver<I, O>
where
    I: Clone + PartialEq + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
{
    async fn run(mut self) {
        if !self.cfg.initial_delay.is_zero() {
            time::sleep(self.cfg.initial_delay).await;
        }

        // The spawning trigger already sent a value, so the first cycle
        // starts without waiting for another change.
        let mut pending = self.input_rx.has_changed().unwrap_or(false);

        loop {
            if !pending {
                if self.input_rx.changed().await.is_err() {
                    return; // controller dropped
                }
            }
            pending = false;

            // Pending: wait out the quiet period; any further submission
            // restarts it.
            loop {
                tokio::select! {
                    changed = self.input_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    () = time::sleep(self.cfg.debounce) => break,
                }
            }

            let (seq, input) = {
                let cell = self.input_rx.borrow_and_update();
                match cell.value.clone() {
                    Some(value) => (cell.seq, value),
                    None => continue,
                }
            };

            self.state_tx.send_modify(|s| {
                s.input = Some(input.clone());
                s.busy = true;
            });
            debug!(cycle = seq, "cycle started");

            let max_attempts = self.cfg.retries.saturating_add(1);
            let mut attempt = 0u32;
            let outcome = loop {
                attempt += 1;
                let fut = self.work.call(input.clone());
                tokio::select! {
                    // A newer submission wins over a completing attempt.
                    biased;

                    changed = self.input_rx.changed() => {
                        match changed {
                            Ok(()) => break Outcome::Superseded,
                            Err(_) => return,
                        }
                    }
                    finished = time::timeout(self.cfg.timeout, fut) => {
                        let error = match finished {
                            Ok(Ok(output)) => break Outcome::Success(output),
                            Ok(Err(source)) => ProcessError::Work(source.into()),
                            Err(_) => ProcessError::Timeout { limit: self.cfg.timeout },
                        };
                        warn!(cycle = seq, attempt, %error, "attempt failed");
                        if attempt >= max_attempts {
                            break Outcome::Failure(error);
                        }
                    }
                }
            };

            match outcome {
                Outcome::Success(output) => {
                    debug!(cycle = seq, attempts = attempt, "cycle succeeded");
                    self.state_tx.send_modify(|s| {
                        s.output = Some(output);
                        s.error = None;
                        s.busy = false;
                    });
                }
                Outcome::Failure(error) => {
                    warn!(cycle = seq, attempts = attempt, %error, "cycle failed");
                    self.state_tx.send_modify(|s| {
                        s.error = Some(error);
                        s.busy = false;
                    });
                }
                Outcome::Superseded => {
                    // The attempt future is already dropped; its result can
                    // never land. Straight back to Pending for the new value.
                    debug!(cycle = seq, "cycle superseded");
                    self.state_tx.send_modify(|s| s.busy = false);
                    pending = true;
                }
            }
        }
    }
}
