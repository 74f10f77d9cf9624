use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::options::TypingOptions;
use crate::surface::{EditableSurface, SurfaceError};
use crate::transform::TransformPipeline;

/// Lifecycle of a typing session as observed by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Cancelling,
    Completed,
    Cancelled,
    Failed,
}

/// Terminal result of a `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    /// A stop request ended the session early; the partially typed text
    /// stays in place.
    Cancelled,
    /// The surface failed mid-session; treated like a cancellation, nothing
    /// propagates to the caller.
    Failed,
    /// Another session was already running; nothing observable happened.
    Busy,
}

/// Pause after typing the wrong character, before noticing it (ms).
const MISTAKE_NOTICE_MS: (u64, u64) = (40, 120);
/// Pause after backspacing the wrong character (ms).
const MISTAKE_RECOVER_MS: (u64, u64) = (40, 150);

#[derive(Default)]
struct Shared {
    running: AtomicBool,
    cancel: AtomicBool,
    state: Mutex<SessionState>,
}

/// Owns the start/stop lifecycle and the per-character emission loop.
///
/// Clones share the same session slot, so a clone handed to another thread
/// (a signal handler, a control-message dispatcher) can observe state and
/// request cancellation while `run` blocks.
#[derive(Clone, Default)]
pub struct SessionController {
    shared: Arc<Shared>,
}

enum LoopEnd {
    Completed,
    Cancelled,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SessionState {
        self.shared
            .state
            .lock()
            .map(|s| *s)
            .unwrap_or(SessionState::Failed)
    }

    /// Request cancellation.
    ///
    /// Safe before any start, with no session running, and repeatedly. Takes
    /// effect at the next emission-step boundary; an in-flight sleep is
    /// never interrupted, so cancellation latency is bounded by the current
    /// step's delay.
    pub fn stop(&self) {
        self.shared.cancel.store(true, Ordering::SeqCst);
    }

    /// Run one typing session to a terminal state on the current thread.
    ///
    /// Returns [`SessionOutcome::Busy`] without touching the in-flight
    /// session when one is already running. Cancellation and surface loss
    /// are normal terminal outcomes, not errors.
    pub fn run<S>(
        &self,
        surface: &mut S,
        options: &TypingOptions,
        rng: &mut impl Rng,
    ) -> SessionOutcome
    where
        S: EditableSurface + ?Sized,
    {
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SessionOutcome::Busy;
        }

        // A stop issued between sessions must not poison this one.
        self.shared.cancel.store(false, Ordering::SeqCst);
        self.set_state(SessionState::Running);

        let (state, outcome) = match self.emit(surface, options, rng) {
            Ok(LoopEnd::Completed) => (SessionState::Completed, SessionOutcome::Completed),
            Ok(LoopEnd::Cancelled) => (SessionState::Cancelled, SessionOutcome::Cancelled),
            Err(SurfaceError::Detached) => (SessionState::Failed, SessionOutcome::Failed),
        };

        self.set_state(state);
        self.shared.running.store(false, Ordering::SeqCst);
        outcome
    }

    fn emit<S>(
        &self,
        surface: &mut S,
        options: &TypingOptions,
        rng: &mut impl Rng,
    ) -> Result<LoopEnd, SurfaceError>
    where
        S: EditableSurface + ?Sized,
    {
        let text = TransformPipeline::from_options(options).apply(&options.text);
        let (min_delay, max_delay) = options.delay_bounds();
        let mistake_rate = options.mistake_rate();

        surface.focus_caret_to_end();
        let mut buffer = surface.read_current_text()?;

        for c in text.chars() {
            if self.cancel_requested() {
                self.set_state(SessionState::Cancelling);
                return Ok(LoopEnd::Cancelled);
            }

            if mistake_rate > 0 && rng.gen_ratio(mistake_rate, 100) {
                // Wrong case first, then notice and backspace. The sub-step
                // always runs to completion: cancellation is only honored at
                // step boundaries, so the buffer never keeps a stray wrong
                // character.
                buffer.push(wrong_case_of(c));
                surface.write_text(&buffer)?;
                sleep_range(MISTAKE_NOTICE_MS, rng);
                buffer.pop();
                surface.write_text(&buffer)?;
                sleep_range(MISTAKE_RECOVER_MS, rng);
            }

            buffer.push(c);
            surface.write_text(&buffer)?;
            sleep_ms(rng.gen_range(min_delay..=max_delay));
        }

        if options.press_enter_at_end {
            surface.dispatch_submit_key();
            if surface.is_multi_line() {
                // Never submit a form on the target's behalf; a literal
                // newline on multi-line surfaces is the only end action.
                buffer.push('\n');
                surface.write_text(&buffer)?;
            }
        }

        Ok(LoopEnd::Completed)
    }

    fn cancel_requested(&self) -> bool {
        self.shared.cancel.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: SessionState) {
        if let Ok(mut slot) = self.shared.state.lock() {
            *slot = state;
        }
    }
}

/// The "typed the wrong case" variant of `c`.
///
/// Characters with no case distinction come back unchanged; the backspace
/// choreography still runs for them.
pub fn wrong_case_of(c: char) -> char {
    if c.is_lowercase() {
        c.to_uppercase().next().unwrap_or(c)
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

fn sleep_range(bounds: (u64, u64), rng: &mut impl Rng) {
    sleep_ms(rng.gen_range(bounds.0..=bounds.1));
}

fn sleep_ms(ms: u64) {
    if ms == 0 {
        return;
    }
    thread::sleep(Duration::from_millis(ms));
}
