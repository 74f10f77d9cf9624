use rand::rngs::StdRng;
use rand::SeedableRng;

use autotyper::options::TypingOptions;
use autotyper::session::{SessionController, SessionOutcome, SessionState};
use autotyper::surface::{EditableSurface, SurfaceError, ValueField};

fn instant_options(text: &str) -> TypingOptions {
    TypingOptions {
        text: text.to_string(),
        min_delay_ms: 0,
        max_delay_ms: 0,
        mistake_rate_percent: 0,
        press_enter_at_end: false,
        smart_punctuation: false,
    }
}

/// Trips the stop flag after a fixed number of writes, making cancellation
/// timing deterministic instead of racing wall-clock sleeps.
struct StopAfterWrites {
    inner: ValueField,
    controller: SessionController,
    writes: usize,
    stop_after: usize,
}

impl StopAfterWrites {
    fn new(controller: SessionController, stop_after: usize) -> Self {
        Self {
            inner: ValueField::single_line(),
            controller,
            writes: 0,
            stop_after,
        }
    }
}

impl EditableSurface for StopAfterWrites {
    fn read_current_text(&mut self) -> Result<String, SurfaceError> {
        self.inner.read_current_text()
    }

    fn write_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.inner.write_text(text)?;
        self.writes += 1;
        if self.writes == self.stop_after {
            self.controller.stop();
        }
        Ok(())
    }

    fn focus_caret_to_end(&mut self) {
        self.inner.focus_caret_to_end();
    }

    fn is_multi_line(&self) -> bool {
        self.inner.is_multi_line()
    }

    fn dispatch_submit_key(&mut self) {
        self.inner.dispatch_submit_key();
    }
}

#[test]
fn stop_with_no_session_is_harmless() {
    let controller = SessionController::new();
    controller.stop();
    controller.stop();

    assert!(!controller.is_running());
    assert_eq!(controller.state(), SessionState::Idle);

    // A later session is unaffected by stale stop requests.
    let mut field = ValueField::single_line();
    let mut rng = StdRng::seed_from_u64(3);
    let outcome = controller.run(&mut field, &instant_options("ok"), &mut rng);

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(field.value(), "ok");
}

#[test]
fn cancellation_leaves_a_clean_prefix() {
    let controller = SessionController::new();
    let mut surface = StopAfterWrites::new(controller.clone(), 2);
    let mut rng = StdRng::seed_from_u64(3);

    let outcome = controller.run(&mut surface, &instant_options("abcdef"), &mut rng);

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(controller.state(), SessionState::Cancelled);
    // Two characters landed before the stop took effect at the next step.
    assert_eq!(surface.inner.value(), "ab");
}

#[test]
fn stop_before_the_first_character_types_nothing() {
    struct StopOnRead {
        inner: ValueField,
        controller: SessionController,
    }

    impl EditableSurface for StopOnRead {
        fn read_current_text(&mut self) -> Result<String, SurfaceError> {
            // The stop request lands after the session started but before
            // any character was emitted.
            self.controller.stop();
            self.inner.read_current_text()
        }

        fn write_text(&mut self, text: &str) -> Result<(), SurfaceError> {
            self.inner.write_text(text)
        }

        fn focus_caret_to_end(&mut self) {
            self.inner.focus_caret_to_end();
        }

        fn is_multi_line(&self) -> bool {
            self.inner.is_multi_line()
        }

        fn dispatch_submit_key(&mut self) {
            self.inner.dispatch_submit_key();
        }
    }

    let controller = SessionController::new();
    let mut surface = StopOnRead {
        inner: ValueField::single_line(),
        controller: controller.clone(),
    };
    let mut rng = StdRng::seed_from_u64(3);

    let outcome = controller.run(&mut surface, &instant_options("abcdef"), &mut rng);

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(surface.inner.value(), "");
}

#[test]
fn stop_inside_a_mistake_still_completes_the_correction() {
    let controller = SessionController::new();
    let mut surface = StopAfterWrites::new(controller.clone(), 1);
    let mut rng = StdRng::seed_from_u64(3);

    let mut options = instant_options("abc");
    options.mistake_rate_percent = 100;

    let outcome = controller.run(&mut surface, &options, &mut rng);

    assert_eq!(outcome, SessionOutcome::Cancelled);
    // Write 1 is the wrong character. The backspace and the real 'a' still
    // land before the cancel check at the top of the next step, so no stray
    // character survives.
    assert_eq!(surface.writes, 3);
    assert_eq!(surface.inner.value(), "a");
}

#[test]
fn detached_target_ends_the_session_silently() {
    struct DetachAfterWrites {
        inner: ValueField,
        writes: usize,
        detach_after: usize,
    }

    impl EditableSurface for DetachAfterWrites {
        fn read_current_text(&mut self) -> Result<String, SurfaceError> {
            self.inner.read_current_text()
        }

        fn write_text(&mut self, text: &str) -> Result<(), SurfaceError> {
            if self.writes == self.detach_after {
                return Err(SurfaceError::Detached);
            }
            self.inner.write_text(text)?;
            self.writes += 1;
            Ok(())
        }

        fn focus_caret_to_end(&mut self) {
            self.inner.focus_caret_to_end();
        }

        fn is_multi_line(&self) -> bool {
            self.inner.is_multi_line()
        }

        fn dispatch_submit_key(&mut self) {
            self.inner.dispatch_submit_key();
        }
    }

    let controller = SessionController::new();
    let mut surface = DetachAfterWrites {
        inner: ValueField::single_line(),
        writes: 0,
        detach_after: 2,
    };
    let mut rng = StdRng::seed_from_u64(3);

    let outcome = controller.run(&mut surface, &instant_options("abcdef"), &mut rng);

    assert_eq!(outcome, SessionOutcome::Failed);
    assert_eq!(controller.state(), SessionState::Failed);
    assert!(!controller.is_running());
    // The partial text stays; nothing is rolled back.
    assert_eq!(surface.inner.value(), "ab");
}

#[test]
fn controller_is_reusable_after_cancellation() {
    let controller = SessionController::new();
    let mut surface = StopAfterWrites::new(controller.clone(), 1);
    let mut rng = StdRng::seed_from_u64(3);

    controller.run(&mut surface, &instant_options("abc"), &mut rng);
    assert_eq!(controller.state(), SessionState::Cancelled);

    let mut field = ValueField::single_line();
    let outcome = controller.run(&mut field, &instant_options("next"), &mut rng);

    assert_eq!(outcome, SessionOutcome::Completed);
    assert_eq!(controller.state(), SessionState::Completed);
    assert_eq!(field.value(), "next");
}
