use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The surface went away mid-session (element removed, handle dropped).
    #[error("target surface detached")]
    Detached,
}

/// Change signals a surface emits so reactive observers notice updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeNotification {
    InputChanged,
    ValueCommitted,
    SubmitKey,
}

/// Capability contract for anything the simulator can type into.
///
/// Writes always replace the full content; there is no incremental insert
/// primitive. Concurrent mutation of the same surface by other code is
/// overwritten, not merged.
pub trait EditableSurface {
    fn read_current_text(&mut self) -> Result<String, SurfaceError>;

    /// Set the content to exactly `text` and emit whatever change
    /// notifications the surrounding environment relies on.
    fn write_text(&mut self, text: &str) -> Result<(), SurfaceError>;

    /// Best effort; caret placement is cosmetic and must not fail a session.
    fn focus_caret_to_end(&mut self);

    /// Decides only the end-of-typing newline behavior.
    fn is_multi_line(&self) -> bool;

    /// Best effort submit-style key signal. Never navigates or submits.
    fn dispatch_submit_key(&mut self);
}

/// Value-based field: a single-line input or a multi-line text area.
///
/// Writes emit an input notification followed by a value-commit
/// notification, matching how value-holding fields announce changes.
#[derive(Debug, Default)]
pub struct ValueField {
    value: String,
    caret: usize,
    multi_line: bool,
    focused: bool,
    detached: bool,
    notifications: Vec<ChangeNotification>,
}

impl ValueField {
    pub fn single_line() -> Self {
        Self::default()
    }

    pub fn multi_line() -> Self {
        Self {
            multi_line: true,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.caret = value.chars().count();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn notifications(&self) -> &[ChangeNotification] {
        &self.notifications
    }

    /// Simulate the field disappearing from the environment. Subsequent
    /// reads and writes fail with [`SurfaceError::Detached`].
    pub fn detach(&mut self) {
        self.detached = true;
    }

    fn check_attached(&self) -> Result<(), SurfaceError> {
        if self.detached {
            Err(SurfaceError::Detached)
        } else {
            Ok(())
        }
    }
}

impl EditableSurface for ValueField {
    fn read_current_text(&mut self) -> Result<String, SurfaceError> {
        self.check_attached()?;
        Ok(self.value.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.check_attached()?;
        self.value = text.to_string();
        self.caret = self.value.chars().count();
        self.notifications.push(ChangeNotification::InputChanged);
        self.notifications.push(ChangeNotification::ValueCommitted);
        Ok(())
    }

    fn focus_caret_to_end(&mut self) {
        if self.detached {
            return;
        }
        self.focused = true;
        self.caret = self.value.chars().count();
    }

    fn is_multi_line(&self) -> bool {
        self.multi_line
    }

    fn dispatch_submit_key(&mut self) {
        if self.detached {
            return;
        }
        self.notifications.push(ChangeNotification::SubmitKey);
    }
}

/// Free-form editable region. Always multi-line; writes emit only an input
/// notification, since there is no committed value to announce.
#[derive(Debug, Default)]
pub struct FreeformRegion {
    text: String,
    caret: usize,
    focused: bool,
    detached: bool,
    notifications: Vec<ChangeNotification>,
}

impl FreeformRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self.caret = text.chars().count();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn notifications(&self) -> &[ChangeNotification] {
        &self.notifications
    }

    pub fn detach(&mut self) {
        self.detached = true;
    }

    fn check_attached(&self) -> Result<(), SurfaceError> {
        if self.detached {
            Err(SurfaceError::Detached)
        } else {
            Ok(())
        }
    }
}

impl EditableSurface for FreeformRegion {
    fn read_current_text(&mut self) -> Result<String, SurfaceError> {
        self.check_attached()?;
        Ok(self.text.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.check_attached()?;
        self.text = text.to_string();
        self.caret = self.text.chars().count();
        self.notifications.push(ChangeNotification::InputChanged);
        Ok(())
    }

    fn focus_caret_to_end(&mut self) {
        if self.detached {
            return;
        }
        self.focused = true;
        self.caret = self.text.chars().count();
    }

    fn is_multi_line(&self) -> bool {
        true
    }

    fn dispatch_submit_key(&mut self) {
        if self.detached {
            return;
        }
        self.notifications.push(ChangeNotification::SubmitKey);
    }
}

/// Cloneable handle to a surface shared across threads.
///
/// The handle does not own the surface lifecycle. A poisoned lock reads as a
/// detached target, which the session loop already treats as terminal.
#[derive(Clone)]
pub struct SharedSurface(Arc<Mutex<dyn EditableSurface + Send>>);

impl SharedSurface {
    pub fn new<S>(surface: S) -> Self
    where
        S: EditableSurface + Send + 'static,
    {
        Self(Arc::new(Mutex::new(surface)))
    }

    /// Wrap an existing shared surface, keeping the typed `Arc` on the
    /// caller's side for direct inspection.
    pub fn from_arc<S>(surface: Arc<Mutex<S>>) -> Self
    where
        S: EditableSurface + Send + 'static,
    {
        Self(surface)
    }

    fn lock(&self) -> Result<MutexGuard<'_, dyn EditableSurface + Send + 'static>, SurfaceError> {
        self.0.lock().map_err(|_| SurfaceError::Detached)
    }
}

impl EditableSurface for SharedSurface {
    fn read_current_text(&mut self) -> Result<String, SurfaceError> {
        self.lock()?.read_current_text()
    }

    fn write_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.lock()?.write_text(text)
    }

    fn focus_caret_to_end(&mut self) {
        if let Ok(mut surface) = self.lock() {
            surface.focus_caret_to_end();
        }
    }

    fn is_multi_line(&self) -> bool {
        self.lock().map(|s| s.is_multi_line()).unwrap_or(false)
    }

    fn dispatch_submit_key(&mut self) {
        if let Ok(mut surface) = self.lock() {
            surface.dispatch_submit_key();
        }
    }
}
