use std::collections::HashMap;

use thiserror::Error;

use crate::extract::normalize_extracted_text;
use crate::surface::{EditableSurface, SharedSurface};

/// Selector-path failures, reported synchronously to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Element not found")]
    NotFound,
    #[error("Element is not editable")]
    NotEditable,
}

/// External collaborator that knows where typing should land.
pub trait TargetResolver {
    /// The surface that should receive typing right now: the focused
    /// editable surface if any, else the most recently touched editable
    /// surface, else nothing.
    fn resolve_target(&mut self) -> Option<SharedSurface>;

    /// Locator-based lookup for the selector start path. Resolution focuses
    /// the surface as a side effect.
    fn resolve_selector(&mut self, selector: &str) -> Result<SharedSurface, ResolveError>;

    /// Extract the text behind a locator, normalized for re-typing.
    fn extract_text(&mut self, selector: &str) -> Result<String, ResolveError>;
}

enum Entry {
    Editable(SharedSurface),
    /// Display-only content; can be extracted from, never typed into.
    Static(String),
}

/// Reference resolver tracking focus and pointer-down history over a set of
/// named surfaces.
#[derive(Default)]
pub struct FocusRegistry {
    entries: HashMap<String, Entry>,
    focused: Option<String>,
    last_active: Option<String>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, surface: SharedSurface) {
        self.entries
            .insert(name.to_string(), Entry::Editable(surface));
    }

    pub fn insert_static(&mut self, name: &str, text: &str) {
        self.entries
            .insert(name.to_string(), Entry::Static(text.to_string()));
    }

    /// Record that a surface took input focus. Non-editable entries are
    /// still tracked; resolution filters them out.
    pub fn focus(&mut self, name: &str) {
        self.focused = Some(name.to_string());
        self.last_active = Some(name.to_string());
    }

    /// Record a pointer-down on a surface without moving focus.
    pub fn touch(&mut self, name: &str) {
        self.last_active = Some(name.to_string());
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    fn editable(&self, name: &str) -> Option<SharedSurface> {
        match self.entries.get(name) {
            Some(Entry::Editable(surface)) => Some(surface.clone()),
            _ => None,
        }
    }
}

impl TargetResolver for FocusRegistry {
    fn resolve_target(&mut self) -> Option<SharedSurface> {
        if let Some(surface) = self.focused.as_deref().and_then(|n| self.editable(n)) {
            return Some(surface);
        }
        self.last_active.as_deref().and_then(|n| self.editable(n))
    }

    fn resolve_selector(&mut self, selector: &str) -> Result<SharedSurface, ResolveError> {
        match self.entries.get(selector) {
            Some(Entry::Editable(surface)) => {
                let surface = surface.clone();
                self.focus(selector);
                Ok(surface)
            }
            Some(Entry::Static(_)) => Err(ResolveError::NotEditable),
            None => Err(ResolveError::NotFound),
        }
    }

    fn extract_text(&mut self, selector: &str) -> Result<String, ResolveError> {
        match self.entries.get(selector) {
            // Value-holding surfaces report their content verbatim.
            Some(Entry::Editable(surface)) => {
                let mut surface = surface.clone();
                surface
                    .read_current_text()
                    .map_err(|_| ResolveError::NotFound)
            }
            Some(Entry::Static(text)) => Ok(normalize_extracted_text(text)),
            None => Err(ResolveError::NotFound),
        }
    }
}
