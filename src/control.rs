use std::thread;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::TypingOptions;
use crate::resolve::TargetResolver;
use crate::session::{SessionController, SessionOutcome};

/// Control messages, independent of any particular transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Start {
        #[serde(flatten)]
        options: TypingOptions,
    },
    Stop,
    StartAtSelector {
        selector: String,
        #[serde(flatten)]
        options: TypingOptions,
    },
    ExtractText {
        selector: String,
    },
}

/// Synchronous acknowledgment for a control message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            text: None,
        }
    }

    pub fn ok_with_text(text: String) -> Self {
        Self {
            success: true,
            error: None,
            text: Some(text),
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            text: None,
        }
    }
}

/// Failure to begin a session at all. Distinct from cancellation, which is a
/// normal terminal state and never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("No editable target")]
    NoTarget,
}

/// Dispatches control messages onto a [`SessionController`].
///
/// Sessions run on a worker thread so stop requests can be processed while
/// typing is in flight. The last nonempty text that was typed or extracted
/// is kept as the default for start requests that omit text.
pub struct TypingService<R> {
    resolver: R,
    controller: SessionController,
    last_text: Option<String>,
    worker: Option<thread::JoinHandle<SessionOutcome>>,
    seed: Option<u64>,
}

impl<R: TargetResolver> TypingService<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            controller: SessionController::new(),
            last_text: None,
            worker: None,
            seed: None,
        }
    }

    /// Fix the RNG seed for every session this service starts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    pub fn handle(&mut self, request: Request) -> Ack {
        match request {
            Request::Start { options } => self.start(None, options),
            Request::Stop => {
                self.controller.stop();
                Ack::ok()
            }
            Request::StartAtSelector { selector, options } => self.start(Some(&selector), options),
            Request::ExtractText { selector } => match self.resolver.extract_text(&selector) {
                Ok(text) => {
                    if !text.is_empty() {
                        self.last_text = Some(text.clone());
                    }
                    Ack::ok_with_text(text)
                }
                Err(err) => Ack::err(err.to_string()),
            },
        }
    }

    /// Wait for the in-flight session, if any, and return its outcome.
    pub fn wait(&mut self) -> Option<SessionOutcome> {
        self.worker.take().and_then(|worker| worker.join().ok())
    }

    fn start(&mut self, selector: Option<&str>, mut options: TypingOptions) -> Ack {
        self.reap();
        if self.controller.is_running() {
            // Re-entrant start is an idempotent no-op, not an error.
            return Ack::ok();
        }

        if options.text.is_empty() {
            options.text = self.last_text.clone().unwrap_or_default();
        } else {
            self.last_text = Some(options.text.clone());
        }

        let surface = match selector {
            Some(selector) => match self.resolver.resolve_selector(selector) {
                Ok(surface) => surface,
                Err(err) => return Ack::err(err.to_string()),
            },
            None => match self.resolver.resolve_target() {
                Some(surface) => surface,
                None => return Ack::err(StartError::NoTarget.to_string()),
            },
        };

        let controller = self.controller.clone();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.worker = Some(thread::spawn(move || {
            let mut surface = surface;
            controller.run(&mut surface, &options, &mut rng)
        }));

        Ack::ok()
    }

    fn reap(&mut self) {
        if !self.controller.is_running() {
            if let Some(worker) = self.worker.take() {
                let _ = worker.join();
            }
        }
    }
}
