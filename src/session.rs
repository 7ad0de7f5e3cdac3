//! One user action at a time: form in, rendered images out.

use crate::error::{Result, Text2ImageError};
use crate::form::GenerationForm;
use crate::generator::Generator;
use crate::image::providers::HuggingFaceFactory;
use crate::image::HandleFactory;
use crate::present::{render, Presenter};
use futures::StreamExt;

/// Where the session is in handling a generate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user.
    Idle,
    /// Looking up the token and client handle.
    ResolvingCredential,
    /// Waiting on the `index`-th (1-based) of `total` remote calls.
    Requesting {
        /// Current call.
        index: u32,
        /// Calls in the batch.
        total: u32,
    },
    /// Every image of the batch has been shown.
    DisplayingResults {
        /// Images shown.
        shown: u32,
    },
}

/// Drives generate actions through the session state machine.
pub struct Session<F = HuggingFaceFactory> {
    generator: Generator<F>,
    state: SessionState,
    history: Vec<SessionState>,
    last_error: Option<String>,
}

impl Session<HuggingFaceFactory> {
    /// Creates a session against the Hugging Face API.
    pub fn new() -> Self {
        Self::with_generator(Generator::new())
    }
}

impl Default for Session<HuggingFaceFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: HandleFactory> Session<F> {
    /// Creates a session around an existing generator.
    pub fn with_generator(generator: Generator<F>) -> Self {
        Self {
            generator,
            state: SessionState::Idle,
            history: vec![SessionState::Idle],
            last_error: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// States entered during the latest generate action, starting from `Idle`.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    /// Message of the error that ended the last action, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the generator.
    pub fn generator(&mut self) -> &mut Generator<F> {
        &mut self.generator
    }

    fn enter(&mut self, state: SessionState) {
        tracing::trace!(from = ?self.state, to = ?state, "session transition");
        self.state = state;
        self.history.push(state);
    }

    fn fail(&mut self, err: Text2ImageError, presenter: &mut dyn Presenter) -> Text2ImageError {
        let message = err.to_string();
        if err.is_generation_failure() {
            tracing::warn!("generate action failed: {message}");
        } else {
            tracing::error!("generate action failed: {message}");
        }
        presenter.error(&message);
        self.last_error = Some(message);
        self.enter(SessionState::Idle);
        err
    }

    /// Handles a press of the generate button.
    ///
    /// Returns the number of images shown. A form whose generate action is
    /// disabled does nothing. Any error is shown to the presenter, ends the
    /// action and is returned.
    pub async fn submit(
        &mut self,
        form: &GenerationForm,
        presenter: &mut dyn Presenter,
    ) -> Result<u32> {
        if self.state != SessionState::Idle {
            tracing::trace!(from = ?self.state, "session reset to idle");
        }
        self.state = SessionState::Idle;
        self.history.clear();
        self.history.push(SessionState::Idle);
        if !form.generate_enabled() {
            tracing::debug!("generate pressed with blank prompt, ignoring");
            return Ok(0);
        }
        self.last_error = None;

        let (request, total) = match form.to_request() {
            Ok(parts) => parts,
            Err(e) => return Err(self.fail(e, presenter)),
        };

        self.enter(SessionState::ResolvingCredential);
        let mut stream = match self.generator.generate(&request, total) {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail(e, presenter)),
        };

        for index in 1..=total {
            self.enter(SessionState::Requesting { index, total });
            presenter.progress(index, total);

            let shown = match stream.next().await {
                Some(Ok(result)) => render(result).and_then(|r| presenter.show(index, total, r)),
                Some(Err(e)) => Err(e),
                None => Err(Text2ImageError::remote("batch ended early")),
            };
            if let Err(e) = shown {
                return Err(self.fail(e, presenter));
            }
        }

        self.enter(SessionState::DisplayingResults { shown: total });
        Ok(total)
    }
}
