//! Upload/test workflow for a single recognition attempt.
//!
//! States: `Idle → FileSelected → Submitting → ResultShown`, with `clear()`
//! returning to `Idle` from any state. Only one request is tracked at a time;
//! responses carrying a superseded token are dropped.

use crate::error::{ApiError, CONNECT_FAILED};
use crate::notify::{Notifier, Severity};
use crate::selection::{Preview, SelectedFile};
use crate::types::RecognitionResult;
use std::future::Future;

const NO_FILE_SELECTED: &str = "Please select an image first";
const RECOGNITION_FAILED: &str = "Recognition failed";
const NOT_RECOGNIZED: &str = "Face detected but not recognized";

/// Backend capability the workflow submits to.
pub trait Recognizer {
    fn recognize(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<RecognitionResult, ApiError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    FileSelected,
    Submitting,
    ResultShown,
}

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionToken(u64);

impl SubmissionToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A request the caller must now send, then hand back to [`Workflow::complete`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub token: SubmissionToken,
    pub file: SelectedFile,
}

/// What a finished attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The backend answered; `success` may still be false.
    Response(RecognitionResult),
    /// Transport or non-2xx failure.
    Failed { message: String },
}

impl Outcome {
    fn from_result(result: Result<RecognitionResult, ApiError>) -> Self {
        match result {
            Ok(result) => Outcome::Response(result),
            Err(err) => Outcome::Failed {
                message: err.user_message(CONNECT_FAILED).to_string(),
            },
        }
    }

    /// Notification text and severity for this outcome.
    pub fn classify(&self) -> (String, Severity) {
        match self {
            Outcome::Response(r) if !r.success() => (failure_message(r).to_string(), Severity::Error),
            Outcome::Response(r) if !r.recognized() => (NOT_RECOGNIZED.to_string(), Severity::Warning),
            Outcome::Response(r) => (format!("Recognized: {}", r.person_name()), Severity::Success),
            Outcome::Failed { message } => (message.clone(), Severity::Error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.classify().1 == Severity::Error
    }
}

/// Error text for a `success=false` body. An empty `error` counts as absent.
pub(crate) fn failure_message(result: &RecognitionResult) -> &str {
    result
        .error()
        .filter(|e| !e.is_empty())
        .unwrap_or(RECOGNITION_FAILED)
}

pub struct Workflow<N> {
    notifier: N,
    state: WorkflowState,
    file: Option<SelectedFile>,
    preview: Option<Preview>,
    outcome: Option<Outcome>,
    in_flight: Option<SubmissionToken>,
    next_token: u64,
}

impl<N: Notifier> Workflow<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            state: WorkflowState::Idle,
            file: None,
            preview: None,
            outcome: None,
            in_flight: None,
            next_token: 0,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Whether the submit trigger is enabled: a file is selected and nothing is pending.
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && self.in_flight.is_none()
    }

    /// Replace the selection. Clears any previous result and abandons a pending request.
    pub fn select_file(&mut self, file: SelectedFile) {
        if let Some(token) = self.in_flight.take() {
            tracing::debug!(token = token.get(), "selection changed; abandoning pending request");
        }
        self.preview = Some(file.preview());
        self.file = Some(file);
        self.outcome = None;
        self.state = WorkflowState::FileSelected;
    }

    /// Start an attempt. Returns `None` without sending anything when no file is
    /// selected (after warning the user) or when a request is already pending.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        let Some(file) = self.file.clone() else {
            self.notifier.notify(NO_FILE_SELECTED, Severity::Warning);
            return None;
        };
        if let Some(pending) = self.in_flight {
            tracing::debug!(token = pending.get(), "submit ignored; request already pending");
            return None;
        }

        self.next_token += 1;
        let token = SubmissionToken(self.next_token);
        self.in_flight = Some(token);
        self.state = WorkflowState::Submitting;
        tracing::info!(token = token.get(), file = %file.file_name, "recognition submitted");

        Some(Submission { token, file })
    }

    /// Apply the response for `token`. Returns `false` if the token is stale and
    /// the response was dropped.
    pub fn complete(&mut self, token: SubmissionToken, result: Result<RecognitionResult, ApiError>) -> bool {
        if self.in_flight != Some(token) {
            tracing::debug!(token = token.get(), "discarding stale recognition response");
            return false;
        }
        if let Err(err) = &result {
            tracing::warn!(error = %err, "recognition request failed");
        }

        let outcome = Outcome::from_result(result);
        let (message, severity) = outcome.classify();
        self.notifier.notify(&message, severity);

        self.in_flight = None;
        self.outcome = Some(outcome);
        self.state = WorkflowState::ResultShown;
        true
    }

    /// Submit the selected file and wait for the outcome.
    pub async fn submit<R: Recognizer>(&mut self, recognizer: &R) -> Option<&Outcome> {
        let Submission { token, file } = self.begin_submit()?;
        let result = recognizer.recognize(&file).await;
        self.complete(token, result);
        self.outcome.as_ref()
    }

    /// Discard file, preview and result.
    pub fn clear(&mut self) {
        self.file = None;
        self.preview = None;
        self.outcome = None;
        self.in_flight = None;
        self.state = WorkflowState::Idle;
    }
}
