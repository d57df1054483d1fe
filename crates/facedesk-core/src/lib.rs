//! facedesk-core — Recognition workflow and result model for the facedesk admin client.
//!
//! Owns no recognition logic: results are produced by the backend and only
//! classified and rendered here.

pub mod error;
pub mod notify;
pub mod render;
pub mod selection;
pub mod types;
pub mod workflow;

pub use error::{ApiError, SelectError, CONNECT_FAILED};
pub use notify::{Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use render::ResultView;
pub use selection::{Preview, SelectedFile};
pub use types::{
    ApiResponse, IdentitiesResponse, IdentityEntry, LogResponse, PersonDetails, RebuildStatus,
    RecognitionResult, StatsResponse, TopMatch,
};
pub use workflow::{Outcome, Recognizer, Submission, SubmissionToken, Workflow, WorkflowState};
