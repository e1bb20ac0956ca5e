//! Import session state machine
//!
//! One session per uploaded spreadsheet, progressing one way through:
//! EMPTY → PARSED → VALIDATED → SUBMITTING → COMPLETED | FAILED
//!
//! A second upload creates a fresh session; sessions are never merged.

use chrono::{DateTime, Utc};
use gvs_common::records::GraduateRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validators::BatchValidation;

/// Import session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    /// Session created, no records parsed yet
    Empty,
    /// Spreadsheet decoded into records
    Parsed,
    /// Records classified, preview available
    Validated,
    /// Batch handed to the backend verification service (busy flag)
    Submitting,
    /// Backend accepted the batch
    Completed,
    /// Parse or transport failure; the whole batch is not-imported
    Failed,
}

/// Import session (in-memory, one per uploaded spreadsheet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Current state
    pub state: SessionState,

    /// Institution the batch belongs to (session metadata, user-entered)
    pub institution_name: String,

    /// Graduation year for the batch (session metadata, user-entered)
    pub year: String,

    /// Parsed records in file order
    pub records: Vec<GraduateRecord>,

    /// Batch validation outcome; results are keyed by row index
    pub validation: Option<BatchValidation>,

    /// Count of records the backend reported as accepted
    pub accepted_count: Option<u64>,

    /// Terminal error message, if the session failed
    pub error: Option<String>,

    /// Session start time
    pub started_at: DateTime<Utc>,

    /// Session end time (if completed/failed)
    pub ended_at: Option<DateTime<Utc>>,
}

impl ImportSession {
    /// Create a new empty session for the given metadata
    pub fn new(institution_name: String, year: String) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Empty,
            institution_name,
            year,
            records: Vec::new(),
            validation: None,
            accepted_count: None,
            error: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to a new state
    pub fn transition_to(&mut self, new_state: SessionState) {
        self.state = new_state;

        // Set end time for terminal states
        if matches!(new_state, SessionState::Completed | SessionState::Failed) {
            self.ended_at = Some(Utc::now());
        }
    }

    /// Check if the session is finished (no further submissions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SessionState::Completed | SessionState::Failed)
    }

    /// Check if a submission is in flight
    pub fn is_submitting(&self) -> bool {
        self.state == SessionState::Submitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_empty() {
        let session = ImportSession::new("X University".to_string(), "2024".to_string());
        assert_eq!(session.state, SessionState::Empty);
        assert!(!session.is_terminal());
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn terminal_transition_sets_end_time() {
        let mut session = ImportSession::new("X University".to_string(), "2024".to_string());
        session.transition_to(SessionState::Parsed);
        session.transition_to(SessionState::Validated);
        assert!(session.ended_at.is_none());

        session.transition_to(SessionState::Completed);
        assert!(session.is_terminal());
        assert!(session.ended_at.is_some());
    }

    #[test]
    fn submitting_is_busy_but_not_terminal() {
        let mut session = ImportSession::new("X University".to_string(), "2024".to_string());
        session.transition_to(SessionState::Submitting);
        assert!(session.is_submitting());
        assert!(!session.is_terminal());
    }
}
