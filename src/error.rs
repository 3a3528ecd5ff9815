use thiserror::Error;

use crate::catalog::Team;

/// Text shown to the user for every failed prediction, whatever the cause.
pub const PREDICTION_FAILED_MESSAGE: &str = "Failed to fetch prediction. Try again later.";

/// Blocking notice shown when the form is submitted incomplete.
pub const INCOMPLETE_FORM_MESSAGE: &str = "Please select all fields!";

/// A required form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Team1,
    Team2,
    TossWinner,
    Venue,
}

/// One or more required selections were missing at submit time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Please select all fields! (missing: {missing:?})")]
pub struct ValidationError {
    pub missing: Vec<Field>,
}

/// A setter received a value outside the candidate set it currently offers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{value} is not offered for {field:?}")]
    NotOffered { field: Field, value: String },

    #[error("toss winner can only be chosen once both teams are selected")]
    TossUnavailable,
}

/// Why a submit did not dispatch a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a prediction request is already in flight")]
    AlreadyPending,
}

/// A prediction request that did not produce a usable probability.
///
/// All variants are shown to the user as [`PREDICTION_FAILED_MESSAGE`].
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("prediction request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("prediction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("prediction request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("prediction request cancelled")]
    Cancelled,

    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),
}

impl SelectionError {
    pub fn not_offered(field: Field, team: Team) -> Self {
        SelectionError::NotOffered {
            field,
            value: team.to_string(),
        }
    }
}
