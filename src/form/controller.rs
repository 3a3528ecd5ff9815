use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::display::FormView;
use super::selection::{SelectionPolicy, SelectionState, SelectionUpdate};
use crate::catalog::{Team, Venue, VenueCategory};
use crate::error::{PredictionError, SelectionError, SubmitError, PREDICTION_FAILED_MESSAGE};
use crate::predictor::{Prediction, PredictionClient, PredictionRequest};

/// Progress of the current prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RequestLifecycle {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Outcome of a completed request. Replaced on every new submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionResult {
    Success {
        /// Teams as they were when the request was dispatched.
        team1: Team,
        team2: Team,
        win_probability: f64,
        resolved_at: DateTime<Utc>,
    },
    Failure {
        error_message: String,
        resolved_at: DateTime<Utc>,
    },
}

/// A request handed out by [`PredictionFormController::begin_submit`].
///
/// The caller sends `request` and reports back with [`PredictionFormController::resolve`]
/// using the same `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub id: u64,
    pub request: PredictionRequest,
}

/// Owns the form selections, the request lifecycle and the last result.
#[derive(Debug, Default)]
pub struct PredictionFormController {
    selection: SelectionState,
    lifecycle: RequestLifecycle,
    result: Option<PredictionResult>,
    in_flight: Option<Dispatch>,
    next_request_id: u64,
}

impl PredictionFormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SelectionPolicy) -> Self {
        PredictionFormController {
            selection: SelectionState::with_policy(policy),
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn lifecycle(&self) -> RequestLifecycle {
        self.lifecycle
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn view(&self) -> FormView {
        FormView::derive(&self.selection, self.lifecycle, self.result.as_ref())
    }

    // ── Selection ────────────────────────────────────────────────────────────

    pub fn apply(&mut self, update: SelectionUpdate) -> Result<(), SelectionError> {
        self.selection.apply(update)?;
        debug!("Selection updated: {:?}", update);
        Ok(())
    }

    pub fn set_team1(&mut self, team: Option<Team>) -> Result<(), SelectionError> {
        self.apply(SelectionUpdate::Team1(team))
    }

    pub fn set_team2(&mut self, team: Option<Team>) -> Result<(), SelectionError> {
        self.apply(SelectionUpdate::Team2(team))
    }

    pub fn set_toss_winner(&mut self, team: Option<Team>) -> Result<(), SelectionError> {
        self.apply(SelectionUpdate::TossWinner(team))
    }

    pub fn set_venue_category(&mut self, category: VenueCategory) -> Result<(), SelectionError> {
        self.apply(SelectionUpdate::VenueCategory(category))
    }

    pub fn set_venue(&mut self, venue: Option<Venue>) -> Result<(), SelectionError> {
        self.apply(SelectionUpdate::Venue(venue))
    }

    // ── Request lifecycle ────────────────────────────────────────────────────

    /// Validate the form and move to `Pending`.
    ///
    /// Refused without any state change while a request is already pending
    /// or when a required field is empty.
    pub fn begin_submit(&mut self) -> Result<Dispatch, SubmitError> {
        if self.lifecycle == RequestLifecycle::Pending {
            let pending = self.in_flight.map(|d| d.id).unwrap_or_default();
            warn!("Submit ignored: request #{} still pending", pending);
            return Err(SubmitError::AlreadyPending);
        }
        let complete = self.selection.complete()?;

        self.next_request_id += 1;
        let dispatch = Dispatch {
            id: self.next_request_id,
            request: complete.into(),
        };
        self.lifecycle = RequestLifecycle::Pending;
        self.result = None;
        self.in_flight = Some(dispatch);
        info!(
            "Prediction #{} requested: {} vs {} (toss: {}, venue: {})",
            dispatch.id,
            dispatch.request.team1,
            dispatch.request.team2,
            dispatch.request.toss_winner,
            dispatch.request.venue
        );
        Ok(dispatch)
    }

    /// Record the outcome of request `id`.
    ///
    /// Returns `false` when `id` is not the in-flight request (already
    /// cancelled or superseded); the outcome is then dropped.
    pub fn resolve(&mut self, id: u64, outcome: Result<Prediction, PredictionError>) -> bool {
        let dispatch = match self.in_flight {
            Some(d) if d.id == id => d,
            _ => {
                debug!("Dropping stale outcome for request #{}", id);
                return false;
            }
        };
        self.in_flight = None;

        let outcome = outcome.and_then(|prediction| {
            let p = prediction.win_probability;
            if p.is_finite() && (0.0..=100.0).contains(&p) {
                Ok(prediction)
            } else {
                Err(PredictionError::MalformedResponse(format!(
                    "win_probability out of range: {}",
                    p
                )))
            }
        });

        match outcome {
            Ok(prediction) => {
                if let (Some(t1), Some(t2)) = (&prediction.team1, &prediction.team2) {
                    if t1 != dispatch.request.team1.as_str() || t2 != dispatch.request.team2.as_str() {
                        warn!(
                            "Service echoed {} vs {} for request {} vs {}",
                            t1, t2, dispatch.request.team1, dispatch.request.team2
                        );
                    }
                }
                self.result = Some(PredictionResult::Success {
                    team1: dispatch.request.team1,
                    team2: dispatch.request.team2,
                    win_probability: prediction.win_probability,
                    resolved_at: Utc::now(),
                });
                self.lifecycle = RequestLifecycle::Succeeded;
                info!("Prediction #{} succeeded: {:.2}%", id, prediction.win_probability);
            }
            Err(e) => {
                warn!("Prediction #{} failed: {}", id, e);
                self.result = Some(PredictionResult::Failure {
                    error_message: PREDICTION_FAILED_MESSAGE.to_string(),
                    resolved_at: Utc::now(),
                });
                self.lifecycle = RequestLifecycle::Failed;
            }
        }
        true
    }

    /// Fail the in-flight request as cancelled. Returns the cancelled id, if any.
    pub fn cancel(&mut self) -> Option<u64> {
        let id = self.in_flight?.id;
        self.resolve(id, Err(PredictionError::Cancelled));
        Some(id)
    }

    /// Clear the form and result. Refused while a request is pending.
    pub fn reset(&mut self) -> Result<(), SubmitError> {
        if self.lifecycle == RequestLifecycle::Pending {
            return Err(SubmitError::AlreadyPending);
        }
        self.selection = SelectionState::with_policy(self.selection.policy());
        self.result = None;
        self.lifecycle = RequestLifecycle::Idle;
        Ok(())
    }

    /// Submit and wait for the answer in one go.
    ///
    /// Holds `&mut self` across the request, so no other edit can interleave;
    /// [`crate::session::PredictionSession`] is the shared, cancellable variant.
    pub async fn submit(
        &mut self,
        client: &dyn PredictionClient,
    ) -> Result<RequestLifecycle, SubmitError> {
        let dispatch = self.begin_submit()?;
        let outcome = client.predict(&dispatch.request).await;
        self.resolve(dispatch.id, outcome);
        Ok(self.lifecycle)
    }
}
