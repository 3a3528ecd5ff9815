//! Everything the page shows, derived from controller state alone.

use serde::Serialize;

use super::controller::{PredictionResult, RequestLifecycle};
use super::selection::SelectionState;
use crate::catalog::{Team, Venue};

pub const SUBMIT_LABEL: &str = "Predict Match Outcome";
pub const SUBMIT_LABEL_PENDING: &str = "Predicting...";

/// Team shown as the predicted winner. A probability of exactly 50 goes to team2.
pub fn predicted_winner(team1: Team, team2: Team, win_probability: f64) -> Team {
    if win_probability > 50.0 {
        team1
    } else {
        team2
    }
}

/// Progress bar fill, in percent of the bar width.
pub fn bar_width_pct(win_probability: f64) -> f64 {
    win_probability
}

/// Text drawn inside the progress bar, e.g. `64.50%`.
pub fn probability_label(win_probability: f64) -> String {
    format!("{:.2}%", win_probability)
}

/// The single result panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResultView {
    Hidden,
    Loading,
    Winner {
        winner: Team,
        team1: Team,
        team2: Team,
        win_probability: f64,
        bar_width_pct: f64,
        label: String,
    },
    Error {
        message: String,
    },
}

impl ResultView {
    fn derive(lifecycle: RequestLifecycle, result: Option<&PredictionResult>) -> Self {
        match (lifecycle, result) {
            (RequestLifecycle::Pending, _) => ResultView::Loading,
            (
                _,
                Some(PredictionResult::Success {
                    team1,
                    team2,
                    win_probability,
                    ..
                }),
            ) => ResultView::Winner {
                winner: predicted_winner(*team1, *team2, *win_probability),
                team1: *team1,
                team2: *team2,
                win_probability: *win_probability,
                bar_width_pct: bar_width_pct(*win_probability),
                label: probability_label(*win_probability),
            },
            (_, Some(PredictionResult::Failure { error_message, .. })) => ResultView::Error {
                message: error_message.clone(),
            },
            (_, None) => ResultView::Hidden,
        }
    }
}

/// Full page model: selections, the options each selector offers, and the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub selection: SelectionState,
    pub team1_options: Vec<Team>,
    pub team2_options: Vec<Team>,
    /// Empty until both teams are chosen.
    pub toss_options: Vec<Team>,
    pub venue_options: Vec<Venue>,
    pub lifecycle: RequestLifecycle,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub result: ResultView,
}

impl FormView {
    pub fn derive(
        selection: &SelectionState,
        lifecycle: RequestLifecycle,
        result: Option<&PredictionResult>,
    ) -> Self {
        let pending = lifecycle == RequestLifecycle::Pending;
        FormView {
            selection: *selection,
            team1_options: selection.team1_options(),
            team2_options: selection.team2_options(),
            toss_options: selection.toss_options(),
            venue_options: selection.venue_options(),
            lifecycle,
            submit_label: if pending {
                SUBMIT_LABEL_PENDING
            } else {
                SUBMIT_LABEL
            },
            submit_enabled: !pending,
            result: ResultView::derive(lifecycle, result),
        }
    }
}
