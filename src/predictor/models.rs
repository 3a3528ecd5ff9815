use serde::{Deserialize, Serialize};

use crate::catalog::{Team, Venue};
use crate::error::PredictionError;
use crate::form::selection::CompleteSelection;

/// Body POSTed to the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub team1: Team,
    pub team2: Team,
    pub toss_winner: Team,
    pub venue: Venue,
}

impl From<CompleteSelection> for PredictionRequest {
    fn from(s: CompleteSelection) -> Self {
        PredictionRequest {
            team1: s.team1,
            team2: s.team2,
            toss_winner: s.toss_winner,
            venue: s.venue,
        }
    }
}

/// A conforming service answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Percentage (0–100) favouring `team1`.
    pub win_probability: f64,
    /// Team names echoed back by the service, when present.
    pub team1: Option<String>,
    pub team2: Option<String>,
}

/// Interpret a raw service response.
///
/// `win_probability` must be a finite JSON number within 0–100; anything else
/// (missing, a string, out of range, an `{"error": ...}` body) is malformed.
pub fn parse_prediction(raw: &serde_json::Value) -> Result<Prediction, PredictionError> {
    let Some(field) = raw.get("win_probability") else {
        let reason = match raw["error"].as_str() {
            Some(e) => format!("service error: {}", e),
            None => "missing win_probability".to_string(),
        };
        return Err(PredictionError::MalformedResponse(reason));
    };

    let win_probability = field.as_f64().ok_or_else(|| {
        PredictionError::MalformedResponse(format!("win_probability is not a number: {}", field))
    })?;

    if !win_probability.is_finite() || !(0.0..=100.0).contains(&win_probability) {
        return Err(PredictionError::MalformedResponse(format!(
            "win_probability out of range: {}",
            win_probability
        )));
    }

    Ok(Prediction {
        win_probability,
        team1: raw["team1"].as_str().map(str::to_string),
        team2: raw["team2"].as_str().map(str::to_string),
    })
}
