use clap::Parser;
use std::time::Duration;

use crate::form::SelectionPolicy;

/// Cricket match predictor: pick teams, toss and venue, ask the model
#[derive(Parser, Debug, Clone)]
#[command(name = "match-predictor", version, about)]
pub struct Config {
    /// Prediction service endpoint (receives POSTed match setups)
    #[arg(
        long,
        env = "SERVICE_URL",
        default_value = "http://127.0.0.1:5000/predict"
    )]
    pub service_url: String,

    /// Address the form UI listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen_addr: String,

    /// Deadline for a single prediction request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Reject duplicate teams and venues outside the chosen category
    #[arg(long, env = "STRICT_SELECTION", default_value = "false")]
    pub strict_selection: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.service_url)
            .map_err(|e| anyhow::anyhow!("service_url '{}' is invalid: {}", self.service_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("service_url must use http or https, got '{}'", url.scheme());
        }
        if !(1..=300).contains(&self.request_timeout_secs) {
            anyhow::bail!("request_timeout_secs must be between 1 and 300");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        if self.strict_selection {
            SelectionPolicy::Strict
        } else {
            SelectionPolicy::Permissive
        }
    }
}
