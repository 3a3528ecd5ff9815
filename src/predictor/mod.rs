pub mod client;
pub mod models;

pub use client::{HttpPredictionClient, PredictionClient};
pub use models::{Prediction, PredictionRequest};
