//! Cricket match predictor.
//!
//! A single form session picks two teams, a toss winner and a venue, then
//! asks a remote inference service for team1's win probability. The
//! [`form`] module holds the state machine; [`session`] drives it against a
//! [`predictor::PredictionClient`]; [`dashboard`] serves it over HTTP.

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod predictor;
pub mod session;
