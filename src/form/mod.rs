pub mod controller;
pub mod display;
pub mod selection;

pub use controller::{Dispatch, PredictionFormController, PredictionResult, RequestLifecycle};
pub use display::{FormView, ResultView};
pub use selection::{SelectionPolicy, SelectionState, SelectionUpdate};
