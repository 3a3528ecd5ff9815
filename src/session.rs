//! One shared form session.
//!
//! The controller lives behind an async mutex that is never held across the
//! network call, so the page can keep polling state (and cancel) while a
//! request is in flight. Each request runs in its own task and races a
//! deadline and a cancel signal; the task resolves the controller even if
//! the caller stops waiting.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info};

use crate::error::{PredictionError, SelectionError, SubmitError};
use crate::form::{Dispatch, FormView, PredictionFormController, SelectionPolicy, SelectionUpdate};
use crate::predictor::PredictionClient;

struct SessionInner {
    controller: PredictionFormController,
    /// Cancel signal for the in-flight request, keyed by request id.
    cancel: Option<(u64, watch::Sender<bool>)>,
}

#[derive(Clone)]
pub struct PredictionSession {
    inner: Arc<Mutex<SessionInner>>,
    client: Arc<dyn PredictionClient>,
    deadline: Duration,
}

impl PredictionSession {
    pub fn new(client: Arc<dyn PredictionClient>, deadline: Duration) -> Self {
        Self::with_policy(client, deadline, SelectionPolicy::default())
    }

    pub fn with_policy(
        client: Arc<dyn PredictionClient>,
        deadline: Duration,
        policy: SelectionPolicy,
    ) -> Self {
        PredictionSession {
            inner: Arc::new(Mutex::new(SessionInner {
                controller: PredictionFormController::with_policy(policy),
                cancel: None,
            })),
            client,
            deadline,
        }
    }

    pub async fn view(&self) -> FormView {
        self.inner.lock().await.controller.view()
    }

    pub async fn apply(&self, update: SelectionUpdate) -> Result<FormView, SelectionError> {
        let mut inner = self.inner.lock().await;
        inner.controller.apply(update)?;
        Ok(inner.controller.view())
    }

    /// Submit the form and wait until the request resolves, times out, or is
    /// cancelled.
    ///
    /// Dropping the returned future does not strand the form in `Pending`:
    /// the request task still resolves it.
    pub async fn submit(&self) -> Result<FormView, SubmitError> {
        let (dispatch, cancel_rx) = {
            let mut inner = self.inner.lock().await;
            let dispatch = inner.controller.begin_submit()?;
            let (tx, rx) = watch::channel(false);
            inner.cancel = Some((dispatch.id, tx));
            (dispatch, rx)
        };

        debug!(
            "Sending request #{} via {} (deadline {:?})",
            dispatch.id,
            self.client.name(),
            self.deadline
        );

        let task = tokio::spawn(run_request(
            self.inner.clone(),
            self.client.clone(),
            self.deadline,
            dispatch,
            cancel_rx,
        ));

        match task.await {
            Ok(view) => Ok(view),
            Err(e) => {
                error!("Request task #{} aborted: {}", dispatch.id, e);
                let mut inner = self.inner.lock().await;
                inner.controller.resolve(dispatch.id, Err(PredictionError::Cancelled));
                clear_cancel(&mut inner, dispatch.id);
                Ok(inner.controller.view())
            }
        }
    }

    /// Cancel the in-flight request, if any. The request is failed
    /// immediately; its eventual answer is discarded.
    pub async fn cancel(&self) -> FormView {
        let mut inner = self.inner.lock().await;
        if let Some(id) = inner.controller.cancel() {
            info!("Prediction #{} cancelled", id);
            if let Some((_, tx)) = inner.cancel.take() {
                let _ = tx.send(true);
            }
        }
        inner.controller.view()
    }

    pub async fn reset(&self) -> Result<FormView, SubmitError> {
        let mut inner = self.inner.lock().await;
        inner.controller.reset()?;
        Ok(inner.controller.view())
    }
}

async fn run_request(
    inner: Arc<Mutex<SessionInner>>,
    client: Arc<dyn PredictionClient>,
    deadline: Duration,
    dispatch: Dispatch,
    mut cancel_rx: watch::Receiver<bool>,
) -> FormView {
    let outcome = tokio::select! {
        res = tokio::time::timeout(deadline, client.predict(&dispatch.request)) => {
            match res {
                Ok(outcome) => outcome,
                Err(_) => Err(PredictionError::Timeout(deadline)),
            }
        }
        Ok(()) = cancel_rx.changed() => Err(PredictionError::Cancelled),
    };

    let mut inner = inner.lock().await;
    inner.controller.resolve(dispatch.id, outcome);
    clear_cancel(&mut inner, dispatch.id);
    inner.controller.view()
}

fn clear_cancel(inner: &mut SessionInner, id: u64) {
    if matches!(inner.cancel, Some((pending, _)) if pending == id) {
        inner.cancel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{City, Team, Venue, VenueCategory};
    use crate::form::controller::tests::FixedClient;
    use crate::form::{RequestLifecycle, ResultView};
    use crate::predictor::{Prediction, PredictionRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Client that answers only once `release` is notified.
    struct GatedClient {
        release: Notify,
        calls: AtomicUsize,
        probability: f64,
    }

    #[async_trait]
    impl PredictionClient for GatedClient {
        fn name(&self) -> &str {
            "gated"
        }

        async fn predict(&self, _request: &PredictionRequest) -> Result<Prediction, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(Prediction {
                win_probability: self.probability,
                team1: None,
                team2: None,
            })
        }
    }

    /// Client that never answers.
    struct SilentClient;

    #[async_trait]
    impl PredictionClient for SilentClient {
        fn name(&self) -> &str {
            "silent"
        }

        async fn predict(&self, _request: &PredictionRequest) -> Result<Prediction, PredictionError> {
            std::future::pending().await
        }
    }

    async fn fill(session: &PredictionSession) {
        for update in [
            SelectionUpdate::Team1(Some(Team::Pakistan)),
            SelectionUpdate::Team2(Some(Team::England)),
            SelectionUpdate::TossWinner(Some(Team::England)),
            SelectionUpdate::VenueCategory(VenueCategory::Cities),
            SelectionUpdate::Venue(Some(Venue::City(City::Lahore))),
        ] {
            session.apply(update).await.unwrap();
        }
    }

    async fn wait_for_pending(session: &PredictionSession) {
        while session.view().await.lifecycle != RequestLifecycle::Pending {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_submit_resolves_to_success() {
        let session = PredictionSession::new(Arc::new(FixedClient::ok(12.0)), Duration::from_secs(5));
        fill(&session).await;

        let view = session.submit().await.unwrap();
        assert_eq!(view.lifecycle, RequestLifecycle::Succeeded);
        match view.result {
            ResultView::Winner { winner, .. } => assert_eq!(winner, Team::England),
            other => panic!("Expected Winner, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_incomplete_submit_rejected() {
        let session = PredictionSession::new(Arc::new(FixedClient::ok(50.0)), Duration::from_secs(5));
        session
            .apply(SelectionUpdate::Team1(Some(Team::India)))
            .await
            .unwrap();
        assert!(matches!(
            session.submit().await,
            Err(SubmitError::Validation(_))
        ));
        assert_eq!(session.view().await.lifecycle, RequestLifecycle::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_submit_dispatches_once() {
        let client = Arc::new(GatedClient {
            release: Notify::new(),
            calls: AtomicUsize::new(0),
            probability: 80.0,
        });
        let session = PredictionSession::new(client.clone(), Duration::from_secs(5));
        fill(&session).await;

        let first = session.submit();
        let second = async {
            wait_for_pending(&session).await;
            let refused = session.submit().await;
            client.release.notify_one();
            refused
        };
        let (first, second) = futures_util::future::join(first, second).await;

        assert_eq!(second.unwrap_err(), SubmitError::AlreadyPending);
        let view = first.unwrap();
        assert_eq!(view.lifecycle, RequestLifecycle::Succeeded);
        match view.result {
            ResultView::Winner { winner, .. } => assert_eq!(winner, Team::Pakistan),
            other => panic!("Expected Winner, got {:?}", other),
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deadline_fails_pending_request() {
        let session = PredictionSession::new(Arc::new(SilentClient), Duration::from_millis(50));
        fill(&session).await;

        let view = session.submit().await.unwrap();
        assert_eq!(view.lifecycle, RequestLifecycle::Failed);
        assert!(matches!(view.result, ResultView::Error { .. }));
    }

    #[tokio::test]
    async fn test_cancel_fails_pending_request() {
        let session = PredictionSession::new(Arc::new(SilentClient), Duration::from_secs(60));
        fill(&session).await;

        let submit = session.submit();
        let cancel = async {
            wait_for_pending(&session).await;
            session.cancel().await
        };
        let (submitted, cancelled) = futures_util::future::join(submit, cancel).await;

        assert_eq!(cancelled.lifecycle, RequestLifecycle::Failed);
        assert_eq!(submitted.unwrap().lifecycle, RequestLifecycle::Failed);

        // The form accepts a new submission afterwards.
        let view = session.view().await;
        assert!(view.submit_enabled);
    }

    #[tokio::test]
    async fn test_abandoned_submit_still_resolves() {
        let session = PredictionSession::new(Arc::new(SilentClient), Duration::from_millis(50));
        fill(&session).await;

        // Caller gives up long before the deadline.
        let abandoned = tokio::time::timeout(Duration::from_millis(10), session.submit()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        let view = session.view().await;
        assert_eq!(view.lifecycle, RequestLifecycle::Failed);
        assert!(view.submit_enabled);

        // The form accepts a new submission.
        let view = session.submit().await.unwrap();
        assert_eq!(view.lifecycle, RequestLifecycle::Failed);
    }

    #[tokio::test]
    async fn test_abandoned_submit_keeps_late_answer() {
        let client = Arc::new(GatedClient {
            release: Notify::new(),
            calls: AtomicUsize::new(0),
            probability: 70.0,
        });
        let session = PredictionSession::new(client.clone(), Duration::from_secs(5));
        fill(&session).await;

        let abandoned = tokio::time::timeout(Duration::from_millis(10), session.submit()).await;
        assert!(abandoned.is_err());
        assert_eq!(session.view().await.lifecycle, RequestLifecycle::Pending);

        client.release.notify_one();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let view = session.view().await;
        assert_eq!(view.lifecycle, RequestLifecycle::Succeeded);
        match view.result {
            ResultView::Winner { winner, .. } => assert_eq!(winner, Team::Pakistan),
            other => panic!("Expected Winner, got {:?}", other),
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_answer_fails() {
        let session = PredictionSession::new(Arc::new(FixedClient::ok(150.0)), Duration::from_secs(5));
        fill(&session).await;

        let view = session.submit().await.unwrap();
        assert_eq!(view.lifecycle, RequestLifecycle::Failed);
        assert!(matches!(view.result, ResultView::Error { .. }));
    }

    #[tokio::test]
    async fn test_strict_session_rejects_duplicate_team() {
        let session = PredictionSession::with_policy(
            Arc::new(FixedClient::ok(50.0)),
            Duration::from_secs(5),
            SelectionPolicy::Strict,
        );
        session
            .apply(SelectionUpdate::Team1(Some(Team::India)))
            .await
            .unwrap();
        assert!(session
            .apply(SelectionUpdate::Team2(Some(Team::India)))
            .await
            .is_err());

        session.reset().await.unwrap();
        session
            .apply(SelectionUpdate::Team1(Some(Team::India)))
            .await
            .unwrap();
        assert!(session
            .apply(SelectionUpdate::Team2(Some(Team::India)))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_reset_refused_while_pending() {
        let session = PredictionSession::new(Arc::new(SilentClient), Duration::from_secs(60));
        fill(&session).await;

        let submit = session.submit();
        let reset = async {
            wait_for_pending(&session).await;
            let refused = session.reset().await;
            session.cancel().await;
            refused
        };
        let (_, refused) = futures_util::future::join(submit, reset).await;
        assert_eq!(refused.unwrap_err(), SubmitError::AlreadyPending);

        let view = session.reset().await.unwrap();
        assert_eq!(view.lifecycle, RequestLifecycle::Idle);
        assert_eq!(view.selection.team1(), None);
    }
}
