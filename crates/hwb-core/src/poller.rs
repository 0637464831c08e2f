//! The poll loop: fetch → validate → notify → sleep, forever.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    errors::Error,
    ports::{HomeworkApi, Notifier},
    response::{extract_homeworks, format_status_message, server_timestamp},
    Result,
};

/// Last successfully observed server time. Owned by the poller, never
/// persisted; restarts begin again from the current wall clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollState {
    pub from_date: i64,
}

impl PollState {
    pub fn now() -> Self {
        Self {
            from_date: Utc::now().timestamp(),
        }
    }
}

/// The orchestrator. Single task, one cycle at a time, no shared state
/// beyond the poll watermark it owns.
pub struct Poller {
    api: Arc<dyn HomeworkApi>,
    notifier: Arc<dyn Notifier>,
    retry_time: Duration,
    notify_failure_limit: u32,
    state: PollState,
    consecutive_notify_failures: u32,
}

impl Poller {
    pub fn new(cfg: &Config, api: Arc<dyn HomeworkApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            retry_time: cfg.retry_time,
            notify_failure_limit: cfg.notify_failure_limit,
            state: PollState::now(),
            consecutive_notify_failures: 0,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Poll until the surrounding task is dropped. Ordinary errors never
    /// stop the loop; only a process-level interrupt does.
    pub async fn run(&mut self) {
        info!(
            "polling every {:?}, starting from_date={}",
            self.retry_time, self.state.from_date
        );
        loop {
            self.run_once().await;
            sleep(self.retry_time).await;
        }
    }

    /// One poll cycle plus the loop-level failure handling.
    pub async fn run_once(&mut self) {
        if let Err(e) = self.poll_cycle().await {
            self.report_failure(&e).await;
        }
    }

    /// fetch → validate → format/notify → advance the watermark.
    ///
    /// The watermark only moves on a fully successful cycle, so a failed
    /// notification is retried with the same `from_date` next time around.
    pub async fn poll_cycle(&mut self) -> Result<()> {
        let response = self.api.fetch(self.state.from_date).await?;
        let homeworks = extract_homeworks(&response)?;

        match homeworks.first() {
            // The API lists the most recent homework first.
            Some(latest) => {
                let message = format_status_message(latest)?;
                self.notify(&message).await?;
            }
            None => info!("no new homework statuses in the response"),
        }

        self.state.from_date = server_timestamp(&response)?;
        Ok(())
    }

    async fn notify(&mut self, text: &str) -> Result<()> {
        match self.notifier.send_text(text).await {
            Ok(()) => {
                self.consecutive_notify_failures = 0;
                info!("notification sent: {text}");
                Ok(())
            }
            Err(e) => {
                self.consecutive_notify_failures += 1;
                error!("failed to send notification: {e}");
                Err(e)
            }
        }
    }

    /// Loop-level error path: log, then relay the failure to the chat —
    /// unless the notifier itself has been failing repeatedly, in which case
    /// relaying would only feed the failure loop.
    async fn report_failure(&mut self, error: &Error) {
        error!("poll cycle failed: {error}");

        if self.consecutive_notify_failures >= self.notify_failure_limit {
            warn!(
                "skipping error relay after {} consecutive notify failures",
                self.consecutive_notify_failures
            );
            return;
        }

        let message = format!("Сбой в работе программы: {error}");
        if let Err(e) = self.notify(&message).await {
            warn!("error relay failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;

    struct ScriptedApi {
        responses: Mutex<VecDeque<Result<Value>>>,
        seen_since: Mutex<Vec<i64>>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<Result<Value>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                seen_since: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HomeworkApi for ScriptedApi {
        async fn fetch(&self, since: i64) -> Result<Value> {
            self.seen_since.lock().unwrap().push(since);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected fetch")
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        attempts: AtomicU32,
        failing: AtomicBool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_text(&self, text: &str) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Notify("telegram is down".to_string()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn test_config() -> Config {
        Config {
            practicum_token: "pt".to_string(),
            telegram_token: "tt".to_string(),
            telegram_chat_id: 1,
            endpoint: "http://localhost/api".to_string(),
            retry_time: Duration::from_secs(0),
            http_timeout: Duration::from_secs(1),
            notify_failure_limit: 3,
        }
    }

    #[tokio::test]
    async fn rejected_status_produces_exact_notification() {
        let api = ScriptedApi::new(vec![Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "rejected"}],
            "current_date": 1000
        }))]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poller = Poller::new(&test_config(), api.clone(), notifier.clone());

        poller.poll_cycle().await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            ["Изменился статус проверки работы \"hw1\". Работа проверена: у ревьюера есть замечания."]
        );
        assert_eq!(poller.state().from_date, 1000);
    }

    #[tokio::test]
    async fn empty_lists_send_nothing_but_advance_the_watermark() {
        let api = ScriptedApi::new(vec![
            Ok(json!({"homeworks": [], "current_date": 100})),
            Ok(json!({"homeworks": [], "current_date": 200})),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poller = Poller::new(&test_config(), api.clone(), notifier.clone());

        poller.poll_cycle().await.unwrap();
        assert_eq!(poller.state().from_date, 100);

        poller.poll_cycle().await.unwrap();
        assert_eq!(poller.state().from_date, 200);

        assert!(notifier.sent.lock().unwrap().is_empty());
        // The second fetch polls from the first server watermark.
        assert_eq!(api.seen_since.lock().unwrap()[1], 100);
    }

    #[tokio::test]
    async fn api_error_is_relayed_and_the_watermark_is_kept() {
        let api = ScriptedApi::new(vec![
            Err(Error::EndpointUnavailable { status: 503 }),
            Ok(json!({"homeworks": [], "current_date": 500})),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poller = Poller::new(&test_config(), api.clone(), notifier.clone());
        let start = poller.state();

        poller.run_once().await;

        {
            let sent = notifier.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert!(sent[0].starts_with("Сбой в работе программы:"));
            assert!(sent[0].contains("HTTP 503"));
        }
        assert_eq!(poller.state(), start);

        // The loop keeps going: the next cycle succeeds normally.
        poller.run_once().await;
        assert_eq!(poller.state().from_date, 500);
    }

    #[tokio::test]
    async fn unknown_status_is_relayed_as_a_failure() {
        let api = ScriptedApi::new(vec![Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "graded"}],
            "current_date": 1000
        }))]);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poller = Poller::new(&test_config(), api.clone(), notifier.clone());

        poller.run_once().await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("unknown homework status"));
    }

    #[tokio::test]
    async fn error_relay_stops_after_the_notify_failure_cap() {
        let api = ScriptedApi::new(vec![
            Err(Error::Transport("connection refused".to_string())),
            Err(Error::Transport("connection refused".to_string())),
            Err(Error::Transport("connection refused".to_string())),
            Err(Error::Transport("connection refused".to_string())),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        notifier.failing.store(true, Ordering::SeqCst);
        let mut poller = Poller::new(&test_config(), api.clone(), notifier.clone());

        for _ in 0..4 {
            poller.run_once().await;
        }

        // Three failed relay attempts, then the guard kicks in.
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn successful_send_resets_the_failure_counter() {
        let api = ScriptedApi::new(vec![
            Err(Error::Transport("connection refused".to_string())),
            Ok(json!({
                "homeworks": [{"homework_name": "hw1", "status": "approved"}],
                "current_date": 1000
            })),
            Err(Error::Transport("connection refused".to_string())),
        ]);
        let notifier = Arc::new(RecordingNotifier::default());
        notifier.failing.store(true, Ordering::SeqCst);
        let mut poller = Poller::new(&test_config(), api.clone(), notifier.clone());

        poller.run_once().await;
        assert_eq!(poller.consecutive_notify_failures, 1);

        notifier.failing.store(false, Ordering::SeqCst);
        poller.run_once().await;
        assert_eq!(poller.consecutive_notify_failures, 0);

        // Relaying works again after the reset.
        poller.run_once().await;
        let sent = notifier.sent.lock().unwrap();
        assert!(sent.last().unwrap().starts_with("Сбой в работе программы:"));
    }
}
