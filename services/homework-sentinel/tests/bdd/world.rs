//! BDD test world for homework sentinel service

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cucumber::World;
use homework_sentinel::io::{HttpClient, HttpResponse};
use homework_sentinel::notifier::{MessageTransport, Notifier};
use homework_sentinel::poll_loop::{CycleOutcome, PollLoop};
use homework_sentinel::status_client::StatusClient;
use homework_sentinel::telegram::TelegramTransport;
use homework_sentinel::verdict::VerdictMap;
use homework_sentinel::SentinelError;
use tokio_util::sync::CancellationToken;

/// Status API stub that answers with queued replies, then with an empty list
#[derive(Debug, Default)]
pub struct StubStatusApi {
    replies: Mutex<VecDeque<Result<HttpResponse, String>>>,
    requested_since: Mutex<Vec<String>>,
}

impl StubStatusApi {
    pub fn push_body(&self, body: String) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse { status: 200, body }));
    }

    pub fn push_status(&self, status: u16) {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: String::new(),
        }));
    }

    pub fn push_failure(&self, detail: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(detail.to_string()));
    }

    pub fn requested_since(&self) -> Vec<String> {
        self.requested_since.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HttpClient for StubStatusApi {
    async fn get(
        &self,
        _url: &str,
        query: &[(&str, &str)],
        _authorization: &str,
    ) -> homework_sentinel::Result<HttpResponse> {
        if let Some((_, since)) = query.iter().find(|(k, _)| *k == "from_date") {
            self.requested_since.lock().unwrap().push(since.to_string());
        }
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(detail)) => Err(SentinelError::Http(detail)),
            None => Ok(HttpResponse {
                status: 200,
                body: r#"{"homeworks": []}"#.to_string(),
            }),
        }
    }

    async fn post_form(
        &self,
        _url: &str,
        _params: &[(&str, &str)],
    ) -> homework_sentinel::Result<HttpResponse> {
        Err(SentinelError::Http("status API does not accept POST".to_string()))
    }
}

/// Chat stub that records delivered messages and can be taken offline
#[derive(Debug, Default)]
pub struct StubChat {
    delivered: Mutex<Vec<String>>,
    offline: Mutex<bool>,
}

impl StubChat {
    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }
}

#[async_trait::async_trait]
impl MessageTransport for StubChat {
    fn type_name(&self) -> &str {
        "stub"
    }

    async fn send(&self, _destination: &str, text: &str) -> homework_sentinel::Result<()> {
        if *self.offline.lock().unwrap() {
            return Err(SentinelError::Messaging("chat offline".to_string()));
        }
        self.delivered.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, World)]
pub struct HomeworkWorld {
    // Poll loop testing
    pub api: Arc<StubStatusApi>,
    pub chat: Arc<StubChat>,
    pub poll: Option<PollLoop>,
    pub last_outcome: Option<CycleOutcome>,

    // Telegram transport testing
    pub transport: Option<TelegramTransport>,
    pub delivery_result: Option<homework_sentinel::Result<()>>,
}

impl HomeworkWorld {
    /// The poll loop under test, built on first use
    pub fn poll_loop(&mut self) -> &mut PollLoop {
        let api: Arc<dyn HttpClient> = self.api.clone();
        let chat: Arc<dyn MessageTransport> = self.chat.clone();
        self.poll.get_or_insert_with(|| {
            PollLoop::new(
                StatusClient::new("http://localhost/api/homework_statuses/", "OAuth", "token", api),
                VerdictMap::default(),
                Notifier::new(chat, "42"),
                Duration::from_millis(10),
                CancellationToken::new(),
            )
        })
    }
}
