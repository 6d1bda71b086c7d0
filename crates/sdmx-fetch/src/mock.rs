//! Scripted [`HttpClient`] for tests.
//!
//! Replies are queued per URL and consumed in order; the last reply of a
//! route repeats forever. Every request is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use futures_util::stream;

use crate::effects::{BoxStream, HttpClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 200 with this body.
    Body(Vec<u8>),
    /// 200 with the body delivered in these chunks.
    Chunks(Vec<Vec<u8>>),
    /// 404.
    NotFound,
    /// Transport failure or non-404 status.
    Fail(String),
    /// 200, but the connection drops after this much of the body.
    Truncated(Vec<u8>),
}

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("404 Not Found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),
}

#[derive(Default)]
pub struct ScriptedClient {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        lock(&self.routes)
            .entry(url.to_owned())
            .or_default()
            .extend(replies);
        self
    }

    pub fn push(&self, url: &str, reply: Reply) {
        lock(&self.routes)
            .entry(url.to_owned())
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn requests_for(&self, url: &str) -> usize {
        lock(&self.requests).iter().filter(|u| *u == url).count()
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut routes = lock(&self.routes);
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::NotFound),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::NotFound),
            None => Reply::NotFound,
        }
    }
}

impl HttpClient for ScriptedClient {
    type Error = MockError;

    async fn stream(
        &self,
        url: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error> {
        lock(&self.requests).push(url.to_owned());

        let chunks: Vec<Result<Bytes, MockError>> = match self.next_reply(url) {
            Reply::Body(body) => vec![Ok(Bytes::from(body))],
            Reply::Chunks(chunks) => chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect(),
            Reply::NotFound => return Err(MockError::NotFound(url.to_owned())),
            Reply::Fail(message) => return Err(MockError::Failed(message)),
            Reply::Truncated(prefix) => vec![
                Ok(Bytes::from(prefix)),
                Err(MockError::Failed("connection reset".to_owned())),
            ],
        };
        Ok(Box::pin(stream::iter(chunks)))
    }

    fn is_not_found(error: &Self::Error) -> bool {
        matches!(error, MockError::NotFound(_))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
