//! In-memory transport for tests
//!
//! `MockTransport` answers requests from scripted replies keyed by method and
//! route, and records every request it sees. Each route replays its replies
//! in order; the last one repeats once the script runs out.

use crate::error::{CoreError, Result};
use crate::transport::{ApiRequest, ResponseBody, Transport, api_error};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    Json(Value),
    Bytes(Vec<u8>),
    /// Non-2xx status with a JSON error body
    Status(u16, Value),
}

struct MockRoute {
    method: Method,
    route: String,
    replies: VecDeque<MockReply>,
}

/// Scripted [`Transport`] that records requests
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<MockRoute>>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method route`
    pub fn reply(&self, method: Method, route: &str, reply: MockReply) -> &Self {
        let mut routes = lock(&self.routes);
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.route == route)
        {
            Some(existing) => existing.replies.push_back(reply),
            None => routes.push(MockRoute {
                method,
                route: route.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    /// Queue a JSON reply wrapped in the `result` envelope
    pub fn reply_result(&self, method: Method, route: &str, result: Value) -> &Self {
        self.reply(
            method,
            route,
            MockReply::Json(serde_json::json!({ "result": result })),
        )
    }

    /// Every request seen so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests seen for `method route`
    #[must_use]
    pub fn count(&self, method: Method, route: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method() == method && r.route == route)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ResponseBody> {
        let method = request.method();
        let route = request.route.clone();
        lock(&self.requests).push(request);

        let reply = {
            let mut routes = lock(&self.routes);
            routes
                .iter_mut()
                .find(|r| r.method == method && r.route == route)
                .and_then(|r| {
                    if r.replies.len() > 1 {
                        r.replies.pop_front()
                    } else {
                        r.replies.front().cloned()
                    }
                })
        };

        match reply {
            Some(MockReply::Json(value)) => Ok(ResponseBody::Json(value)),
            Some(MockReply::Bytes(bytes)) => Ok(ResponseBody::Bytes(bytes)),
            Some(MockReply::Status(status, body)) => Err(api_error(status, &body.to_string())),
            None => Err(CoreError::Api {
                status: 404,
                code: None,
                message: format!("No mock reply for {method} {route}"),
            }),
        }
    }
}
