//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::Error;
use crate::transport::{Request, Transport};

type Reply = Box<dyn Fn(&Request) -> Result<Value, Error> + Send + Sync>;

/// Replays queued replies in order and records every request it sees.
///
/// Once the queue is empty, the fallback reply (if any) answers all
/// further requests.
#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Mutex<Option<Reply>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply(&self, value: Value) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Box::new(move |_| Ok(value.clone())));
        self
    }

    pub(crate) fn fail(&self, url: &str) -> &Self {
        let url = url.to_string();
        self.replies
            .lock()
            .unwrap()
            .push_back(Box::new(move |_| Err(Error::timed_out(&url))));
        self
    }

    pub(crate) fn reply_always(&self, value: Value) -> &Self {
        *self.fallback.lock().unwrap() = Some(Box::new(move |_| Ok(value.clone())));
        self
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn perform(&self, request: Request) -> BoxFuture<'_, Result<Value, Error>> {
        let result = {
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(reply) => reply(&request),
                None => match self.fallback.lock().unwrap().as_ref() {
                    Some(reply) => reply(&request),
                    None => panic!("unexpected request: {:?}", request),
                },
            }
        };
        self.requests.lock().unwrap().push(request);
        futures::future::ready(result).boxed()
    }
}
