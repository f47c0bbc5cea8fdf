use bytes::Bytes;
use dadmin_core::transport::{
    BuiltRequest, Transport, TransportError, TransportResponse,
};
use http::{HeaderMap, Method, StatusCode};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub endpoint: String,
    pub method: Method,
    pub url: url::Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct MockReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl MockReply {
    /// 200 with a `text/plain` panel body.
    pub fn ok_body(body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("text/plain"),
        );
        Self {
            status: StatusCode::OK,
            headers,
            body: body.into(),
        }
    }

    /// 200 with an empty body.
    pub fn ok_empty() -> Self {
        Self::ok_body(Bytes::new())
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: http::header::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Clone, Debug)]
enum Step {
    Reply(MockReply),
    Fail(String),
}

#[derive(Debug)]
struct MockState {
    recorded: Mutex<Vec<RecordedRequest>>,
    steps: Mutex<VecDeque<Step>>,
}

#[derive(Clone)]
pub struct MockTransport {
    st: Arc<MockState>,
}

pub struct MockHandle {
    st: Arc<MockState>,
    finished: bool,
}

pub struct MockBuilder {
    steps: Vec<Step>,
}

impl MockBuilder {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn reply(mut self, r: MockReply) -> Self {
        self.steps.push(Step::Reply(r));
        self
    }

    pub fn replies(mut self, rs: impl IntoIterator<Item = MockReply>) -> Self {
        self.steps.extend(rs.into_iter().map(Step::Reply));
        self
    }

    /// Scripts a transport-level fault (connection refused, timeout, ...)
    /// for the next request.
    pub fn fail(mut self, msg: impl Into<String>) -> Self {
        self.steps.push(Step::Fail(msg.into()));
        self
    }

    pub fn build(self) -> (MockTransport, MockHandle) {
        let st = Arc::new(MockState {
            recorded: Mutex::new(Vec::new()),
            steps: Mutex::new(self.steps.into_iter().collect()),
        });
        (
            MockTransport { st: st.clone() },
            MockHandle {
                st,
                finished: false,
            },
        )
    }
}

impl Default for MockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn mock() -> MockBuilder {
    MockBuilder::new()
}

impl MockHandle {
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.st.recorded.lock().unwrap().clone()
    }

    pub fn recorded_len(&self) -> usize {
        self.st.recorded.lock().unwrap().len()
    }

    pub fn assert_recorded_len(&self, expected: usize) {
        let got = self.recorded_len();
        if got != expected {
            let reqs = self.recorded();
            panic!(
                "recorded request count mismatch\n  expected: {expected}\n  got: {got}\n  recorded:\n{:#?}",
                reqs
            );
        }
    }

    pub fn remaining_steps(&self) -> usize {
        self.st.steps.lock().unwrap().len()
    }

    pub fn assert_no_remaining_steps(&self) {
        let left = self.remaining_steps();
        if left != 0 {
            panic!("mock script not fully consumed: remaining={left}");
        }
    }

    pub fn finish(mut self) {
        self.assert_no_remaining_steps();
        self.finished = true;
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if std::thread::panicking() {
            return;
        }
        let left = self.st.steps.lock().unwrap().len();
        if left != 0 {
            panic!("mock script not fully consumed (drop): remaining={left}");
        }
    }
}

impl Transport for MockTransport {
    fn send<'a>(
        &'a self,
        req: &'a BuiltRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>> {
        let st = self.st.clone();
        Box::pin(async move {
            st.recorded.lock().unwrap().push(RecordedRequest {
                endpoint: req.meta.endpoint.clone(),
                method: req.meta.method.clone(),
                url: req.url.clone(),
                headers: req.headers.clone(),
                body: req.body.clone(),
                timeout: req.timeout,
            });

            let step = {
                let mut g = st.steps.lock().unwrap();
                g.pop_front().unwrap_or_else(|| {
                    let last = st.recorded.lock().unwrap().last().cloned();
                    panic!(
                        "MockTransport: script exhausted, but send() was called.\nlast_request={:#?}",
                        last
                    );
                })
            };

            match step {
                Step::Reply(reply) => Ok(TransportResponse {
                    status: reply.status,
                    headers: reply.headers,
                    body: reply.body,
                }),
                Step::Fail(msg) => Err(TransportError::message(msg)),
            }
        })
    }
}
