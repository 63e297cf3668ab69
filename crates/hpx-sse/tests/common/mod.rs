//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::time::Instant;
use hpx_sse::{ByteStream, SseError, SseRequest, SseResponse, SseResult, SseTransport};

/// How a scripted body finishes after its chunks are exhausted.
#[derive(Clone, Debug)]
pub enum BodyEnd {
    /// Clean end of stream.
    Close,
    /// Read error.
    Error(&'static str),
    /// Never yields again.
    Stall,
}

/// One scripted response to a connection attempt.
#[derive(Clone, Debug)]
pub enum Script {
    /// The transport fails without a response.
    Refuse,
    /// The server answers with this status and no body.
    Status(u16),
    /// `200 OK` without a readable body.
    NoBody,
    /// `200 OK` streaming the chunks, then ending as specified.
    Body(Vec<Bytes>, BodyEnd),
    /// The request never completes.
    Hang,
}

impl Script {
    /// A body that delivers `chunks` and then closes cleanly.
    pub fn body(chunks: &[&'static str]) -> Self {
        Self::Body(
            chunks.iter().map(|c| Bytes::from_static(c.as_bytes())).collect(),
            BodyEnd::Close,
        )
    }

    /// A body that delivers `chunks` and then fails.
    pub fn body_then_error(chunks: &[&'static str], message: &'static str) -> Self {
        Self::Body(
            chunks.iter().map(|c| Bytes::from_static(c.as_bytes())).collect(),
            BodyEnd::Error(message),
        )
    }

    /// A body that delivers `chunks` and then stalls forever.
    pub fn body_then_stall(chunks: &[&'static str]) -> Self {
        Self::Body(
            chunks.iter().map(|c| Bytes::from_static(c.as_bytes())).collect(),
            BodyEnd::Stall,
        )
    }
}

#[derive(Default)]
struct Inner {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<SseRequest>>,
    opened_at: Mutex<Vec<Instant>>,
    reads: Arc<AtomicUsize>,
}

/// Transport replaying a queue of [`Script`]s; refuses once the queue is empty.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Inner>,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<Script>) -> Self {
        let transport = Self::default();
        transport
            .inner
            .scripts
            .lock()
            .expect("lock scripts")
            .extend(scripts);
        transport
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<SseRequest> {
        self.inner.requests.lock().expect("lock requests").clone()
    }

    /// When each request was received, on the tokio clock.
    pub fn opened_at(&self) -> Vec<Instant> {
        self.inner.opened_at.lock().expect("lock opened_at").clone()
    }

    /// `Last-Event-ID` of every request received so far.
    pub fn last_event_ids(&self) -> Vec<Option<String>> {
        self.requests()
            .iter()
            .map(|req| req.last_event_id().map(str::to_owned))
            .collect()
    }

    /// Number of body chunks handed to the client across all connections.
    pub fn chunks_read(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SseTransport for ScriptedTransport {
    async fn open(&self, request: SseRequest) -> SseResult<SseResponse> {
        self.inner
            .requests
            .lock()
            .expect("lock requests")
            .push(request);
        self.inner
            .opened_at
            .lock()
            .expect("lock opened_at")
            .push(Instant::now());
        let script = self
            .inner
            .scripts
            .lock()
            .expect("lock scripts")
            .pop_front()
            .unwrap_or(Script::Refuse);

        match script {
            Script::Refuse => Err(SseError::transport("connection refused")),
            Script::Status(code) => Ok(SseResponse::status(
                http::StatusCode::from_u16(code).expect("valid status"),
            )),
            Script::NoBody => Ok(SseResponse::status(http::StatusCode::OK)),
            Script::Hang => std::future::pending().await,
            Script::Body(chunks, end) => {
                let reads = Arc::clone(&self.inner.reads);
                let chunks = futures_util::stream::iter(chunks.into_iter().map(Ok)).inspect(
                    move |_| {
                        reads.fetch_add(1, Ordering::SeqCst);
                    },
                );
                let body: ByteStream = match end {
                    BodyEnd::Close => chunks.boxed(),
                    BodyEnd::Error(message) => chunks
                        .chain(futures_util::stream::once(async move {
                            Err(SseError::stream(message))
                        }))
                        .boxed(),
                    BodyEnd::Stall => chunks.chain(futures_util::stream::pending()).boxed(),
                };
                Ok(SseResponse::ok(body))
            }
        }
    }
}
