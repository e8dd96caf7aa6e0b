//! A scripted in-memory [`Transport`] for driving the download state machine.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::Url;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use steadyfetch::utils::ContentRange;
use steadyfetch::{Error, ProbeResponse, Result, TransferResponse, Transport};

/// A request the fake transport received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Head,
    Get { range_start: Option<u64> },
}

/// How the fake answers `HEAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadBehavior {
    /// Answer 200 with the configured metadata.
    Ok,
    /// Fail to connect.
    Fail,
    /// Answer with this status and no metadata.
    Status(u16),
}

/// A failure injected into the next `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail before any response arrives.
    Connect,
    /// Answer with this status and an empty body.
    Status(u16),
    /// Send this many body bytes, then reset the connection.
    AfterBytes(usize),
    /// Send this many body bytes, then end the body cleanly.
    EndAfter(usize),
    /// Send headers, then never deliver a body chunk.
    Hang,
}

struct Inner {
    content: Vec<u8>,
    head: HeadBehavior,
    accept_ranges: bool,
    honor_range: bool,
    advertise_length: bool,
    /// Start reported in `Content-Range` instead of the requested one.
    range_start_override: Option<u64>,
    /// `Content-Length` reported instead of the real one.
    length_override: Option<u64>,
    chunk_size: usize,
    faults: VecDeque<Fault>,
    calls: Vec<Call>,
}

/// Serves `content` from memory and records every request.
#[derive(Clone)]
pub struct FakeTransport {
    inner: Arc<Mutex<Inner>>,
}

impl FakeTransport {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                content,
                head: HeadBehavior::Ok,
                accept_ranges: true,
                honor_range: true,
                advertise_length: true,
                range_start_override: None,
                length_override: None,
                chunk_size: 100,
                faults: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_head(self, head: HeadBehavior) -> Self {
        self.inner.lock().unwrap().head = head;
        self
    }

    pub fn with_accept_ranges(self, accept_ranges: bool) -> Self {
        self.inner.lock().unwrap().accept_ranges = accept_ranges;
        self
    }

    /// Answer ranged requests with the full body and a 200.
    pub fn ignoring_range(self) -> Self {
        self.inner.lock().unwrap().honor_range = false;
        self
    }

    /// Omit `Content-Length` from every response.
    pub fn without_length(self) -> Self {
        self.inner.lock().unwrap().advertise_length = false;
        self
    }

    pub fn with_range_start_override(self, start: u64) -> Self {
        self.inner.lock().unwrap().range_start_override = Some(start);
        self
    }

    /// Claim `length` in every `Content-Length`, whatever the body holds.
    pub fn with_length_override(self, length: u64) -> Self {
        self.inner.lock().unwrap().length_override = Some(length);
        self
    }

    pub fn with_chunk_size(self, chunk_size: usize) -> Self {
        self.inner.lock().unwrap().chunk_size = chunk_size;
        self
    }

    /// Queue faults, consumed one per `GET` in order.
    pub fn with_faults(self, faults: impl IntoIterator<Item = Fault>) -> Self {
        self.inner.lock().unwrap().faults.extend(faults);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn head_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Head).count()
    }

    pub fn get_ranges(&self) -> Vec<Option<u64>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Get { range_start } => Some(range_start),
                Call::Head => None,
            })
            .collect()
    }
}

fn chunked(data: &[u8], chunk_size: usize) -> Vec<Result<Bytes>> {
    data.chunks(chunk_size.max(1))
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect()
}

#[async_trait]
impl Transport for FakeTransport {
    async fn head(&self, _url: &Url) -> Result<ProbeResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Head);
        match inner.head {
            HeadBehavior::Fail => Err(Error::Internal("connection refused".into())),
            HeadBehavior::Status(status) => Ok(ProbeResponse {
                status,
                content_length: None,
                accept_ranges: false,
            }),
            HeadBehavior::Ok => Ok(ProbeResponse {
                status: 200,
                content_length: inner
                    .advertise_length
                    .then_some(inner.content.len() as u64)
                    .map(|len| inner.length_override.unwrap_or(len)),
                accept_ranges: inner.accept_ranges,
            }),
        }
    }

    async fn get(&self, _url: &Url, range_start: Option<u64>) -> Result<TransferResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Get { range_start });
        let fault = inner.faults.pop_front();

        match fault {
            Some(Fault::Connect) => return Err(Error::Internal("connection refused".into())),
            Some(Fault::Status(status)) => {
                return Ok(TransferResponse {
                    status,
                    content_length: Some(0),
                    content_range: None,
                    body: stream::empty::<Result<Bytes>>().boxed(),
                })
            }
            _ => {}
        }

        let total = inner.content.len() as u64;
        let (status, offset, content_range) = match range_start {
            Some(offset) if inner.honor_range => {
                let start = inner.range_start_override.unwrap_or(offset);
                let range = ContentRange {
                    start,
                    end: total.saturating_sub(1),
                    total: Some(total),
                };
                (206, offset.min(total) as usize, Some(range))
            }
            _ => (200, 0, None),
        };
        let served = &inner.content[offset..];
        let content_length = inner
            .advertise_length
            .then_some(served.len() as u64)
            .map(|len| inner.length_override.unwrap_or(len));

        let body = match fault {
            Some(Fault::AfterBytes(n)) => {
                let sent = &served[..n.min(served.len())];
                stream::iter(chunked(sent, inner.chunk_size))
                    .chain(stream::once(async {
                        Err(Error::Internal("connection reset".into()))
                    }))
                    .boxed()
            }
            Some(Fault::EndAfter(n)) => {
                stream::iter(chunked(&served[..n.min(served.len())], inner.chunk_size)).boxed()
            }
            Some(Fault::Hang) => stream::pending::<Result<Bytes>>().boxed(),
            _ => stream::iter(chunked(served, inner.chunk_size)).boxed(),
        };

        Ok(TransferResponse {
            status,
            content_length,
            content_range,
            body,
        })
    }
}
