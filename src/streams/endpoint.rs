// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::errors::StreamError;
use crate::observability::messages::stream::{BackpressureTimeout, FrameDecodeFailed, SendFailed};
use crate::observability::messages::StructuredLog;
use crate::protocol::{Message, MessageCodec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Send,
    Receive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Send => f.write_str("send"),
            Direction::Receive => f.write_str("receive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EndpointId(pub(crate) u64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "endpoint#{}", self.0)
    }
}

/// One half of a bounded frame channel, before it is registered.
#[derive(Debug)]
pub enum RawStream {
    Sender {
        tx: mpsc::Sender<Vec<u8>>,
        capacity: usize,
    },
    Receiver {
        rx: mpsc::Receiver<Vec<u8>>,
        capacity: usize,
    },
}

impl RawStream {
    /// Create both halves of a bounded stream; capacity is at least 1.
    pub fn bounded(capacity: usize) -> (RawStream, RawStream) {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        (
            RawStream::Sender { tx, capacity },
            RawStream::Receiver { rx, capacity },
        )
    }

    pub fn direction(&self) -> Direction {
        match self {
            RawStream::Sender { .. } => Direction::Send,
            RawStream::Receiver { .. } => Direction::Receive,
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            RawStream::Sender { capacity, .. } | RawStream::Receiver { capacity, .. } => *capacity,
        }
    }
}

enum Channel {
    Send(RwLock<Option<mpsc::Sender<Vec<u8>>>>),
    Receive(Mutex<mpsc::Receiver<Vec<u8>>>),
}

#[derive(Default)]
struct EndpointMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    send_failures: AtomicU64,
    receive_timeouts: AtomicU64,
    decode_errors: AtomicU64,
}

/// Point-in-time copy of an endpoint's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointMetricsSnapshot {
    pub id: EndpointId,
    pub owner: String,
    pub port: String,
    pub direction: Direction,
    pub capacity: usize,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub send_failures: u64,
    pub receive_timeouts: u64,
    pub decode_errors: u64,
}

/// A named, directional handle onto a bounded frame queue.
pub struct Endpoint {
    id: EndpointId,
    port: String,
    owner: String,
    capacity: usize,
    send_timeout: Duration,
    codec: MessageCodec,
    channel: Channel,
    metrics: EndpointMetrics,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("port", &self.port)
            .field("direction", &self.direction())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Endpoint {
    pub(crate) fn new(
        id: EndpointId,
        port: String,
        owner: String,
        raw: RawStream,
        send_timeout: Duration,
        codec: MessageCodec,
    ) -> Self {
        let capacity = raw.capacity();
        let channel = match raw {
            RawStream::Sender { tx, .. } => Channel::Send(RwLock::new(Some(tx))),
            RawStream::Receiver { rx, .. } => Channel::Receive(Mutex::new(rx)),
        };
        Self {
            id,
            port,
            owner,
            capacity,
            send_timeout,
            codec,
            channel,
            metrics: EndpointMetrics::default(),
        }
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn direction(&self) -> Direction {
        match self.channel {
            Channel::Send(_) => Direction::Send,
            Channel::Receive(_) => Direction::Receive,
        }
    }

    /// Frame and enqueue a message, waiting up to the send timeout for room.
    pub async fn send(&self, message: &Message) -> Result<(), StreamError> {
        let result = self.try_send(message).await;
        match &result {
            Ok(size) => {
                self.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
                self.metrics.bytes_sent.fetch_add(*size as u64, Ordering::Relaxed);
            }
            Err(StreamError::Timeout { timeout, .. }) => {
                self.metrics.send_failures.fetch_add(1, Ordering::Relaxed);
                BackpressureTimeout {
                    owner: &self.owner,
                    port: &self.port,
                    timeout: *timeout,
                }
                .log();
            }
            Err(error) => {
                self.metrics.send_failures.fetch_add(1, Ordering::Relaxed);
                SendFailed {
                    owner: &self.owner,
                    port: &self.port,
                    error,
                }
                .log();
            }
        }
        result.map(|_| ())
    }

    async fn try_send(&self, message: &Message) -> Result<usize, StreamError> {
        let Channel::Send(sender) = &self.channel else {
            return Err(StreamError::WrongDirection {
                id: self.id,
                actual: Direction::Receive,
            });
        };

        let frame = self.codec.encode(message)?;
        let size = frame.len();

        // Clone out of the lock so the guard is not held across the await
        let tx = sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(StreamError::Closed(self.id))?;

        match tx.send_timeout(frame, self.send_timeout).await {
            Ok(()) => Ok(size),
            Err(SendTimeoutError::Timeout(_)) => Err(StreamError::Timeout {
                id: self.id,
                timeout: self.send_timeout,
            }),
            Err(SendTimeoutError::Closed(_)) => Err(StreamError::Closed(self.id)),
        }
    }

    /// [`Endpoint::send`], abandoned as soon as `cancel` fires.
    pub async fn send_cancellable(
        &self,
        message: &Message,
        cancel: &CancellationToken,
    ) -> Result<(), StreamError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StreamError::Cancelled(self.id)),
            result = self.send(message) => result,
        }
    }

    /// Dequeue and decode the next frame.
    ///
    /// `Ok(None)` means nothing arrived within `timeout`. `None` for the
    /// timeout waits until a frame arrives or the stream closes.
    pub async fn receive(&self, timeout: Option<Duration>) -> Result<Option<Message>, StreamError> {
        let Channel::Receive(receiver) = &self.channel else {
            return Err(StreamError::WrongDirection {
                id: self.id,
                actual: Direction::Send,
            });
        };

        let mut rx = receiver.lock().await;
        let frame = match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(frame) => frame,
                Err(_elapsed) => {
                    self.metrics.receive_timeouts.fetch_add(1, Ordering::Relaxed);
                    return Ok(None);
                }
            },
            None => rx.recv().await,
        };
        drop(rx);

        let frame = frame.ok_or(StreamError::Closed(self.id))?;
        match self.codec.decode(&frame) {
            Ok(message) => {
                self.metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                self.metrics
                    .bytes_received
                    .fetch_add(frame.len() as u64, Ordering::Relaxed);
                Ok(Some(message))
            }
            Err(error) => {
                self.metrics.decode_errors.fetch_add(1, Ordering::Relaxed);
                FrameDecodeFailed {
                    owner: &self.owner,
                    port: &self.port,
                    error: &error,
                }
                .log();
                Err(error.into())
            }
        }
    }

    /// [`Endpoint::receive`], abandoned as soon as `cancel` fires.
    pub async fn receive_cancellable(
        &self,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<Option<Message>, StreamError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StreamError::Cancelled(self.id)),
            result = self.receive(timeout) => result,
        }
    }

    /// Close the endpoint.
    ///
    /// Closing a send endpoint drops its sender so the receiver drains what is
    /// queued and then sees the stream end. Closing a receive endpoint rejects
    /// further sends while keeping queued frames readable.
    pub async fn close(&self) {
        match &self.channel {
            Channel::Send(sender) => {
                sender.write().unwrap_or_else(PoisonError::into_inner).take();
            }
            Channel::Receive(receiver) => receiver.lock().await.close(),
        }
    }

    pub fn metrics(&self) -> EndpointMetricsSnapshot {
        EndpointMetricsSnapshot {
            id: self.id,
            owner: self.owner.clone(),
            port: self.port.clone(),
            direction: self.direction(),
            capacity: self.capacity,
            messages_sent: self.metrics.messages_sent.load(Ordering::Relaxed),
            messages_received: self.metrics.messages_received.load(Ordering::Relaxed),
            bytes_sent: self.metrics.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.metrics.bytes_received.load(Ordering::Relaxed),
            send_failures: self.metrics.send_failures.load(Ordering::Relaxed),
            receive_timeouts: self.metrics.receive_timeouts.load(Ordering::Relaxed),
            decode_errors: self.metrics.decode_errors.load(Ordering::Relaxed),
        }
    }
}
