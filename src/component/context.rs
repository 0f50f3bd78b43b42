// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::ComponentConfig;
use crate::errors::{ComponentError, ComponentResult, StreamError};
use crate::lifecycle::ComponentStatus;
use crate::protocol::{create_message, ControlSignal, Message, MessageType};
use crate::streams::Endpoint;

/// Everything a [`Component`](crate::traits::Component) can see and touch.
///
/// Owns the component's status, its wired endpoints and its shutdown token.
/// Ports are kept in name order so broadcasts and multi-port receives are
/// deterministic.
#[derive(Debug)]
pub struct ComponentContext {
    name: String,
    config: ComponentConfig,
    pub(crate) status: ComponentStatus,
    pub(crate) outputs: BTreeMap<String, Arc<Endpoint>>,
    pub(crate) inputs: BTreeMap<String, Arc<Endpoint>>,
    /// Outputs whose receiving side has gone away
    closed_outputs: BTreeSet<String>,
    pending: VecDeque<(String, Message)>,
    pub(crate) message_count: u64,
    pub(crate) start_time: Option<Instant>,
    pub(crate) setup_duration: Option<Duration>,
    pub(crate) setup_finished_at: Option<Instant>,
    pub(crate) cancel: CancellationToken,
}

/// One message on its way to every output port.
///
/// Ports are dropped as they accept, so a broadcast interrupted by a full
/// port resumes without resending to the others.
#[derive(Debug, Clone)]
pub struct Broadcast {
    message: Message,
    remaining: BTreeSet<String>,
}

impl Broadcast {
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Ports that have not accepted the message yet
    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.remaining.iter().map(String::as_str)
    }

    pub fn is_delivered(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl ComponentContext {
    pub(crate) fn new(name: String, config: ComponentConfig) -> Self {
        let status = ComponentStatus::with_threshold(name.clone(), config.error_threshold());
        Self {
            name,
            config,
            status,
            outputs: BTreeMap::new(),
            inputs: BTreeMap::new(),
            closed_outputs: BTreeSet::new(),
            pending: VecDeque::new(),
            message_count: 0,
            start_time: None,
            setup_duration: None,
            setup_finished_at: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    pub fn status(&self) -> &ComponentStatus {
        &self.status
    }

    /// Messages sent plus messages received so far
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    /// How long setup took, successful or not; `None` before it finishes
    pub fn setup_duration(&self) -> Option<Duration> {
        self.setup_duration
    }

    pub fn input_ports(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    pub fn output_ports(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    pub fn has_input(&self, port: &str) -> bool {
        self.inputs.contains_key(port)
    }

    pub fn has_output(&self, port: &str) -> bool {
        self.outputs.contains_key(port)
    }

    /// Cooperative cancellation check.
    pub fn should_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Send a `DATA` message on `port`.
    pub async fn send_message(&mut self, port: &str, payload: Value) -> ComponentResult<()> {
        self.send_typed(port, payload, MessageType::Data).await
    }

    pub async fn send_typed(
        &mut self,
        port: &str,
        payload: Value,
        message_type: MessageType,
    ) -> ComponentResult<()> {
        let message = create_message(payload, message_type, &self.name)
            .with_compression(self.config.compression);
        self.send_on(port, &message).await
    }

    pub async fn send_control(&mut self, port: &str, signal: ControlSignal) -> ComponentResult<()> {
        let message = Message::control(signal, &self.name);
        self.send_on(port, &message).await
    }

    /// Send `payload` on every output port, returning how many accepted it.
    ///
    /// Every port is attempted once. A full port is reported as
    /// [`ComponentError::Backpressure`]; use [`start_broadcast`] and
    /// [`flush`] to retry only the ports that have not accepted yet.
    ///
    /// [`start_broadcast`]: Self::start_broadcast
    /// [`flush`]: Self::flush
    pub async fn broadcast(&mut self, payload: Value) -> ComponentResult<usize> {
        let mut broadcast = self.start_broadcast(payload);
        self.deliver(&mut broadcast).await
    }

    pub async fn broadcast_control(&mut self, signal: ControlSignal) -> ComponentResult<usize> {
        let mut broadcast = self.start_broadcast_control(signal);
        self.deliver(&mut broadcast).await
    }

    /// Frame a `DATA` message for every open output without sending it.
    pub fn start_broadcast(&self, payload: Value) -> Broadcast {
        self.start_broadcast_typed(payload, MessageType::Data)
    }

    pub fn start_broadcast_typed(&self, payload: Value, message_type: MessageType) -> Broadcast {
        let message = create_message(payload, message_type, &self.name)
            .with_compression(self.config.compression);
        self.broadcast_to_open_outputs(message)
    }

    pub fn start_broadcast_control(&self, signal: ControlSignal) -> Broadcast {
        self.broadcast_to_open_outputs(Message::control(signal, &self.name))
    }

    fn broadcast_to_open_outputs(&self, message: Message) -> Broadcast {
        let remaining = self
            .outputs
            .keys()
            .filter(|port| !self.closed_outputs.contains(*port))
            .cloned()
            .collect();
        Broadcast { message, remaining }
    }

    /// Send `broadcast` to each port still waiting for it.
    ///
    /// A port leaves the broadcast once it accepted the message or failed
    /// for good; a full port stays for the next attempt. Hard failures are
    /// reported before backpressure. Returns how many ports accepted.
    pub async fn deliver(&mut self, broadcast: &mut Broadcast) -> ComponentResult<usize> {
        let ports: Vec<String> = broadcast.remaining.iter().cloned().collect();
        let mut accepted = 0;
        let mut failure = None;
        for port in ports {
            match self.send_on(&port, &broadcast.message).await {
                Ok(()) => {
                    broadcast.remaining.remove(&port);
                    accepted += 1;
                }
                Err(ComponentError::Backpressure(_)) => {}
                Err(ComponentError::Cancelled) => return Err(ComponentError::Cancelled),
                Err(error) => {
                    broadcast.remaining.remove(&port);
                    failure.get_or_insert(error);
                }
            }
        }

        if let Some(error) = failure {
            return Err(error);
        }
        match broadcast.remaining.iter().next() {
            Some(port) => Err(ComponentError::Backpressure(port.clone())),
            None => Ok(accepted),
        }
    }

    /// Deliver the broadcast held in `slot`, if any.
    ///
    /// `Ok(true)` means nothing is left to send; `Ok(false)` means a port is
    /// still full and the broadcast stays in `slot`. The slot is emptied as
    /// soon as every port has accepted or failed.
    pub async fn flush(&mut self, slot: &mut Option<Broadcast>) -> ComponentResult<bool> {
        let Some(broadcast) = slot.as_mut() else {
            return Ok(true);
        };
        let result = self.deliver(broadcast).await;
        if broadcast.is_delivered() {
            *slot = None;
        }
        match result {
            Ok(_) => Ok(true),
            Err(ComponentError::Backpressure(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    async fn send_on(&mut self, port: &str, message: &Message) -> ComponentResult<()> {
        let endpoint = self
            .outputs
            .get(port)
            .ok_or_else(|| ComponentError::UnknownPort(port.to_string()))?;

        match endpoint.send_cancellable(message, &self.cancel).await {
            Ok(()) => {
                self.message_count += 1;
                Ok(())
            }
            Err(StreamError::Cancelled(_)) => Err(ComponentError::Cancelled),
            Err(StreamError::Timeout { .. }) => Err(ComponentError::Backpressure(port.to_string())),
            Err(StreamError::Closed(_)) => {
                self.closed_outputs.insert(port.to_string());
                Err(ComponentError::SendFailed(port.to_string()))
            }
            Err(_) => Err(ComponentError::SendFailed(port.to_string())),
        }
    }

    /// Receive the next message on `port`.
    ///
    /// `Ok(None)` means the timeout elapsed or shutdown was signalled while
    /// waiting. A closed and drained input is [`ComponentError::StreamClosed`].
    pub async fn receive_message(
        &mut self,
        port: &str,
        timeout: Option<Duration>,
    ) -> ComponentResult<Option<Message>> {
        if let Some(index) = self.pending.iter().position(|(p, _)| p == port) {
            let message = self.pending.remove(index).map(|(_, m)| m);
            self.message_count += 1;
            return Ok(message);
        }

        let endpoint = self
            .inputs
            .get(port)
            .ok_or_else(|| ComponentError::UnknownPort(port.to_string()))?;

        match endpoint.receive_cancellable(timeout, &self.cancel).await {
            Ok(Some(message)) => {
                self.message_count += 1;
                Ok(Some(message))
            }
            Ok(None) | Err(StreamError::Cancelled(_)) => Ok(None),
            Err(StreamError::Closed(_)) => Err(ComponentError::StreamClosed(port.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Receive from whichever input port delivers first.
    ///
    /// Returns the port name with the message. Messages that arrive on other
    /// ports during the race are held back and returned by later calls, so
    /// per-port order is preserved. When every input is closed and drained
    /// the result is [`ComponentError::StreamClosed`].
    pub async fn receive_from_any(
        &mut self,
        timeout: Option<Duration>,
    ) -> ComponentResult<Option<(String, Message)>> {
        if let Some(entry) = self.pending.pop_front() {
            self.message_count += 1;
            return Ok(Some(entry));
        }
        if self.inputs.is_empty() {
            return Err(ComponentError::UnknownPort("*".to_string()));
        }

        let mut tasks = JoinSet::new();
        for (port, endpoint) in &self.inputs {
            let port = port.clone();
            let endpoint = Arc::clone(endpoint);
            tasks.spawn(async move {
                let result = endpoint.receive(timeout).await;
                (port, result)
            });
        }

        let input_count = self.inputs.len();
        let mut closed = 0;
        let mut failure = None;
        let first = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break None,
                joined = tasks.join_next() => match joined {
                    None => break None,
                    Some(Ok((port, Ok(Some(message))))) => break Some((port, message)),
                    Some(Ok((_, Ok(None)))) => {}
                    Some(Ok((_, Err(StreamError::Closed(_))))) => closed += 1,
                    Some(Ok((_, Err(e)))) => {
                        failure.get_or_insert(e);
                    }
                    Some(Err(_aborted)) => {}
                },
            }
        };

        // Keep anything that was dequeued while the race was being decided
        tasks.abort_all();
        while let Some(joined) = tasks.join_next().await {
            if let Ok((port, Ok(Some(message)))) = joined {
                self.pending.push_back((port, message));
            }
        }

        match first {
            Some(entry) => {
                self.message_count += 1;
                Ok(Some(entry))
            }
            None if closed == input_count => Err(ComponentError::StreamClosed("*".to_string())),
            None => match failure {
                Some(e) => Err(e.into()),
                None => Ok(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::StreamFramework;
    use serde_json::json;

    fn wire(framework: &StreamFramework, port: &str, capacity: usize) -> (Arc<Endpoint>, Arc<Endpoint>) {
        let (tx, rx) = framework.create_stream(Some(capacity));
        let out = framework.register_endpoint(port, "fan", tx).unwrap();
        let inp = framework.register_endpoint("input", port, rx).unwrap();
        (framework.endpoint(out).unwrap(), framework.endpoint(inp).unwrap())
    }

    fn fan_out(framework: &StreamFramework, ports: &[(&str, usize)]) -> (ComponentContext, Vec<Arc<Endpoint>>) {
        let mut ctx = ComponentContext::new("fan".into(), ComponentConfig::default());
        let mut receivers = Vec::new();
        for (port, capacity) in ports {
            let (out, inp) = wire(framework, port, *capacity);
            ctx.outputs.insert(port.to_string(), out);
            receivers.push(inp);
        }
        (ctx, receivers)
    }

    async fn next_payload(endpoint: &Endpoint) -> Option<Value> {
        endpoint
            .receive(Some(Duration::from_millis(50)))
            .await
            .unwrap()
            .map(|m| m.payload)
    }

    #[tokio::test]
    async fn test_interrupted_broadcast_resumes_without_duplicates() {
        let framework = StreamFramework::new(16, Duration::from_millis(10));
        let (mut ctx, receivers) = fan_out(&framework, &[("fast", 16), ("slow", 1)]);
        let (fast, slow) = (&receivers[0], &receivers[1]);
        ctx.send_message("slow", json!("filler")).await.unwrap();

        let mut broadcast = ctx.start_broadcast(json!("item"));
        let err = ctx.deliver(&mut broadcast).await.unwrap_err();
        assert!(matches!(err, ComponentError::Backpressure(ref port) if port == "slow"));
        assert_eq!(broadcast.remaining().collect::<Vec<_>>(), vec!["slow"]);

        // Still full: the retry leaves the healthy port alone
        let mut slot = Some(broadcast);
        assert!(!ctx.flush(&mut slot).await.unwrap());
        assert!(slot.is_some());

        assert_eq!(next_payload(slow).await, Some(json!("filler")));
        assert!(ctx.flush(&mut slot).await.unwrap());
        assert!(slot.is_none());

        assert_eq!(next_payload(fast).await, Some(json!("item")));
        assert_eq!(next_payload(fast).await, None);
        assert_eq!(next_payload(slow).await, Some(json!("item")));
        assert_eq!(ctx.message_count(), 3);
    }

    #[tokio::test]
    async fn test_closed_output_is_dropped_from_later_broadcasts() {
        let framework = StreamFramework::default();
        let (mut ctx, receivers) = fan_out(&framework, &[("gone", 4), ("live", 4)]);
        let (gone, live) = (&receivers[0], &receivers[1]);
        gone.close().await;

        let err = ctx.broadcast(json!(1)).await.unwrap_err();
        assert!(matches!(err, ComponentError::SendFailed(ref port) if port == "gone"));
        assert_eq!(ctx.broadcast(json!(2)).await.unwrap(), 1);
        assert_eq!(ctx.start_broadcast_control(ControlSignal::EndOfStream).remaining().count(), 1);

        assert_eq!(next_payload(live).await, Some(json!(1)));
        assert_eq!(next_payload(live).await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_flush_of_empty_slot_is_done() {
        let mut ctx = ComponentContext::new("quiet".into(), ComponentConfig::default());
        let mut slot = None;
        assert!(ctx.flush(&mut slot).await.unwrap());

        // No outputs: a broadcast is delivered as soon as it starts
        let mut slot = Some(ctx.start_broadcast(json!("nobody")));
        assert!(slot.as_ref().unwrap().is_delivered());
        assert!(ctx.flush(&mut slot).await.unwrap());
        assert!(slot.is_none());
    }
}
