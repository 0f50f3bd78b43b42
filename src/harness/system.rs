// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::component::{HarnessComponent, PerformanceMetrics};
use crate::config::{ComponentConfig, HarnessConfig};
use crate::errors::HarnessError;
use crate::harness::{ComponentRef, Connection, HarnessReport, HarnessStatus, PortRef};
use crate::lifecycle::ComponentState;
use crate::observability::messages::harness::{
    ComponentForceCancelled, ComponentRegistered, ComponentTaskFailed, HarnessCompleted,
    HarnessStarted, PortsConnected, ShutdownRequested, UnhealthyComponent,
};
use crate::observability::messages::{StructuredLog, StructuredSpan};
use crate::streams::{Direction, StreamFramework};
use crate::traits::Component;

struct Registered {
    name: String,
    component: Arc<Mutex<HarnessComponent>>,
    state: watch::Receiver<ComponentState>,
}

/// Top-level orchestrator: a registry of named components, the wiring
/// between their ports, and a concurrent driver.
///
/// Registration and wiring take `&mut self` and must happen before
/// [`run`](Self::run). `run`, [`status`](Self::status) and
/// [`shutdown_handle`](Self::shutdown_handle) take `&self`, so the harness can
/// be shared while it runs.
///
/// # Example
/// ```
/// use the_harness::components::{Generator, GeneratorConfig, Sink, SinkConfig};
/// use the_harness::config::{ComponentConfig, HarnessConfig};
/// use the_harness::harness::SystemExecutionHarness;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut harness = SystemExecutionHarness::new(HarnessConfig::default());
///
/// let generator = Generator::new(GeneratorConfig { count: 3, ..Default::default() });
/// let sink = Sink::new(SinkConfig::default());
/// let collected = sink.collected();
///
/// let source = harness
///     .register_component("numbers", Box::new(generator), ComponentConfig::default())
///     .unwrap();
/// let dest = harness
///     .register_component("collector", Box::new(sink), ComponentConfig::default())
///     .unwrap();
/// harness.connect(source.output("output"), dest.input("input")).unwrap();
///
/// let report = harness.run().await.unwrap();
/// assert_eq!(collected.len(), 3);
/// assert!(report.forced.is_empty());
/// # }
/// ```
pub struct SystemExecutionHarness {
    config: HarnessConfig,
    framework: StreamFramework,
    components: Vec<Registered>,
    index: HashMap<String, usize>,
    connections: Vec<Connection>,
    shutdown: CancellationToken,
    started: AtomicBool,
    running: AtomicBool,
}

impl SystemExecutionHarness {
    pub fn new(config: HarnessConfig) -> Self {
        let framework = StreamFramework::new(config.stream_buffer_size, config.send_timeout);
        Self {
            config,
            framework,
            components: Vec::new(),
            index: HashMap::new(),
            connections: Vec::new(),
            shutdown: CancellationToken::new(),
            started: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn stream_framework(&self) -> &StreamFramework {
        &self.framework
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Component names in registration order
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|r| r.name.as_str())
    }

    /// Cancelling this token asks every component to stop.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Shared handle to a component, for inspection once the run is over.
    pub fn get_component(&self, name: &str) -> Option<Arc<Mutex<HarnessComponent>>> {
        self.entry(name).map(|r| Arc::clone(&r.component))
    }

    /// Latest published state, readable without locking the component.
    pub fn component_state(&self, name: &str) -> Option<ComponentState> {
        self.entry(name).map(|r| *r.state.borrow())
    }

    fn entry(&self, name: &str) -> Option<&Registered> {
        self.index.get(name).and_then(|&i| self.components.get(i))
    }

    fn ensure_not_started(&self) -> Result<(), HarnessError> {
        if self.started.load(Ordering::SeqCst) {
            return Err(HarnessError::AlreadyStarted);
        }
        Ok(())
    }

    /// Exclusive access to a component during wiring.
    fn component_mut(&mut self, name: &str) -> Result<&mut HarnessComponent, HarnessError> {
        let registered = self
            .index
            .get(name)
            .and_then(|&i| self.components.get_mut(i))
            .ok_or_else(|| HarnessError::UnknownComponent(name.to_string()))?;
        Arc::get_mut(&mut registered.component)
            .map(Mutex::get_mut)
            .ok_or(HarnessError::AlreadyStarted)
    }

    /// Add a component under a unique name.
    ///
    /// A config without an `error_threshold` inherits the harness default.
    pub fn register_component(
        &mut self,
        name: &str,
        behaviour: Box<dyn Component>,
        config: ComponentConfig,
    ) -> Result<ComponentRef, HarnessError> {
        self.ensure_not_started()?;
        if self.index.contains_key(name) {
            return Err(HarnessError::DuplicateComponent(name.to_string()));
        }

        let config = match config.error_threshold {
            Some(_) => config,
            None => config.with_error_threshold(self.config.error_threshold),
        };
        let mut component = HarnessComponent::new(name, config, behaviour);
        component.set_cancellation_token(self.shutdown.child_token());
        let state = component.status().subscribe();

        self.index.insert(name.to_string(), self.components.len());
        self.components.push(Registered {
            name: name.to_string(),
            component: Arc::new(Mutex::new(component)),
            state,
        });

        ComponentRegistered { component: name }.log();
        Ok(ComponentRef::new(name))
    }

    /// Wire `source` to `dest` with the default buffer size.
    pub fn connect(&mut self, source: PortRef, dest: PortRef) -> Result<(), HarnessError> {
        let buffer_size = self.framework.default_buffer_size();
        self.connect_with_buffer(source, dest, buffer_size)
    }

    /// Wire two `"component.port"` addresses with the default buffer size.
    pub fn connect_addresses(&mut self, source: &str, dest: &str) -> Result<(), HarnessError> {
        let source = PortRef::parse(source, Direction::Send)?;
        let dest = PortRef::parse(dest, Direction::Receive)?;
        self.connect(source, dest)
    }

    /// Create a bounded stream from an output port to an input port.
    ///
    /// Fails without side effects if either component is unknown, a port
    /// has the wrong direction, or either port is already wired.
    pub fn connect_with_buffer(
        &mut self,
        source: PortRef,
        dest: PortRef,
        buffer_size: usize,
    ) -> Result<(), HarnessError> {
        self.ensure_not_started()?;
        for (port, expected) in [(&source, Direction::Send), (&dest, Direction::Receive)] {
            if port.direction() != expected {
                return Err(HarnessError::PortDirectionMismatch {
                    component: port.component().to_string(),
                    port: port.port().to_string(),
                    expected,
                    actual: port.direction(),
                });
            }
        }

        if self.component_mut(source.component())?.context().has_output(source.port()) {
            return Err(HarnessError::PortAlreadyConnected {
                component: source.component().to_string(),
                port: source.port().to_string(),
                direction: Direction::Send,
            });
        }
        if self.component_mut(dest.component())?.context().has_input(dest.port()) {
            return Err(HarnessError::PortAlreadyConnected {
                component: dest.component().to_string(),
                port: dest.port().to_string(),
                direction: Direction::Receive,
            });
        }

        let (tx, rx) = self.framework.create_stream(Some(buffer_size));
        let tx_id = self.framework.register_endpoint(source.port(), source.component(), tx)?;
        let rx_id = self.framework.register_endpoint(dest.port(), dest.component(), rx)?;
        let sender = self
            .framework
            .endpoint(tx_id)
            .ok_or(crate::errors::StreamError::UnknownEndpoint(tx_id))?;
        let receiver = self
            .framework
            .endpoint(rx_id)
            .ok_or(crate::errors::StreamError::UnknownEndpoint(rx_id))?;
        let capacity = sender.capacity();

        self.component_mut(source.component())?
            .connect_output_stream(source.port(), sender)?;
        self.component_mut(dest.component())?
            .connect_input_stream(dest.port(), receiver)?;

        PortsConnected {
            source: &source.to_string(),
            dest: &dest.to_string(),
            buffer_size: capacity,
        }
        .log();

        self.connections.push(Connection {
            source,
            dest,
            buffer_size: capacity,
        });
        Ok(())
    }

    /// Aggregate state of every component.
    pub fn status(&self) -> HarnessStatus {
        let components: BTreeMap<String, ComponentState> = self
            .components
            .iter()
            .map(|r| (r.name.clone(), *r.state.borrow()))
            .collect();
        let healthy_count = components
            .values()
            .filter(|state| **state != ComponentState::Error)
            .count();

        HarnessStatus {
            running: self.running.load(Ordering::SeqCst),
            components,
            healthy_count,
            connection_count: self.connections.len(),
        }
    }

    /// Run every component to completion, or until shutdown.
    ///
    /// Each component gets its own task: setup (bounded by the startup
    /// timeout), then the process loop. Once shutdown is requested the
    /// remaining tasks have `shutdown_timeout` to finish before they are
    /// aborted and their components marked faulted. Every component is then
    /// cleaned up. A harness runs once.
    pub async fn run(&self) -> Result<HarnessReport, HarnessError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(HarnessError::AlreadyStarted);
        }
        self.running.store(true, Ordering::SeqCst);

        let start_msg = HarnessStarted {
            component_count: self.components.len(),
            connection_count: self.connections.len(),
        };
        let span = start_msg.span("harness_run");
        start_msg.log();
        self.drive().instrument(span).await
    }

    async fn drive(&self) -> Result<HarnessReport, HarnessError> {
        let started_at = Utc::now();
        let run_started = Instant::now();

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        for registered in &self.components {
            let component = Arc::clone(&registered.component);
            let startup_timeout = self.config.startup_timeout;
            let handle = tasks.spawn(async move {
                let mut component = component.lock().await;
                // Failures are recorded on the component's status
                if component.setup_with_timeout(startup_timeout).await.is_ok() {
                    let _ = component.run_process_with_lifecycle().await;
                }
                component.close_endpoints().await;
            });
            pending.insert(handle.id(), registered.name.clone());
        }

        let shutdown_timeout = self.config.shutdown_timeout;
        let mut health = tokio::time::interval(
            self.config
                .health_check_interval
                .max(Duration::from_millis(1)),
        );
        health.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reported_unhealthy = HashSet::new();

        let deadline = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(deadline);
        let mut draining = false;
        let mut forced = Vec::new();
        let mut crashed = Vec::new();

        while !pending.is_empty() {
            tokio::select! {
                joined = tasks.join_next_with_id() => match joined {
                    Some(Ok((id, ()))) => {
                        pending.remove(&id);
                    }
                    Some(Err(error)) => {
                        if let Some(name) = pending.remove(&error.id()) {
                            ComponentTaskFailed {
                                component: &name,
                                error: &error,
                            }
                            .log();
                            crashed.push(name);
                        }
                    }
                    None => break,
                },
                _ = self.shutdown.cancelled(), if !draining => {
                    ShutdownRequested {
                        pending_components: pending.len(),
                        timeout: shutdown_timeout,
                    }
                    .log();
                    deadline
                        .as_mut()
                        .reset(tokio::time::Instant::now() + shutdown_timeout);
                    draining = true;
                }
                () = &mut deadline, if draining => {
                    forced.extend(pending.drain().map(|(_, name)| name));
                    forced.sort();
                    for name in &forced {
                        ComponentForceCancelled {
                            component: name,
                            timeout: shutdown_timeout,
                        }
                        .log();
                    }
                    tasks.abort_all();
                    while tasks.join_next().await.is_some() {}
                }
                _ = health.tick(), if self.config.enable_health_monitoring => {
                    self.check_health(&mut reported_unhealthy);
                }
            }
        }

        let mut last_setup_finished: Option<Instant> = None;
        for registered in &self.components {
            let mut component = registered.component.lock().await;
            last_setup_finished = last_setup_finished.max(component.setup_finished_at());
            if forced.contains(&registered.name) {
                component.mark_faulted(&format!(
                    "did not stop within {:?} of shutdown; force-cancelled",
                    shutdown_timeout
                ));
            } else if crashed.contains(&registered.name) {
                component.mark_faulted("component task panicked");
            }

            if tokio::time::timeout(shutdown_timeout, component.cleanup())
                .await
                .is_err()
            {
                component.mark_faulted("cleanup timed out");
            }
        }

        let components = if self.config.enable_performance_monitoring {
            self.collect_metrics().await
        } else {
            Vec::new()
        };
        let runtime = run_started.elapsed();
        let startup = last_setup_finished
            .map(|finished| finished.saturating_duration_since(run_started))
            .unwrap_or_default();
        self.running.store(false, Ordering::SeqCst);

        HarnessCompleted {
            component_count: self.components.len(),
            forced_count: forced.len(),
            startup,
            duration: runtime,
        }
        .log();

        Ok(HarnessReport {
            started_at,
            startup_seconds: startup.as_secs_f64(),
            runtime_seconds: runtime.as_secs_f64(),
            components,
            streams: self.framework.all_metrics(),
            forced,
        })
    }

    fn check_health(&self, reported: &mut HashSet<String>) {
        for registered in &self.components {
            let state = *registered.state.borrow();
            if state == ComponentState::Error && reported.insert(registered.name.clone()) {
                UnhealthyComponent {
                    component: &registered.name,
                    state,
                }
                .log();
            }
        }
    }

    async fn collect_metrics(&self) -> Vec<PerformanceMetrics> {
        let mut metrics = Vec::with_capacity(self.components.len());
        for registered in &self.components {
            metrics.push(registered.component.lock().await.get_performance_metrics());
        }
        metrics
    }
}
