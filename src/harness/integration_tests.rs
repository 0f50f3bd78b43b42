// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use crate::components::stub::{FailingComponent, IdleComponent, StallingComponent};
    use crate::components::{
        Generator, GeneratorConfig, Operation, Sink, SinkConfig, Transformer, TransformerConfig,
    };
    use crate::config::{ComponentConfig, HarnessConfig};
    use crate::errors::{ComponentResult, HarnessError};
    use crate::harness::{PortRef, SystemExecutionHarness};
    use crate::lifecycle::ComponentState;
    use crate::protocol::MessageType;
    use crate::streams::Direction;
    use crate::traits::{Component, ComponentContext, ProcessOutcome};

    fn fast_config() -> HarnessConfig {
        HarnessConfig {
            shutdown_timeout: Duration::from_millis(200),
            health_check_interval: Duration::from_millis(10),
            ..HarnessConfig::default()
        }
    }

    fn fast() -> ComponentConfig {
        ComponentConfig::default().with_poll_interval_ms(10)
    }

    fn generator(count: u64, prefix: Option<&str>) -> Box<Generator> {
        Box::new(Generator::new(GeneratorConfig {
            count,
            interval_ms: 0,
            prefix: prefix.map(str::to_string),
        }))
    }

    /// Setup hook that never returns.
    struct HangingSetup;

    #[async_trait]
    impl Component for HangingSetup {
        async fn setup(&mut self, _ctx: &mut ComponentContext) -> ComponentResult<()> {
            std::future::pending::<()>().await;
            Ok(())
        }

        async fn process(&mut self, _ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
            Ok(ProcessOutcome::Complete)
        }

        fn kind(&self) -> &'static str {
            "hanging_setup"
        }
    }

    /// Setup hook that takes a while, then a behaviour with nothing to do.
    struct SlowSetup(Duration);

    #[async_trait]
    impl Component for SlowSetup {
        async fn setup(&mut self, _ctx: &mut ComponentContext) -> ComponentResult<()> {
            tokio::time::sleep(self.0).await;
            Ok(())
        }

        async fn process(&mut self, _ctx: &mut ComponentContext) -> ComponentResult<ProcessOutcome> {
            Ok(ProcessOutcome::Complete)
        }

        fn kind(&self) -> &'static str {
            "slow_setup"
        }
    }

    /// Test that a three-stage pipeline delivers every item in order and stops cleanly
    #[tokio::test]
    async fn test_three_stage_pipeline_delivers_all_items() {
        let mut harness = SystemExecutionHarness::new(fast_config());
        let sink = Sink::new(SinkConfig::default());
        let collected = sink.collected();
        let upper = Transformer::new(TransformerConfig {
            operation: Operation::Uppercase,
            ..Default::default()
        });

        let source = harness.register_component("source", generator(3, Some("item")), fast()).unwrap();
        let middle = harness.register_component("upper", Box::new(upper), fast()).unwrap();
        let dest = harness.register_component("dest", Box::new(sink), fast()).unwrap();
        harness.connect(source.output("output"), middle.input("input")).unwrap();
        harness.connect(middle.output("output"), dest.input("input")).unwrap();

        let report = harness.run().await.unwrap();

        assert_eq!(collected.snapshot(), vec![json!("ITEM-1"), json!("ITEM-2"), json!("ITEM-3")]);
        assert!(report.forced.is_empty());
        for name in ["source", "upper", "dest"] {
            assert_eq!(harness.component_state(name), Some(ComponentState::Stopped), "{}", name);
            assert_eq!(report.component(name).unwrap().error_count, 0);
        }

        // Three data messages plus end-of-stream on each hop
        let source_out = report
            .streams
            .iter()
            .find(|s| s.owner == "source" && s.direction == Direction::Send)
            .unwrap();
        assert_eq!(source_out.messages_sent, 4);
        assert_eq!(source_out.send_failures, 0);
        assert_eq!(report.component("dest").unwrap().message_count, 4);
        assert!(!harness.status().running);
    }

    /// Test that a tiny buffer applies backpressure without losing or reordering data
    #[tokio::test]
    async fn test_small_buffer_preserves_order() {
        let mut harness = SystemExecutionHarness::new(fast_config());
        let sink = Sink::new(SinkConfig::default());
        let collected = sink.collected();

        let source = harness.register_component("source", generator(50, None), fast()).unwrap();
        let dest = harness.register_component("dest", Box::new(sink), fast()).unwrap();
        harness
            .connect_with_buffer(source.output("output"), dest.input("input"), 1)
            .unwrap();

        harness.run().await.unwrap();

        let expected: Vec<_> = (1..=50).map(|n| json!(n)).collect();
        assert_eq!(collected.snapshot(), expected);
        assert_eq!(harness.connections()[0].buffer_size, 1);
    }

    /// Test that one failing component degrades alone while its siblings finish
    #[tokio::test]
    async fn test_failing_component_is_isolated() {
        let mut harness = SystemExecutionHarness::new(fast_config());
        let sink = Sink::new(SinkConfig::default());
        let collected = sink.collected();

        harness
            .register_component(
                "broken",
                Box::new(FailingComponent::new("simulated failure")),
                ComponentConfig::default().with_error_threshold(2),
            )
            .unwrap();
        harness.register_component("source", generator(5, None), fast()).unwrap();
        harness.register_component("dest", Box::new(sink), fast()).unwrap();
        harness.connect_addresses("source.output", "dest.input").unwrap();

        let report = harness.run().await.unwrap();

        assert_eq!(harness.component_state("broken"), Some(ComponentState::Error));
        assert_eq!(harness.component_state("source"), Some(ComponentState::Stopped));
        assert_eq!(harness.component_state("dest"), Some(ComponentState::Stopped));
        assert_eq!(collected.len(), 5);

        let broken = report.component("broken").unwrap();
        assert_eq!(broken.error_count, 3);
        assert_eq!(broken.state, ComponentState::Error);
        assert!(report.forced.is_empty());

        let status = harness.status();
        assert_eq!(status.component_count(), 3);
        assert_eq!(status.healthy_count, 2);
    }

    /// Test that shutdown stops cooperative components and force-cancels a stuck one
    #[tokio::test]
    async fn test_stalling_component_is_force_cancelled() {
        let mut harness = SystemExecutionHarness::new(fast_config());
        harness
            .register_component("stuck", Box::new(StallingComponent::new(Duration::from_secs(3600))), fast())
            .unwrap();
        harness.register_component("idle", Box::new(IdleComponent), fast()).unwrap();

        let harness = Arc::new(harness);
        let shutdown = harness.shutdown_handle();
        let run = {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move { harness.run().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(harness.status().running);
        let requested = Instant::now();
        shutdown.cancel();

        let report = run.await.unwrap().unwrap();
        assert!(requested.elapsed() < Duration::from_secs(2));
        assert_eq!(report.forced, vec!["stuck".to_string()]);
        assert_eq!(harness.component_state("stuck"), Some(ComponentState::Error));
        assert_eq!(harness.component_state("idle"), Some(ComponentState::Stopped));

        let stuck = harness.get_component("stuck").unwrap();
        let stuck = stuck.lock().await;
        assert!(stuck.status().last_error().unwrap().contains("force-cancelled"));
    }

    /// Test that shutdown interrupts a long-running pipeline without forcing anything
    #[tokio::test]
    async fn test_shutdown_stops_cooperative_pipeline() {
        let mut harness = SystemExecutionHarness::new(fast_config());
        let slow = Generator::new(GeneratorConfig {
            count: 1_000_000,
            interval_ms: 5,
            prefix: None,
        });
        let source = harness.register_component("source", Box::new(slow), fast()).unwrap();
        let dest = harness
            .register_component("dest", Box::new(Sink::new(SinkConfig::default())), fast())
            .unwrap();
        harness.connect(source.output("output"), dest.input("input")).unwrap();

        let harness = Arc::new(harness);
        let shutdown = harness.shutdown_handle();
        let run = {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move { harness.run().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();

        let report = run.await.unwrap().unwrap();
        assert!(report.forced.is_empty());
        assert_eq!(harness.component_state("source"), Some(ComponentState::Stopped));
        assert_eq!(harness.component_state("dest"), Some(ComponentState::Stopped));
    }

    /// Test that a setup hook exceeding the startup timeout fails only its component
    #[tokio::test]
    async fn test_setup_timeout_marks_component_error() {
        let config = HarnessConfig {
            startup_timeout: Duration::from_millis(30),
            ..fast_config()
        };
        let mut harness = SystemExecutionHarness::new(config);
        harness.register_component("hangs", Box::new(HangingSetup), fast()).unwrap();
        let sink = Sink::new(SinkConfig::default());
        let collected = sink.collected();
        let source = harness.register_component("source", generator(2, None), fast()).unwrap();
        let dest = harness.register_component("dest", Box::new(sink), fast()).unwrap();
        harness.connect(source.output("output"), dest.input("input")).unwrap();

        harness.run().await.unwrap();

        assert_eq!(harness.component_state("hangs"), Some(ComponentState::Error));
        assert_eq!(collected.len(), 2);
        let hangs = harness.get_component("hangs").unwrap();
        let hangs = hangs.lock().await;
        assert!(hangs.status().last_error().unwrap().contains("timed out"));
        // A timed-out setup still counts toward startup
        assert!(hangs.context().setup_duration().unwrap() >= Duration::from_millis(30));
        assert!(hangs.setup_finished_at().is_some());
    }

    /// Test that a producer finishes on its own when its consumer never starts
    #[tokio::test]
    async fn test_producer_finishes_when_consumer_fails_setup() {
        let config = HarnessConfig {
            startup_timeout: Duration::from_millis(30),
            send_timeout: Duration::from_secs(5),
            ..fast_config()
        };
        let mut harness = SystemExecutionHarness::new(config);
        let source = harness.register_component("source", generator(5, None), fast()).unwrap();
        let hangs = harness.register_component("hangs", Box::new(HangingSetup), fast()).unwrap();
        harness
            .connect_with_buffer(source.output("output"), hangs.input("input"), 1)
            .unwrap();

        let report = tokio::time::timeout(Duration::from_secs(2), harness.run())
            .await
            .expect("run finished without a shutdown request")
            .unwrap();

        assert_eq!(harness.component_state("hangs"), Some(ComponentState::Error));
        assert_eq!(harness.component_state("source"), Some(ComponentState::Stopped));
        assert_eq!(report.component("source").unwrap().error_count, 1);
        assert!(report.forced.is_empty());
    }

    /// Test that wiring mistakes are rejected before anything runs
    #[tokio::test]
    async fn test_wiring_errors() {
        let mut harness = SystemExecutionHarness::new(HarnessConfig::default());
        let a = harness.register_component("a", Box::new(IdleComponent), fast()).unwrap();
        let b = harness.register_component("b", Box::new(IdleComponent), fast()).unwrap();

        assert!(matches!(
            harness.register_component("a", Box::new(IdleComponent), fast()),
            Err(HarnessError::DuplicateComponent(name)) if name == "a"
        ));
        assert!(matches!(
            harness.connect(a.output("out"), PortRef::input("ghost", "in")),
            Err(HarnessError::UnknownComponent(name)) if name == "ghost"
        ));
        assert!(matches!(
            harness.connect(a.input("in"), b.input("in")),
            Err(HarnessError::PortDirectionMismatch { expected: Direction::Send, .. })
        ));
        assert!(matches!(
            harness.connect_addresses("a-out", "b.in"),
            Err(HarnessError::InvalidPortAddress(_))
        ));

        harness.connect(a.output("out"), b.input("in")).unwrap();
        assert!(matches!(
            harness.connect(a.output("out"), b.input("other")),
            Err(HarnessError::PortAlreadyConnected { direction: Direction::Send, .. })
        ));
        assert!(matches!(
            harness.connect(b.output("out"), b.input("in")),
            Err(HarnessError::PortAlreadyConnected { direction: Direction::Receive, .. })
        ));

        // Failed attempts left no trace
        assert_eq!(harness.connections().len(), 1);
        assert_eq!(harness.stream_framework().endpoint_count(), 2);

        // and the first connection still carries messages
        let framework = harness.stream_framework();
        let endpoints = framework.all_metrics();
        let tx = endpoints
            .iter()
            .find(|m| m.owner == "a" && m.port == "out" && m.direction == Direction::Send)
            .unwrap()
            .id;
        let rx = endpoints
            .iter()
            .find(|m| m.owner == "b" && m.port == "in" && m.direction == Direction::Receive)
            .unwrap()
            .id;
        assert!(framework.send_message(tx, json!("still wired"), MessageType::Data).await);
        let message = framework
            .receive_message(rx, Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert_eq!(message.payload, json!("still wired"));
        assert_eq!(message.sender, "a");
    }

    /// Test that a full side output holds the generator back without
    /// resending items to the outputs that already took them
    #[tokio::test]
    async fn test_full_output_does_not_duplicate_on_other_outputs() {
        let config = HarnessConfig {
            send_timeout: Duration::from_millis(20),
            ..fast_config()
        };
        let mut harness = SystemExecutionHarness::new(config);
        let sink = Sink::new(SinkConfig::default());
        let collected = sink.collected();

        let source = harness.register_component("source", generator(5, None), fast()).unwrap();
        let main = harness.register_component("main", Box::new(sink), fast()).unwrap();
        let side = harness.register_component("side", Box::new(IdleComponent), fast()).unwrap();
        harness
            .connect_with_buffer(source.output("main"), main.input("input"), 100)
            .unwrap();
        harness
            .connect_with_buffer(source.output("side"), side.input("input"), 1)
            .unwrap();

        let harness = Arc::new(harness);
        let shutdown = harness.shutdown_handle();
        let run = {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move { harness.run().await })
        };
        // Many send timeouts pass while "side" stays full
        tokio::time::sleep(Duration::from_millis(150)).await;
        shutdown.cancel();

        let report = run.await.unwrap().unwrap();
        assert_eq!(collected.snapshot(), vec![json!(1), json!(2)]);
        let source = report.component("source").unwrap();
        assert_eq!(source.error_count, 0);
        assert_eq!(source.state, ComponentState::Stopped);
        assert!(report.forced.is_empty());
    }

    /// Test that the report records how long startup took
    #[tokio::test]
    async fn test_report_records_startup_time() {
        let mut harness = SystemExecutionHarness::new(fast_config());
        harness
            .register_component("slow", Box::new(SlowSetup(Duration::from_millis(30))), fast())
            .unwrap();
        harness.register_component("quick", generator(1, None), fast()).unwrap();

        let report = harness.run().await.unwrap();

        assert!(report.startup_seconds >= 0.03);
        assert!(report.startup_seconds <= report.runtime_seconds);
        assert!(report.component("slow").unwrap().setup_seconds.unwrap() >= 0.03);
        assert!(report.component("quick").unwrap().setup_seconds.unwrap() < 0.03);
    }

    /// Test that a harness cannot be rewired or rerun once started
    #[tokio::test]
    async fn test_harness_runs_once() {
        let mut harness = SystemExecutionHarness::new(fast_config());
        harness.register_component("source", generator(0, None), fast()).unwrap();

        harness.run().await.unwrap();

        assert!(matches!(harness.run().await, Err(HarnessError::AlreadyStarted)));
        assert!(matches!(
            harness.register_component("late", Box::new(IdleComponent), fast()),
            Err(HarnessError::AlreadyStarted)
        ));
    }

    /// Test that components inherit the harness error threshold unless they override it
    #[test]
    fn test_error_threshold_inheritance() {
        let config = HarnessConfig {
            error_threshold: 4,
            ..HarnessConfig::default()
        };
        let mut harness = SystemExecutionHarness::new(config);
        harness.register_component("inherits", Box::new(IdleComponent), fast()).unwrap();
        harness
            .register_component("overrides", Box::new(IdleComponent), fast().with_error_threshold(1))
            .unwrap();

        let threshold = |name: &str| {
            let component = harness.get_component(name).unwrap();
            let guard = component.try_lock().unwrap();
            guard.status().error_threshold()
        };
        assert_eq!(threshold("inherits"), 4);
        assert_eq!(threshold("overrides"), 1);
    }
}
