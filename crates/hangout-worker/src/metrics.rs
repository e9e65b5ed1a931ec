//! Pipeline metrics: messages consumed per topic, processing duration by outcome, and
//! messages in flight.
//!
//! Instruments come from the global meter provider, so they only export once telemetry
//! installed one. Without the `observability-opentelemetry` feature every method is a
//! no-op.

use std::time::Duration;

#[cfg(feature = "observability-opentelemetry")]
use opentelemetry::{
    metrics::{Counter, Histogram, UpDownCounter},
    KeyValue,
};

use hangout_core::{PipelineName, ProcessingOutcome};

#[cfg(feature = "observability-opentelemetry")]
const METER_NAME: &str = "hangout.pipeline";

/// Histogram buckets in seconds, up to ten minutes.
#[cfg(feature = "observability-opentelemetry")]
const DURATION_BUCKETS: [f64; 21] = [
    0.0, 30.0, 60.0, 90.0, 120.0, 150.0, 180.0, 210.0, 240.0, 270.0, 300.0, 330.0, 360.0,
    390.0, 420.0, 450.0, 480.0, 510.0, 540.0, 570.0, 600.0,
];

#[derive(Clone)]
#[cfg(feature = "observability-opentelemetry")]
pub struct PipelineMetrics {
    consumed: Counter<u64>,
    duration: Histogram<f64>,
    in_flight: UpDownCounter<i64>,
}

#[derive(Clone, Default)]
#[cfg(not(feature = "observability-opentelemetry"))]
pub struct PipelineMetrics;

#[cfg(feature = "observability-opentelemetry")]
impl PipelineMetrics {
    pub fn new() -> Self {
        let meter = opentelemetry::global::meter(METER_NAME);

        let consumed = meter
            .u64_counter("hangout.pipeline.messages.consumed")
            .with_description("Pipeline-init messages taken off a topic queue")
            .build();

        let duration = meter
            .f64_histogram("hangout.pipeline.processing.duration")
            .with_description("Time spent processing one pipeline-init message")
            .with_unit("s")
            .with_boundaries(DURATION_BUCKETS.to_vec())
            .build();

        let in_flight = meter
            .i64_up_down_counter("hangout.pipeline.messages.in_flight")
            .with_description("Pipeline-init messages currently being processed")
            .build();

        Self {
            consumed,
            duration,
            in_flight,
        }
    }

    pub fn record_consumed(&self, topic: PipelineName) {
        self.consumed.add(1, &[KeyValue::new("topic", topic.topic())]);
    }

    pub fn record_started(&self, topic: PipelineName) {
        self.in_flight.add(1, &[KeyValue::new("topic", topic.topic())]);
    }

    pub fn record_processed(
        &self,
        topic: PipelineName,
        outcome: &ProcessingOutcome,
        elapsed: Duration,
    ) {
        self.in_flight
            .add(-1, &[KeyValue::new("topic", topic.topic())]);
        self.duration.record(
            elapsed.as_secs_f64(),
            &[
                KeyValue::new("topic", topic.topic()),
                KeyValue::new("outcome", outcome.label()),
            ],
        );
    }
}

#[cfg(feature = "observability-opentelemetry")]
impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(feature = "observability-opentelemetry"))]
impl PipelineMetrics {
    pub fn new() -> Self {
        Self
    }

    pub fn record_consumed(&self, _topic: PipelineName) {}

    pub fn record_started(&self, _topic: PipelineName) {}

    pub fn record_processed(
        &self,
        _topic: PipelineName,
        _outcome: &ProcessingOutcome,
        _elapsed: Duration,
    ) {
    }
}
