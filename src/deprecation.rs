//! Deprecation-emission hook (§4.4, §5 "the only shared mutable touch-point
//! is the deprecation-log sink... append-only and thread-safe by contract").
//! Modelled on an optional notification
//! `Sender`: an explicit, injected dependency rather than a mutable global.
use std::sync::Arc;

/// A single deprecation notice: a fixed category/key pair and the payload
/// naming what triggered it (§4.4: `category = "API"`,
/// `key = "open_system_index_access"`).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct DeprecationEvent {
	pub category: &'static str,
	pub key: &'static str,
	pub payload: Vec<String>,
}

/// Append-only sink for deprecation notices. Implementations must be safe to
/// call concurrently from many resolution calls.
pub trait DeprecationSink: Send + Sync {
	fn emit(&self, event: DeprecationEvent);
}

/// The default sink: forwards every event to `tracing::warn!`. Suitable when
/// the embedding process already aggregates deprecations from its log
/// stream rather than a dedicated channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDeprecationSink;

impl DeprecationSink for TracingDeprecationSink {
	fn emit(&self, event: DeprecationEvent) {
		warn!(
			category = event.category,
			key = event.key,
			payload = ?event.payload,
			"deprecated index access"
		);
	}
}

/// A sink that also records every event in memory, for tests and for
/// embedders that want to surface deprecations to their own callers instead
/// of (or in addition to) the log stream.
#[derive(Clone, Default)]
pub struct RecordingDeprecationSink {
	events: Arc<std::sync::Mutex<Vec<DeprecationEvent>>>,
}

impl RecordingDeprecationSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<DeprecationEvent> {
		self.events.lock().expect("deprecation sink mutex poisoned").clone()
	}
}

impl DeprecationSink for RecordingDeprecationSink {
	fn emit(&self, event: DeprecationEvent) {
		warn!(category = event.category, key = event.key, payload = ?event.payload, "deprecated index access");
		self.events.lock().expect("deprecation sink mutex poisoned").push(event);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recording_sink_keeps_every_event() {
		let sink = RecordingDeprecationSink::new();
		sink.emit(DeprecationEvent {
			category: "API",
			key: "open_system_index_access",
			payload: vec![".tasks".to_string()],
		});
		assert_eq!(sink.events().len(), 1);
	}
}
