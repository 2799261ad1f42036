//! System-index access gate (§4.4). Runs after materialization and enforces
//! access rules against the concrete set it produced.
use crate::deprecation::{DeprecationEvent, DeprecationSink};
use crate::err::{Error, Result};
use crate::model::{ClusterSnapshot, Context, IndexId};

/// Enforce system-index access for a materialized set. Does not filter
/// `indices`: historic-system rejection is a deprecation, not an exclusion
/// (§7 "Propagation").
pub fn apply_gate<S: ClusterSnapshot>(
	ctx: &Context<'_, S>,
	sink: &dyn DeprecationSink,
	indices: &[IndexId],
) -> Result<()> {
	let mut rejected_historic = Vec::new();
	let mut rejected_net_new = Vec::new();
	let mut rejected_data_streams = Vec::new();

	for id in indices {
		let Some(meta) = ctx.snapshot.index_metadata(&id.name) else {
			continue;
		};
		if !meta.is_system {
			continue;
		}
		if ctx.system_access(&id.name) {
			continue;
		}
		if let Some(parent) = &meta.data_stream_parent {
			rejected_data_streams.push(parent.clone());
		} else if ctx.is_net_new_system(&id.name) {
			rejected_net_new.push(id.name.clone());
		} else {
			rejected_historic.push(id.name.clone());
		}
	}

	if !rejected_historic.is_empty() {
		rejected_historic.sort();
		rejected_historic.dedup();
		sink.emit(DeprecationEvent {
			category: "API",
			key: "open_system_index_access",
			payload: rejected_historic,
		});
	}

	if !rejected_data_streams.is_empty() {
		rejected_data_streams.sort();
		rejected_data_streams.dedup();
		return Err(Error::SystemDataStreamAccessDenied {
			data_streams: rejected_data_streams,
		});
	}

	if !rejected_net_new.is_empty() {
		rejected_net_new.sort();
		rejected_net_new.dedup();
		return Err(Error::SystemNetNewAccessDenied {
			indices: rejected_net_new,
		});
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::deprecation::RecordingDeprecationSink;
	use crate::model::{IndexMetadata, IndexState, IndicesOptions, InMemorySnapshot, SystemIndexAccessLevel};

	fn snapshot_with_system(data_stream_parent: Option<&str>) -> InMemorySnapshot {
		InMemorySnapshot::new().with_index(
			IndexMetadata {
				id: IndexId::new(".tasks", uuid::Uuid::nil()),
				state: IndexState::Open,
				frozen: false,
				is_system: true,
				is_hidden: true,
				data_stream_parent: data_stream_parent.map(str::to_owned),
			},
			true,
			true,
		)
	}

	#[test]
	fn historic_rejection_emits_deprecation_not_error() {
		let snap = snapshot_with_system(None);
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::None,
			|_| false,
			|_| false,
		);
		let sink = RecordingDeprecationSink::new();
		let ids = vec![IndexId::new(".tasks", uuid::Uuid::nil())];
		apply_gate(&ctx, &sink, &ids).unwrap();
		assert_eq!(sink.events().len(), 1);
	}

	#[test]
	fn net_new_rejection_is_an_error() {
		let snap = snapshot_with_system(None);
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::None,
			|_| false,
			|_| true,
		);
		let ids = vec![IndexId::new(".tasks", uuid::Uuid::nil())];
		let sink = RecordingDeprecationSink::new();
		let err = apply_gate(&ctx, &sink, &ids).unwrap_err();
		assert!(matches!(err, Error::SystemNetNewAccessDenied { .. }));
	}

	#[test]
	fn data_stream_owned_rejection_names_the_parent() {
		let snap = snapshot_with_system(Some("events"));
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::None,
			|_| false,
			|_| false,
		);
		let ids = vec![IndexId::new(".tasks", uuid::Uuid::nil())];
		let sink = RecordingDeprecationSink::new();
		let err = apply_gate(&ctx, &sink, &ids).unwrap_err();
		match err {
			Error::SystemDataStreamAccessDenied { data_streams } => {
				assert_eq!(data_streams, vec!["events".to_string()]);
			}
			_ => panic!("expected SystemDataStreamAccessDenied"),
		}
	}
}
