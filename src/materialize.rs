//! Concrete-index materializer (§4.3). Turns a wildcard-resolved name
//! collection into the final, deduplicated, insertion-ordered set of
//! concrete backing index ids.
use indexmap::IndexSet;

use crate::err::{Error, Result};
use crate::model::{Context, IndexAbstraction, IndexId, IndexState};
use crate::model::ClusterSnapshot;

/// Materialize `names` (already date-math-resolved and wildcard-expanded)
/// into concrete index ids. `original_expression_count` is the arity of the
/// caller's original request, which decides whether a missing name fails
/// under `allow_no_indices` (single expression) or `ignore_unavailable`
/// (multiple) — the §9 "preserved for backwards compatibility" split.
pub fn materialize<S: ClusterSnapshot>(
	ctx: &Context<'_, S>,
	names: &[String],
	original_expression_count: usize,
) -> Result<Vec<IndexId>> {
	let (names, cross_cluster) = partition_cross_cluster(names);
	if !cross_cluster.is_empty() && !ctx.options.ignore_unavailable {
		return Err(Error::CrossClusterUnsupported {
			expressions: cross_cluster,
		});
	}

	let fail_if_missing = if original_expression_count <= 1 {
		!ctx.options.allow_no_indices
	} else {
		!ctx.options.ignore_unavailable
	};

	let mut tracked: IndexSet<IndexId> = IndexSet::new();
	let mut excluded_data_streams = false;

	for name in &names {
		let Some(abstraction) = ctx.snapshot.lookup(name) else {
			if fail_if_missing {
				return Err(Error::IndexNotFound {
					expression: name.clone(),
					excluded_data_streams,
				});
			}
			continue;
		};

		if abstraction.is_alias() && ctx.options.ignore_aliases {
			if fail_if_missing {
				return Err(Error::AliasNotAllowed {
					expression: name.clone(),
				});
			}
			continue;
		}

		if abstraction.is_data_stream() && !ctx.include_data_streams {
			excluded_data_streams = true;
			continue;
		}

		if ctx.resolve_to_write_index {
			let write_index = abstraction.write_index_name().ok_or_else(|| Error::NoWriteIndex {
				alias: name.clone(),
			})?;
			if let Some(id) = admit_index(ctx, write_index)? {
				tracked.insert(id);
			}
			continue;
		}

		let backing = abstraction.backing_index_names();
		if backing.len() > 1 && !ctx.options.allow_aliases_to_multiple_indices {
			return Err(Error::MultipleIndicesForbidden {
				expression: name.clone(),
			});
		}
		for idx_name in backing {
			if let Some(id) = admit_index(ctx, idx_name)? {
				tracked.insert(id);
			}
		}
	}

	if !ctx.options.allow_no_indices && tracked.is_empty() {
		return Err(Error::IndexNotFound {
			expression: names.join(","),
			excluded_data_streams,
		});
	}

	Ok(tracked.into_iter().collect())
}

fn partition_cross_cluster(names: &[String]) -> (Vec<String>, Vec<String>) {
	let mut plain = Vec::with_capacity(names.len());
	let mut cross_cluster = Vec::new();
	for name in names {
		if name.contains(':') {
			cross_cluster.push(name.clone());
		} else {
			plain.push(name.clone());
		}
	}
	(plain, cross_cluster)
}

/// §4.3.1 per-index admission (`should_track`). `Ok(None)` means "admitted
/// nowhere, but not an error" (net-new system under backwards-compatible
/// access, frozen under `ignore_throttled`); `Err` aborts the call.
fn admit_index<S: ClusterSnapshot>(ctx: &Context<'_, S>, name: &str) -> Result<Option<IndexId>> {
	if ctx.system_access_level == crate::model::SystemIndexAccessLevel::BackwardsCompatibleOnly
		&& ctx.is_net_new_system(name)
	{
		return Ok(None);
	}

	let meta = ctx
		.snapshot
		.index_metadata(name)
		.ok_or_else(|| Error::InvalidState {
			index: name.to_owned(),
		})?;

	match meta.state {
		IndexState::Close => {
			if ctx.options.forbid_closed_indices {
				if !ctx.options.ignore_unavailable {
					return Err(Error::IndexClosed {
						index: name.to_owned(),
					});
				}
				return Ok(None);
			}
		}
		IndexState::Open => {}
	}

	if ctx.options.ignore_throttled && meta.frozen {
		return Ok(None);
	}

	Ok(Some(meta.id.clone()))
}

/// §6 item 2: restrict a resolved name collection to data-stream names.
pub fn filter_data_stream_names<S: ClusterSnapshot>(ctx: &Context<'_, S>, names: &[String]) -> Vec<String> {
	names
		.iter()
		.filter(|n| matches!(ctx.snapshot.lookup(n), Some(IndexAbstraction::DataStream { .. })))
		.cloned()
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{IndicesOptions, SystemIndexAccessLevel};
	use crate::model::{IndexId as Id, IndexMetadata, InMemorySnapshot};

	fn snapshot() -> InMemorySnapshot {
		InMemorySnapshot::new()
			.with_index(
				IndexMetadata {
					id: Id::new("logs-1", uuid::Uuid::nil()),
					state: IndexState::Open,
					frozen: false,
					is_system: false,
					is_hidden: false,
					data_stream_parent: None,
				},
				false,
				false,
			)
			.with_index(
				IndexMetadata {
					id: Id::new("logs-old", uuid::Uuid::nil()),
					state: IndexState::Close,
					frozen: false,
					is_system: false,
					is_hidden: false,
					data_stream_parent: None,
				},
				false,
				false,
			)
	}

	#[test]
	fn closed_index_rejected_when_forbidden_and_strict() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let err = materialize(&ctx, &["logs-old".to_string()], 1).unwrap_err();
		assert!(matches!(err, Error::IndexClosed { .. }));
	}

	#[test]
	fn closed_index_skipped_when_ignore_unavailable() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default().with_ignore_unavailable(true).with_allow_no_indices(true),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let got = materialize(&ctx, &["logs-old".to_string()], 1).unwrap();
		assert!(got.is_empty());
	}

	#[test]
	fn cross_cluster_token_rejected_when_strict() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let err = materialize(&ctx, &["logs-1:foo".to_string()], 1).unwrap_err();
		assert!(matches!(err, Error::CrossClusterUnsupported { .. }));
	}

	#[test]
	fn plain_open_index_round_trips() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let got = materialize(&ctx, &["logs-1".to_string()], 1).unwrap();
		assert_eq!(got.len(), 1);
		assert_eq!(got[0].name, "logs-1");
	}
}
