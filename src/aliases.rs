//! Filtering-alias selection (§4.5): which aliases, if any, a concrete
//! index's search should be filtered by for a given resolved expression set.
use std::collections::BTreeSet;

use crate::model::{ClusterSnapshot, Context, IndexAbstraction};

/// Returns the alias names filtering `index` given the already-resolved
/// expression set `resolved`, or `None` when the index should be searched
/// unfiltered. `is_all_indices` marks that `resolved` came from the §4.2
/// all-indices path (in which case no alias ever filters). `skip_identity`
/// bypasses the "index named directly" short-circuit, used by callers that
/// need alias filters applied even when the index was matched by its own
/// name (e.g. security filtering).
pub fn filtering_aliases<S: ClusterSnapshot>(
	ctx: &Context<'_, S>,
	index: &str,
	resolved: &BTreeSet<String>,
	is_all_indices: bool,
	skip_identity: bool,
	required: impl Fn(&str) -> bool,
) -> Option<Vec<String>> {
	if is_all_indices {
		return None;
	}
	if !skip_identity && resolved.contains(index) {
		return None;
	}

	// §4.5 "iterate the smaller of (aliases on `I`, `|E|`)": walk whichever
	// side is cheaper instead of always scanning every abstraction in the
	// cluster.
	let mut candidates: Vec<&str> = Vec::new();
	let aliases_on_index = ctx.snapshot.aliases_over_index(index);
	if aliases_on_index.len() <= resolved.len() {
		for name in aliases_on_index {
			if resolved.contains(name.as_str()) {
				candidates.push(name.as_str());
			}
		}
	} else {
		for name in resolved {
			if let Some(IndexAbstraction::Alias {
				members, ..
			}) = ctx.snapshot.lookup(name)
			{
				if members.iter().any(|m| m.index == index) {
					candidates.push(name.as_str());
				}
			}
		}
	}

	if let Some(meta) = ctx.snapshot.index_metadata(index) {
		if let Some(parent) = &meta.data_stream_parent {
			// Bounded by `|E|` rather than the cluster's total data-stream-alias
			// count, for the same reason as above.
			for name in resolved {
				if let Some(ds_alias) = ctx.snapshot.data_stream_aliases().get(name) {
					if ds_alias.data_streams.iter().any(|d| d == parent) {
						candidates.push(name.as_str());
					}
				}
			}
		}
	}

	if candidates.is_empty() {
		return None;
	}

	let mut out = Vec::with_capacity(candidates.len());
	for candidate in candidates {
		if !required(candidate) {
			return None;
		}
		out.push(candidate.to_owned());
	}

	if out.is_empty() {
		None
	} else {
		Some(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{AliasMember, IndexId, IndexMetadata, IndexState, IndicesOptions, InMemorySnapshot, SystemIndexAccessLevel};

	fn snapshot() -> InMemorySnapshot {
		InMemorySnapshot::new()
			.with_index(
				IndexMetadata {
					id: IndexId::new("logs-1", uuid::Uuid::nil()),
					state: IndexState::Open,
					frozen: false,
					is_system: false,
					is_hidden: false,
					data_stream_parent: None,
				},
				false,
				false,
			)
			.with_alias(
				"logs-alias",
				vec![AliasMember {
					index: "logs-1".into(),
					search_routing: None,
				}],
				None,
				true,
				false,
			)
	}

	#[test]
	fn direct_name_match_is_unfiltered() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let resolved: BTreeSet<String> = ["logs-1".to_string()].into_iter().collect();
		assert!(filtering_aliases(&ctx, "logs-1", &resolved, false, false, |_| true).is_none());
	}

	#[test]
	fn alias_candidate_is_returned_when_required_accepts() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let resolved: BTreeSet<String> = ["logs-alias".to_string()].into_iter().collect();
		let got = filtering_aliases(&ctx, "logs-1", &resolved, false, false, |_| true).unwrap();
		assert_eq!(got, vec!["logs-alias".to_string()]);
	}

	#[test]
	fn rejected_required_predicate_yields_unfiltered() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let resolved: BTreeSet<String> = ["logs-alias".to_string()].into_iter().collect();
		assert!(filtering_aliases(&ctx, "logs-1", &resolved, false, false, |_| false).is_none());
	}

	/// When `resolved` is smaller than the aliases defined on the index, the
	/// smaller-side walk must go through `resolved` (looking up each name)
	/// rather than the reverse index, and still find the one that matches.
	#[test]
	fn picks_smaller_side_when_resolved_is_smaller_than_aliases_on_index() {
		let snap = InMemorySnapshot::new()
			.with_index(
				IndexMetadata {
					id: IndexId::new("logs-1", uuid::Uuid::nil()),
					state: IndexState::Open,
					frozen: false,
					is_system: false,
					is_hidden: false,
					data_stream_parent: None,
				},
				false,
				false,
			)
			.with_alias(
				"alias-a",
				vec![AliasMember {
					index: "logs-1".into(),
					search_routing: None,
				}],
				None,
				true,
				false,
			)
			.with_alias(
				"alias-b",
				vec![AliasMember {
					index: "logs-1".into(),
					search_routing: None,
				}],
				None,
				true,
				false,
			)
			.with_alias(
				"alias-c",
				vec![AliasMember {
					index: "logs-1".into(),
					search_routing: None,
				}],
				None,
				true,
				false,
			);
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let resolved: BTreeSet<String> = ["alias-b".to_string()].into_iter().collect();
		let got = filtering_aliases(&ctx, "logs-1", &resolved, false, false, |_| true).unwrap();
		assert_eq!(got, vec!["alias-b".to_string()]);
	}
}
