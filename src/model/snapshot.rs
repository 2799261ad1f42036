//! The cluster state snapshot collaborator (§3, §1 "Out of scope"). Real
//! deployments back this with an immutable, versioned view over the actual
//! cluster metadata; this crate only depends on the `ClusterSnapshot` trait.
//! [`InMemorySnapshot`] is a reference implementation used by this crate's
//! own tests and suitable for embedding this resolver in a process that
//! keeps its own metadata in memory, the way a storage engine ships an
//! in-memory backend alongside its trait-level storage abstraction.
use std::collections::BTreeMap;

use super::abstraction::{IndexAbstraction, IndexId, IndexMetadata};

/// A named alias over one or more data streams (§3 `dataStreamAliases`).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct DataStreamAlias {
	pub name: String,
	pub data_streams: Vec<String>,
}

/// Read-only access to cluster metadata required by the resolution pipeline.
/// Every accessor here is a pure read against a snapshot fixed for the
/// duration of one resolution call (§5).
pub trait ClusterSnapshot {
	/// Ordered mapping, ordered by name: look up an abstraction by its exact
	/// name.
	fn lookup(&self, name: &str) -> Option<&IndexAbstraction>;

	/// Metadata (state, settings, system flag) for a single backing index,
	/// addressed by name.
	fn index_metadata(&self, name: &str) -> Option<&IndexMetadata>;

	/// All concrete index abstractions, ordered by name.
	fn concrete_all_indices(&self) -> Box<dyn Iterator<Item = &str> + '_>;

	/// Every abstraction in the snapshot (concrete indices, aliases, data
	/// streams), ordered by name. Backs the §4.2 full-table scan path.
	fn all_abstractions(&self) -> Box<dyn Iterator<Item = (&str, &IndexAbstraction)> + '_>;

	/// Abstractions whose name lies in `[lower, upper)`. Backs the §4.2
	/// suffix-wildcard fast path; requires the underlying lookup to be an
	/// ordered key map (§9).
	fn range<'a>(
		&'a self,
		lower: &str,
		upper: &str,
	) -> Box<dyn Iterator<Item = (&'a str, &'a IndexAbstraction)> + 'a>;

	/// Aliases defined over data streams rather than over indices directly.
	fn data_stream_aliases(&self) -> &BTreeMap<String, DataStreamAlias>;

	/// Names of the aliases that list `index` among their members, ordered by
	/// name. A reverse index over `lookup`'s forward mapping, so §4.5 can
	/// iterate the smaller of (aliases on `index`, the resolved expression
	/// set) instead of scanning every abstraction in the cluster.
	fn aliases_over_index(&self, index: &str) -> &[String];
}

/// A straightforward, fully in-memory [`ClusterSnapshot`]. Not meant to model
/// a production cluster's storage; it exists so this crate's pipeline can be
/// exercised and tested end to end without a real metadata store.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct InMemorySnapshot {
	abstractions: BTreeMap<String, IndexAbstraction>,
	indices: BTreeMap<String, IndexMetadata>,
	data_stream_aliases: BTreeMap<String, DataStreamAlias>,
	/// Reverse index: index name -> names of the aliases listing it as a
	/// member, kept in sync by `with_alias`. Backs `aliases_over_index`.
	aliases_by_index: BTreeMap<String, Vec<String>>,
}

impl InMemorySnapshot {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_index(mut self, meta: IndexMetadata, is_system: bool, is_hidden: bool) -> Self {
		let name = meta.id.name.clone();
		self.abstractions.insert(
			name.clone(),
			IndexAbstraction::Concrete {
				name: name.clone(),
				index: meta.id.clone(),
				is_system,
				is_hidden,
			},
		);
		self.indices.insert(name, meta);
		self
	}

	pub fn with_alias(
		mut self,
		name: impl Into<String>,
		members: Vec<super::abstraction::AliasMember>,
		write_index: Option<String>,
		is_filtering: bool,
		is_hidden: bool,
	) -> Self {
		let name = name.into();
		for member in &members {
			self.aliases_by_index.entry(member.index.clone()).or_default().push(name.clone());
		}
		self.abstractions.insert(
			name.clone(),
			IndexAbstraction::Alias {
				name,
				members,
				write_index,
				is_filtering,
				is_hidden,
			},
		);
		self
	}

	pub fn with_data_stream(
		mut self,
		name: impl Into<String>,
		backing_indices: Vec<String>,
		write_index: impl Into<String>,
		allow_custom_routing: bool,
		is_hidden: bool,
		is_system: bool,
	) -> Self {
		let name = name.into();
		let write_index = write_index.into();
		for idx in &backing_indices {
			if let Some(meta) = self.indices.get_mut(idx) {
				meta.data_stream_parent = Some(name.clone());
			}
		}
		self.abstractions.insert(
			name.clone(),
			IndexAbstraction::DataStream {
				name,
				backing_indices,
				write_index,
				allow_custom_routing,
				is_hidden,
				is_system,
			},
		);
		self
	}

	pub fn with_data_stream_alias(mut self, name: impl Into<String>, data_streams: Vec<String>) -> Self {
		let name = name.into();
		self.data_stream_aliases.insert(
			name.clone(),
			DataStreamAlias {
				name,
				data_streams,
			},
		);
		self
	}

	pub fn index_id(&self, name: &str) -> Option<IndexId> {
		self.indices.get(name).map(|m| m.id.clone())
	}
}

impl ClusterSnapshot for InMemorySnapshot {
	fn lookup(&self, name: &str) -> Option<&IndexAbstraction> {
		self.abstractions.get(name)
	}

	fn index_metadata(&self, name: &str) -> Option<&IndexMetadata> {
		self.indices.get(name)
	}

	fn concrete_all_indices(&self) -> Box<dyn Iterator<Item = &str> + '_> {
		Box::new(self.indices.keys().map(String::as_str))
	}

	fn all_abstractions(&self) -> Box<dyn Iterator<Item = (&str, &IndexAbstraction)> + '_> {
		Box::new(self.abstractions.iter().map(|(k, v)| (k.as_str(), v)))
	}

	fn range<'a>(
		&'a self,
		lower: &str,
		upper: &str,
	) -> Box<dyn Iterator<Item = (&'a str, &'a IndexAbstraction)> + 'a> {
		Box::new(
			self.abstractions
				.range(lower.to_owned()..upper.to_owned())
				.map(|(k, v)| (k.as_str(), v)),
		)
	}

	fn data_stream_aliases(&self) -> &BTreeMap<String, DataStreamAlias> {
		&self.data_stream_aliases
	}

	fn aliases_over_index(&self, index: &str) -> &[String] {
		self.aliases_by_index.get(index).map(Vec::as_slice).unwrap_or(&[])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{AliasMember, IndexId, IndexState};

	#[test]
	fn aliases_over_index_tracks_every_alias_listing_a_member() {
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
				"a",
				vec![AliasMember {
					index: "logs-1".into(),
					search_routing: None,
				}],
				None,
				true,
				false,
			)
			.with_alias(
				"b",
				vec![AliasMember {
					index: "logs-1".into(),
					search_routing: None,
				}],
				None,
				true,
				false,
			);
		let mut got = snap.aliases_over_index("logs-1").to_vec();
		got.sort();
		assert_eq!(got, vec!["a".to_string(), "b".to_string()]);
		assert!(snap.aliases_over_index("missing").is_empty());
	}
}
