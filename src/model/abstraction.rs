use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A concrete backing index identifier: name plus uuid, the terminal form of
/// resolution (glossary: "Concrete index").
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub struct IndexId {
	pub name: String,
	pub uuid: Uuid,
}

impl IndexId {
	pub fn new(name: impl Into<String>, uuid: Uuid) -> Self {
		Self {
			name: name.into(),
			uuid,
		}
	}
}

impl fmt::Display for IndexId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name)
	}
}

/// OPEN/CLOSE lifecycle state of a concrete index. Any other state observed
/// from the snapshot is an `Error::InvalidState` (§4.3.1).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum IndexState {
	Open,
	Close,
}

/// Per-index state consumed by the materializer (§4.3.1).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct IndexMetadata {
	pub id: IndexId,
	pub state: IndexState,
	/// `index.frozen` setting, default false. Read by the throttled filter.
	pub frozen: bool,
	pub is_system: bool,
	pub is_hidden: bool,
	/// Name of the data stream owning this index as a backing index, if any.
	pub data_stream_parent: Option<String>,
}

/// Per-member metadata an alias may carry for one of its indices.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct AliasMember {
	pub index: String,
	/// Per-index search-routing values, if the alias defines a filter with a
	/// custom routing for this member.
	pub search_routing: Option<std::collections::BTreeSet<String>>,
}

/// A named abstraction in the cluster: a concrete index, an alias pointing at
/// one or more indices, or a data stream (§3).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum IndexAbstraction {
	Concrete {
		name: String,
		index: IndexId,
		is_system: bool,
		is_hidden: bool,
	},
	Alias {
		name: String,
		members: Vec<AliasMember>,
		write_index: Option<String>,
		is_filtering: bool,
		is_hidden: bool,
	},
	DataStream {
		name: String,
		/// Ordered backing indices, first to last.
		backing_indices: Vec<String>,
		write_index: String,
		allow_custom_routing: bool,
		is_hidden: bool,
		is_system: bool,
	},
}

impl IndexAbstraction {
	pub fn name(&self) -> &str {
		match self {
			Self::Concrete { name, .. } => name,
			Self::Alias { name, .. } => name,
			Self::DataStream { name, .. } => name,
		}
	}

	pub fn is_alias(&self) -> bool {
		matches!(self, Self::Alias { .. })
	}

	pub fn is_data_stream(&self) -> bool {
		matches!(self, Self::DataStream { .. })
	}

	pub fn is_hidden(&self) -> bool {
		match self {
			Self::Concrete {
				is_hidden, ..
			} => *is_hidden,
			Self::Alias {
				is_hidden, ..
			} => *is_hidden,
			Self::DataStream {
				is_hidden, ..
			} => *is_hidden,
		}
	}

	/// Backing index names of this abstraction, in definition order. A
	/// concrete index's "backing indices" is itself.
	pub fn backing_index_names(&self) -> Vec<&str> {
		match self {
			Self::Concrete {
				index, ..
			} => vec![index.name.as_str()],
			Self::Alias {
				members, ..
			} => members.iter().map(|m| m.index.as_str()).collect(),
			Self::DataStream {
				backing_indices, ..
			} => backing_indices.iter().map(String::as_str).collect(),
		}
	}

	pub fn write_index_name(&self) -> Option<&str> {
		match self {
			Self::Concrete {
				index, ..
			} => Some(index.name.as_str()),
			Self::Alias {
				write_index, ..
			} => write_index.as_deref(),
			Self::DataStream {
				write_index, ..
			} => Some(write_index.as_str()),
		}
	}

	/// The §4.2 hidden-wildcard carve-out: a wildcard that itself starts with
	/// `.` is allowed to retain hidden names that also start with `.`.
	pub fn is_hidden_name(name: &str) -> bool {
		name.starts_with('.')
	}
}
