use std::sync::Arc;

use super::options::IndicesOptions;
use super::snapshot::ClusterSnapshot;
use super::system::SystemIndexAccessLevel;

/// Per-call immutable record (§3 `Context`): a snapshot reference, the
/// options in effect, the clock reading taken once at construction, and the
/// two system-index predicates derived from the caller's request context.
///
/// Holds a borrow of the snapshot for the call's lifetime rather than owning
/// it, matching §5's requirement that the snapshot not be mutated mid-call:
/// the borrow checker enforces that statically.
#[non_exhaustive]
pub struct Context<'a, S: ClusterSnapshot> {
	pub snapshot: &'a S,
	pub options: IndicesOptions,
	/// ms since epoch, read once and reused for every date-math token in the
	/// call (§5 "intra-call consistency").
	pub start_time: i64,
	pub preserve_aliases: bool,
	pub resolve_to_write_index: bool,
	pub include_data_streams: bool,
	pub preserve_data_streams: bool,
	pub system_access_level: SystemIndexAccessLevel,
	system_access: Arc<dyn Fn(&str) -> bool + Send + Sync>,
	is_net_new_system: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

impl<'a, S: ClusterSnapshot> Context<'a, S> {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		snapshot: &'a S,
		options: IndicesOptions,
		start_time: i64,
		system_access_level: SystemIndexAccessLevel,
		system_access: impl Fn(&str) -> bool + Send + Sync + 'static,
		is_net_new_system: impl Fn(&str) -> bool + Send + Sync + 'static,
	) -> Self {
		Self {
			snapshot,
			options,
			start_time,
			preserve_aliases: false,
			resolve_to_write_index: false,
			include_data_streams: true,
			preserve_data_streams: false,
			system_access_level,
			system_access: Arc::new(system_access),
			is_net_new_system: Arc::new(is_net_new_system),
		}
	}

	/// The lenient-defaults construction used by `resolve_expressions_set`
	/// (§6 item 8): open and hidden, data streams included, aliases
	/// preserved, and no system-index gating (every name is admitted).
	pub fn lenient(snapshot: &'a S, start_time: i64) -> Self {
		Self {
			snapshot,
			options: IndicesOptions::lenient(),
			start_time,
			preserve_aliases: true,
			resolve_to_write_index: false,
			include_data_streams: true,
			preserve_data_streams: false,
			system_access_level: SystemIndexAccessLevel::All,
			system_access: Arc::new(|_| true),
			is_net_new_system: Arc::new(|_| false),
		}
	}

	pub fn with_preserve_aliases(mut self, v: bool) -> Self {
		self.preserve_aliases = v;
		self
	}

	pub fn with_resolve_to_write_index(mut self, v: bool) -> Self {
		self.resolve_to_write_index = v;
		self
	}

	pub fn with_include_data_streams(mut self, v: bool) -> Self {
		self.include_data_streams = v;
		self
	}

	pub fn with_preserve_data_streams(mut self, v: bool) -> Self {
		self.preserve_data_streams = v;
		self
	}

	pub fn system_access(&self, name: &str) -> bool {
		(self.system_access)(name)
	}

	pub fn is_net_new_system(&self, name: &str) -> bool {
		(self.is_net_new_system)(name)
	}

	/// Clone this context with different `options`/`include_data_streams`,
	/// reusing the same snapshot reference and system-access predicates.
	/// Used by [`crate::routing`] to force `ignore_aliases=false` and
	/// `include_data_streams=true` per §4.6 without requiring callers to
	/// reconstruct a `Context` from raw predicates.
	pub(crate) fn derived(&self, options: IndicesOptions, include_data_streams: bool) -> Self {
		Self {
			snapshot: self.snapshot,
			options,
			start_time: self.start_time,
			preserve_aliases: self.preserve_aliases,
			resolve_to_write_index: self.resolve_to_write_index,
			include_data_streams,
			preserve_data_streams: self.preserve_data_streams,
			system_access_level: self.system_access_level,
			system_access: self.system_access.clone(),
			is_net_new_system: self.is_net_new_system.clone(),
		}
	}

	/// Clone this context with `resolve_to_write_index` forced on, reusing
	/// the same snapshot reference and predicates. Used by
	/// `Resolver::resolve_single_write_index` (§6.5), which needs write-index
	/// resolution without requiring the caller to rebuild a `Context`.
	pub fn resolving_to_write_index(&self) -> Self {
		Self {
			snapshot: self.snapshot,
			options: self.options,
			start_time: self.start_time,
			preserve_aliases: self.preserve_aliases,
			resolve_to_write_index: true,
			include_data_streams: self.include_data_streams,
			preserve_data_streams: self.preserve_data_streams,
			system_access_level: self.system_access_level,
			system_access: self.system_access.clone(),
			is_net_new_system: self.is_net_new_system.clone(),
		}
	}
}
