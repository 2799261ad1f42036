/// Per-call resolver policy (§3 `IndicesOptions`). Mirrors
/// a `Clone + Debug` bag of booleans
/// with chainable `with_*` setters, constructed once per request and cheap to
/// clone (no allocation beyond what its fields already own).
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub struct IndicesOptions {
	pub ignore_unavailable: bool,
	pub allow_no_indices: bool,
	pub expand_wildcards_open: bool,
	pub expand_wildcards_closed: bool,
	pub expand_wildcards_hidden: bool,
	pub allow_aliases_to_multiple_indices: bool,
	pub forbid_closed_indices: bool,
	pub ignore_aliases: bool,
	pub ignore_throttled: bool,
	pub expand_wildcard_expressions: bool,
}

impl Default for IndicesOptions {
	/// The strict defaults: wildcards expand to open, visible indices only;
	/// missing names and an empty result are both errors.
	fn default() -> Self {
		Self {
			ignore_unavailable: false,
			allow_no_indices: false,
			expand_wildcards_open: true,
			expand_wildcards_closed: false,
			expand_wildcards_hidden: false,
			allow_aliases_to_multiple_indices: true,
			forbid_closed_indices: true,
			ignore_aliases: false,
			ignore_throttled: true,
			expand_wildcard_expressions: true,
		}
	}
}

impl IndicesOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// The "lenient" defaults used by `resolve_expressions_set` (§6 item 8):
	/// open and hidden indices, data streams included, everything else as
	/// forgiving as the strict default is unforgiving.
	pub fn lenient() -> Self {
		Self {
			ignore_unavailable: true,
			allow_no_indices: true,
			expand_wildcards_open: true,
			expand_wildcards_closed: false,
			expand_wildcards_hidden: true,
			allow_aliases_to_multiple_indices: true,
			forbid_closed_indices: false,
			ignore_aliases: false,
			ignore_throttled: false,
			expand_wildcard_expressions: true,
		}
	}

	pub fn with_ignore_unavailable(mut self, v: bool) -> Self {
		self.ignore_unavailable = v;
		self
	}

	pub fn with_allow_no_indices(mut self, v: bool) -> Self {
		self.allow_no_indices = v;
		self
	}

	pub fn with_expand_wildcards(mut self, open: bool, closed: bool, hidden: bool) -> Self {
		self.expand_wildcards_open = open;
		self.expand_wildcards_closed = closed;
		self.expand_wildcards_hidden = hidden;
		self
	}

	pub fn with_allow_aliases_to_multiple_indices(mut self, v: bool) -> Self {
		self.allow_aliases_to_multiple_indices = v;
		self
	}

	pub fn with_forbid_closed_indices(mut self, v: bool) -> Self {
		self.forbid_closed_indices = v;
		self
	}

	pub fn with_ignore_aliases(mut self, v: bool) -> Self {
		self.ignore_aliases = v;
		self
	}

	pub fn with_ignore_throttled(mut self, v: bool) -> Self {
		self.ignore_throttled = v;
		self
	}

	pub fn with_expand_wildcard_expressions(mut self, v: bool) -> Self {
		self.expand_wildcard_expressions = v;
		self
	}

	/// No wildcard state is selected at all: the all-indices selection table
	/// (§4.2) maps this to the empty set.
	pub fn no_wildcard_states_selected(&self) -> bool {
		!self.expand_wildcards_open && !self.expand_wildcards_closed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strict_defaults_reject_missing_and_empty() {
		let opts = IndicesOptions::default();
		assert!(!opts.ignore_unavailable);
		assert!(!opts.allow_no_indices);
		assert!(opts.expand_wildcards_open);
		assert!(!opts.expand_wildcards_closed);
	}

	#[test]
	fn lenient_defaults_include_hidden_and_data_streams() {
		let opts = IndicesOptions::lenient();
		assert!(opts.expand_wildcards_hidden);
		assert!(opts.allow_no_indices);
	}

	#[test]
	fn builder_chains() {
		let opts = IndicesOptions::new()
			.with_ignore_unavailable(true)
			.with_allow_no_indices(true)
			.with_expand_wildcards(true, true, false);
		assert!(opts.ignore_unavailable);
		assert!(opts.expand_wildcards_closed);
	}
}
