use thiserror::Error;

/// The error type returned by every public operation in this crate.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
	/// A concrete name could not be found and the options in effect do not
	/// allow it to be silently dropped, or the final resolved set was empty
	/// while `allow_no_indices` is false.
	#[error("no such index [{expression}]")]
	IndexNotFound {
		expression: String,
		/// Set when the empty result was caused by data streams being
		/// excluded rather than by a genuinely missing name (`es.excluded_ds`).
		excluded_data_streams: bool,
	},

	/// An alias was matched while `ignore_aliases` is set and the missing
	/// -expression policy says to fail rather than skip.
	#[error("aliases are not allowed for this request, but [{expression}] is an alias")]
	AliasNotAllowed { expression: String },

	/// An alias or data stream resolved to more than one backing index while
	/// `allow_aliases_to_multiple_indices` is false.
	#[error("[{expression}] resolves to multiple indices, but only one is allowed")]
	MultipleIndicesForbidden { expression: String },

	/// Write-index resolution was requested for an alias with none
	/// designated.
	#[error("no write index is defined for alias [{alias}]")]
	NoWriteIndex { alias: String },

	/// A closed index was matched while `forbid_closed_indices` is set and
	/// `ignore_unavailable` is false.
	#[error("index [{index}] is closed")]
	IndexClosed { index: String },

	/// The expression itself is malformed: empty, `_`-prefixed, or an
	/// unparsable date-math template.
	#[error("invalid expression [{expression}]: {reason}")]
	InvalidExpression { expression: String, reason: String },

	/// An expression contains a `:` and would require cross-cluster
	/// resolution, which this component does not perform.
	#[error("cross-cluster index expressions are not supported: {expressions:?}")]
	CrossClusterUnsupported { expressions: Vec<String> },

	/// A concrete index belonging to a system data stream was rejected by
	/// the system-index access gate.
	#[error("access to system data stream(s) {data_streams:?} is denied")]
	SystemDataStreamAccessDenied { data_streams: Vec<String> },

	/// A net-new system index was rejected by the system-index access gate.
	#[error("access to net-new system index(es) {indices:?} is denied")]
	SystemNetNewAccessDenied { indices: Vec<String> },

	/// An index was found in a state other than `OPEN` or `CLOSE`.
	#[error("index [{index}] is in an invalid state")]
	InvalidState { index: String },

	/// A single-abstraction operation (`resolve_write_abstraction`,
	/// `resolve_single_concrete_index`, ...) resolved to zero or more than
	/// one abstraction/index.
	#[error("expected exactly one result for [{expression}], found {found}")]
	NotSingleResult { expression: String, found: usize },

	/// Something the `ClusterSnapshot` collaborator reported that does not
	/// map onto one of the kinds above (e.g. a backing-store failure on the
	/// caller's side). Opaque by design: this crate does not own that
	/// collaborator's error type.
	#[error("cluster snapshot error: {0}")]
	Snapshot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
