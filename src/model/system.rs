use std::fmt;

/// Governs which system indices a caller may see (§3). Modelled after
/// a `None | Some | All` capability-target
/// shape, but as a fixed four-way enum since §4.2/§4.4 dispatch on it by
/// name rather than by a generic target set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub enum SystemIndexAccessLevel {
	/// All system indices are visible, no gating applied.
	All,
	/// No system indices are visible.
	None,
	/// Only historic (non-net-new) system indices are visible.
	BackwardsCompatibleOnly,
	/// Visibility is decided per-name by the request's product-tag
	/// predicate.
	Restricted,
}

impl fmt::Display for SystemIndexAccessLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::All => "all",
			Self::None => "none",
			Self::BackwardsCompatibleOnly => "backwards_compatible_only",
			Self::Restricted => "restricted",
		};
		write!(f, "{s}")
	}
}

impl Default for SystemIndexAccessLevel {
	fn default() -> Self {
		Self::BackwardsCompatibleOnly
	}
}
