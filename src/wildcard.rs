//! Wildcard expression resolver (§4.2). Expands an ordered sequence of
//! already date-math-resolved expressions against a [`ClusterSnapshot`],
//! honoring open/closed/hidden/system visibility and alias/data-stream
//! options.
use glob::Pattern;
use indexmap::IndexSet;

use crate::err::{Error, Result};
use crate::model::{Context, IndexAbstraction, IndicesOptions, SystemIndexAccessLevel};
use crate::model::ClusterSnapshot;

fn is_trivial_all(expressions: &[String]) -> bool {
	matches!(expressions, [only] if only == "_all" || only == "*")
}

/// Expand `expressions` against `ctx.snapshot`. Returns the working set of
/// resolved names, insertion-ordered, duplicates collapsed.
pub fn expand_wildcards<S: ClusterSnapshot>(
	ctx: &Context<'_, S>,
	expressions: &[String],
) -> Result<Vec<String>> {
	if !ctx.options.expand_wildcard_expressions {
		return Ok(expressions.to_vec());
	}
	if expressions.is_empty() || is_trivial_all(expressions) {
		return Ok(all_indices_selection(ctx));
	}

	let mut working: IndexSet<String> = IndexSet::new();
	let mut wildcard_seen = false;

	for token in expressions {
		let is_exclusion = wildcard_seen && token.starts_with('-') && token.len() > 1;
		let body = if is_exclusion {
			&token[1..]
		} else {
			token.as_str()
		};

		if body.is_empty() {
			return Err(Error::InvalidExpression {
				expression: token.clone(),
				reason: "expression must not be empty".into(),
			});
		}
		if body.starts_with('_') {
			return Err(Error::InvalidExpression {
				expression: token.clone(),
				reason: "expression must not start with '_'".into(),
			});
		}

		let has_wildcard = body.contains('*') || body.contains('?');

		if !has_wildcard {
			handle_plain_token(ctx, token, body, is_exclusion, &mut working)?;
			continue;
		}

		wildcard_seen = true;
		let matches = match_wildcard(ctx, body)?;
		let mut expanded: Vec<String> = Vec::new();
		for (_, abstraction) in matches {
			expanded.extend(expand_to_open_closed(ctx, abstraction));
		}

		if expanded.is_empty() && !ctx.options.allow_no_indices {
			return Err(Error::IndexNotFound {
				expression: token.clone(),
				excluded_data_streams: false,
			});
		}

		if is_exclusion {
			for name in expanded {
				working.shift_remove(&name);
			}
		} else {
			for name in expanded {
				working.insert(name);
			}
		}
	}

	Ok(working.into_iter().collect())
}

fn handle_plain_token<S: ClusterSnapshot>(
	ctx: &Context<'_, S>,
	token: &str,
	body: &str,
	is_exclusion: bool,
	working: &mut IndexSet<String>,
) -> Result<()> {
	// A cross-cluster reference (`remote:index`) is never a name in this
	// snapshot; defer it to the materializer's own pre-check (§4.3) rather
	// than failing it here as an ordinary missing name.
	if body.contains(':') {
		if is_exclusion {
			working.shift_remove(body);
		} else {
			working.insert(body.to_owned());
		}
		return Ok(());
	}
	match ctx.snapshot.lookup(body) {
		Some(abstraction) => {
			let is_alias_forbidden = abstraction.is_alias() && ctx.options.ignore_aliases;
			let is_ds_forbidden = abstraction.is_data_stream() && !ctx.include_data_streams;
			if !is_alias_forbidden && !is_ds_forbidden {
				if is_exclusion {
					working.shift_remove(body);
				} else {
					working.insert(body.to_owned());
				}
				return Ok(());
			}
			if !ctx.options.ignore_unavailable {
				return if is_alias_forbidden {
					Err(Error::AliasNotAllowed {
						expression: token.to_owned(),
					})
				} else {
					Err(Error::IndexNotFound {
						expression: token.to_owned(),
						excluded_data_streams: true,
					})
				};
			}
			if is_exclusion {
				working.shift_remove(body);
			} else {
				working.insert(body.to_owned());
			}
			Ok(())
		}
		None => {
			if !ctx.options.ignore_unavailable {
				return Err(Error::IndexNotFound {
					expression: token.to_owned(),
					excluded_data_streams: false,
				});
			}
			if is_exclusion {
				working.shift_remove(body);
			} else {
				working.insert(body.to_owned());
			}
			Ok(())
		}
	}
}

/// `*`/`?` matching for a single candidate name against a single pattern.
pub(crate) fn matches_glob(pattern: &str, candidate: &str) -> Result<bool> {
	let glob = Pattern::new(pattern).map_err(|e| Error::InvalidExpression {
		expression: pattern.to_owned(),
		reason: e.to_string(),
	})?;
	Ok(glob.matches(candidate))
}

/// A wildcard `prefix*` with no other glob metacharacter is range-scanned
/// over `[prefix, prefix⁺)` rather than scanning the whole table (§4.2
/// "Suffix-wildcard fast path").
fn match_wildcard<'a, S: ClusterSnapshot>(
	ctx: &'a Context<'_, S>,
	pattern: &str,
) -> Result<Vec<(&'a str, &'a IndexAbstraction)>> {
	let candidates: Box<dyn Iterator<Item = (&str, &IndexAbstraction)>> =
		if let Some(prefix) = simple_suffix_prefix(pattern) {
			let upper = increment_prefix(prefix);
			ctx.snapshot.range(prefix, &upper)
		} else {
			ctx.snapshot.all_abstractions()
		};

	let glob = Pattern::new(pattern).map_err(|e| Error::InvalidExpression {
		expression: pattern.to_owned(),
		reason: e.to_string(),
	})?;

	let mut out = Vec::new();
	for (name, abstraction) in candidates {
		if !glob.matches(name) {
			continue;
		}
		if ctx.options.ignore_aliases && abstraction.is_alias() {
			continue;
		}
		if !ctx.include_data_streams && abstraction.is_data_stream() {
			continue;
		}
		if is_system_abstraction(ctx, abstraction) && !wildcard_system_visible(ctx, name) {
			continue;
		}
		if !ctx.options.expand_wildcards_hidden && abstraction.is_hidden() {
			let carve_out = pattern.starts_with('.') && IndexAbstraction::is_hidden_name(name);
			if !carve_out {
				continue;
			}
		}
		out.push((name, abstraction));
	}
	Ok(out)
}

fn is_system_abstraction<S: ClusterSnapshot>(ctx: &Context<'_, S>, abstraction: &IndexAbstraction) -> bool {
	match abstraction {
		IndexAbstraction::Concrete {
			is_system, ..
		} => *is_system,
		IndexAbstraction::DataStream {
			is_system, ..
		} => *is_system,
		IndexAbstraction::Alias {
			..
		} => ctx
			.snapshot
			.index_metadata(abstraction.name())
			.map(|m| m.is_system)
			.unwrap_or(false),
	}
}

/// §4.2 step 4's wildcard-match system filter: historic system abstractions
/// are always kept, net-new ones only if the caller's predicate admits them.
/// Distinct from the all-indices selection's `system_access_level`-aware
/// filter below; final enforcement happens later in `access::apply_gate`.
fn wildcard_system_visible<S: ClusterSnapshot>(ctx: &Context<'_, S>, name: &str) -> bool {
	if ctx.is_net_new_system(name) {
		ctx.system_access(name)
	} else {
		true
	}
}

fn simple_suffix_prefix(pattern: &str) -> Option<&str> {
	let prefix = pattern.strip_suffix('*')?;
	if prefix.is_empty() || prefix.contains('*') || prefix.contains('?') {
		// A bare "*" (empty prefix) has no usable range bound: `range("", "")`
		// is an empty half-open interval, not "everything". Fall back to the
		// full-table scan rather than silently matching nothing.
		None
	} else {
		Some(prefix)
	}
}

fn increment_prefix(prefix: &str) -> String {
	let mut chars: Vec<char> = prefix.chars().collect();
	if let Some(last) = chars.pop() {
		let next = char::from_u32(last as u32 + 1).unwrap_or(last);
		chars.push(next);
	}
	chars.into_iter().collect()
}

/// §4.2 "Expansion to names": an alias/data-stream match yields its own name
/// when preserved, else the filtered backing index names underneath it.
fn expand_to_open_closed<S: ClusterSnapshot>(ctx: &Context<'_, S>, abstraction: &IndexAbstraction) -> Vec<String> {
	if ctx.preserve_aliases && abstraction.is_alias() {
		return vec![abstraction.name().to_owned()];
	}
	if ctx.preserve_data_streams && abstraction.is_data_stream() {
		return vec![abstraction.name().to_owned()];
	}

	let open = ctx.options.expand_wildcards_open;
	let closed = ctx.options.expand_wildcards_closed;
	if !open && !closed {
		return Vec::new();
	}

	abstraction
		.backing_index_names()
		.into_iter()
		.filter(|name| match ctx.snapshot.index_metadata(name) {
			Some(meta) => match meta.state {
				crate::model::IndexState::Open => open,
				crate::model::IndexState::Close => closed,
			},
			None => false,
		})
		.map(str::to_owned)
		.collect()
}

/// The §4.2 all-indices selection table, driven by the open/closed/hidden
/// triple, plus the `system_access_level`-aware `.`-prefixed filter that
/// follows it.
fn all_indices_selection<S: ClusterSnapshot>(ctx: &Context<'_, S>) -> Vec<String> {
	let IndicesOptions {
		expand_wildcards_open: open,
		expand_wildcards_closed: closed,
		expand_wildcards_hidden: hidden,
		..
	} = ctx.options;

	let mut out = Vec::new();
	for name in ctx.snapshot.concrete_all_indices() {
		let Some(meta) = ctx.snapshot.index_metadata(name) else {
			continue;
		};
		let state_ok = match meta.state {
			crate::model::IndexState::Open => open,
			crate::model::IndexState::Close => closed,
		};
		if !state_ok {
			continue;
		}
		if meta.is_hidden && !hidden {
			continue;
		}
		if !all_indices_system_visible(ctx, name, meta.data_stream_parent.is_some()) {
			continue;
		}
		out.push(name.to_owned());
	}

	if ctx.include_data_streams {
		for (name, abstraction) in ctx.snapshot.all_abstractions() {
			if !abstraction.is_data_stream() {
				continue;
			}
			if abstraction.is_hidden() && !hidden {
				continue;
			}
			if !all_indices_system_visible(ctx, name, false) {
				continue;
			}
			out.push(name.to_owned());
		}
	}

	out
}

fn all_indices_system_visible<S: ClusterSnapshot>(ctx: &Context<'_, S>, name: &str, data_stream_owned: bool) -> bool {
	if !name.starts_with('.') {
		return true;
	}
	if ctx.system_access_level == SystemIndexAccessLevel::All {
		return true;
	}
	if data_stream_owned {
		return ctx.system_access(name);
	}
	if ctx.is_net_new_system(name) {
		if ctx.system_access_level == SystemIndexAccessLevel::BackwardsCompatibleOnly {
			return false;
		}
		return ctx.system_access(name);
	}
	true
}

/// §6 item 7 helper: whether `name` names an abstraction in `snapshot`,
/// after date-math resolution by the caller.
pub fn has_index_abstraction<S: ClusterSnapshot>(name: &str, snapshot: &S) -> bool {
	snapshot.lookup(name).is_some()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{AliasMember, IndexId, IndexMetadata, IndexState, InMemorySnapshot};

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
			.with_index(
				IndexMetadata {
					id: IndexId::new("logs-2", uuid::Uuid::nil()),
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
					id: IndexId::new("logs-old", uuid::Uuid::nil()),
					state: IndexState::Close,
					frozen: false,
					is_system: false,
					is_hidden: false,
					data_stream_parent: None,
				},
				false,
				false,
			)
			.with_alias(
				"logs",
				vec![
					AliasMember {
						index: "logs-1".into(),
						search_routing: None,
					},
					AliasMember {
						index: "logs-2".into(),
						search_routing: None,
					},
				],
				Some("logs-2".into()),
				false,
				false,
			)
	}

	#[test]
	fn suffix_wildcard_expands_open_indices() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default().with_expand_wildcards(true, false, false),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let mut got = expand_wildcards(&ctx, &["logs-*".to_string()]).unwrap();
		got.sort();
		assert_eq!(got, vec!["logs-1".to_string(), "logs-2".to_string()]);
	}

	#[test]
	fn exclusion_after_wildcard_removes_name() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default().with_expand_wildcards(true, false, false),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let mut got = expand_wildcards(&ctx, &["logs-*".to_string(), "-logs-1".to_string()]).unwrap();
		got.sort();
		assert_eq!(got, vec!["logs-2".to_string()]);
	}

	#[test]
	fn bare_star_as_non_trivial_token_still_matches_everything() {
		// A bare "*" alongside another token does not hit the is_trivial_all
		// shortcut, so it must still go through match_wildcard and expand to
		// every visible abstraction rather than degenerating into an empty
		// range scan (`simple_suffix_prefix("*")` must not yield an empty
		// prefix).
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default().with_expand_wildcards(true, false, false),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let mut got = expand_wildcards(&ctx, &["*".to_string(), "-logs-1".to_string()]).unwrap();
		got.sort();
		assert_eq!(got, vec!["logs-2".to_string()]);
	}

	#[test]
	fn simple_suffix_prefix_rejects_bare_star() {
		assert_eq!(simple_suffix_prefix("*"), None);
		assert_eq!(simple_suffix_prefix("logs-*"), Some("logs-"));
	}

	#[test]
	fn leading_dash_without_prior_wildcard_is_literal() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default().with_ignore_unavailable(true),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		let got = expand_wildcards(&ctx, &["-foo".to_string()]).unwrap();
		assert_eq!(got, vec!["-foo".to_string()]);
	}

	#[test]
	fn empty_token_is_invalid() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		assert!(expand_wildcards(&ctx, &["".to_string()]).is_err());
	}

	#[test]
	fn missing_name_without_ignore_unavailable_errors() {
		let snap = snapshot();
		let ctx = Context::new(
			&snap,
			IndicesOptions::default(),
			0,
			SystemIndexAccessLevel::All,
			|_| true,
			|_| false,
		);
		assert!(expand_wildcards(&ctx, &["missing".to_string()]).is_err());
	}

	#[test]
	fn matches_glob_agrees_with_suffix_fast_path() {
		assert!(matches_glob("logs-*", "logs-2024.01.01").unwrap());
		assert!(!matches_glob("logs-*", "metrics-2024.01.01").unwrap());
		assert!(matches_glob("logs-0?", "logs-01").unwrap());
		assert!(!matches_glob("logs-0?", "logs-001").unwrap());
	}
}
