//! The public facade (§6): wires the date-math, wildcard and materializer
//! stages together and exposes the ten external operations. A unit struct
//! rather than free functions at the crate root, so callers write
//! `Resolver::resolve_concrete_indices(...)` the way one writes
//! `path::Path::new(...)` — a namespace, not a value with state of its own.
use std::collections::{BTreeMap, BTreeSet};

use crate::access;
use crate::aliases;
use crate::datemath::{self, Clock, SystemClock};
use crate::deprecation::DeprecationSink;
use crate::err::{Error, Result};
use crate::materialize;
use crate::model::{ClusterSnapshot, Context, IndexAbstraction, IndexId};
use crate::routing;
use crate::wildcard;

#[derive(Clone, Copy, Debug, Default)]
pub struct Resolver;

impl Resolver {
	/// §6.1 `resolve_concrete_indices`.
	pub fn resolve_concrete_indices<S: ClusterSnapshot>(
		ctx: &Context<'_, S>,
		sink: &dyn DeprecationSink,
		clock: &impl Clock,
		exprs: &[String],
	) -> Result<Vec<IndexId>> {
		run_pipeline(ctx, sink, clock, exprs)
	}

	/// §6.1 `resolve_concrete_index_names`.
	pub fn resolve_concrete_index_names<S: ClusterSnapshot>(
		ctx: &Context<'_, S>,
		sink: &dyn DeprecationSink,
		clock: &impl Clock,
		exprs: &[String],
	) -> Result<Vec<String>> {
		Ok(run_pipeline(ctx, sink, clock, exprs)?.into_iter().map(|id| id.name).collect())
	}

	/// §6.2 `resolve_data_stream_names`.
	pub fn resolve_data_stream_names<S: ClusterSnapshot>(
		ctx: &Context<'_, S>,
		clock: &impl Clock,
		exprs: &[String],
	) -> Result<Vec<String>> {
		let rewritten = datemath::resolve_date_math(exprs, clock)?;
		let names = wildcard::expand_wildcards(ctx, &rewritten)?;
		Ok(materialize::filter_data_stream_names(ctx, &names))
	}

	/// §6.3 `resolve_write_abstraction`: requires the wildcard-resolved
	/// collection to be exactly one abstraction; an alias must define a
	/// write index.
	pub fn resolve_write_abstraction<S: ClusterSnapshot>(
		ctx: &Context<'_, S>,
		clock: &impl Clock,
		expr: &str,
	) -> Result<IndexAbstraction> {
		let rewritten = datemath::resolve_date_math(std::slice::from_ref(&expr.to_owned()), clock)?;
		let names = wildcard::expand_wildcards(ctx, &rewritten)?;
		if names.len() != 1 {
			return Err(Error::NotSingleResult {
				expression: expr.to_owned(),
				found: names.len(),
			});
		}
		let name = &names[0];
		let abstraction = ctx
			.snapshot
			.lookup(name)
			.ok_or_else(|| Error::IndexNotFound {
				expression: name.clone(),
				excluded_data_streams: false,
			})?
			.clone();
		if abstraction.is_alias() && abstraction.write_index_name().is_none() {
			return Err(Error::NoWriteIndex {
				alias: name.clone(),
			});
		}
		Ok(abstraction)
	}

	/// §6.4 `resolve_single_concrete_index`.
	pub fn resolve_single_concrete_index<S: ClusterSnapshot>(
		ctx: &Context<'_, S>,
		sink: &dyn DeprecationSink,
		clock: &impl Clock,
		expr: &str,
	) -> Result<IndexId> {
		let ids = run_pipeline(ctx, sink, clock, std::slice::from_ref(&expr.to_owned()))?;
		match ids.len() {
			1 => Ok(ids.into_iter().next().unwrap()),
			found => Err(Error::NotSingleResult {
				expression: expr.to_owned(),
				found,
			}),
		}
	}

	/// §6.5 `resolve_single_write_index`.
	pub fn resolve_single_write_index<S: ClusterSnapshot>(
		ctx: &Context<'_, S>,
		sink: &dyn DeprecationSink,
		clock: &impl Clock,
		expr: &str,
		allow_no_index: bool,
	) -> Result<Option<IndexId>> {
		let write_ctx = ctx.resolving_to_write_index();
		let ids = run_pipeline(&write_ctx, sink, clock, std::slice::from_ref(&expr.to_owned()))?;
		match ids.len() {
			0 if allow_no_index => Ok(None),
			1 => Ok(Some(ids.into_iter().next().unwrap())),
			found => Err(Error::NotSingleResult {
				expression: expr.to_owned(),
				found,
			}),
		}
	}

	/// §6.6 `has_index_abstraction`: date-math-resolves `name`, then queries
	/// `snapshot` directly (no wildcard expansion, no options).
	pub fn has_index_abstraction<S: ClusterSnapshot>(name: &str, snapshot: &S, clock: &impl Clock) -> Result<bool> {
		let resolved = datemath::resolve_date_math_single(name, clock)?;
		Ok(wildcard::has_index_abstraction(&resolved, snapshot))
	}

	/// §6.7 `resolve_date_math`, using the real wall clock.
	pub fn resolve_date_math(expr: &str) -> Result<String> {
		datemath::resolve_date_math_single(expr, &SystemClock)
	}

	/// §6.7 `resolve_date_math`, with a caller-supplied clock.
	pub fn resolve_date_math_at(expr: &str, clock: &impl Clock) -> Result<String> {
		datemath::resolve_date_math_single(expr, clock)
	}

	/// §6.8 `resolve_expressions_set`: wildcard-resolved with lenient
	/// defaults (open + hidden, data streams included, aliases preserved).
	pub fn resolve_expressions_set<S: ClusterSnapshot>(snapshot: &S, exprs: &[String]) -> Result<BTreeSet<String>> {
		let ctx = Context::lenient(snapshot, SystemClock.now_millis());
		Ok(wildcard::expand_wildcards(&ctx, exprs)?.into_iter().collect())
	}

	/// §6.9 `filtering_aliases`.
	pub fn filtering_aliases<S: ClusterSnapshot>(
		ctx: &Context<'_, S>,
		index: &str,
		resolved: &BTreeSet<String>,
		is_all_indices: bool,
		skip_identity: bool,
		required: impl Fn(&str) -> bool,
	) -> Option<Vec<String>> {
		aliases::filtering_aliases(ctx, index, resolved, is_all_indices, skip_identity, required)
	}

	/// §6.10 `resolve_search_routing`.
	pub fn resolve_search_routing<S: ClusterSnapshot>(
		ctx: &Context<'_, S>,
		routing_csv: Option<&str>,
		exprs: &[String],
	) -> Result<Option<BTreeMap<String, BTreeSet<String>>>> {
		routing::resolve_search_routing(ctx, routing_csv, exprs)
	}
}

fn run_pipeline<S: ClusterSnapshot>(
	ctx: &Context<'_, S>,
	sink: &dyn DeprecationSink,
	clock: &impl Clock,
	exprs: &[String],
) -> Result<Vec<IndexId>> {
	let rewritten = datemath::resolve_date_math(exprs, clock)?;
	let names = wildcard::expand_wildcards(ctx, &rewritten)?;
	let ids = materialize::materialize(ctx, &names, exprs.len())?;
	access::apply_gate(ctx, sink, &ids)?;
	Ok(ids)
}
