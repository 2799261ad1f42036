//! Search-routing projection (§4.6): given a caller-supplied routing string
//! and a set of expressions, project the effective routing values per
//! concrete index.
use std::collections::{BTreeMap, BTreeSet};

use crate::err::Result;
use crate::model::{ClusterSnapshot, Context, IndexAbstraction};
use crate::wildcard;

fn is_trivial_all(expressions: &[String]) -> bool {
	expressions.is_empty() || matches!(expressions, [only] if only == "_all" || only == "*")
}

fn parse_routing(routing: Option<&str>) -> Option<BTreeSet<String>> {
	let routing = routing?;
	let values: BTreeSet<String> = routing
		.split(',')
		.map(str::trim)
		.filter(|v| !v.is_empty())
		.map(str::to_owned)
		.collect();
	if values.is_empty() {
		None
	} else {
		Some(values)
	}
}

/// Project effective search routing per concrete index for `expressions`.
/// Forces `ignore_aliases=false` and `include_data_streams=true` regardless
/// of `ctx`'s own options, per §4.6.
pub fn resolve_search_routing<S: ClusterSnapshot>(
	ctx: &Context<'_, S>,
	routing: Option<&str>,
	expressions: &[String],
) -> Result<Option<BTreeMap<String, BTreeSet<String>>>> {
	let caller_routing = parse_routing(routing);
	let routing_ctx = ctx.derived(ctx.options.with_ignore_aliases(false), true);

	if is_trivial_all(expressions) {
		let Some(cr) = caller_routing else {
			return Ok(None);
		};
		let mut map = BTreeMap::new();
		for name in routing_ctx.snapshot.concrete_all_indices() {
			map.insert(name.to_owned(), cr.clone());
		}
		return Ok(if map.is_empty() {
			None
		} else {
			Some(map)
		});
	}

	let names = wildcard::expand_wildcards(&routing_ctx, expressions)?;
	let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

	for name in &names {
		match routing_ctx.snapshot.lookup(name) {
			Some(IndexAbstraction::Alias {
				members, ..
			}) => {
				for member in members {
					match &member.search_routing {
						Some(specific) => {
							let effective = match &caller_routing {
								Some(cr) => specific.intersection(cr).cloned().collect(),
								None => specific.clone(),
							};
							map.insert(member.index.clone(), effective);
						}
						None => mark_no_routing_required(&mut map, &member.index, &caller_routing),
					}
				}
			}
			Some(IndexAbstraction::DataStream {
				allow_custom_routing,
				backing_indices,
				..
			}) => {
				if *allow_custom_routing {
					for backing in backing_indices {
						mark_no_routing_required(&mut map, backing, &caller_routing);
					}
				}
			}
			Some(IndexAbstraction::Concrete {
				name: concrete_name, ..
			}) => {
				mark_no_routing_required(&mut map, concrete_name, &caller_routing);
			}
			None => {}
		}
	}

	Ok(if map.is_empty() {
		None
	} else {
		Some(map)
	})
}

fn mark_no_routing_required(map: &mut BTreeMap<String, BTreeSet<String>>, index: &str, caller_routing: &Option<BTreeSet<String>>) {
	match caller_routing {
		Some(cr) => {
			map.insert(index.to_owned(), cr.clone());
		}
		None => {
			map.remove(index);
		}
	}
}
