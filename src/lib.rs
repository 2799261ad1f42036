//! Index name expression resolution.
//!
//! Translates user-supplied, wildcard- and date-math-bearing index
//! expressions into concrete, deduplicated sets of backing index
//! identifiers, subject to the per-request [`model::IndicesOptions`] matrix.
//!
//! The pipeline is: [`datemath`] rewrite, then [`wildcard`] expand/exclude,
//! then [`materialize`] into concrete indices, gated by [`access`].
#[macro_use]
extern crate tracing;

pub mod access;
pub mod aliases;
pub mod cnf;
pub mod datemath;
pub mod deprecation;
pub mod err;
pub mod materialize;
pub mod model;
pub mod resolver;
pub mod routing;
pub mod wildcard;

pub use err::Error;
pub use resolver::Resolver;
