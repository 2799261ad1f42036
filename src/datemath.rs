//! Date-math preprocessor (§4.1). Rewrites `<name{format|tz}>`-style tokens
//! against a request-time clock. Hand-rolled as a small byte-at-a-time
//! automaton, the way a hand-rolled lexer reads its own token kinds
//! (a `Reader`-style cursor, a `scratch` accumulation buffer, a focused
//! `thiserror::Error` enum) rather than reaching for a parser-combinator
//! crate for what is, underneath, three states and a handful of transitions.
use chrono::{DateTime, Datelike, FixedOffset, Months, TimeZone, Timelike, Utc};
use thiserror::Error;

use crate::cnf::{DEFAULT_DATE_MATH_FORMAT, DEFAULT_DATE_MATH_TIMEZONE};
use crate::err::{self, Error as CrateError};

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum DateMathError {
	#[error("unbalanced placeholder in [{0}]")]
	UnbalancedPlaceholder(String),
	#[error("date math expression [{0}] resolved to an empty string")]
	EmptyOutput(String),
	#[error("missing date format after '{{' in [{0}]")]
	MissingDateFormat(String),
	#[error("missing closing '}}' for date format block in [{0}]")]
	UnclosedDateFormat(String),
	#[error("stray '{{' or '}}' outside of an escape in [{0}]")]
	StrayBrace(String),
	#[error("dangling escape character in [{0}]")]
	DanglingEscape(String),
	#[error("invalid date math expression [{0}]: {1}")]
	InvalidMath(String, String),
	#[error("unknown date math unit '{0}' in [{1}]")]
	UnknownUnit(char, String),
	#[error("unknown timezone [{0}] in [{1}]")]
	UnknownTimezone(String, String),
}

impl From<DateMathError> for CrateError {
	fn from(e: DateMathError) -> Self {
		let expression = match &e {
			DateMathError::UnbalancedPlaceholder(s)
			| DateMathError::EmptyOutput(s)
			| DateMathError::MissingDateFormat(s)
			| DateMathError::UnclosedDateFormat(s)
			| DateMathError::StrayBrace(s)
			| DateMathError::DanglingEscape(s)
			| DateMathError::InvalidMath(s, _)
			| DateMathError::UnknownUnit(_, s)
			| DateMathError::UnknownTimezone(_, s) => s.clone(),
		};
		err::Error::InvalidExpression {
			expression,
			reason: e.to_string(),
		}
	}
}

/// A clock, read once per call and reused for every token (§5).
pub trait Clock {
	fn now_millis(&self) -> i64;
}

impl<F: Fn() -> i64> Clock for F {
	fn now_millis(&self) -> i64 {
		self()
	}
}

/// A clock fixed at a given ms-since-epoch value, for deterministic tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
	fn now_millis(&self) -> i64 {
		self.0
	}
}

/// The real wall clock, used by callers that do not supply their own
/// (§6 item 7: `resolve_date_math(expr [, clock])`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> i64 {
		std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			.map(|d| d.as_millis() as i64)
			.unwrap_or(0)
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
	Outside,
	InPlaceholder,
	InDateFormat,
}

/// Rewrite a single expression. An expression not bracketed by `<…>` is
/// passed through byte-for-byte (§4.1 edge case).
pub fn resolve_date_math_single(expr: &str, clock: &impl Clock) -> Result<String, CrateError> {
	if expr.len() > *crate::cnf::MAX_EXPRESSION_LENGTH {
		return Err(CrateError::InvalidExpression {
			expression: expr.chars().take(64).collect(),
			reason: "expression exceeds the maximum allowed length".into(),
		});
	}
	if !expr.starts_with('<') {
		return Ok(expr.to_owned());
	}
	let Some(inner) = expr.strip_prefix('<').and_then(|s| s.strip_suffix('>')) else {
		return Err(DateMathError::UnbalancedPlaceholder(expr.to_owned()).into());
	};

	let mut out = String::with_capacity(inner.len());
	let mut math_buf = String::new();
	let mut format_buf = String::new();
	let mut state = State::Outside;
	let mut chars = inner.chars().peekable();
	let mut awaiting_placeholder_close = false;

	while let Some(c) = chars.next() {
		match state {
			State::Outside => match c {
				'\\' => {
					let escaped = chars.next().ok_or_else(|| DateMathError::DanglingEscape(expr.to_owned()))?;
					out.push(escaped);
				}
				'{' => {
					state = State::InPlaceholder;
					math_buf.clear();
				}
				'}' => return Err(DateMathError::StrayBrace(expr.to_owned()).into()),
				_ => out.push(c),
			},
			State::InPlaceholder => {
				if awaiting_placeholder_close {
					if c != '}' {
						return Err(DateMathError::UnbalancedPlaceholder(expr.to_owned()).into());
					}
					let rendered = render_placeholder(&math_buf, Some(&format_buf), clock, expr)?;
					out.push_str(&rendered);
					state = State::Outside;
					awaiting_placeholder_close = false;
					continue;
				}
				match c {
					'{' => {
						state = State::InDateFormat;
						format_buf.clear();
					}
					'}' => {
						let rendered = render_placeholder(&math_buf, None, clock, expr)?;
						out.push_str(&rendered);
						state = State::Outside;
					}
					_ => math_buf.push(c),
				}
			}
			State::InDateFormat => {
				if c == '}' {
					if format_buf.is_empty() {
						return Err(DateMathError::MissingDateFormat(expr.to_owned()).into());
					}
					state = State::InPlaceholder;
					awaiting_placeholder_close = true;
				} else {
					format_buf.push(c);
				}
			}
		}
	}

	if state != State::Outside {
		return Err(DateMathError::UnclosedDateFormat(expr.to_owned()).into());
	}
	if out.is_empty() {
		return Err(DateMathError::EmptyOutput(expr.to_owned()).into());
	}
	Ok(out)
}

fn render_placeholder(
	math: &str,
	format_spec: Option<&str>,
	clock: &impl Clock,
	whole_expr: &str,
) -> Result<String, CrateError> {
	let (pattern, tz_name) = match format_spec {
		Some(spec) => match spec.split_once('|') {
			Some((p, tz)) => (p, tz),
			None => (spec, DEFAULT_DATE_MATH_TIMEZONE),
		},
		None => (DEFAULT_DATE_MATH_FORMAT, DEFAULT_DATE_MATH_TIMEZONE),
	};
	let tz = parse_timezone(tz_name, whole_expr)?;
	let dt = eval_math(math, clock.now_millis(), tz, whole_expr)?;
	Ok(format_java_pattern(pattern, &dt))
}

fn parse_timezone(name: &str, whole_expr: &str) -> Result<FixedOffset, CrateError> {
	if name.eq_ignore_ascii_case("utc") || name.eq_ignore_ascii_case("z") {
		return Ok(FixedOffset::east_opt(0).unwrap());
	}
	let (sign, rest) = match name.as_bytes().first() {
		Some(b'+') => (1, &name[1..]),
		Some(b'-') => (-1, &name[1..]),
		_ => return Err(DateMathError::UnknownTimezone(name.to_owned(), whole_expr.to_owned()).into()),
	};
	let (h, m) = match rest.split_once(':') {
		Some((h, m)) => (h, m),
		None if rest.len() == 4 => rest.split_at(2),
		None => return Err(DateMathError::UnknownTimezone(name.to_owned(), whole_expr.to_owned()).into()),
	};
	let h: i32 = h.parse().map_err(|_| DateMathError::UnknownTimezone(name.to_owned(), whole_expr.to_owned()))?;
	let m: i32 = m.parse().map_err(|_| DateMathError::UnknownTimezone(name.to_owned(), whole_expr.to_owned()))?;
	let secs = sign * (h * 3600 + m * 60);
	FixedOffset::east_opt(secs).ok_or_else(|| DateMathError::UnknownTimezone(name.to_owned(), whole_expr.to_owned()).into())
}

fn eval_math(
	expr: &str,
	now_ms: i64,
	tz: FixedOffset,
	whole_expr: &str,
) -> Result<DateTime<FixedOffset>, CrateError> {
	let Some(rest) = expr.strip_prefix("now") else {
		return Err(DateMathError::InvalidMath(
			whole_expr.to_owned(),
			format!("expected date math expression to start with 'now', found [{expr}]"),
		)
		.into());
	};
	let base_utc = DateTime::<Utc>::from_timestamp_millis(now_ms)
		.ok_or_else(|| DateMathError::InvalidMath(whole_expr.to_owned(), "clock value out of range".into()))?;
	let mut dt = base_utc.with_timezone(&tz);

	let mut chars = rest.chars().peekable();
	while let Some(op) = chars.next() {
		match op {
			'+' | '-' => {
				let mut digits = String::new();
				while let Some(d) = chars.peek() {
					if d.is_ascii_digit() {
						digits.push(*d);
						chars.next();
					} else {
						break;
					}
				}
				if digits.is_empty() {
					return Err(DateMathError::InvalidMath(whole_expr.to_owned(), "missing quantity".into()).into());
				}
				let unit = chars
					.next()
					.ok_or_else(|| DateMathError::InvalidMath(whole_expr.to_owned(), "missing unit".into()))?;
				let qty: i64 = digits.parse().map_err(|_| {
					DateMathError::InvalidMath(whole_expr.to_owned(), "quantity overflow".into())
				})?;
				let signed = if op == '-' {
					-qty
				} else {
					qty
				};
				dt = add_unit(dt, signed, unit, whole_expr)?;
			}
			'/' => {
				let unit = chars
					.next()
					.ok_or_else(|| DateMathError::InvalidMath(whole_expr.to_owned(), "missing rounding unit".into()))?;
				dt = round_down(dt, unit, whole_expr)?;
			}
			_ => {
				return Err(DateMathError::InvalidMath(
					whole_expr.to_owned(),
					format!("unexpected character '{op}'"),
				)
				.into());
			}
		}
	}
	Ok(dt)
}

fn add_unit(
	dt: DateTime<FixedOffset>,
	qty: i64,
	unit: char,
	whole_expr: &str,
) -> Result<DateTime<FixedOffset>, CrateError> {
	let result = match unit {
		'y' => add_months(dt, qty * 12),
		'M' => add_months(dt, qty),
		'w' => dt.checked_add_signed(chrono::Duration::weeks(qty)),
		'd' => dt.checked_add_signed(chrono::Duration::days(qty)),
		'H' | 'h' => dt.checked_add_signed(chrono::Duration::hours(qty)),
		'm' => dt.checked_add_signed(chrono::Duration::minutes(qty)),
		's' => dt.checked_add_signed(chrono::Duration::seconds(qty)),
		_ => return Err(DateMathError::UnknownUnit(unit, whole_expr.to_owned()).into()),
	};
	result.ok_or_else(|| DateMathError::InvalidMath(whole_expr.to_owned(), "date math overflowed".into()).into())
}

fn add_months(dt: DateTime<FixedOffset>, months: i64) -> Option<DateTime<FixedOffset>> {
	if months >= 0 {
		dt.checked_add_months(Months::new(months as u32))
	} else {
		dt.checked_sub_months(Months::new((-months) as u32))
	}
}

fn round_down(dt: DateTime<FixedOffset>, unit: char, whole_expr: &str) -> Result<DateTime<FixedOffset>, CrateError> {
	let tz = dt.timezone();
	let truncated = match unit {
		'y' => tz.with_ymd_and_hms(dt.year(), 1, 1, 0, 0, 0).single(),
		'M' => tz.with_ymd_and_hms(dt.year(), dt.month(), 1, 0, 0, 0).single(),
		'w' => {
			let days_since_monday = dt.weekday().num_days_from_monday() as i64;
			let monday = dt.checked_sub_signed(chrono::Duration::days(days_since_monday));
			monday.and_then(|m| tz.with_ymd_and_hms(m.year(), m.month(), m.day(), 0, 0, 0).single())
		}
		'd' => tz.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), 0, 0, 0).single(),
		'H' | 'h' => tz.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), dt.hour(), 0, 0).single(),
		'm' => tz
			.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), 0)
			.single(),
		's' => dt.with_nanosecond(0),
		_ => return Err(DateMathError::UnknownUnit(unit, whole_expr.to_owned()).into()),
	};
	truncated.ok_or_else(|| DateMathError::InvalidMath(whole_expr.to_owned(), "rounding produced an invalid date".into()).into())
}

/// Render a Java-`DateTimeFormatter`-style letter pattern (`uuuu.MM.dd`),
/// the way §4.1 expects. Implemented by hand rather than via
/// `chrono::format::strftime`, whose `%`-based syntax is a different
/// notation from the letter patterns this component's callers supply.
fn format_java_pattern(pattern: &str, dt: &DateTime<FixedOffset>) -> String {
	let mut out = String::with_capacity(pattern.len());
	let chars: Vec<char> = pattern.chars().collect();
	let mut i = 0;
	while i < chars.len() {
		let c = chars[i];
		let mut run_len = 1;
		while i + run_len < chars.len() && chars[i + run_len] == c {
			run_len += 1;
		}
		match c {
			'y' | 'u' => out.push_str(&pad(dt.year(), run_len.max(4))),
			'M' => {
				if run_len >= 2 {
					out.push_str(&pad(dt.month() as i32, 2));
				} else {
					out.push_str(&dt.month().to_string());
				}
			}
			'd' => {
				if run_len >= 2 {
					out.push_str(&pad(dt.day() as i32, 2));
				} else {
					out.push_str(&dt.day().to_string());
				}
			}
			'H' => out.push_str(&pad(dt.hour() as i32, if run_len >= 2 { 2 } else { 1 })),
			'h' => {
				let (_, h12) = dt.hour12();
				out.push_str(&pad(h12 as i32, if run_len >= 2 { 2 } else { 1 }));
			}
			'm' => out.push_str(&pad(dt.minute() as i32, if run_len >= 2 { 2 } else { 1 })),
			's' => out.push_str(&pad(dt.second() as i32, if run_len >= 2 { 2 } else { 1 })),
			other => {
				for _ in 0..run_len {
					out.push(other);
				}
			}
		}
		i += run_len;
	}
	out
}

fn pad(v: i32, width: usize) -> String {
	format!("{:0width$}", v, width = width)
}

/// Rewrite an ordered sequence of expressions (§4.1). Preserves a leading
/// `-` exclusion marker only after a wildcard has already been seen earlier
/// in the sequence (§9 open question — legacy behaviour, preserved as-is).
pub fn resolve_date_math(expressions: &[String], clock: &impl Clock) -> Result<Vec<String>, CrateError> {
	let mut wildcard_seen = false;
	let mut out = Vec::with_capacity(expressions.len());
	for expr in expressions {
		let (is_exclusion, body) = if wildcard_seen && expr.starts_with('-') {
			(true, &expr[1..])
		} else {
			(false, expr.as_str())
		};
		let resolved = resolve_date_math_single(body, clock)?;
		if resolved.contains('*') || resolved.contains('?') {
			wildcard_seen = true;
		}
		out.push(if is_exclusion {
			format!("-{resolved}")
		} else {
			resolved
		});
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn clock_at(ms: i64) -> FixedClock {
		FixedClock(ms)
	}

	#[test]
	fn passes_through_non_bracketed_expressions() {
		let clock = clock_at(0);
		assert_eq!(resolve_date_math_single("logs-1", &clock).unwrap(), "logs-1");
	}

	#[test]
	fn rewrites_simple_now_placeholder() {
		// 2024-01-15T10:00:00Z
		let clock = clock_at(1705312800000);
		let got = resolve_date_math_single("<logs-{now/d{yyyy.MM.dd|UTC}}>", &clock).unwrap();
		assert_eq!(got, "logs-2024.01.15");
	}

	#[test]
	fn default_format_and_timezone_are_applied() {
		let clock = clock_at(1705312800000);
		let got = resolve_date_math_single("<logs-{now}>", &clock).unwrap();
		assert_eq!(got, "logs-2024.01.15");
	}

	#[test]
	fn math_with_offset_and_rounding() {
		let clock = clock_at(1705312800000);
		let got = resolve_date_math_single("<logs-{now-1d/M{yyyy.MM.dd}}>", &clock).unwrap();
		assert_eq!(got, "logs-2024.01.01");
	}

	#[test]
	fn escapes_literal_braces() {
		let clock = clock_at(0);
		let got = resolve_date_math_single(r"<logs-\{literal\}>", &clock).unwrap();
		assert_eq!(got, "logs-{literal}");
	}

	#[test]
	fn unbalanced_placeholder_is_an_error() {
		let clock = clock_at(0);
		assert!(resolve_date_math_single("<logs-{now", &clock).is_err());
	}

	#[test]
	fn stray_closing_brace_is_an_error() {
		let clock = clock_at(0);
		assert!(resolve_date_math_single("<logs-}>", &clock).is_err());
	}

	#[test]
	fn sequence_preserves_dash_exclusion_only_after_wildcard() {
		let clock = clock_at(0);
		let exprs = vec!["-foo".to_string()];
		let out = resolve_date_math(&exprs, &clock).unwrap();
		// No wildcard has been seen yet, so resolve_date_math itself does not
		// strip the dash (the wildcard resolver decides what a leading dash
		// with no prior wildcard means); this stage leaves it untouched.
		assert_eq!(out, vec!["-foo".to_string()]);

		let exprs = vec!["*".to_string(), "-foo".to_string()];
		let out = resolve_date_math(&exprs, &clock).unwrap();
		assert_eq!(out, vec!["*".to_string(), "-foo".to_string()]);
	}

	#[test]
	fn idempotent_on_non_date_math_result() {
		let clock = clock_at(1705312800000);
		let once = resolve_date_math_single("<logs-{now/d}>", &clock).unwrap();
		let twice = resolve_date_math_single(&once, &clock).unwrap();
		assert_eq!(once, twice);
	}
}
