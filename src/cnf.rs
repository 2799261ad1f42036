//! Process-wide tunables. Most of this component's behaviour is per-call
//! (carried on [`crate::model::IndicesOptions`] and [`crate::model::Context`]);
//! only the handful of values below are read once from the environment, the
//! way a process reads its own tunables once at startup.
use once_cell::sync::Lazy;

macro_rules! lazy_env_parse {
	($key:expr, $ty:ty, $default:expr) => {
		once_cell::sync::Lazy::new(|| {
			std::env::var($key).ok().and_then(|v| v.parse::<$ty>().ok()).unwrap_or($default)
		})
	};
}

/// Default date format used by a date-math placeholder when none is given
/// between `{` and `|`. See §4.1.
pub const DEFAULT_DATE_MATH_FORMAT: &str = "uuuu.MM.dd";

/// Default timezone used by a date-math placeholder when none is given after
/// `|`. See §4.1.
pub const DEFAULT_DATE_MATH_TIMEZONE: &str = "UTC";

/// Defensive cap on the byte length of a single expression, checked before
/// any parsing is attempted. Expressions containing date-math are otherwise
/// attacker-controlled input evaluated on every request's hot path.
pub static MAX_EXPRESSION_LENGTH: Lazy<usize> =
	lazy_env_parse!("INER_MAX_EXPRESSION_LENGTH", usize, 4096);
