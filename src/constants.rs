//! # System Constants
//!
//! Logical key namespaces, header names and defaults shared across the cache,
//! services and web layers.

/// Logical cache key namespaces
///
/// Logical keys never carry the `{namespace}:v{version}:` generation prefix;
/// the cache client adds it.
pub mod keys {
    pub const GOAL: &str = "goal";
    pub const SUBTASK: &str = "subtask";
    pub const REWARD: &str = "reward";
    pub const USER: &str = "user";

    pub const GOALS_LIST: &str = "goals:user";
    pub const SUBTASKS_LIST: &str = "subtasks:goal";
    pub const REWARDS_LIST: &str = "rewards:user";
    pub const DASHBOARD: &str = "analytics:dashboard";

    /// Per-user registry of tracked query keys
    pub const USER_KEYS: &str = "user_keys";

    /// Value used in canonical params for an absent optional parameter
    pub const ABSENT: &str = "_";
}

/// HTTP header names
pub mod headers {
    pub const CACHE_STATUS: &str = "x-cache";
    pub const REQUEST_ID: &str = "x-request-id";
    pub const USER_ID: &str = "x-user-id";
}

/// Goal progress bounds, in percent
pub mod progress {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;
}

/// Round to two decimal places, the precision progress values are stored at
pub fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
