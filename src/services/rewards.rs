use std::str::FromStr;
use thiserror::Error;

/// Points granted for every finished study chunk.
pub const POINTS_PER_SESSION: i64 = 10;
/// Trailing-week study minutes needed for the weekly badge (5 hours).
pub const WEEKLY_BADGE_THRESHOLD_MINUTES: i64 = 300;
pub const WEEKLY_BADGE_NAME: &str = "🔥 Legend of the Week";
/// Length of the trailing window used for weekly totals.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// Whether the weekly badge can be awarded again while the threshold stays crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgePolicy {
    /// Award at most once per trailing week.
    OncePerWeek,
    /// Award on every finish while the weekly total is at or above the threshold.
    #[default]
    Repeat,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown badge policy `{0}`, expected `once-per-week` or `repeat`")]
pub struct UnknownBadgePolicy(pub String);

impl FromStr for BadgePolicy {
    type Err = UnknownBadgePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once-per-week" | "once_per_week" => Ok(BadgePolicy::OncePerWeek),
            "repeat" => Ok(BadgePolicy::Repeat),
            other => Err(UnknownBadgePolicy(other.to_string())),
        }
    }
}

pub fn weekly_threshold_reached(weekly_minutes: i64) -> bool {
    weekly_minutes >= WEEKLY_BADGE_THRESHOLD_MINUTES
}
