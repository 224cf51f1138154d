//! Leaderboard sizing.

/// Rows returned when the caller does not ask for a size.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
/// Largest leaderboard a caller may request.
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Raised when a requested leaderboard size is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("limit must be between 1 and {max}, got {requested}")]
pub struct LeaderboardLimitError {
    pub requested: usize,
    pub max: usize,
}

/// Number of leaderboard rows, 1..=100.
///
/// # Examples
/// ```
/// use volunteer_ledger::domain::LeaderboardLimit;
///
/// assert_eq!(LeaderboardLimit::default().get(), 10);
/// assert!(LeaderboardLimit::new(0).is_err());
/// assert!(LeaderboardLimit::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardLimit(usize);

impl LeaderboardLimit {
    pub fn new(requested: usize) -> Result<Self, LeaderboardLimitError> {
        if (1..=MAX_LEADERBOARD_LIMIT).contains(&requested) {
            Ok(Self(requested))
        } else {
            Err(LeaderboardLimitError {
                requested,
                max: MAX_LEADERBOARD_LIMIT,
            })
        }
    }

    /// Apply the default when no size was given.
    pub fn from_optional(requested: Option<usize>) -> Result<Self, LeaderboardLimitError> {
        requested.map_or(Ok(Self::default()), Self::new)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for LeaderboardLimit {
    fn default() -> Self {
        Self(DEFAULT_LEADERBOARD_LIMIT)
    }
}
