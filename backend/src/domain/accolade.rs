//! Milestone accolades and their rendering.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccoladeId, StudentId};

/// Text shown when a student holds no accolades.
pub const NO_ACCOLADES: &str = "No accolades";

/// Milestone reached by a student's cumulative hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum AccoladeKind {
    #[serde(rename = "10")]
    TenHours,
    #[serde(rename = "25")]
    TwentyFiveHours,
    #[serde(rename = "50")]
    FiftyHours,
}

impl AccoladeKind {
    /// Every kind in ascending threshold order.
    pub const ALL: [Self; 3] = [Self::TenHours, Self::TwentyFiveHours, Self::FiftyHours];

    /// Hours required to earn the accolade.
    pub const fn threshold(self) -> f64 {
        match self {
            Self::TenHours => 10.0,
            Self::TwentyFiveHours => 25.0,
            Self::FiftyHours => 50.0,
        }
    }

    /// Storage representation (`"10"`, `"25"`, `"50"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TenHours => "10",
            Self::TwentyFiveHours => "25",
            Self::FiftyHours => "50",
        }
    }
}

impl fmt::Display for AccoladeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored accolade type is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown accolade type: {0}")]
pub struct UnknownAccoladeError(pub String);

impl FromStr for AccoladeKind {
    type Err = UnknownAccoladeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownAccoladeError(value.to_owned()))
    }
}

/// Ordered set of thresholds the accolade engine evaluates.
///
/// # Examples
/// ```
/// use volunteer_ledger::domain::{AccoladeKind, AccoladeLadder};
///
/// let ladder = AccoladeLadder::default();
/// let earned: Vec<_> = ladder.qualifying(26.0).collect();
/// assert_eq!(earned, vec![AccoladeKind::TenHours, AccoladeKind::TwentyFiveHours]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AccoladeLadder {
    rungs: Vec<AccoladeKind>,
}

impl AccoladeLadder {
    /// Build a ladder from any set of kinds; duplicates are dropped and the
    /// rungs are kept in ascending threshold order.
    pub fn new(kinds: impl IntoIterator<Item = AccoladeKind>) -> Self {
        let mut rungs: Vec<_> = kinds.into_iter().collect();
        rungs.sort();
        rungs.dedup();
        Self { rungs }
    }

    /// Every rung whose threshold `total` meets, lowest first.
    pub fn qualifying(&self, total: f64) -> impl Iterator<Item = AccoladeKind> + '_ {
        self.rungs
            .iter()
            .copied()
            .filter(move |kind| total >= kind.threshold())
    }
}

impl Default for AccoladeLadder {
    fn default() -> Self {
        Self::new(AccoladeKind::ALL)
    }
}

/// An accolade held by a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Accolade {
    pub id: AccoladeId,
    pub student_id: StudentId,
    pub accolade_type: AccoladeKind,
    pub awarded_at: DateTime<Utc>,
}

/// Render accolades as `"10h 25h"` in ascending order, or [`NO_ACCOLADES`].
///
/// # Examples
/// ```
/// use volunteer_ledger::domain::{render_badges, AccoladeKind};
///
/// assert_eq!(render_badges(&[AccoladeKind::TwentyFiveHours, AccoladeKind::TenHours]), "10h 25h");
/// assert_eq!(render_badges(&[]), "No accolades");
/// ```
pub fn render_badges(kinds: &[AccoladeKind]) -> String {
    let mut sorted = kinds.to_vec();
    sorted.sort();
    sorted.dedup();
    if sorted.is_empty() {
        return NO_ACCOLADES.to_owned();
    }
    sorted
        .iter()
        .map(|kind| format!("{kind}h"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, vec![])]
    #[case(9.99, vec![])]
    #[case(10.0, vec![AccoladeKind::TenHours])]
    #[case(25.0, vec![AccoladeKind::TenHours, AccoladeKind::TwentyFiveHours])]
    #[case(
        120.0,
        vec![AccoladeKind::TenHours, AccoladeKind::TwentyFiveHours, AccoladeKind::FiftyHours]
    )]
    fn ladder_awards_every_reached_threshold(#[case] total: f64, #[case] expected: Vec<AccoladeKind>) {
        let earned: Vec<_> = AccoladeLadder::default().qualifying(total).collect();
        assert_eq!(earned, expected);
    }

    #[test]
    fn custom_ladder_is_sorted_and_deduplicated() {
        let ladder = AccoladeLadder::new([
            AccoladeKind::FiftyHours,
            AccoladeKind::TenHours,
            AccoladeKind::FiftyHours,
        ]);
        let earned: Vec<_> = ladder.qualifying(60.0).collect();
        assert_eq!(earned, vec![AccoladeKind::TenHours, AccoladeKind::FiftyHours]);
    }

    #[test]
    fn kinds_serialise_as_threshold_strings() {
        let value = serde_json::to_value(AccoladeKind::TwentyFiveHours).expect("serialise");
        assert_eq!(value, serde_json::json!("25"));
        assert_eq!("50".parse::<AccoladeKind>(), Ok(AccoladeKind::FiftyHours));
        assert!("75".parse::<AccoladeKind>().is_err());
    }

    #[rstest]
    #[case(vec![], "No accolades")]
    #[case(vec![AccoladeKind::TenHours], "10h")]
    #[case(vec![AccoladeKind::FiftyHours, AccoladeKind::TenHours, AccoladeKind::TwentyFiveHours], "10h 25h 50h")]
    fn badges_render_in_ascending_order(#[case] kinds: Vec<AccoladeKind>, #[case] expected: &str) {
        assert_eq!(render_badges(&kinds), expected);
    }
}
