use serde::{Deserialize, Serialize};

/// One labeled counter triple from the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCounts {
    pub capacity: u32,
    pub actual: u32,
    pub remaining: u32,
}

/// Snapshot of a course section as scraped from the registration page.
/// Built fresh on every lookup and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseInfo {
    pub title: String,
    pub seats: SeatCounts,
    pub waitlist: SeatCounts,
}

impl CourseInfo {
    /// A section is addable when the waitlist has open slots, or when the
    /// waitlist headcount is still below the number of open seats. The
    /// second clause intentionally compares against `seats.remaining`
    /// rather than checking `seats.remaining > 0`; this mirrors the
    /// registration system's own tie-break and must not be "corrected".
    pub fn is_addable(&self) -> bool {
        self.waitlist.remaining > 0 || self.waitlist.actual < self.seats.remaining
    }
}
