//! Extraction of seat counts from a Banner class-detail page.
//!
//! The page is near-identical repeated table markup, not anything worth a
//! DOM for. Each counter block is a `ddlabel` header naming the section
//! ("Seats", "Waitlist Seats") followed by a run of `dddefault` cells;
//! the first three cells carry capacity, actual and remaining. The page
//! pads blocks with extra cells, so the matcher accepts up to
//! [`MAX_TABLE_CELLS`] optional cells per label and reads the first three
//! it captured. Pure functions only; no I/O happens here.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::models::{CourseInfo, SeatCounts};

/// Phrase Banner renders instead of the detail table when a CRN has no
/// record for the requested term.
const NOT_FOUND_SENTINEL: &str = "No detailed class information found";

/// Upper bound on trailing cells after a counter label.
const MAX_TABLE_CELLS: usize = 10;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<th CLASS="ddlabel" scope="row" >(.+?)<br /><br /></th>"#)
        .expect("title pattern compiles")
});

static SEATS_RE: LazyLock<Regex> = LazyLock::new(|| counter_table_regex("Seats"));

static WAITLIST_RE: LazyLock<Regex> = LazyLock::new(|| counter_table_regex("Waitlist Seats"));

fn counter_table_regex(label: &str) -> Regex {
    let mut pattern = format!(
        r#"<th CLASS="ddlabel" scope="row" ><SPAN class="fieldlabeltext">{}</SPAN></th>\n"#,
        regex::escape(label)
    );
    for _ in 0..MAX_TABLE_CELLS {
        pattern.push_str(r#"(?:<td CLASS="dddefault">(.+?)</td>\n)?"#);
    }
    Regex::new(&pattern).expect("counter table pattern compiles")
}

/// Parse a raw detail-page body.
///
/// Returns `Ok(None)` when the page carries the no-record sentinel,
/// `Err(AppError::Unparseable)` when any expected fragment is missing or
/// a counter cell is not a base-10 integer. A `CourseInfo` is only
/// produced with all six counters present.
pub fn parse(body: &str) -> Result<Option<CourseInfo>, AppError> {
    if body.contains(NOT_FOUND_SENTINEL) {
        return Ok(None);
    }

    let title = TITLE_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| AppError::Unparseable("course title row not found".to_string()))?
        .as_str()
        .to_string();

    let seats = extract_counts(body, &SEATS_RE, "Seats")?;
    let waitlist = extract_counts(body, &WAITLIST_RE, "Waitlist Seats")?;

    Ok(Some(CourseInfo { title, seats, waitlist }))
}

fn extract_counts(body: &str, table: &Regex, label: &str) -> Result<SeatCounts, AppError> {
    let caps = table
        .captures(body)
        .ok_or_else(|| AppError::Unparseable(format!("{} table not found", label)))?;

    let mut cells = (1..=MAX_TABLE_CELLS).filter_map(|i| caps.get(i)).map(|m| m.as_str());
    let mut next_count = || -> Result<u32, AppError> {
        let cell = cells
            .next()
            .ok_or_else(|| AppError::Unparseable(format!("{} table is missing cells", label)))?;
        cell.trim().parse::<u32>().map_err(|_| {
            AppError::Unparseable(format!("{} cell {:?} is not a count", label, cell))
        })
    };

    Ok(SeatCounts {
        capacity: next_count()?,
        actual: next_count()?,
        remaining: next_count()?,
    })
}
