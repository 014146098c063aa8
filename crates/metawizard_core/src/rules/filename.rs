//! Filename convention checks: `YYYY-MMDD {block}[block] Free text.pdf`.

use crate::constants::DOCUMENT_EXTENSION;
use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

/// Earliest year accepted without a warning.
pub const MIN_YEAR: i32 = 1950;

/// Why a filename does not follow the convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameIssue {
    /// No `YYYY-MMDD` prefix.
    MissingDate,
    /// Year before [`MIN_YEAR`].
    YearTooOld,
    /// Year after the current year, or a full date later than today.
    FutureDate,
    /// Month/day combination that does not exist.
    InvalidDate { year: i32, month: u32, day: u32 },
    /// The date is not followed by bracket blocks and whitespace.
    BracketShape,
}

impl FilenameIssue {
    /// Problem with the date prefix itself.
    pub fn is_date_issue(&self) -> bool {
        !self.is_shape_issue()
    }

    /// Problem with the bracket blocks after the date.
    pub fn is_shape_issue(&self) -> bool {
        matches!(self, FilenameIssue::BracketShape)
    }
}

impl fmt::Display for FilenameIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilenameIssue::MissingDate => f.write_str("Expected YYYY-MMDD date."),
            FilenameIssue::YearTooOld => f.write_str("Year is unusually old; please confirm."),
            FilenameIssue::FutureDate => f.write_str("Date is in the future; please check."),
            FilenameIssue::InvalidDate { year, month, day } => {
                write!(f, "Date '{:04}-{:02}{:02}' is invalid.", year, month, day)
            }
            FilenameIssue::BracketShape => f.write_str("Expected {...} or [...] after date."),
        }
    }
}

impl std::error::Error for FilenameIssue {}

/// Leap years: divisible by 4, except centuries not divisible by 400.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Validate a date prefix against `today`.
///
/// Month `00` means unknown and requires day `00`; day `00` means unknown day.
///
/// # Errors
/// Returns the first rule the date breaks.
pub fn validate_date(year: i32, month: u32, day: u32, today: NaiveDate) -> Result<(), FilenameIssue> {
    if year < MIN_YEAR {
        return Err(FilenameIssue::YearTooOld);
    }
    if year > today.year() {
        return Err(FilenameIssue::FutureDate);
    }

    let invalid = FilenameIssue::InvalidDate { year, month, day };
    if month == 0 {
        return if day == 0 { Ok(()) } else { Err(invalid) };
    }
    if month > 12 {
        return Err(invalid);
    }
    if day == 0 {
        return Ok(());
    }
    if day > days_in_month(year, month) {
        return Err(invalid);
    }

    if year == today.year() {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) if date > today => return Err(FilenameIssue::FutureDate),
            Some(_) => {}
            None => return Err(invalid),
        }
    }
    Ok(())
}

fn parse_date_prefix(name: &str) -> Option<(i32, u32, u32)> {
    let bytes = name.as_bytes();
    if bytes.len() < 9 || bytes[4] != b'-' {
        return None;
    }
    let digits_ok = bytes[..4]
        .iter()
        .chain(&bytes[5..9])
        .all(|b| b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    let year = name[..4].parse().ok()?;
    let month = name[5..7].parse().ok()?;
    let day = name[7..9].parse().ok()?;
    Some((year, month, day))
}

/// Bracket blocks must open the text and some closing bracket on the same
/// line must be followed by whitespace.
fn has_bracket_blocks(after_date: &str) -> bool {
    let mut chars = after_date.chars().peekable();
    match chars.next() {
        Some('{') | Some('[') => {}
        _ => return false,
    }
    while let Some(ch) = chars.next() {
        if ch == '\n' {
            return false;
        }
        if matches!(ch, '}' | ']') && chars.peek().is_some_and(|next| next.is_whitespace()) {
            return true;
        }
    }
    false
}

fn strip_document_extension(filename: &str) -> &str {
    let ext_len = DOCUMENT_EXTENSION.len() + 1;
    if filename.len() >= ext_len && filename.is_char_boundary(filename.len() - ext_len) {
        let (stem, ext) = filename.split_at(filename.len() - ext_len);
        if ext.starts_with('.') && ext[1..].eq_ignore_ascii_case(DOCUMENT_EXTENSION) {
            return stem;
        }
    }
    filename
}

/// Validate `filename` against the naming convention using today's local date.
///
/// # Errors
/// Returns the [`FilenameIssue`] describing the first violation.
pub fn validate_filename(filename: &str) -> Result<(), FilenameIssue> {
    validate_filename_on(filename, Local::now().date_naive())
}

/// [`validate_filename`] with an explicit notion of "today".
///
/// # Errors
/// Returns the [`FilenameIssue`] describing the first violation.
pub fn validate_filename_on(filename: &str, today: NaiveDate) -> Result<(), FilenameIssue> {
    let name = strip_document_extension(filename);
    let (year, month, day) = parse_date_prefix(name).ok_or(FilenameIssue::MissingDate)?;
    validate_date(year, month, day, today)?;

    // One separator character sits between the date and the first block.
    let after_date: String = name[9..].chars().skip(1).collect();
    if !has_bracket_blocks(&after_date) {
        return Err(FilenameIssue::BracketShape);
    }
    Ok(())
}
