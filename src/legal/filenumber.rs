//! Office file number rules.
//!
//! The office file number is the firm's internal reference for a case: a
//! unique positive integer that is handed out sequentially and becomes
//! immutable once written. The pure rules live here; the store layer queries
//! the facts (current max, duplicate existence) and runs the allocation
//! transaction itself.

use crate::error::CaseError;

/// How many candidates past max+1 the allocator probes before giving up.
pub const ALLOCATION_PROBE_WINDOW: i64 = 10;

/// Tag attached to cases created from the "cases" entry point.
pub const CASE_TAG: &str = "case";

/// Tag attached to cases created from the "matters" entry point.
pub const MATTER_TAG: &str = "matter";

/// Validate a manually entered office file number.
///
/// `max_excluding_self` is the highest number currently assigned to any
/// other case (0 when none). `duplicate` is whether another case already
/// holds `candidate`. `bypass_sequence_check` skips only the max+1 rule, for
/// system-generated numbers and bulk backfill; positivity and uniqueness are
/// enforced unconditionally.
pub fn validate_file_number(
    candidate: i64,
    max_excluding_self: i64,
    duplicate: bool,
    bypass_sequence_check: bool,
) -> Result<(), CaseError> {
    if candidate <= 0 {
        return Err(CaseError::NonPositiveFileNumber(candidate));
    }
    if duplicate {
        return Err(CaseError::DuplicateFileNumber(candidate));
    }
    let next = max_excluding_self + 1;
    if !bypass_sequence_check && candidate > next {
        return Err(CaseError::OutOfSequenceFileNumber { candidate, next });
    }
    Ok(())
}

/// The candidates the allocator tries, in order: max+1 through max+window.
pub fn allocation_candidates(current_max: i64) -> impl Iterator<Item = i64> {
    let first = current_max.saturating_add(1);
    (0..ALLOCATION_PROBE_WINDOW).map(move |offset| first.saturating_add(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_sequential_number_is_accepted() {
        assert!(validate_file_number(42, 41, false, false).is_ok());
    }

    #[test]
    fn number_past_next_available_is_rejected_without_bypass() {
        let err = validate_file_number(50, 41, false, false).expect_err("must reject gap");
        match err {
            CaseError::OutOfSequenceFileNumber { candidate, next } => {
                assert_eq!(candidate, 50);
                assert_eq!(next, 42);
            }
            other => panic!("expected OutOfSequenceFileNumber, got {other:?}"),
        }
        assert!(validate_file_number(50, 41, false, true).is_ok());
    }

    #[test]
    fn duplicates_are_rejected_even_with_bypass() {
        let err = validate_file_number(7, 41, true, true).expect_err("must reject duplicate");
        assert!(matches!(err, CaseError::DuplicateFileNumber(7)));
    }

    #[test]
    fn non_positive_numbers_are_rejected_even_with_bypass() {
        assert!(matches!(
            validate_file_number(0, 0, false, true),
            Err(CaseError::NonPositiveFileNumber(0))
        ));
        assert!(matches!(
            validate_file_number(-3, 10, false, true),
            Err(CaseError::NonPositiveFileNumber(-3))
        ));
    }

    #[test]
    fn allocation_candidates_cover_the_probe_window() {
        let candidates: Vec<i64> = allocation_candidates(41).collect();
        assert_eq!(candidates.len(), ALLOCATION_PROBE_WINDOW as usize);
        assert_eq!(candidates.first(), Some(&42));
        assert_eq!(candidates.last(), Some(&51));
    }
}
