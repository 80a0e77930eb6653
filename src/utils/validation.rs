//! Centralized input limits and helper functions.

/// Maximum number of data rows accepted from a single file (DOS protection)
pub const MAX_ROWS: usize = 5_000_000;

/// Maximum number of columns accepted from a single file
pub const MAX_COLUMNS: usize = 16_384;

/// Convert a usize count to f64 for ratio calculations.
///
/// Row and column counts are far below the 2^53 range where f64 loses
/// integer precision.
#[inline]
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Check if adding another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_ROWS}"
        ))
    } else {
        None
    }
}

/// Check that a header does not declare more columns than allowed.
#[must_use]
pub fn check_column_limit(count: usize) -> Option<String> {
    if count > MAX_COLUMNS {
        Some(format!(
            "Too many columns: {count} exceeds maximum of {MAX_COLUMNS}"
        ))
    } else {
        None
    }
}

/// Ratio helper that treats an empty denominator as 1, so an empty sample
/// yields 0.0 rather than NaN.
#[must_use]
pub fn ratio(part: usize, total: usize) -> f64 {
    count_to_f64(part) / count_to_f64(total.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_limit() {
        assert!(check_row_limit(0).is_none());
        assert!(check_row_limit(MAX_ROWS - 1).is_none());
        assert!(check_row_limit(MAX_ROWS).is_some());
    }

    #[test]
    fn test_column_limit() {
        assert!(check_column_limit(MAX_COLUMNS).is_none());
        assert!(check_column_limit(MAX_COLUMNS + 1).is_some());
    }

    #[test]
    fn test_ratio_empty_denominator() {
        assert!((ratio(0, 0) - 0.0).abs() < f64::EPSILON);
        assert!((ratio(3, 4) - 0.75).abs() < f64::EPSILON);
    }
}
