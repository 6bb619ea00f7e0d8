//! Wall-clock helpers.

/// Milliseconds since the Unix epoch.
///
/// Used for generated layout ids and export filenames.
pub fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_millis_is_monotonic_enough() {
        let a = unix_millis();
        let b = unix_millis();
        assert!(a > 1_600_000_000_000);
        assert!(b >= a);
    }
}
