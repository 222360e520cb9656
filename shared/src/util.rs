/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Document identifier for anything the caller did not name itself.
pub fn generate_id() -> String {
    snowflake_id().to_string()
}

/// Human-readable order number: `ORD` + last 8 digits of the timestamp + 3 random digits.
pub fn generate_order_number(now_ms: i64) -> String {
    use rand::Rng;
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("ORD{:08}{:03}", now_ms.rem_euclid(100_000_000), suffix)
}

/// Identifier of the `position`-th (1-based) element of a nested collection.
pub fn child_id(prefix: &str, position: usize) -> String {
    format!("{prefix}_{position}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_is_positive_and_safe_for_js() {
        for _ in 0..100 {
            let id = snowflake_id();
            assert!(id > 0);
            assert!(id < (1i64 << 53));
        }
    }

    #[test]
    fn test_generate_id_is_numeric() {
        let id = generate_id();
        assert!(id.parse::<i64>().is_ok());
    }

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number(1_718_000_123_456);
        assert_eq!(number.len(), 3 + 8 + 3);
        assert!(number.starts_with("ORD00123456"));
        assert!(number[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_order_number_pads_small_timestamps() {
        let number = generate_order_number(42);
        assert!(number.starts_with("ORD00000042"));
    }

    #[test]
    fn test_child_id() {
        assert_eq!(child_id("item", 1), "item_1");
        assert_eq!(child_id("timeline", 12), "timeline_12");
    }
}
