/// Cache key for a raw problem text: `ml_` followed by the base-36
/// absolute value of a 32-bit djb2 hash over the UTF-16 code units.
///
/// Keys are stable across processes, so corrections recorded elsewhere
/// can address the same entry.
pub fn cache_key(text: &str) -> String {
    let mut hash: i32 = 5381;
    for unit in text.encode_utf16() {
        hash = hash.wrapping_shl(5).wrapping_add(hash) ^ i32::from(unit);
    }
    format!("ml_{}", to_base36(i64::from(hash).unsigned_abs()))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_hashes_to_seed() {
        // 5381 = 4·36² + 5·36 + 17
        assert_eq!(cache_key(""), "ml_45h");
    }

    #[test]
    fn single_char_matches_djb2_xor() {
        // (5381 << 5) + 5381 = 177573, ^ 'a' (97) = 177604
        assert_eq!(cache_key("a"), format!("ml_{}", to_base36(177_604)));
    }

    #[test]
    fn keys_are_stable_and_distinct() {
        let a = cache_key("Line AB 75mm long");
        let b = cache_key("Line AB 75mm long");
        let c = cache_key("Line AB 76mm long");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("ml_"));
    }

    #[test]
    fn long_text_wraps_without_panicking() {
        let text = "θ ".repeat(10_000);
        let key = cache_key(&text);
        assert!(key[3..].chars().all(|c| c.is_ascii_alphanumeric()), "Got {key}");
    }

    #[test]
    fn base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
