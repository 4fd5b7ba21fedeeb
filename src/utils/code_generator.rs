//! Short code generation
//!
//! Codes are public bearer identifiers: anyone who learns one can
//! resolve it. They are therefore drawn from the thread-local CSPRNG,
//! not a seeded PRNG, so observed codes reveal nothing about the next
//! one. Uniqueness is not checked here; the link store's unique index
//! owns that invariant.

use std::iter;

/// 62-symbol alphanumeric alphabet, 62^6 ≈ 5.7e10 codes at the default length
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Generate a fixed-length, URL-safe candidate code.
pub fn generate_code(length: usize) -> String {
    iter::repeat_with(|| ALPHABET[rand::random_range(0..ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Route-level guard for inbound codes. Rejects anything that could not
/// have been produced by `generate_code` before it reaches the store.
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= 64 && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_match_length_and_alphabet() {
        for length in [1, 6, 12, 32] {
            let code = generate_code(length);
            assert_eq!(code.len(), length);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn generated_codes_pass_route_guard() {
        for _ in 0..100 {
            assert!(is_valid_short_code(&generate_code(DEFAULT_CODE_LENGTH)));
        }
    }

    #[test]
    fn consecutive_codes_differ() {
        // 62^6 space makes an accidental repeat across a handful of
        // draws vanishingly unlikely; a repeat here means a broken RNG.
        let codes: Vec<String> = (0..10).map(|_| generate_code(DEFAULT_CODE_LENGTH)).collect();
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn route_guard_rejects_junk() {
        assert!(!is_valid_short_code(""));
        assert!(!is_valid_short_code("abc/def"));
        assert!(!is_valid_short_code("abc def"));
        assert!(!is_valid_short_code("héllo"));
        assert!(!is_valid_short_code(&"a".repeat(65)));
        assert!(is_valid_short_code("aB3xYz"));
    }
}
