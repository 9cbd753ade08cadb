//! Version tokens for stored content.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `bytes`.
///
/// Callers pass the exact text that is (or will be) stored, so equal tokens
/// always mean byte-identical content.
pub fn content_version(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_has_stable_token() {
        assert_eq!(
            content_version(b"{}"),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn token_tracks_exact_bytes() {
        let compact = content_version(br#"{"notes":"hello"}"#);
        assert_eq!(compact.len(), 64);
        assert!(compact.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        assert_ne!(compact, content_version(br#"{"notes": "hello"}"#));
    }
}
