//! Subscriber token generation

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Generate a URL-safe random token from `length` bytes of entropy.
///
/// Tokens end up in playlist query strings, so the alphabet must survive
/// URLs without percent-encoding.
pub fn generate_token(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe() {
        let token = generate_token(32);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(32), generate_token(32));
    }

    #[test]
    fn token_length_scales_with_entropy() {
        // 32 bytes -> ceil(32 * 4 / 3) = 43 base64 chars without padding
        assert_eq!(generate_token(32).len(), 43);
    }
}
