//! Storage key generation.
//!
//! Keys have the form `{prefix}/{token}{extension}`. Uniqueness comes from entropy
//! width alone (256 bits from the operating system), never from checking for
//! existing objects.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use thiserror::Error;

/// Bytes of entropy drawn per token (256 bits).
pub const TOKEN_ENTROPY_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Secure entropy unavailable: {0}")]
    EntropyUnavailable(String),
}

/// Draw a fresh URL-safe, unpadded token from the OS CSPRNG.
///
/// There is deliberately no fallback RNG: failure to obtain entropy is returned
/// to the caller as [`KeyError::EntropyUnavailable`].
pub fn generate_token() -> Result<String, KeyError> {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| KeyError::EntropyUnavailable(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate a storage key `{prefix}/{token}{extension}`.
///
/// `extension` includes its leading dot (e.g. `.mp4`).
pub fn generate_storage_key(prefix: &str, extension: &str) -> Result<String, KeyError> {
    let token = generate_token()?;
    Ok(format!("{}/{}{}", prefix, token, extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_url_safe(token: &str) -> bool {
        token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    #[test]
    fn test_token_is_url_safe_and_unpadded() {
        let token = generate_token().unwrap();
        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(token.len(), 43);
        assert!(is_url_safe(&token));
        assert!(!token.contains('='));
    }

    #[test]
    fn test_key_shape() {
        let key = generate_storage_key("landscape", ".mp4").unwrap();
        let (prefix, rest) = key.split_once('/').unwrap();
        assert_eq!(prefix, "landscape");
        let token = rest.strip_suffix(".mp4").unwrap();
        assert!(is_url_safe(token));
        assert!(!key.contains(".."));
        assert!(!key.starts_with('/'));
    }

    #[test]
    fn test_keys_are_pairwise_distinct() {
        let keys: HashSet<String> = (0..10_000)
            .map(|_| generate_storage_key("portrait", ".mp4").unwrap())
            .collect();
        assert_eq!(keys.len(), 10_000);
    }
}
