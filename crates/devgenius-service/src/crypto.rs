//! Password hashing and signature helpers.
//!
//! Passwords are stored as `hex(salt):hex(key)` where `key` is a 64-byte
//! scrypt derivation. Payment callbacks are signed with HMAC-SHA256.

use hmac::{Hmac, Mac};
use rand::RngCore;
use scrypt::{scrypt, Params};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// scrypt cost: N = 2^14, r = 8, p = 1.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const KEY_LEN: usize = 64;
const SALT_LEN: usize = 16;

/// Errors from password hashing.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The stored hash is not `salt:key` hex.
    #[error("malformed password hash")]
    MalformedHash,

    /// The key derivation failed.
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// The blocking hashing task panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns `CryptoError::Derivation` if scrypt rejects its parameters.
pub fn hash_password(password: &str) -> Result<String, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);

    let key = derive_key(password, &salt_hex)?;
    Ok(format!("{salt_hex}:{}", hex::encode(key)))
}

/// Check a password against a hash produced by [`hash_password`].
///
/// # Errors
///
/// Returns `CryptoError::MalformedHash` if `hash` cannot be parsed.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, CryptoError> {
    let (salt, key_hex) = hash.split_once(':').ok_or(CryptoError::MalformedHash)?;
    let expected = hex::decode(key_hex).map_err(|_| CryptoError::MalformedHash)?;

    let derived = derive_key(password, salt)?;
    Ok(constant_time_eq(&derived, &expected))
}

/// [`hash_password`] on the blocking thread pool.
///
/// # Errors
///
/// As [`hash_password`], or `CryptoError::Task` if the task fails.
pub async fn hash_password_blocking(password: String) -> Result<String, CryptoError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CryptoError::Task(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool.
///
/// # Errors
///
/// As [`verify_password`], or `CryptoError::Task` if the task fails.
pub async fn verify_password_blocking(
    hash: String,
    password: String,
) -> Result<bool, CryptoError> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| CryptoError::Task(e.to_string()))?
}

fn derive_key(password: &str, salt: &str) -> Result<Vec<u8>, CryptoError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| CryptoError::Derivation(e.to_string()))?;

    let mut output = vec![0u8; KEY_LEN];
    scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut output)
        .map_err(|e| CryptoError::Derivation(e.to_string()))?;

    Ok(output)
}

/// Compute HMAC-SHA256 and return the hex-encoded result.
///
/// # Panics
///
/// Never in practice: HMAC accepts keys of any size.
#[must_use]
pub fn hmac_sha256_hex(secret: &str, message: &[u8]) -> String {
    // HMAC-SHA256 accepts keys of any size per RFC 2104.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time byte comparison.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_has_salt_and_key() {
        let hash = hash_password("correct horse").unwrap();
        let (salt, key) = hash.split_once(':').unwrap();
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert_eq!(key.len(), KEY_LEN * 2);
    }

    #[test]
    fn verify_accepts_only_the_right_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_leaves_the_runtime_free() {
        let ticker = tokio::spawn(async {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
        });

        let hash = hash_password_blocking("correct horse".into()).await.unwrap();
        assert!(ticker.is_finished());

        let ticker = tokio::spawn(tokio::task::yield_now());
        assert!(verify_password_blocking(hash, "correct horse".into()).await.unwrap());
        assert!(ticker.is_finished());
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash_password("pw123456").unwrap(), hash_password("pw123456").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("no-colon-here", "pw"),
            Err(CryptoError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("abcd:not-hex", "pw"),
            Err(CryptoError::MalformedHash)
        ));
    }

    #[test]
    fn hmac_sha256_known_vector() {
        // RFC 4231 test case 2.
        assert_eq!(
            hmac_sha256_hex("Jefe", b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn constant_time_eq_compares_bytes() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
