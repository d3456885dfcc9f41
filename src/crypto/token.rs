use crate::error::{AppError, Result};
use base64::{Engine as _, engine::general_purpose};
use rand::{rngs::OsRng, TryRngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

/// The size of the session token in bytes.
pub const SESSION_TOKEN_SIZE: usize = 32;

/// Length of an encoded session token (base64url, no padding).
pub const ENCODED_TOKEN_LEN: usize = 43;

/// Generates a new random session token.
///
/// The bytes come straight from the operating system's CSPRNG. If the
/// source cannot be read the call fails; an empty or partial token is
/// never returned.
///
/// # Returns
///
/// A URL-safe base64-encoded session token.
pub fn generate_session_token() -> Result<Zeroizing<String>> {
    let mut bytes = [0u8; SESSION_TOKEN_SIZE];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::RandomSource(format!("Failed to generate session token: {}", e)))?;

    let token = Zeroizing::new(general_purpose::URL_SAFE_NO_PAD.encode(bytes));
    bytes.zeroize();
    Ok(token)
}

/// Draws and discards random bytes so that an unusable random source is
/// detected before any session is issued.
pub fn probe_random_source() -> Result<()> {
    let mut probe = [0u8; SESSION_TOKEN_SIZE];
    OsRng
        .try_fill_bytes(&mut probe)
        .map_err(|e| AppError::RandomSource(format!("Random source probe failed: {}", e)))?;
    probe.zeroize();
    Ok(())
}

/// Compares a presented token with the stored one in constant time.
///
/// Tokens of different length never match. Empty tokens never match either,
/// so a cleared credential cannot authenticate.
pub fn tokens_match(presented: &str, stored: &str) -> bool {
    if presented.is_empty() || stored.is_empty() {
        return false;
    }
    presented.as_bytes().ct_eq(stored.as_bytes()).into()
}
