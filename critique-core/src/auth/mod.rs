//! Credential primitives for the signup/token exchange.
//!
//! Confirmation codes are short-lived, single-use secrets dispatched out of
//! band at signup; only a keyed hash bound to the owning user is stored.
//! Access tokens are opaque random strings handed to the client; the server
//! keeps their SHA-256 digest so a database leak does not leak live bearer
//! credentials.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use critique_model::UserId;
use rand::{Rng, RngCore, distr::Alphanumeric};
use sha2::{Digest, Sha256};

/// Length of the emailed confirmation code.
pub const CONFIRMATION_CODE_LEN: usize = 24;

const ACCESS_TOKEN_BYTES: usize = 32;

pub fn generate_confirmation_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CONFIRMATION_CODE_LEN)
        .map(char::from)
        .collect()
}

/// Keyed digest of a confirmation code, bound to the user it was issued to so
/// a code captured for one account cannot be replayed against another.
pub fn hash_confirmation_code(key: &str, user_id: UserId, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(user_id.as_uuid().as_bytes());
    hasher.update(code.as_bytes());
    hex_digest(hasher)
}

pub fn generate_access_token() -> String {
    let mut bytes = [0u8; ACCESS_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Storage digest of an access token.
pub fn hash_access_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex_digest(hasher)
}

fn hex_digest(hasher: Sha256) -> String {
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
