use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// Random bytes per bearer or reset token (160 bits).
const TOKEN_BYTES: usize = 20;

/// Mints an opaque bearer token: 20 bytes from the OS RNG, hex encoded.
///
/// Tokens carry no claims. They mean something only while a matching
/// session (or recovery record) exists in the store.
pub fn issue_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A four-digit numeric one-time code.
pub fn generate_otp() -> String {
    OsRng.gen_range(1000..=9999).to_string()
}
