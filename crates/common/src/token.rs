use rand::RngCore;

/// Random bytes behind a registration token (a user's collection id).
pub const REGISTRATION_TOKEN_BYTES: usize = 64;

/// Random bytes behind a share token.
pub const SHARE_TOKEN_BYTES: usize = 16;

/// Hex encoding of `len` bytes from the thread-local CSPRNG.
pub fn generate(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
