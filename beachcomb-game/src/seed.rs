//! Deterministic seed derivation for per-field RNG streams.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::constants::FIELD_STREAM_TAG;

/// Derive an independent stream seed from a user-visible seed and a domain tag.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        // HMAC accepts keys of any length.
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Seed for the `generation`-th field of a session.
#[must_use]
pub fn field_seed(session_seed: u64, generation: u64) -> u64 {
    let mut tag = FIELD_STREAM_TAG.to_vec();
    tag.extend_from_slice(&generation.to_le_bytes());
    derive_stream_seed(session_seed, &tag)
}

/// RNG for the `generation`-th field of a session.
#[must_use]
pub fn field_rng(session_seed: u64, generation: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(field_seed(session_seed, generation))
}

/// Fresh session seed drawn from the operating system's entropy source.
#[must_use]
pub fn entropy_seed() -> u64 {
    rand::random()
}
