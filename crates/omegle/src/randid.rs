//! Random client tokens for spy-mode starts
//!
//! The service expects a short token made of characters that cannot be
//! misread for one another (no `0`/`O`, `1`/`I`).

use rand::Rng;

/// Characters a random id is drawn from.
pub const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Length of a random id.
pub const LEN: usize = 8;

/// Generate a fresh random id.
pub fn random_id() -> String {
    let mut rng = rand::thread_rng();
    (0..LEN)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}
