//! Coupon code generation.

use rand::{Rng, rngs::OsRng, seq::SliceRandom};

/// Prefix shared by every reward coupon code.
pub(crate) const REWARD_CODE_PREFIX: &str = "GIFT";

const REWARD_CODE_SUFFIX_LEN: usize = 8;

const REWARD_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a reward code from the operating system's random source.
pub(crate) fn generate_reward_code() -> String {
    generate_reward_code_with(&mut OsRng)
}

pub(crate) fn generate_reward_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(REWARD_CODE_PREFIX.len() + REWARD_CODE_SUFFIX_LEN);

    code.push_str(REWARD_CODE_PREFIX);

    for _ in 0..REWARD_CODE_SUFFIX_LEN {
        if let Some(byte) = REWARD_CODE_ALPHABET.choose(rng) {
            code.push(char::from(*byte));
        }
    }

    code
}
