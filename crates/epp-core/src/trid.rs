//! Client transaction ID (clTRID) generation.
//!
//! Every EPP command carries a client transaction ID that the registry
//! echoes back. IDs have the shape `<prefix>-<unix-time>-<5 hex chars>`,
//! the hex part being the head of an MD5 digest of a random seed. Registries
//! cap the element length, so longer IDs keep only their last
//! [`MAX_TRID_LEN`] characters.

use chrono::Utc;

/// Maximum length of a client transaction ID.
pub const MAX_TRID_LEN: usize = 32;

/// Number of hex characters taken from the seed digest.
const SUFFIX_LEN: usize = 5;

/// Generates a fresh transaction ID using the current time and a random seed.
pub fn generate(prefix: &str) -> String {
    let seed: u32 = rand::random();
    build(prefix, Utc::now().timestamp(), seed)
}

/// Builds a transaction ID from explicit inputs.
pub fn build(prefix: &str, unix_time: i64, seed: u32) -> String {
    let id = format!("{}-{}-{}", prefix, unix_time, seed_suffix(seed));
    keep_tail(id, MAX_TRID_LEN)
}

/// Returns the hex suffix derived from `seed`.
pub fn seed_suffix(seed: u32) -> String {
    let digest = format!("{:x}", md5::compute(seed.to_string()));
    digest[..SUFFIX_LEN].to_string()
}

/// Generates a contact handle: `<prefix>-<5 hex chars>`.
pub fn handle(prefix: &str) -> String {
    format!("{}-{}", prefix, seed_suffix(rand::random()))
}

fn keep_tail(id: String, max: usize) -> String {
    let len = id.chars().count();
    if len <= max {
        return id;
    }
    id.chars().skip(len - max).collect()
}
