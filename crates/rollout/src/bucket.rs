use sha2::{Digest, Sha256};

/// Maps an identifier to a stable bucket in `[0, 100)`.
///
/// The resolver takes the bucketer as an injected strategy so tests can pin
/// buckets and the algorithm can change without touching the policy code.
#[cfg_attr(test, mockall::automock)]
pub trait Bucketer: Send + Sync {
    fn bucket(&self, identifier: &str) -> u8;
}

/// Production bucketer: SHA-256 of the identifier, big-endian u32 from the
/// first four digest bytes, reduced modulo 100. No salt, no randomness; the
/// same identifier lands in the same bucket forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Bucketer;

impl Bucketer for Sha256Bucketer {
    fn bucket(&self, identifier: &str) -> u8 {
        let digest = Sha256::digest(identifier.as_bytes());
        let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        (head % 100) as u8
    }
}

/// Rollout membership. Anonymous callers (no identifier, or an empty one)
/// are only covered by a full 100% rollout; partial rollouts never include
/// them.
pub fn in_rollout(bucketer: &dyn Bucketer, identifier: Option<&str>, percent: i32) -> bool {
    match identifier {
        None | Some("") => percent >= 100,
        Some(id) => i32::from(bucketer.bucket(id)) < percent,
    }
}
