// HMAC-SHA256 signing and verification for uplinked commands

use super::digest::compare_digest;
use crate::core::constants::COUNTER_SEPARATOR;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies (message, counter) pairs with a shared secret.
///
/// Holds no mutable state: one instance can serve any number of callers, and
/// instances with different keys (ground station, flight, tests) coexist.
/// Counter monotonicity is not checked here; see `command::replay`.
#[derive(Clone)]
pub struct HmacAuthenticator {
    mac: HmacSha256,
}

impl HmacAuthenticator {
    pub fn new(secret_key: &str) -> Self {
        let mac = HmacSha256::new_from_slice(secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        Self { mac }
    }

    /// Signature over `message` and `counter`, as 64 lowercase hex characters
    pub fn generate_hmac(&self, message: &str, counter: u64) -> String {
        let mut mac = self.mac.clone();
        mac.update(signing_input(message, counter).as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        tracing::trace!(counter, "generated command signature");
        signature
    }

    /// True only when `candidate` is exactly the signature for this message and counter
    pub fn verify_hmac(&self, message: &str, counter: u64, candidate: &str) -> bool {
        let expected = self.generate_hmac(message, counter);
        let valid = compare_digest(&expected, candidate);
        tracing::trace!(counter, valid, "verified command signature");
        valid
    }

    /// Constant-time equality over two text values
    pub fn compare_digest(a: &str, b: &str) -> bool {
        compare_digest(a, b)
    }
}

impl fmt::Debug for HmacAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacAuthenticator").finish_non_exhaustive()
    }
}

/// Exact bytes that get signed: `<message>|<counter in decimal>`
pub fn signing_input(message: &str, counter: u64) -> String {
    format!("{}{}{}", message, COUNTER_SEPARATOR, counter)
}
