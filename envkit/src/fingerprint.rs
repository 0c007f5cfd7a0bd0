// Copyright (c) The Warren Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use sha2::{Digest, Sha256};
use std::fmt;

/// The number of hex characters from the full digest shown in `Display` and used for most
/// equality checks in diagnostics. The full 32-byte digest is always retained for actual
/// equality comparisons, so a collision within this prefix can never silently conflate two
/// distinct environments (§4.B).
const PRINTABLE_PREFIX_LEN: usize = 16;

/// A stable digest over the canonical form of an environment (§4.B).
///
/// Two environments that are equal as maps under their schemas' canonical forms always produce
/// equal fingerprints (§8, fingerprint canonicality); the converse holds in practice because the
/// full SHA-256 digest, not just the printable prefix, backs `Eq`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Computes the fingerprint of a pre-serialized canonical byte buffer.
    pub(crate) fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Fingerprint(out)
    }

    /// The full 32-byte digest.
    pub fn digest(&self) -> &[u8; 32] {
        &self.0
    }

    /// A short, printable hex prefix suitable for log lines and manifest diagnostics.
    pub fn short(&self) -> String {
        let mut s = String::with_capacity(PRINTABLE_PREFIX_LEN);
        for byte in self.0.iter().take(PRINTABLE_PREFIX_LEN / 2) {
            s.push_str(&format!("{:02x}", byte));
        }
        s
    }

    /// The full digest, hex-encoded.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}...)", self.short())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}
