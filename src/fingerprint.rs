use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Truncated hex length. 64 bits of digest is far beyond what a store of a
/// few thousand entries needs; this is not a security boundary.
const FINGERPRINT_LEN: usize = 16;

/// Dedupe identity of a candidate: the link alone is not enough, because two
/// unrelated source families could coincidentally serve the same URL. Scoping
/// by source label keeps those apart while still collapsing the same posting
/// returned for different search terms.
pub fn fingerprint(source_label: &str, url: &str, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_label.as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    hasher.update(b"|");
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        write!(hex, "{:02x}", byte).expect("writing to a String cannot fail");
    }
    hex
}
