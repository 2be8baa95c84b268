//! Export encryption.
//!
//! Exports are sealed in a hybrid [`Envelope`]: the payload is encrypted
//! with a one-off symmetric key, and only that key is encrypted for the
//! recipient's public key.
//!
//! ## Key Wrapping
//!
//! - **age**: Default. Wraps the key for an x25519 recipient (`age1...`).
//!
//! ## Adding a New Wrapper
//!
//! 1. Implement the `KeyWrap` trait
//! 2. Add the implementation in a new file (e.g., `kms.rs`, `gpg.rs`)
//! 3. Re-export from this module

use ::age::x25519;
use zeroize::Zeroizing;

use crate::error::Result;

mod age;
mod envelope;

pub use age::{generate_identity, load_identity, load_recipient, parse_recipient, Age};
pub use envelope::{Envelope, KEY_SIZE, NONCE_SIZE};

/// Asymmetric wrapping of envelope keys.
///
/// Recipients and identities are backend-specific:
/// - age: x25519 public key / x25519 identity
pub trait KeyWrap {
    /// Public half used to wrap.
    type Recipient;

    /// Private half used to unwrap.
    type Identity;

    /// Encrypt a symmetric key for `recipient`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if wrapping fails.
    fn wrap_key(&self, key: &[u8], recipient: &Self::Recipient) -> Result<String>;

    /// Recover a symmetric key with `identity`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` if the identity does not match.
    fn unwrap_key(&self, wrapped: &str, identity: &Self::Identity) -> Result<Zeroizing<Vec<u8>>>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

/// Seal `plaintext` for an age recipient.
///
/// Convenience wrapper around [`Envelope::seal`] with the [`Age`] wrapper.
pub fn seal(recipient: &x25519::Recipient, plaintext: &[u8]) -> Result<Envelope> {
    Envelope::seal(&Age, recipient, plaintext)
}

/// Open an envelope with an age identity.
pub fn open(envelope: &Envelope, identity: &x25519::Identity) -> Result<Vec<u8>> {
    envelope.open(&Age, identity)
}
