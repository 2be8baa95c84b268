//! Hybrid encryption envelope.
//!
//! A fresh 32-byte key encrypts the payload with XChaCha20-Poly1305; the
//! key itself is wrapped for an asymmetric recipient. The two artifacts
//! only recover the payload together.
//!
//! Persisted layout:
//!
//! ```text
//! <base64(nonce || ciphertext || tag)>
//! -----BEGIN AGE ENCRYPTED FILE-----
//! <wrapped key>
//! -----END AGE ENCRYPTED FILE-----
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use tracing::trace;
use zeroize::Zeroizing;

use super::KeyWrap;
use crate::error::{CipherError, Result};

/// Payload key size in bytes.
pub const KEY_SIZE: usize = 32;

/// XChaCha20 nonce size in bytes.
pub const NONCE_SIZE: usize = 24;

const ARMOR_BEGIN: &str = "-----BEGIN AGE ENCRYPTED FILE-----";

/// Sealed export: encrypted payload plus the wrapped key that opens it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Base64 of nonce ‖ ciphertext ‖ tag.
    pub ciphertext: String,
    /// Armored key wrapped for the recipient.
    pub wrapped_key: String,
}

impl Envelope {
    /// Seal `plaintext` for `recipient`.
    ///
    /// Every call draws a new key and nonce, so sealing the same plaintext
    /// twice yields unrelated envelopes.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if encryption or key
    /// wrapping fails. Nothing is returned in that case.
    pub fn seal<W: KeyWrap>(
        wrapper: &W,
        recipient: &W::Recipient,
        plaintext: &[u8],
    ) -> Result<Self> {
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        key.copy_from_slice(&XChaCha20Poly1305::generate_key(&mut OsRng));

        let cipher = XChaCha20Poly1305::new_from_slice(key.as_ref())
            .map_err(|e| CipherError::EncryptionFailed(format!("cipher init: {}", e)))?;
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| CipherError::EncryptionFailed(format!("payload: {}", e)))?;

        let mut payload = Vec::with_capacity(NONCE_SIZE + sealed.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&sealed);

        let wrapped_key = wrapper.wrap_key(key.as_ref(), recipient)?;

        trace!(
            wrapper = wrapper.name(),
            plaintext_len = plaintext.len(),
            ciphertext_len = payload.len(),
            "sealed envelope"
        );

        Ok(Self {
            ciphertext: STANDARD.encode(payload),
            wrapped_key,
        })
    }

    /// Recover the plaintext with the recipient's identity.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` if the key cannot be
    /// unwrapped or the payload fails authentication.
    pub fn open<W: KeyWrap>(&self, wrapper: &W, identity: &W::Identity) -> Result<Vec<u8>> {
        let key = wrapper.unwrap_key(&self.wrapped_key, identity)?;
        if key.len() != KEY_SIZE {
            return Err(CipherError::DecryptionFailed(format!(
                "unwrapped key is {} bytes, expected {}",
                key.len(),
                KEY_SIZE
            ))
            .into());
        }

        let payload = STANDARD
            .decode(self.ciphertext.trim())
            .map_err(|e| CipherError::MalformedEnvelope(format!("invalid base64: {}", e)))?;
        if payload.len() < NONCE_SIZE {
            return Err(CipherError::MalformedEnvelope("ciphertext too short".to_string()).into());
        }
        let (nonce, sealed) = payload.split_at(NONCE_SIZE);

        let cipher = XChaCha20Poly1305::new_from_slice(&key)
            .map_err(|e| CipherError::DecryptionFailed(format!("cipher init: {}", e)))?;
        cipher
            .decrypt(XNonce::from_slice(nonce), sealed)
            .map_err(|_| {
                CipherError::DecryptionFailed("payload authentication failed".to_string()).into()
            })
    }

    /// Text form: ciphertext line, then the wrapped key block.
    pub fn render(&self) -> String {
        format!("{}\n{}\n", self.ciphertext, self.wrapped_key.trim_end())
    }

    /// Parse the text form produced by [`Envelope::render`].
    ///
    /// # Errors
    ///
    /// Returns `CipherError::MalformedEnvelope` if either block is missing.
    pub fn parse(text: &str) -> Result<Self> {
        let (ciphertext, rest) = text
            .trim_start()
            .split_once('\n')
            .ok_or_else(|| CipherError::MalformedEnvelope("missing wrapped key".to_string()))?;

        let ciphertext = ciphertext.trim();
        let wrapped_key = rest.trim();
        if ciphertext.is_empty() {
            return Err(CipherError::MalformedEnvelope("missing ciphertext".to_string()).into());
        }
        if !wrapped_key.starts_with(ARMOR_BEGIN) {
            return Err(CipherError::MalformedEnvelope("missing wrapped key".to_string()).into());
        }

        Ok(Self {
            ciphertext: ciphertext.to_string(),
            wrapped_key: format!("{}\n", wrapped_key),
        })
    }
}
