//! Age key wrapping.
//!
//! Wraps envelope keys for x25519 recipients using the age format with
//! ASCII armor, and manages the identity files that unwrap them.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use ::age::x25519;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use super::KeyWrap;
use crate::error::{CipherError, Result};

const PUBLIC_KEY_COMMENT: &str = "# public key:";
const RECIPIENT_PREFIX: &str = "age1";

/// Age-based key wrapping using x25519 keys.
pub struct Age;

impl KeyWrap for Age {
    type Recipient = x25519::Recipient;
    type Identity = x25519::Identity;

    fn name(&self) -> &'static str {
        "age"
    }

    fn wrap_key(&self, key: &[u8], recipient: &x25519::Recipient) -> Result<String> {
        trace!(key_len = key.len(), "wrapping key");

        let encryptor =
            age::Encryptor::with_recipients(std::iter::once(recipient as &dyn age::Recipient))
                .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        let mut wrapped = Vec::new();
        let mut writer = encryptor
            .wrap_output(age::armor::ArmoredWriter::wrap_output(
                &mut wrapped,
                age::armor::Format::AsciiArmor,
            )?)
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        writer.write_all(key)?;
        let armored = writer
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
        armored
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(format!("armor: {}", e)))?;

        String::from_utf8(wrapped)
            .map_err(|e| CipherError::EncryptionFailed(format!("UTF-8 error: {}", e)).into())
    }

    fn unwrap_key(
        &self,
        wrapped: &str,
        identity: &x25519::Identity,
    ) -> Result<Zeroizing<Vec<u8>>> {
        trace!(wrapped_len = wrapped.len(), "unwrapping key");

        let reader = age::armor::ArmoredReader::new(wrapped.as_bytes());
        let decryptor = age::Decryptor::new(reader)
            .map_err(|e| CipherError::DecryptionFailed(format!("{}", e)))?;

        let mut key = Zeroizing::new(Vec::new());
        let mut reader = decryptor
            .decrypt(std::iter::once(identity as &dyn age::Identity))
            .map_err(|e| CipherError::DecryptionFailed(format!("{}", e)))?;

        reader.read_to_end(&mut key)?;
        Ok(key)
    }
}

/// Parse a public key string into an age recipient.
///
/// # Errors
///
/// Returns `CipherError::InvalidPublicKey` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.trim()
        .parse::<x25519::Recipient>()
        .map_err(|_| CipherError::InvalidPublicKey(key.trim().to_string()).into())
}

/// Resolve a recipient given inline (`age1...`) or as a file path.
///
/// Files may hold a bare recipient line, or be an identity file carrying
/// a `# public key: age1...` comment as written by `hoard keygen` and
/// `age-keygen`.
///
/// # Errors
///
/// Returns `CipherError::InvalidPublicKey` if no recipient can be found.
pub fn load_recipient(value: &str) -> Result<x25519::Recipient> {
    let value = value.trim();
    if value.starts_with(RECIPIENT_PREFIX) {
        return parse_recipient(value);
    }

    let path = Path::new(value);
    debug!(path = %path.display(), "reading recipient file");
    let contents = fs::read_to_string(path)
        .map_err(|e| CipherError::InvalidPublicKey(format!("{}: {}", path.display(), e)))?;

    let line = contents.lines().map(str::trim).find_map(|line| {
        if let Some(key) = line.strip_prefix(PUBLIC_KEY_COMMENT) {
            Some(key.trim())
        } else if line.is_empty() || line.starts_with('#') {
            None
        } else {
            Some(line)
        }
    });

    match line {
        Some(key) => parse_recipient(key),
        None => Err(CipherError::InvalidPublicKey(format!(
            "{}: no recipient found",
            path.display()
        ))
        .into()),
    }
}

/// Generate an identity, write it to `path` with owner-only permissions,
/// and return its recipient.
///
/// # Errors
///
/// Returns an io error if the file cannot be written.
pub fn generate_identity(path: &Path) -> Result<x25519::Recipient> {
    use age::secrecy::ExposeSecret;

    let identity = x25519::Identity::generate();
    let recipient = identity.to_public();

    let secret = identity.to_string();
    let contents = Zeroizing::new(format!(
        "{} {}\n{}\n",
        PUBLIC_KEY_COMMENT,
        recipient,
        secret.expose_secret()
    ));
    fs::write(path, contents.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    debug!(path = %path.display(), "identity written");
    Ok(recipient)
}

/// Load an identity file (the `AGE-SECRET-KEY-...` line; comments ignored).
///
/// # Errors
///
/// Returns `CipherError::InvalidIdentity` if the file holds no valid key.
pub fn load_identity(path: &Path) -> Result<x25519::Identity> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mode = metadata.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                warn!(
                    path = %path.display(),
                    mode = %format!("{:o}", mode),
                    "identity file is readable by others, run: chmod 600"
                );
            }
        }
    }

    let contents = Zeroizing::new(fs::read_to_string(path)?);
    let line = contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or_else(|| CipherError::InvalidIdentity(format!("{}: empty", path.display())))?;

    line.parse::<x25519::Identity>()
        .map_err(|e: &str| CipherError::InvalidIdentity(e.to_string()).into())
}
