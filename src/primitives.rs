//! Low-level cryptographic primitives: randomness, hashing, AEAD, and AES key wrap.
//!
//! Nothing in this module knows about JWE document shape or headers; it only
//! operates on byte slices and enforces length invariants before touching a
//! cipher.
//!
//! # Security
//!
//! - All randomness comes from the OS CSPRNG ([`rand_core::OsRng`]).
//! - AEAD tag verification is handled by the underlying RustCrypto crates,
//!   which compare in constant time.
//! - `aes_kw_unwrap`'s integrity check failure and any AEAD open failure are
//!   both reported as [`Error::DecryptionFailed`] with no further detail.

use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit, Payload},
    Aes256Gcm,
};
use aes_kw::KekAes256;
use chacha20poly1305::XChaCha20Poly1305;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Fills a buffer of the given size with CSPRNG output.
pub fn random(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encrypts with AES-256-GCM. `key` must be 32 bytes, `nonce` 12 bytes.
pub fn aes256gcm_seal(key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    if key.len() != 32 {
        return Err(Error::InvalidArgument("A256GCM key must be 32 bytes".into()));
    }
    if nonce.len() != 12 {
        return Err(Error::InvalidArgument("A256GCM nonce must be 12 bytes".into()));
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| Error::InvalidArgument(e.to_string()))?;
    let nonce = GenericArray::from_slice(nonce);
    let sealed = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad })
        .map_err(|_| Error::DecryptionFailed)?;

    let tag_at = sealed.len() - 16;
    Ok((sealed[..tag_at].to_vec(), sealed[tag_at..].to_vec()))
}

/// Decrypts with AES-256-GCM. Returns `DecryptionFailed` on any failure,
/// including length mismatches, to keep the failure surface uniform.
pub fn aes256gcm_open(key: &[u8], nonce: &[u8], aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Vec<u8>> {
    if key.len() != 32 || nonce.len() != 12 || tag.len() != 16 {
        return Err(Error::DecryptionFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| Error::DecryptionFailed)?;
    let nonce = GenericArray::from_slice(nonce);
    let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    cipher
        .decrypt(nonce, Payload { msg: &combined, aad })
        .map_err(|_| Error::DecryptionFailed)
}

/// Encrypts with XChaCha20-Poly1305. `key` must be 32 bytes, `nonce` 24 bytes.
pub fn xchacha20poly1305_seal(key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    if key.len() != 32 {
        return Err(Error::InvalidArgument("C20P key must be 32 bytes".into()));
    }
    if nonce.len() != 24 {
        return Err(Error::InvalidArgument("C20P nonce must be 24 bytes".into()));
    }

    let cipher =
        XChaCha20Poly1305::new_from_slice(key).map_err(|e| Error::InvalidArgument(e.to_string()))?;
    let nonce = GenericArray::from_slice(nonce);
    let sealed = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad })
        .map_err(|_| Error::DecryptionFailed)?;

    let tag_at = sealed.len() - 16;
    Ok((sealed[..tag_at].to_vec(), sealed[tag_at..].to_vec()))
}

/// Decrypts with XChaCha20-Poly1305. Returns `DecryptionFailed` on any
/// failure, including length mismatches.
pub fn xchacha20poly1305_open(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>> {
    if key.len() != 32 || nonce.len() != 24 || tag.len() != 16 {
        return Err(Error::DecryptionFailed);
    }

    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| Error::DecryptionFailed)?;
    let nonce = GenericArray::from_slice(nonce);
    let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    cipher
        .decrypt(nonce, Payload { msg: &combined, aad })
        .map_err(|_| Error::DecryptionFailed)
}

/// Wraps a 32-byte CEK under a 32-byte KWK using plain (RFC 3394) AES Key
/// Wrap, producing a 40-byte wrapped key. No padding: RFC 5649 is not used.
pub fn aes_kw_wrap(kwk: &[u8], cek: &[u8]) -> Result<Vec<u8>> {
    if kwk.len() != 32 {
        return Err(Error::InvalidArgument("key wrapping key must be 32 bytes".into()));
    }
    if cek.len() != 32 {
        return Err(Error::InvalidArgument("content encryption key must be 32 bytes".into()));
    }

    let kek = KekAes256::from(kwk);
    kek.wrap_key(cek).map_err(|_| Error::InvalidArgument("key wrap failed".into()))
}

/// Unwraps a 40-byte wrapped key under a 32-byte KWK. Any integrity-check
/// failure is reported as `DecryptionFailed`, not distinguished from other
/// decryption failures.
pub fn aes_kw_unwrap(kwk: &[u8], wrapped: &[u8]) -> Result<Vec<u8>> {
    if kwk.len() != 32 || wrapped.len() != 40 {
        return Err(Error::DecryptionFailed);
    }

    let kek = KekAes256::from(kwk);
    kek.unwrap_key(wrapped).map_err(|_| Error::DecryptionFailed)
}
