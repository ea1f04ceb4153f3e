//! The JWE protected header and the per-recipient `epk` (ephemeral public
//! key) encoding.
//!
//! Only the X25519 OKP encoding is supported; NIST-curve `x`/`y` pairs are
//! out of scope for this crate.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The recipient key agreement algorithm. Fixed to ECDH-ES + AES Key Wrap.
///
/// Wire documents carry `alg` as a plain string (see [`RecipientHeader`]) so
/// that an unrecognized value can be reported as
/// [`Error::UnsupportedAlgorithm`] rather than failing deserialization
/// outright; [`KeyAgreementAlgorithm::parse`] does that matching explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAgreementAlgorithm {
    /// `ECDH-ES+A256KW`
    EcdhEsA256Kw,
}

impl KeyAgreementAlgorithm {
    /// The wire string for this algorithm.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAgreementAlgorithm::EcdhEsA256Kw => "ECDH-ES+A256KW",
        }
    }

    /// Matches a wire `alg` string, returning `UnsupportedAlgorithm` for
    /// anything else.
    pub fn parse(alg: &str) -> Result<Self> {
        match alg {
            "ECDH-ES+A256KW" => Ok(KeyAgreementAlgorithm::EcdhEsA256Kw),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// The content encryption algorithm named in the document's protected
/// header.
///
/// Like [`KeyAgreementAlgorithm`], the wire `enc` field is a plain string
/// (see [`ProtectedHeader`]); [`ContentEncryptionAlgorithm::parse`] does the
/// explicit matching so an unknown value surfaces as
/// [`Error::UnsupportedAlgorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncryptionAlgorithm {
    /// XChaCha20-Poly1305, the "recommended" profile.
    C20P,
    /// AES-256-GCM, the "fips" profile.
    A256Gcm,
}

impl ContentEncryptionAlgorithm {
    /// Length in bytes of the nonce/IV this algorithm requires.
    pub fn iv_len(self) -> usize {
        match self {
            ContentEncryptionAlgorithm::C20P => 24,
            ContentEncryptionAlgorithm::A256Gcm => 12,
        }
    }

    /// The wire string for this algorithm.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentEncryptionAlgorithm::C20P => "C20P",
            ContentEncryptionAlgorithm::A256Gcm => "A256GCM",
        }
    }

    /// Matches a wire `enc` string, returning `UnsupportedAlgorithm` for
    /// anything else.
    pub fn parse(enc: &str) -> Result<Self> {
        match enc {
            "C20P" => Ok(ContentEncryptionAlgorithm::C20P),
            "A256GCM" => Ok(ContentEncryptionAlgorithm::A256Gcm),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// The JWE protected header: `{"enc": <alg>}`, serialized once and carried
/// verbatim as the AAD input — never re-serialized after construction.
///
/// `enc` is a plain string on the wire, not the typed
/// [`ContentEncryptionAlgorithm`]: an unrecognized value must deserialize
/// successfully and be reported as `UnsupportedAlgorithm` by the caller
/// (via [`ContentEncryptionAlgorithm::parse`]), not fail as a malformed
/// document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedHeader {
    /// The content encryption algorithm, as named on the wire.
    pub enc: String,
}

/// An ephemeral X25519 public key in JWK `OKP` form, embedded in each
/// recipient's header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemeralPublicKey {
    /// Always `"OKP"`.
    pub kty: String,
    /// Always `"X25519"`.
    pub crv: String,
    /// Base64url-encoded 32-byte public key.
    pub x: String,
}

impl EphemeralPublicKey {
    /// Builds the JWK encoding of a raw 32-byte X25519 public key.
    pub fn new(public_key: &[u8; 32]) -> Self {
        Self {
            kty: "OKP".to_string(),
            crv: "X25519".to_string(),
            x: URL_SAFE_NO_PAD.encode(public_key),
        }
    }

    /// Decodes back to the raw 32-byte public key, validating `kty`/`crv`
    /// and the decoded length.
    pub fn raw_public_key(&self) -> Result<[u8; 32]> {
        if self.kty != "OKP" || self.crv != "X25519" {
            return Err(Error::MalformedDocument(format!(
                "unsupported epk kty/crv: {}/{}",
                self.kty, self.crv
            )));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(&self.x)
            .map_err(|e| Error::MalformedDocument(format!("invalid epk.x: {e}")))?;

        bytes
            .try_into()
            .map_err(|_| Error::MalformedDocument("epk.x must decode to 32 bytes".into()))
    }
}

/// A recipient's header: which key it targets, the algorithm, and the
/// ephemeral public key used to derive its key-wrapping key.
///
/// `alg` is a plain string on the wire, not the typed
/// [`KeyAgreementAlgorithm`] — see [`ProtectedHeader`] for why, and
/// [`KeyAgreementAlgorithm::parse`] for the explicit match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientHeader {
    /// Identifier of the recipient's static key agreement key.
    pub kid: String,
    /// Named `"ECDH-ES+A256KW"` for a supported recipient.
    pub alg: String,
    /// The sender's ephemeral public key for this recipient.
    pub epk: EphemeralPublicKey,
}
