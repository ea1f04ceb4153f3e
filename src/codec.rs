//! The JWE general-JSON-serialization wire format: construction, parsing,
//! and base64url encoding discipline.
//!
//! The additional authenticated data bound into content encryption is
//! always the exact `protected` base64url string's ASCII bytes — never a
//! re-serialization of the parsed header. [`JweDocument::protected`] is kept
//! verbatim for this reason from the moment it is first produced or parsed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::header::{ContentEncryptionAlgorithm, ProtectedHeader, RecipientHeader};

/// One recipient entry on the wire: its header and its wrapped CEK.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientEntry {
    /// The recipient's header (kid, alg, epk).
    pub header: RecipientHeader,
    /// Base64url-encoded AES Key Wrap output (40 bytes decoded).
    pub encrypted_key: String,
}

/// A complete JWE document in the general JSON serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JweDocument {
    /// Base64url(UTF-8(`{"enc": <enc>}`)), carried verbatim; this exact
    /// string is the AAD input, not a re-serialization of its contents.
    pub protected: String,
    /// One entry per recipient; never empty.
    pub recipients: Vec<RecipientEntry>,
    /// Base64url-encoded nonce/IV.
    pub iv: String,
    /// Base64url-encoded ciphertext.
    pub ciphertext: String,
    /// Base64url-encoded authentication tag.
    pub tag: String,
}

impl JweDocument {
    /// Builds the protected header string and the document shell, given
    /// already-sealed content and assembled recipients. The returned
    /// `(document, aad)` pair's `aad` is exactly `document.protected`'s
    /// ASCII bytes.
    pub fn assemble(
        enc: ContentEncryptionAlgorithm,
        recipients: Vec<RecipientEntry>,
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Self> {
        if recipients.is_empty() {
            return Err(Error::InvalidArgument("recipients must not be empty".into()));
        }

        let protected_json = serde_json::to_string(&ProtectedHeader {
            enc: enc.as_str().to_string(),
        })?;
        let protected = URL_SAFE_NO_PAD.encode(protected_json.as_bytes());

        Ok(Self {
            protected,
            recipients,
            iv: URL_SAFE_NO_PAD.encode(iv),
            ciphertext: URL_SAFE_NO_PAD.encode(ciphertext),
            tag: URL_SAFE_NO_PAD.encode(tag),
        })
    }

    /// The additional authenticated data bound into content encryption:
    /// the ASCII bytes of the `protected` string exactly as it appears on
    /// the wire.
    pub fn aad(&self) -> &[u8] {
        self.protected.as_bytes()
    }

    /// Parses and validates the protected header, returning the declared
    /// `enc` algorithm. An `enc` value outside the supported set is
    /// reported as `UnsupportedAlgorithm`, not `MalformedDocument`: the
    /// header itself parsed fine, it just names an algorithm this crate
    /// does not implement.
    pub fn content_encryption_algorithm(&self) -> Result<ContentEncryptionAlgorithm> {
        let bytes = decode_b64(&self.protected)?;
        let header: ProtectedHeader = serde_json::from_slice(&bytes)?;
        ContentEncryptionAlgorithm::parse(&header.enc)
    }

    /// Decodes and length-checks the IV against the document's declared
    /// `enc` algorithm.
    pub fn decode_iv(&self, enc: ContentEncryptionAlgorithm) -> Result<Vec<u8>> {
        let iv = decode_b64(&self.iv)?;
        if iv.len() != enc.iv_len() {
            return Err(Error::MalformedDocument(format!(
                "iv length {} does not match {:?}'s required {}",
                iv.len(),
                enc,
                enc.iv_len()
            )));
        }
        Ok(iv)
    }

    /// Decodes the ciphertext.
    pub fn decode_ciphertext(&self) -> Result<Vec<u8>> {
        decode_b64(&self.ciphertext)
    }

    /// Decodes and length-checks the authentication tag (always 16 bytes).
    pub fn decode_tag(&self) -> Result<Vec<u8>> {
        let tag = decode_b64(&self.tag)?;
        if tag.len() != 16 {
            return Err(Error::MalformedDocument("tag must decode to 16 bytes".into()));
        }
        Ok(tag)
    }

    /// Serializes the document to its wire JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a JWE document from its wire JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(json)?;
        if doc.recipients.is_empty() {
            return Err(Error::MalformedDocument("recipients must not be empty".into()));
        }
        Ok(doc)
    }
}

/// Decodes unpadded base64url, rejecting padded input per RFC 7515.
fn decode_b64(s: &str) -> Result<Vec<u8>> {
    if s.contains('=') {
        return Err(Error::MalformedDocument("base64url must not be padded".into()));
    }
    Ok(URL_SAFE_NO_PAD.decode(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{EphemeralPublicKey, KeyAgreementAlgorithm};

    fn sample_recipient() -> RecipientEntry {
        RecipientEntry {
            header: RecipientHeader {
                kid: "did:example:bob#key-1".to_string(),
                alg: KeyAgreementAlgorithm::EcdhEsA256Kw.as_str().to_string(),
                epk: EphemeralPublicKey::new(&[1u8; 32]),
            },
            encrypted_key: URL_SAFE_NO_PAD.encode([2u8; 40]),
        }
    }

    #[test]
    fn assemble_and_parse_round_trip() {
        let doc = JweDocument::assemble(
            ContentEncryptionAlgorithm::C20P,
            vec![sample_recipient()],
            &[0u8; 24],
            b"ciphertext-bytes",
            &[9u8; 16],
        )
        .unwrap();

        let json = doc.to_json().unwrap();
        let parsed = JweDocument::from_json(&json).unwrap();

        assert_eq!(parsed.protected, doc.protected);
        assert_eq!(parsed.content_encryption_algorithm().unwrap(), ContentEncryptionAlgorithm::C20P);
        assert_eq!(parsed.decode_iv(ContentEncryptionAlgorithm::C20P).unwrap(), vec![0u8; 24]);
        assert_eq!(parsed.decode_ciphertext().unwrap(), b"ciphertext-bytes");
        assert_eq!(parsed.decode_tag().unwrap(), vec![9u8; 16]);
    }

    #[test]
    fn assemble_rejects_empty_recipients() {
        let result = JweDocument::assemble(
            ContentEncryptionAlgorithm::A256Gcm,
            vec![],
            &[0u8; 12],
            b"ct",
            &[0u8; 16],
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn aad_is_exact_protected_bytes() {
        let doc = JweDocument::assemble(
            ContentEncryptionAlgorithm::A256Gcm,
            vec![sample_recipient()],
            &[0u8; 12],
            b"ct",
            &[0u8; 16],
        )
        .unwrap();
        assert_eq!(doc.aad(), doc.protected.as_bytes());
    }

    #[test]
    fn rejects_padded_base64url() {
        assert!(decode_b64("abcd=").is_err());
    }

    #[test]
    fn rejects_iv_length_mismatch() {
        let doc = JweDocument::assemble(
            ContentEncryptionAlgorithm::A256Gcm,
            vec![sample_recipient()],
            &[0u8; 12],
            b"ct",
            &[0u8; 16],
        )
        .unwrap();
        assert!(doc.decode_iv(ContentEncryptionAlgorithm::C20P).is_err());
    }

    #[test]
    fn rejects_unsupported_enc() {
        let protected = URL_SAFE_NO_PAD.encode(r#"{"enc":"A128GCM"}"#);
        let doc = JweDocument {
            protected,
            recipients: vec![sample_recipient()],
            iv: URL_SAFE_NO_PAD.encode([0u8; 12]),
            ciphertext: URL_SAFE_NO_PAD.encode(b"ct"),
            tag: URL_SAFE_NO_PAD.encode([0u8; 16]),
        };
        assert!(matches!(
            doc.content_encryption_algorithm(),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
