//! The public [`Cipher`] facade: `encrypt`/`decrypt` and their JSON-object
//! convenience wrappers.
//!
//! Each call runs the state machine `Init -> CekGenerated -> ContentSealed
//! -> RecipientsAssembled -> Emitted` (encrypt) or its inverse (decrypt).
//! Any step's failure aborts the whole call; no partial document is ever
//! returned, and the CEK is zeroised on every exit path.

use base64::Engine;
use tracing::{debug, instrument, warn};
use zeroize::Zeroize;

use crate::codec::JweDocument;
use crate::error::{Error, Result};
use crate::header::ContentEncryptionAlgorithm;
use crate::keys::{KeyAgreementKey, KeyResolver};
use crate::primitives::{
    aes256gcm_open, aes256gcm_seal, random, xchacha20poly1305_open, xchacha20poly1305_seal,
};
use crate::recipient::{assemble_recipient, unwrap_for_recipient, RecipientRequest};

/// Which fixed algorithm profile a [`Cipher`] uses for content encryption.
/// The key-wrapping algorithm (`ECDH-ES+A256KW`) is the same in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherProfile {
    /// XChaCha20-Poly1305, `enc: "C20P"`. The default: a wide nonce makes
    /// random generation safely collision-resistant without a counter.
    Recommended,
    /// AES-256-GCM, `enc: "A256GCM"`, for deployments that require a
    /// FIPS-validated primitive.
    Fips,
}

impl Default for CipherProfile {
    fn default() -> Self {
        CipherProfile::Recommended
    }
}

impl CipherProfile {
    fn enc(self) -> ContentEncryptionAlgorithm {
        match self {
            CipherProfile::Recommended => ContentEncryptionAlgorithm::C20P,
            CipherProfile::Fips => ContentEncryptionAlgorithm::A256Gcm,
        }
    }
}

/// The JWE encryption/decryption facade.
pub struct Cipher {
    profile: CipherProfile,
}

impl Cipher {
    /// Builds a cipher configured for the given profile.
    pub fn new(profile: CipherProfile) -> Self {
        Self { profile }
    }

    /// Encrypts `data` to every recipient in `requests`, resolving each
    /// `kid` through `resolver`.
    #[instrument(skip(self, data, resolver, requests), fields(recipients = requests.len()))]
    pub async fn encrypt(
        &self,
        data: &[u8],
        requests: &[RecipientRequest],
        resolver: &dyn KeyResolver,
    ) -> Result<JweDocument> {
        if requests.is_empty() {
            return Err(Error::InvalidArgument("at least one recipient is required".into()));
        }

        let enc = self.profile.enc();
        let mut cek = [0u8; 32];
        cek.copy_from_slice(&random(32));

        let iv = random(enc.iv_len());

        // AAD is the protected header's base64url bytes; since that string
        // only depends on `enc`, it can be computed before sealing.
        let protected_header_json = serde_json::to_string(&crate::header::ProtectedHeader {
            enc: enc.as_str().to_string(),
        })?;
        let aad = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(protected_header_json.as_bytes())
            .into_bytes();

        let seal_result = seal(enc, &cek, &iv, &aad, data);
        let (ciphertext, tag) = match seal_result {
            Ok(v) => v,
            Err(e) => {
                cek.zeroize();
                return Err(e);
            }
        };

        let mut recipients = Vec::with_capacity(requests.len());
        for request in requests {
            match assemble_recipient(request, resolver, &cek).await {
                Ok(entry) => recipients.push(entry),
                Err(e) => {
                    warn!(kid = %request.kid, "recipient assembly failed, aborting encryption");
                    cek.zeroize();
                    return Err(e);
                }
            }
        }

        cek.zeroize();
        debug!(profile = ?self.profile, "encryption complete");

        JweDocument::assemble(enc, recipients, &iv, &ciphertext, &tag)
    }

    /// Encrypts a JSON-serializable value; the payload is the UTF-8 bytes
    /// of its serialization.
    #[instrument(skip(self, value, resolver, requests), fields(recipients = requests.len()))]
    pub async fn encrypt_object<T: serde::Serialize>(
        &self,
        value: &T,
        requests: &[RecipientRequest],
        resolver: &dyn KeyResolver,
    ) -> Result<JweDocument> {
        let data = serde_json::to_vec(value)?;
        self.encrypt(&data, requests, resolver).await
    }

    /// Decrypts `document` using `local_key`, which must match one
    /// recipient's `kid`.
    #[instrument(skip(self, document, local_key))]
    pub async fn decrypt(&self, document: &JweDocument, local_key: &dyn KeyAgreementKey) -> Result<Vec<u8>> {
        let enc = document.content_encryption_algorithm()?;

        let mut cek = unwrap_for_recipient(&document.recipients, local_key).await?;

        let iv = document.decode_iv(enc)?;
        let ciphertext = document.decode_ciphertext()?;
        let tag = document.decode_tag()?;
        let aad = document.aad();

        let result = open(enc, &cek, &iv, aad, &ciphertext, &tag);
        cek.zeroize();
        result
    }

    /// Decrypts `document` and parses the plaintext as JSON.
    #[instrument(skip(self, document, local_key))]
    pub async fn decrypt_object<T: serde::de::DeserializeOwned>(
        &self,
        document: &JweDocument,
        local_key: &dyn KeyAgreementKey,
    ) -> Result<T> {
        let data = self.decrypt(document, local_key).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

fn seal(enc: ContentEncryptionAlgorithm, cek: &[u8], iv: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    match enc {
        ContentEncryptionAlgorithm::C20P => xchacha20poly1305_seal(cek, iv, aad, plaintext),
        ContentEncryptionAlgorithm::A256Gcm => aes256gcm_seal(cek, iv, aad, plaintext),
    }
}

fn open(enc: ContentEncryptionAlgorithm, cek: &[u8], iv: &[u8], aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Vec<u8>> {
    match enc {
        ContentEncryptionAlgorithm::C20P => xchacha20poly1305_open(cek, iv, aad, ciphertext, tag),
        ContentEncryptionAlgorithm::A256Gcm => aes256gcm_open(cek, iv, aad, ciphertext, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{LocalKeyAgreementKey, StaticKeyResolver};
    use serde_json::json;

    fn recipients(kids: &[&str]) -> Vec<RecipientRequest> {
        kids.iter()
            .map(|kid| RecipientRequest { kid: kid.to_string() })
            .collect()
    }

    #[tokio::test]
    async fn recommended_profile_round_trip() {
        let bob = LocalKeyAgreementKey::generate("did:example:bob#key-1");
        let resolver = StaticKeyResolver::new(vec![bob.public_key()]);
        let cipher = Cipher::new(CipherProfile::Recommended);

        let doc = cipher
            .encrypt(b"hello", &recipients(&["did:example:bob#key-1"]), &resolver)
            .await
            .unwrap();

        assert_eq!(doc.content_encryption_algorithm().unwrap(), ContentEncryptionAlgorithm::C20P);

        let plaintext = cipher.decrypt(&doc, &bob).await.unwrap();
        assert_eq!(plaintext, b"hello");
    }

    #[tokio::test]
    async fn fips_profile_round_trip_two_recipients() {
        let bob = LocalKeyAgreementKey::generate("did:example:bob#key-1");
        let carol = LocalKeyAgreementKey::generate("did:example:carol#key-1");
        let resolver = StaticKeyResolver::new(vec![bob.public_key(), carol.public_key()]);
        let cipher = Cipher::new(CipherProfile::Fips);

        let doc = cipher
            .encrypt_object(
                &json!({"a": 1}),
                &recipients(&["did:example:bob#key-1", "did:example:carol#key-1"]),
                &resolver,
            )
            .await
            .unwrap();

        assert_eq!(doc.recipients.len(), 2);
        assert_ne!(doc.recipients[0].header.epk.x, doc.recipients[1].header.epk.x);

        let value_bob: serde_json::Value = cipher.decrypt_object(&doc, &bob).await.unwrap();
        let value_carol: serde_json::Value = cipher.decrypt_object(&doc, &carol).await.unwrap();
        assert_eq!(value_bob, json!({"a": 1}));
        assert_eq!(value_carol, json!({"a": 1}));
    }

    #[tokio::test]
    async fn empty_payload_round_trips() {
        let bob = LocalKeyAgreementKey::generate("did:example:bob#key-1");
        let resolver = StaticKeyResolver::new(vec![bob.public_key()]);
        let cipher = Cipher::new(CipherProfile::default());

        let doc = cipher
            .encrypt(b"", &recipients(&["did:example:bob#key-1"]), &resolver)
            .await
            .unwrap();
        assert_eq!(doc.ciphertext, "");

        let plaintext = cipher.decrypt(&doc, &bob).await.unwrap();
        assert_eq!(plaintext, Vec::<u8>::new());
    }

    #[tokio::test]
    async fn mutating_protected_header_breaks_decryption() {
        let bob = LocalKeyAgreementKey::generate("did:example:bob#key-1");
        let resolver = StaticKeyResolver::new(vec![bob.public_key()]);
        let cipher = Cipher::new(CipherProfile::default());

        let mut doc = cipher
            .encrypt(b"hello", &recipients(&["did:example:bob#key-1"]), &resolver)
            .await
            .unwrap();

        let mut bytes = doc.protected.clone().into_bytes();
        bytes[0] ^= 1;
        doc.protected = String::from_utf8_lossy(&bytes).to_string();

        let result = cipher.decrypt(&doc, &bob).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn encrypt_rejects_empty_recipients() {
        let resolver = StaticKeyResolver::new(vec![]);
        let cipher = Cipher::new(CipherProfile::default());
        let result = cipher.encrypt(b"hello", &[], &resolver).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn unresolvable_recipient_aborts_whole_encryption() {
        let resolver = StaticKeyResolver::new(vec![]);
        let cipher = Cipher::new(CipherProfile::default());
        let result = cipher
            .encrypt(b"hello", &recipients(&["did:example:ghost#key-1"]), &resolver)
            .await;
        assert!(matches!(result, Err(Error::UnknownKey(_))));
    }

    #[tokio::test]
    async fn wrong_key_is_rejected() {
        let bob = LocalKeyAgreementKey::generate("did:example:bob#key-1");
        let resolver = StaticKeyResolver::new(vec![bob.public_key()]);
        let cipher = Cipher::new(CipherProfile::default());

        let doc = cipher
            .encrypt(b"hello", &recipients(&["did:example:bob#key-1"]), &resolver)
            .await
            .unwrap();

        let stranger = LocalKeyAgreementKey::generate("did:example:stranger#key-1");
        let result = cipher.decrypt(&doc, &stranger).await;
        assert!(matches!(result, Err(Error::NoMatchingRecipient)));
    }
}
