//! Public-key resolution and the pluggable key agreement contract.
//!
//! These traits are the external collaborators this crate delegates to:
//! resolving a `kid` to a public key, and deriving an ECDH-ES shared secret
//! (or directly wrapping/unwrapping a CEK, for HSM-backed keys that never
//! export a shared secret).

use async_trait::async_trait;
use serde::Deserialize;
use x25519_dalek::StaticSecret;

use crate::error::{Error, Result};

const X25519_PUB_CODEC: u64 = 0xec;

/// A resolved X25519 public key, bound to an opaque identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Identifier of the key, typically a DID URL fragment like
    /// `did:example:bob#key-1`.
    pub id: String,
    /// Raw 32-byte X25519 public key.
    pub bytes: [u8; 32],
}

/// The shape a resolver returns before decoding: either a multibase or a
/// JWK encoding of the public key bytes. Exactly one of the two fields must
/// be present; any other encoding is rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedKeyMaterial {
    /// Identifier of the resolved key.
    pub id: String,
    /// Declared key type, informational only; not used for dispatch.
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    /// A `z`-prefixed base58btc multibase string wrapping a
    /// multicodec-tagged X25519 public key.
    pub public_key_multibase: Option<String>,
    /// A JWK `{kty:"OKP", crv:"X25519", x:<base64url>}` object.
    pub public_key_jwk: Option<JwkOkp>,
}

/// The subset of JWK fields this crate accepts for an X25519 public key.
#[derive(Debug, Clone, Deserialize)]
pub struct JwkOkp {
    /// Must be `"OKP"`.
    pub kty: String,
    /// Must be `"X25519"`.
    pub crv: String,
    /// Base64url-encoded 32-byte public key.
    pub x: String,
}

impl ResolvedKeyMaterial {
    /// Decodes whichever encoding is present to a [`PublicKey`]. Rejects
    /// documents with neither or both fields present, and any encoding
    /// whose multicodec tag is not X25519, as [`Error::MalformedDocument`].
    pub fn into_public_key(self) -> Result<PublicKey> {
        let bytes = match (self.public_key_multibase, self.public_key_jwk) {
            (Some(mb), None) => decode_multibase_x25519(&mb)?,
            (None, Some(jwk)) => decode_jwk_x25519(&jwk)?,
            (None, None) => {
                return Err(Error::MalformedDocument(
                    "resolved key has neither publicKeyMultibase nor publicKeyJwk".into(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(Error::MalformedDocument(
                    "resolved key has both publicKeyMultibase and publicKeyJwk".into(),
                ))
            }
        };

        Ok(PublicKey { id: self.id, bytes })
    }
}

fn decode_jwk_x25519(jwk: &JwkOkp) -> Result<[u8; 32]> {
    if jwk.kty != "OKP" || jwk.crv != "X25519" {
        return Err(Error::MalformedDocument(format!(
            "unsupported publicKeyJwk kty/crv: {}/{}",
            jwk.kty, jwk.crv
        )));
    }

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let raw = URL_SAFE_NO_PAD
        .decode(&jwk.x)
        .map_err(|e| Error::MalformedDocument(format!("invalid publicKeyJwk.x: {e}")))?;

    raw.try_into()
        .map_err(|_| Error::MalformedDocument("publicKeyJwk.x must decode to 32 bytes".into()))
}

/// Decodes a `z`-prefixed base58btc multibase string wrapping a
/// multicodec-tagged X25519 public key (the `did:key`/multikey convention,
/// codec `0xec`).
fn decode_multibase_x25519(multibase: &str) -> Result<[u8; 32]> {
    let encoded = multibase
        .strip_prefix('z')
        .ok_or_else(|| Error::MalformedDocument("publicKeyMultibase must be base58btc ('z'-prefixed)".into()))?;

    let raw = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| Error::MalformedDocument(format!("invalid base58btc: {e}")))?;

    let (codec, data) = unsigned_varint::decode::u64(&raw)
        .map_err(|e| Error::MalformedDocument(format!("invalid multicodec varint: {e}")))?;

    if codec != X25519_PUB_CODEC {
        return Err(Error::MalformedDocument(format!(
            "publicKeyMultibase is not an X25519 public key (codec {codec:#x})"
        )));
    }

    data.try_into()
        .map_err(|_| Error::MalformedDocument("decoded multikey must be 32 bytes".into()))
}

/// Resolves a recipient or sender key identifier to its public key
/// material. Implementations typically consult a DID document, a local
/// keystore, or a remote directory.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Resolves `id` to a public key, or `UnknownKey` if it cannot be
    /// found.
    async fn resolve_key(&self, id: &str) -> Result<PublicKey>;
}

/// A local or HSM-backed X25519 key agreement key, used on the decrypt
/// side to derive the shared secret for a matched recipient.
#[async_trait]
pub trait KeyAgreementKey: Send + Sync {
    /// Identifier matched against each recipient's `kid`.
    fn id(&self) -> &str;

    /// The public half of this key, usable as an encryption target.
    fn public_key(&self) -> PublicKey;

    /// Derives the raw 32-byte ECDH-ES shared secret against `their_public`.
    async fn derive_secret(&self, their_public: &PublicKey) -> Result<[u8; 32]>;
}

/// An in-process [`KeyAgreementKey`] backed directly by an X25519 static
/// secret, for embedding applications that hold their own key material
/// rather than delegating to an HSM.
pub struct LocalKeyAgreementKey {
    id: String,
    secret: StaticSecret,
    public: PublicKey,
}

impl LocalKeyAgreementKey {
    /// Wraps an existing X25519 static secret under the given identifier.
    pub fn new(id: impl Into<String>, secret: StaticSecret) -> Self {
        let id = id.into();
        let public_bytes = x25519_dalek::PublicKey::from(&secret).to_bytes();
        let public = PublicKey {
            id: id.clone(),
            bytes: public_bytes,
        };
        Self { id, secret, public }
    }

    /// Generates a fresh static X25519 keypair under the given identifier.
    pub fn generate(id: impl Into<String>) -> Self {
        Self::new(id, StaticSecret::random_from_rng(rand_core::OsRng))
    }
}

#[async_trait]
impl KeyAgreementKey for LocalKeyAgreementKey {
    fn id(&self) -> &str {
        &self.id
    }

    fn public_key(&self) -> PublicKey {
        self.public.clone()
    }

    async fn derive_secret(&self, their_public: &PublicKey) -> Result<[u8; 32]> {
        crate::key_agreement::static_diffie_hellman(&self.secret, &their_public.bytes)
    }
}

/// A [`KeyResolver`] backed by a fixed in-memory set of public keys, for
/// tests and simple embedding scenarios.
pub struct StaticKeyResolver {
    keys: Vec<PublicKey>,
}

impl StaticKeyResolver {
    /// Builds a resolver over the given keys.
    pub fn new(keys: Vec<PublicKey>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve_key(&self, id: &str) -> Result<PublicKey> {
        self.keys
            .iter()
            .find(|k| k.id == id)
            .cloned()
            .ok_or_else(|| Error::UnknownKey(id.to_string()))
    }
}
