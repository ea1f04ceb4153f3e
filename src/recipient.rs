//! Per-recipient key agreement, wrapping, and unwrapping: assembling the
//! `recipients` array on encrypt, and selecting + unwrapping one entry on
//! decrypt.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::codec::RecipientEntry;
use crate::error::{Error, Result};
use crate::header::{EphemeralPublicKey, KeyAgreementAlgorithm, RecipientHeader};
use crate::key_agreement::{concat_kdf, EphemeralKeypair};
use crate::keys::{KeyAgreementKey, KeyResolver, PublicKey};
use crate::primitives::{aes_kw_unwrap, aes_kw_wrap};

/// A recipient requested on the encrypt path: the target key id, to be
/// resolved through a [`KeyResolver`].
pub struct RecipientRequest {
    /// Identifier to resolve to a public key.
    pub kid: String,
}

/// Produces one recipient entry: generates a fresh ephemeral keypair,
/// derives the key-wrapping key via ECDH-ES + Concat-KDF, and wraps `cek`.
pub async fn assemble_recipient(
    request: &RecipientRequest,
    resolver: &dyn KeyResolver,
    cek: &[u8; 32],
) -> Result<RecipientEntry> {
    let recipient_public = resolver.resolve_key(&request.kid).await?;

    let ephemeral = EphemeralKeypair::generate();
    let epk_bytes = ephemeral.public_bytes();
    let mut z = ephemeral.derive_shared_secret(&recipient_public.bytes)?;
    let mut kwk = concat_kdf(&z);
    zeroize::Zeroize::zeroize(&mut z);

    let wrapped = aes_kw_wrap(&kwk, cek);
    zeroize::Zeroize::zeroize(&mut kwk);
    let wrapped = wrapped?;

    Ok(RecipientEntry {
        header: RecipientHeader {
            kid: request.kid.clone(),
            alg: KeyAgreementAlgorithm::EcdhEsA256Kw.as_str().to_string(),
            epk: EphemeralPublicKey::new(&epk_bytes),
        },
        encrypted_key: URL_SAFE_NO_PAD.encode(wrapped),
    })
}

/// Finds the first recipient entry whose `kid` matches `local_key`'s id and
/// unwraps its CEK. Never tries more than one entry: trying several on
/// failure would let a caller distinguish "wrong recipient" from "wrong
/// key" by timing or by which attempt succeeded.
pub async fn unwrap_for_recipient(
    recipients: &[RecipientEntry],
    local_key: &dyn KeyAgreementKey,
) -> Result<[u8; 32]> {
    let entry = recipients
        .iter()
        .find(|r| r.header.kid == local_key.id())
        .ok_or(Error::NoMatchingRecipient)?;

    KeyAgreementAlgorithm::parse(&entry.header.alg)?;

    let epk_bytes = entry.header.epk.raw_public_key()?;
    let epk = PublicKey {
        id: String::new(),
        bytes: epk_bytes,
    };

    let mut z = local_key.derive_secret(&epk).await.map_err(|_| Error::DecryptionFailed)?;
    let mut kwk = concat_kdf(&z);
    zeroize::Zeroize::zeroize(&mut z);

    let wrapped = URL_SAFE_NO_PAD
        .decode(&entry.encrypted_key)
        .map_err(|_| Error::DecryptionFailed)?;

    let cek = aes_kw_unwrap(&kwk, &wrapped);
    zeroize::Zeroize::zeroize(&mut kwk);
    let cek = cek?;

    cek.try_into().map_err(|_| Error::DecryptionFailed)
}
