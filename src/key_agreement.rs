//! ECDH-ES key agreement over X25519 and the Concat-KDF key-wrapping-key
//! derivation.
//!
//! The derivation here is the single-round Concat-KDF of NIST SP 800-56A
//! §5.8.1 (equivalently RFC 7518 §4.6.2), built directly over [`Sha256`] —
//! it is not HKDF, and the two must not be confused: HKDF-Expand runs the
//! HMAC construction with its own counter-and-info framing, while Concat-KDF
//! here is one SHA-256 call over a fixed byte layout.

use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::error::{Error, Result};

const ALGORITHM_ID: &[u8] = b"ECDH-ES+A256KW";
const KEY_DATA_LEN_BITS: u32 = 256;

/// An ephemeral X25519 keypair, generated fresh for one recipient of one
/// document and never reused.
pub struct EphemeralKeypair {
    secret: StaticSecret,
    public: PublicKey,
}

impl EphemeralKeypair {
    /// Generates a new ephemeral keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(rand_core::OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// The public half, to be embedded in the recipient's `epk` header.
    pub fn public_bytes(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Consumes the keypair, deriving the shared secret with `their_public`
    /// and immediately zeroising the ephemeral private scalar.
    pub fn derive_shared_secret(self, their_public: &[u8; 32]) -> Result<[u8; 32]> {
        let their_public = PublicKey::from(*their_public);
        let shared = self.secret.diffie_hellman(&their_public);
        reject_if_zero(shared.as_bytes())?;
        Ok(*shared.as_bytes())
    }
}

/// Performs a static X25519 diffie-hellman, used on the decrypt side where
/// the local key agreement key is static rather than ephemeral.
pub fn static_diffie_hellman(local_secret: &StaticSecret, their_public: &[u8; 32]) -> Result<[u8; 32]> {
    let their_public = PublicKey::from(*their_public);
    let shared = local_secret.diffie_hellman(&their_public);
    reject_if_zero(shared.as_bytes())?;
    Ok(*shared.as_bytes())
}

fn reject_if_zero(shared: &[u8; 32]) -> Result<()> {
    if shared.iter().all(|b| *b == 0) {
        return Err(Error::InvalidArgument(
            "ECDH produced an all-zero shared secret".into(),
        ));
    }
    Ok(())
}

/// Derives the 32-byte key-wrapping key from a 32-byte shared secret `z`
/// via Concat-KDF bound to `ECDH-ES+A256KW`, with empty PartyUInfo/PartyVInfo.
///
/// Layout: `SHA-256(0x00000001 || z || AlgorithmID || PartyUInfo ||
/// PartyVInfo || SuppPubInfo)` where `AlgorithmID` is a 4-byte big-endian
/// length followed by the UTF-8 bytes of `"ECDH-ES+A256KW"`, `PartyUInfo`
/// and `PartyVInfo` are each a 4-byte big-endian zero length with no data,
/// and `SuppPubInfo` is the 4-byte big-endian key length in bits (256).
pub fn concat_kdf(z: &[u8; 32]) -> [u8; 32] {
    let mut input = Vec::with_capacity(4 + 32 + 4 + ALGORITHM_ID.len() + 4 + 4 + 4);

    input.extend_from_slice(&1u32.to_be_bytes()); // counter, single round
    input.extend_from_slice(z);

    input.extend_from_slice(&(ALGORITHM_ID.len() as u32).to_be_bytes());
    input.extend_from_slice(ALGORITHM_ID);

    input.extend_from_slice(&0u32.to_be_bytes()); // PartyUInfo: empty
    input.extend_from_slice(&0u32.to_be_bytes()); // PartyVInfo: empty

    input.extend_from_slice(&KEY_DATA_LEN_BITS.to_be_bytes()); // SuppPubInfo

    let mut hasher = Sha256::new();
    hasher.update(&input);
    let digest: [u8; 32] = hasher.finalize().into();

    input.zeroize();
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_kdf_is_deterministic() {
        let z = [0x42u8; 32];
        assert_eq!(concat_kdf(&z), concat_kdf(&z));
    }

    #[test]
    fn concat_kdf_input_depends_on_z() {
        let a = concat_kdf(&[0x01u8; 32]);
        let b = concat_kdf(&[0x02u8; 32]);
        assert_ne!(a, b);
    }

    #[test]
    fn ephemeral_ecdh_agrees_both_directions() {
        let alice = EphemeralKeypair::generate();
        let bob_secret = StaticSecret::random_from_rng(rand_core::OsRng);
        let bob_public = PublicKey::from(&bob_secret);

        let alice_public = alice.public_bytes();
        let z_alice = alice.derive_shared_secret(&bob_public.to_bytes()).unwrap();
        let z_bob = static_diffie_hellman(&bob_secret, &alice_public).unwrap();

        assert_eq!(z_alice, z_bob);
        assert_eq!(concat_kdf(&z_alice), concat_kdf(&z_bob));
    }

    #[test]
    fn rejects_all_zero_shared_secret() {
        // x25519-dalek clamps scalars so constructing a genuine all-zero
        // shared secret requires a crafted public key; the low-order-point
        // all-zero public key triggers it deterministically.
        let secret = StaticSecret::random_from_rng(rand_core::OsRng);
        let zero_public = [0u8; 32];
        let result = static_diffie_hellman(&secret, &zero_public);
        assert!(result.is_err());
    }
}
