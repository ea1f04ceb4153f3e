//! A minimal JSON Web Encryption (JWE) library: authenticated encryption
//! and decryption of arbitrary payloads to one or more recipients, using
//! ECDH-ES over X25519, Concat-KDF, and AES Key Wrap.
//!
//! Two content-encryption profiles are supported: [`CipherProfile::Recommended`]
//! (XChaCha20-Poly1305) and [`CipherProfile::Fips`] (AES-256-GCM). Documents
//! are emitted and parsed in the JWE general JSON serialization (RFC 7516).
//!
//! Key resolution and key agreement are pluggable through the
//! [`KeyResolver`] and [`KeyAgreementKey`] traits, so key material can live
//! in an HSM or a remote directory rather than in this process.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cipher;
pub mod codec;
pub mod error;
pub mod header;
pub mod key_agreement;
pub mod keys;
pub mod prelude;
pub mod primitives;
pub mod recipient;

pub use cipher::{Cipher, CipherProfile};
pub use codec::{JweDocument, RecipientEntry};
pub use error::Error;
pub use header::{ContentEncryptionAlgorithm, EphemeralPublicKey, KeyAgreementAlgorithm, RecipientHeader};
pub use keys::{JwkOkp, KeyAgreementKey, KeyResolver, LocalKeyAgreementKey, PublicKey, ResolvedKeyMaterial, StaticKeyResolver};
pub use recipient::RecipientRequest;
