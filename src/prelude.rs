//! Prelude module for commonly used types and traits.
//!
//! Import everything from this module with `use jwe_anoncrypt::prelude::*`.
//!
//! # Example
//!
//! ```rust
//! use jwe_anoncrypt::prelude::*;
//!
//! async fn example(resolver: &dyn KeyResolver, local_key: &dyn KeyAgreementKey) -> Result<()> {
//!     let cipher = Cipher::new(CipherProfile::default());
//!     let requests = vec![RecipientRequest { kid: local_key.id().to_string() }];
//!     let doc = cipher.encrypt(b"hello", &requests, resolver).await?;
//!     let plaintext = cipher.decrypt(&doc, local_key).await?;
//!     assert_eq!(plaintext, b"hello");
//!     Ok(())
//! }
//! ```

pub use crate::cipher::{Cipher, CipherProfile};
pub use crate::codec::{JweDocument, RecipientEntry};
pub use crate::error::{Error, Result};
pub use crate::header::{ContentEncryptionAlgorithm, EphemeralPublicKey, KeyAgreementAlgorithm, RecipientHeader};
pub use crate::keys::{JwkOkp, KeyAgreementKey, KeyResolver, LocalKeyAgreementKey, PublicKey, ResolvedKeyMaterial, StaticKeyResolver};
pub use crate::recipient::RecipientRequest;
