//! Authenticated encryption layer for keyseal.
//!
//! Provides the envelope cipher used at both levels of the key hierarchy:
//! - AES-256-GCM with a fresh random 96-bit nonce per seal
//! - Fixed-size 256-bit key material that is zeroized on drop
//!
//! # Wire format
//!
//! Every sealed blob, whether it carries a wrapped data key or a caller
//! payload, has the same layout:
//!
//! ```text
//! nonce (12 bytes) || ciphertext (len(plaintext) bytes) || tag (16 bytes)
//! ```
//!
//! No associated data is bound into the tag, so a blob is self-contained:
//! the key is the only other input needed to open it.

mod cipher;
mod error;
mod key;

pub use cipher::{open, random_nonce, seal, sealed_len, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{SecretKey, KEY_SIZE};
