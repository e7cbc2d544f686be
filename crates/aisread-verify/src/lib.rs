//! Checksum verification for object content.
//!
//! The cluster reports a checksum type and a hex digest for every object. This
//! crate turns that pair into a [`Verifier`] that hashes content incrementally
//! while it streams, so a full read is validated in a single pass.
//!
//! # Example
//!
//! ```
//! use aisread_verify::{Checksum, Md5Hasher, Hasher};
//!
//! let mut h = Md5Hasher::new();
//! h.update(b"hello world");
//! let digest = hex::encode(h.finalize());
//!
//! let checksum = Checksum::parse("md5", &digest).unwrap();
//! let mut verifier = checksum.verifier();
//! verifier.update(b"hello ");
//! verifier.update(b"world");
//! verifier.finish().unwrap();
//! ```

pub use self::checksum::{Checksum, ChecksumKind, Verifier};
pub use self::error::{Result, VerificationError};
pub use self::hasher::{AnyHasher, DigestHasher, Hasher};

#[cfg(feature = "md5")]
pub use self::hasher::Md5Hasher;

#[cfg(feature = "sha2")]
pub use self::hasher::{Sha256Hasher, Sha512Hasher};

mod checksum;
mod error;
mod hasher;
