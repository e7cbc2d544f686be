use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VerificationError};
use crate::hasher::{AnyHasher, Hasher};

/// Checksum algorithms this crate can validate.
///
/// The cluster may report others (`xxhash`, `crc32c`, `none`); those parse to
/// [`VerificationError::Unsupported`] and callers decide whether to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    #[cfg(feature = "md5")]
    Md5,
    #[cfg(feature = "sha2")]
    Sha256,
    #[cfg(feature = "sha2")]
    Sha512,
}

impl ChecksumKind {
    pub fn hasher(self) -> AnyHasher {
        match self {
            #[cfg(feature = "md5")]
            ChecksumKind::Md5 => AnyHasher::Md5(Default::default()),
            #[cfg(feature = "sha2")]
            ChecksumKind::Sha256 => AnyHasher::Sha256(Default::default()),
            #[cfg(feature = "sha2")]
            ChecksumKind::Sha512 => AnyHasher::Sha512(Default::default()),
        }
    }

    pub fn digest_len(self) -> usize {
        match self {
            #[cfg(feature = "md5")]
            ChecksumKind::Md5 => 16,
            #[cfg(feature = "sha2")]
            ChecksumKind::Sha256 => 32,
            #[cfg(feature = "sha2")]
            ChecksumKind::Sha512 => 64,
        }
    }
}

impl FromStr for ChecksumKind {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            #[cfg(feature = "md5")]
            "md5" => Ok(ChecksumKind::Md5),
            #[cfg(feature = "sha2")]
            "sha256" => Ok(ChecksumKind::Sha256),
            #[cfg(feature = "sha2")]
            "sha512" => Ok(ChecksumKind::Sha512),
            other => Err(VerificationError::Unsupported(other.to_string())),
        }
    }
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "md5")]
            ChecksumKind::Md5 => write!(f, "md5"),
            #[cfg(feature = "sha2")]
            ChecksumKind::Sha256 => write!(f, "sha256"),
            #[cfg(feature = "sha2")]
            ChecksumKind::Sha512 => write!(f, "sha512"),
        }
    }
}

/// An expected digest together with its algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    kind:     ChecksumKind,
    expected: Vec<u8>,
}

impl Checksum {
    /// Parse the `(type, hex value)` pair reported in object headers.
    pub fn parse(kind: &str, value: &str) -> Result<Self> {
        let kind: ChecksumKind = kind.parse()?;
        let value = value.trim();
        let expected = hex::decode(value).map_err(|e| VerificationError::InvalidValue {
            value:  value.to_string(),
            reason: e.to_string(),
        })?;
        if expected.len() != kind.digest_len() {
            return Err(VerificationError::InvalidValue {
                value:  value.to_string(),
                reason: format!("expected {} bytes for {kind}", kind.digest_len()),
            });
        }
        Ok(Self { kind, expected })
    }

    pub fn kind(&self) -> ChecksumKind { self.kind }

    pub fn verifier(&self) -> Verifier {
        Verifier {
            hasher:   self.kind.hasher(),
            expected: self.expected.clone(),
        }
    }

    pub fn verify(&self, data: &[u8]) -> Result<()> {
        let mut verifier = self.verifier();
        verifier.update(data);
        verifier.finish()
    }
}

/// Hashes content as it passes through and compares on [`Verifier::finish`].
pub struct Verifier {
    hasher:   AnyHasher,
    expected: Vec<u8>,
}

impl Verifier {
    pub fn update(&mut self, data: &[u8]) { self.hasher.update(data); }

    pub fn finish(self) -> Result<()> {
        let actual = self.hasher.finalize();
        if actual == self.expected {
            Ok(())
        } else {
            Err(VerificationError::Mismatch {
                expected: hex::encode(&self.expected),
                actual:   hex::encode(actual),
            })
        }
    }
}
