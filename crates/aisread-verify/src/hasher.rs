use digest::Digest;

/// Incremental hash over streamed content.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Adapter from any `digest::Digest` implementation.
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

#[cfg(feature = "md5")]
pub type Md5Hasher = DigestHasher<md5::Md5>;

#[cfg(feature = "sha2")]
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

#[cfg(feature = "sha2")]
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

/// Hasher selected at runtime from a checksum type reported by the cluster.
pub enum AnyHasher {
    #[cfg(feature = "md5")]
    Md5(Md5Hasher),
    #[cfg(feature = "sha2")]
    Sha256(Sha256Hasher),
    #[cfg(feature = "sha2")]
    Sha512(Sha512Hasher),
}

impl Hasher for AnyHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            #[cfg(feature = "md5")]
            AnyHasher::Md5(h) => h.update(data),
            #[cfg(feature = "sha2")]
            AnyHasher::Sha256(h) => h.update(data),
            #[cfg(feature = "sha2")]
            AnyHasher::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            #[cfg(feature = "md5")]
            AnyHasher::Md5(h) => h.finalize(),
            #[cfg(feature = "sha2")]
            AnyHasher::Sha256(h) => h.finalize(),
            #[cfg(feature = "sha2")]
            AnyHasher::Sha512(h) => h.finalize(),
        }
    }
}
