//! Sealed prescription payloads.
//!
//! A sealed payload is a short header (magic plus a key fingerprint) followed
//! by the plaintext XORed with a SHA-256 counter-mode keystream. Decryption is
//! a [`Read`] adapter, so the XML parser consumes plaintext as it streams.

use sha2::{Digest, Sha256};
use std::fmt;
use std::io::{self, Read};
use thiserror::Error;

const MAGIC: &[u8; 4] = b"XPDS";
const FINGERPRINT_LEN: usize = 4;
pub const HEADER_LEN: usize = MAGIC.len() + FINGERPRINT_LEN;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("cipher key must not be empty")]
    EmptyKey,
    #[error("payload is not sealed")]
    NotSealed,
    #[error("payload was sealed with a different key")]
    KeyMismatch,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Symmetric key for sealing and opening payloads.
#[derive(Clone)]
pub struct SecretKey {
    material: [u8; 32],
}

impl SecretKey {
    pub fn new(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.is_empty() {
            return Err(CipherError::EmptyKey);
        }
        let mut material = [0u8; 32];
        material.copy_from_slice(&Sha256::digest(bytes));
        Ok(Self { material })
    }

    fn fingerprint(&self) -> [u8; FINGERPRINT_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(b"fingerprint");
        hasher.update(self.material);
        let digest = hasher.finalize();
        [digest[0], digest[1], digest[2], digest[3]]
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

struct Keystream {
    material: [u8; 32],
    counter: u64,
    block: [u8; 32],
    used: usize,
}

impl Keystream {
    fn new(key: &SecretKey) -> Self {
        Self {
            material: key.material,
            counter: 0,
            block: [0; 32],
            used: 32,
        }
    }

    fn apply(&mut self, data: &mut [u8]) {
        for byte in data {
            if self.used == self.block.len() {
                let mut hasher = Sha256::new();
                hasher.update(self.material);
                hasher.update(self.counter.to_le_bytes());
                self.block.copy_from_slice(&hasher.finalize());
                self.counter += 1;
                self.used = 0;
            }
            *byte ^= self.block[self.used];
            self.used += 1;
        }
    }
}

/// Seals `plaintext` under `key`.
pub fn seal(key: &SecretKey, plaintext: &[u8]) -> Vec<u8> {
    let mut sealed = Vec::with_capacity(HEADER_LEN + plaintext.len());
    sealed.extend_from_slice(MAGIC);
    sealed.extend_from_slice(&key.fingerprint());
    let start = sealed.len();
    sealed.extend_from_slice(plaintext);
    Keystream::new(key).apply(&mut sealed[start..]);
    sealed
}

/// Yields the plaintext of a sealed stream.
pub struct DecryptingReader<R> {
    inner: R,
    keystream: Keystream,
}

impl<R: Read> DecryptingReader<R> {
    /// Consumes and checks the header. A stream shorter than the header or
    /// with the wrong magic is `NotSealed`.
    pub fn new(mut inner: R, key: &SecretKey) -> Result<Self, CipherError> {
        let mut header = [0u8; HEADER_LEN];
        match inner.read_exact(&mut header) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(CipherError::NotSealed)
            }
            Err(err) => return Err(err.into()),
        }
        if &header[..MAGIC.len()] != MAGIC {
            return Err(CipherError::NotSealed);
        }
        if header[MAGIC.len()..] != key.fingerprint() {
            return Err(CipherError::KeyMismatch);
        }

        Ok(Self {
            inner,
            keystream: Keystream::new(key),
        })
    }
}

impl<R: Read> Read for DecryptingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.keystream.apply(&mut buf[..n]);
        Ok(n)
    }
}
