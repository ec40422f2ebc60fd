//! HMAC-DRBG (NIST SP 800-90A Section 10.1.2) over HMAC-SHA-256.
//!
//! No allocation anywhere: the update function feeds its inputs to the MAC
//! incrementally instead of concatenating them, so the generator is usable
//! from the tick interrupt.

use ::hmac::digest::generic_array::GenericArray;
use ::hmac::digest::KeyInit;
use ::hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{Drbg, DrbgError};

type HmacSha256 = Hmac<Sha256>;

/// HMAC output size for SHA-256.
const HMAC_SIZE: usize = 32;

/// SHA-256 block size; HMAC keys are zero-padded to this length.
const BLOCK_SIZE: usize = 64;

/// Minimum seed length: 256-bit security strength.
pub const MIN_ENTROPY_LEN: usize = 32;

/// Maximum bytes per generate request (2^19 bits).
pub const MAX_REQUEST_BYTES: usize = 1 << 16;

/// Maximum generate requests between reseeds.
const RESEED_INTERVAL: u64 = 1 << 48;

/// HMAC-DRBG state.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HmacDrbg {
    k: [u8; HMAC_SIZE],
    v: [u8; HMAC_SIZE],
    reseed_counter: u64,
    seeded: bool,
}

/// Keys an HMAC-SHA-256 instance with a 32-byte key.
fn keyed(key: &[u8; HMAC_SIZE]) -> HmacSha256 {
    // Zero-padding to the block size is exactly what HMAC does to short keys.
    let mut block = [0u8; BLOCK_SIZE];
    block[..HMAC_SIZE].copy_from_slice(key);
    let mac = <HmacSha256 as KeyInit>::new(GenericArray::from_slice(&block));
    block.zeroize();
    mac
}

/// HMAC-SHA-256 keyed with `key` over the concatenation of `parts`.
fn hmac_sha256(key: &[u8; HMAC_SIZE], parts: &[&[u8]]) -> [u8; HMAC_SIZE] {
    let mut mac = keyed(key);
    for part in parts {
        mac.update(part);
    }

    let mut out = [0u8; HMAC_SIZE];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

impl HmacDrbg {
    /// Creates an unseeded generator; call [`Drbg::seed`] before use.
    pub const fn new() -> Self {
        Self {
            k: [0x00; HMAC_SIZE],
            v: [0x01; HMAC_SIZE],
            reseed_counter: 0,
            seeded: false,
        }
    }

    /// Creates a generator seeded from `entropy`.
    pub fn from_seed(entropy: &[u8]) -> Result<Self, DrbgError> {
        let mut drbg = Self::new();
        drbg.seed(entropy)?;
        Ok(drbg)
    }

    /// HMAC_DRBG_Update over `provided`, treated as one concatenated string.
    fn update(&mut self, provided: &[&[u8]]) {
        // K = HMAC(K, V || 0x00 || provided_data); V = HMAC(K, V)
        self.round(0x00, provided);

        if provided.iter().any(|p| !p.is_empty()) {
            // K = HMAC(K, V || 0x01 || provided_data); V = HMAC(K, V)
            self.round(0x01, provided);
        }
    }

    fn round(&mut self, separator: u8, provided: &[&[u8]]) {
        let mut mac = keyed(&self.k);
        mac.update(&self.v);
        mac.update(&[separator]);
        for part in provided {
            mac.update(part);
        }
        self.k.copy_from_slice(&mac.finalize().into_bytes());
        self.v = hmac_sha256(&self.k, &[&self.v]);
    }

    fn check_entropy(entropy: &[u8]) -> Result<(), DrbgError> {
        if entropy.len() < MIN_ENTROPY_LEN {
            return Err(DrbgError::InsufficientEntropy);
        }
        Ok(())
    }
}

impl Default for HmacDrbg {
    fn default() -> Self {
        Self::new()
    }
}

impl Drbg for HmacDrbg {
    fn seed(&mut self, entropy: &[u8]) -> Result<(), DrbgError> {
        Self::check_entropy(entropy)?;
        self.k = [0x00; HMAC_SIZE];
        self.v = [0x01; HMAC_SIZE];
        self.update(&[entropy]);
        self.reseed_counter = 1;
        self.seeded = true;
        Ok(())
    }

    fn reseed(&mut self, entropy: &[u8], additional_input: Option<&[u8]>) -> Result<(), DrbgError> {
        if !self.seeded {
            return Err(DrbgError::NotSeeded);
        }
        Self::check_entropy(entropy)?;
        self.update(&[entropy, additional_input.unwrap_or(&[])]);
        self.reseed_counter = 1;
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<(), DrbgError> {
        if !self.seeded {
            return Err(DrbgError::NotSeeded);
        }
        if out.len() > MAX_REQUEST_BYTES {
            return Err(DrbgError::RequestTooLarge);
        }
        if self.reseed_counter > RESEED_INTERVAL {
            return Err(DrbgError::ReseedRequired);
        }

        for chunk in out.chunks_mut(HMAC_SIZE) {
            self.v = hmac_sha256(&self.k, &[&self.v]);
            chunk.copy_from_slice(&self.v[..chunk.len()]);
        }

        self.update(&[]);
        self.reseed_counter += 1;
        Ok(())
    }

    fn is_seeded(&self) -> bool {
        self.seeded
    }
}
