//! AES-256-GCM for the profile payload.
//!
//! Ciphertext layout is `nonce (12 bytes) || ciphertext || tag`. When the crate
//! is built without the `encryption` feature the encrypt/decrypt functions
//! exist but always fail, and [`available`] reports `false`.

use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{AppError, Result};

pub const KEY_LEN: usize = 32;
#[cfg_attr(not(feature = "encryption"), allow(dead_code))]
const NONCE_LEN: usize = 12;
#[cfg_attr(not(feature = "encryption"), allow(dead_code))]
const TAG_LEN: usize = 16;

pub type Key = Zeroizing<[u8; KEY_LEN]>;

pub fn available() -> bool {
    cfg!(feature = "encryption")
}

pub fn generate_key() -> Key {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    rand::rng().fill_bytes(&mut key[..]);
    key
}

#[cfg(feature = "encryption")]
pub fn encrypt(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    use aes_gcm::Aes256Gcm;
    use aes_gcm::aead::{Aead, KeyInit, generic_array::GenericArray};

    let mut nonce = vec![0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| AppError::Crypto(format!("Invalid key: {e}")))?;
    let ciphertext = cipher
        .encrypt(GenericArray::from_slice(&nonce), plaintext)
        .map_err(|_| AppError::Crypto("Profile encryption failed".into()))?;

    let mut out = nonce;
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

#[cfg(feature = "encryption")]
pub fn decrypt(key: &[u8; KEY_LEN], data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    use aes_gcm::Aes256Gcm;
    use aes_gcm::aead::{Aead, KeyInit, generic_array::GenericArray};

    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(AppError::Crypto("Profile file is truncated".into()));
    }
    let (nonce, ciphertext) = data.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| AppError::Crypto(format!("Invalid key: {e}")))?;
    let plaintext = cipher
        .decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| {
            AppError::Crypto("Profile could not be decrypted with the stored key".into())
        })?;
    Ok(Zeroizing::new(plaintext))
}

#[cfg(not(feature = "encryption"))]
pub fn encrypt(_key: &[u8; KEY_LEN], _plaintext: &[u8]) -> Result<Vec<u8>> {
    Err(AppError::Crypto("built without the `encryption` feature".into()))
}

#[cfg(not(feature = "encryption"))]
pub fn decrypt(_key: &[u8; KEY_LEN], _data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    Err(AppError::Crypto("built without the `encryption` feature".into()))
}
