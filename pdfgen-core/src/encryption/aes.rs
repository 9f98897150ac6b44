//! AES-128-CBC for the AESV2 crypt filter
//!
//! Encrypted payloads are laid out as `IV (16 bytes) || ciphertext`, with
//! PKCS#7 padding applied to the plaintext (ISO 32000-1 §7.6.2).

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use crate::error::{PdfError, Result};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

pub const BLOCK_SIZE: usize = 16;

/// Generate a random initialization vector.
pub fn generate_iv() -> [u8; BLOCK_SIZE] {
    let mut iv = [0u8; BLOCK_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}

/// Encrypt `data` with a fresh random IV and prefix the IV to the result.
pub fn encrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_iv(key, &generate_iv(), data)
}

/// Encrypt `data` with the given IV and prefix the IV to the result.
pub fn encrypt_with_iv(key: &[u8], iv: &[u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|e| PdfError::EncryptionError(format!("Invalid AES key: {e}")))?;

    let padded_len = (data.len() / BLOCK_SIZE + 1) * BLOCK_SIZE;
    let mut buf = vec![0u8; padded_len];
    buf[..data.len()].copy_from_slice(data);

    let ciphertext = cipher
        .encrypt_padded_mut::<Pkcs7>(&mut buf, data.len())
        .map_err(|e| PdfError::EncryptionError(format!("AES encryption failed: {e}")))?;

    let mut output = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
    output.extend_from_slice(iv);
    output.extend_from_slice(ciphertext);
    Ok(output)
}

/// Decrypt an `IV || ciphertext` payload and strip the PKCS#7 padding.
pub fn decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < BLOCK_SIZE {
        return Err(PdfError::EncryptionError(
            "AES encrypted data must be at least 16 bytes (IV)".to_string(),
        ));
    }

    let (iv, ciphertext) = data.split_at(BLOCK_SIZE);
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(PdfError::EncryptionError(format!(
            "AES ciphertext length {} is not a multiple of {BLOCK_SIZE}",
            ciphertext.len()
        )));
    }

    let cipher = Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|e| PdfError::EncryptionError(format!("Invalid AES key: {e}")))?;

    let mut buf = ciphertext.to_vec();
    let plaintext = cipher
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|e| PdfError::EncryptionError(format!("AES decryption failed: {e}")))?;
    Ok(plaintext.to_vec())
}
