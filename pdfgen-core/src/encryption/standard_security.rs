//! Standard Security Handler according to ISO 32000-1 §7.6.3
//!
//! Covers revision 3 (RC4 128-bit) and revision 4 (AES-128 through the
//! `AESV2` crypt filter). Both share the MD5-based key derivation; they differ
//! only in the per-object cipher.

use crate::encryption::{aes, rc4, Permissions};
use crate::error::Result;
use crate::objects::ObjectId;

/// Padding used in password processing
const PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// Key length in bytes for both supported revisions.
const KEY_LENGTH: usize = 16;

/// File encryption key
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey(Vec<u8>);

impl EncryptionKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncryptionKey({} bytes)", self.0.len())
    }
}

/// Security handler revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SecurityHandlerRevision {
    /// RC4 128-bit
    R3 = 3,
    /// Crypt filters; used here with AESV2
    R4 = 4,
}

/// Standard Security Handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardSecurityHandler {
    revision: SecurityHandlerRevision,
}

impl StandardSecurityHandler {
    pub fn rc4_128bit() -> Self {
        Self {
            revision: SecurityHandlerRevision::R3,
        }
    }

    pub fn aes_128bit() -> Self {
        Self {
            revision: SecurityHandlerRevision::R4,
        }
    }

    pub fn revision(&self) -> SecurityHandlerRevision {
        self.revision
    }

    /// `/V` value of the encryption dictionary.
    pub fn version(&self) -> i64 {
        match self.revision {
            SecurityHandlerRevision::R3 => 2,
            SecurityHandlerRevision::R4 => 4,
        }
    }

    pub fn key_length_bits(&self) -> i64 {
        (KEY_LENGTH * 8) as i64
    }

    fn uses_aes(&self) -> bool {
        self.revision == SecurityHandlerRevision::R4
    }

    /// Pad or truncate password to 32 bytes (algorithm 2, step a)
    fn pad_password(password: &str) -> [u8; 32] {
        let mut padded = [0u8; 32];
        let password_bytes = password.as_bytes();
        let len = password_bytes.len().min(32);

        padded[..len].copy_from_slice(&password_bytes[..len]);
        if len < 32 {
            padded[len..].copy_from_slice(&PADDING[..32 - len]);
        }

        padded
    }

    /// Runs the 19 extra RC4 passes with the key XORed by the pass number.
    fn rc4_iterations(key: &[u8], mut data: Vec<u8>) -> Vec<u8> {
        for i in 1..=19u8 {
            let iter_key: Vec<u8> = key.iter().map(|b| b ^ i).collect();
            data = rc4::rc4(&iter_key, &data);
        }
        data
    }

    /// Owner password hash, the `/O` entry (algorithm 3).
    ///
    /// An empty owner password falls back to the user password.
    pub fn compute_owner_hash(&self, owner_password: &str, user_password: &str) -> Vec<u8> {
        let owner = if owner_password.is_empty() {
            user_password
        } else {
            owner_password
        };

        let mut hash = md5::compute(Self::pad_password(owner)).to_vec();
        for _ in 0..50 {
            hash = md5::compute(&hash).to_vec();
        }
        let key = &hash[..KEY_LENGTH];

        let result = rc4::rc4(key, &Self::pad_password(user_password));
        Self::rc4_iterations(key, result)
    }

    /// File encryption key (algorithm 2).
    pub fn compute_encryption_key(
        &self,
        user_password: &str,
        owner_hash: &[u8],
        permissions: Permissions,
        file_id: &[u8],
    ) -> EncryptionKey {
        let mut data = Vec::with_capacity(32 + owner_hash.len() + 4 + file_id.len());
        data.extend_from_slice(&Self::pad_password(user_password));
        data.extend_from_slice(owner_hash);
        data.extend_from_slice(&permissions.bits().to_le_bytes());
        data.extend_from_slice(file_id);

        let mut hash = md5::compute(&data).to_vec();
        for _ in 0..50 {
            hash = md5::compute(&hash[..KEY_LENGTH]).to_vec();
        }
        hash.truncate(KEY_LENGTH);

        EncryptionKey(hash)
    }

    /// User password hash, the `/U` entry (algorithm 5).
    pub fn compute_user_hash(&self, key: &EncryptionKey, file_id: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(32 + file_id.len());
        data.extend_from_slice(&PADDING);
        data.extend_from_slice(file_id);

        let hash = md5::compute(&data);
        let first = rc4::rc4(key.as_bytes(), &hash[..]);
        let mut result = Self::rc4_iterations(key.as_bytes(), first);

        // 16 significant bytes followed by arbitrary padding
        result.resize(32, 0);
        result
    }

    /// Checks `password` against the stored `/U` entry (algorithm 6) and
    /// returns the file key on success.
    pub fn authenticate_user_password(
        &self,
        password: &str,
        user_hash: &[u8],
        owner_hash: &[u8],
        permissions: Permissions,
        file_id: &[u8],
    ) -> Option<EncryptionKey> {
        let key = self.compute_encryption_key(password, owner_hash, permissions, file_id);
        let computed = self.compute_user_hash(&key, file_id);

        let matches = user_hash.len() >= 16 && computed[..16] == user_hash[..16];
        matches.then_some(key)
    }

    /// Per-object key (algorithm 1).
    pub fn compute_object_key(&self, key: &EncryptionKey, obj_id: ObjectId) -> Vec<u8> {
        let mut data = key.as_bytes().to_vec();
        data.extend_from_slice(&obj_id.number().to_le_bytes()[..3]);
        data.extend_from_slice(&obj_id.generation().to_le_bytes());
        if self.uses_aes() {
            data.extend_from_slice(b"sAlT");
        }

        let hash = md5::compute(&data);
        let len = (key.as_bytes().len() + 5).min(16);
        hash[..len].to_vec()
    }

    /// Encrypt a string or stream payload belonging to `obj_id`.
    pub fn encrypt_bytes(
        &self,
        data: &[u8],
        key: &EncryptionKey,
        obj_id: ObjectId,
    ) -> Result<Vec<u8>> {
        let object_key = self.compute_object_key(key, obj_id);
        if self.uses_aes() {
            aes::encrypt(&object_key, data)
        } else {
            Ok(rc4::rc4(&object_key, data))
        }
    }

    /// Decrypt a string or stream payload belonging to `obj_id`.
    pub fn decrypt_bytes(
        &self,
        data: &[u8],
        key: &EncryptionKey,
        obj_id: ObjectId,
    ) -> Result<Vec<u8>> {
        let object_key = self.compute_object_key(key, obj_id);
        if self.uses_aes() {
            aes::decrypt(&object_key, data)
        } else {
            Ok(rc4::rc4(&object_key, data))
        }
    }
}
