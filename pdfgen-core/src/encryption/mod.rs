//! PDF encryption according to ISO 32000-1 Chapter 7.6
//!
//! A document is protected in two stages. [`encrypt`] attaches
//! [`SecuritySettings`] (passwords, permissions, strength) to a laid-out
//! [`Document`]; the writer then derives a [`SecurityState`] once the file
//! identifier is known and uses it to encrypt every string and stream.
//!
//! Both RC4 128-bit (revision 3) and AES-128 (revision 4, `AESV2`) are
//! supported. AES-128 is the default.

mod aes;
mod permissions;
mod rc4;
mod standard_security;

pub use self::aes::generate_iv;
pub use permissions::Permissions;
pub use rc4::{rc4, Rc4};
pub use standard_security::{EncryptionKey, SecurityHandlerRevision, StandardSecurityHandler};

use std::fmt;
use std::str::FromStr;

use crate::error::{PdfError, Result};
use crate::layout::Document;
use crate::objects::{Dictionary, Object, ObjectId};

/// Cipher used for the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionStrength {
    /// RC4 with a 128-bit key (`/V 2 /R 3`)
    Rc4_128,
    /// AES-128 through the `AESV2` crypt filter (`/V 4 /R 4`)
    #[default]
    Aes128,
}

impl EncryptionStrength {
    pub fn handler(self) -> StandardSecurityHandler {
        match self {
            EncryptionStrength::Rc4_128 => StandardSecurityHandler::rc4_128bit(),
            EncryptionStrength::Aes128 => StandardSecurityHandler::aes_128bit(),
        }
    }
}

impl fmt::Display for EncryptionStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionStrength::Rc4_128 => write!(f, "rc4-128"),
            EncryptionStrength::Aes128 => write!(f, "aes128"),
        }
    }
}

impl FromStr for EncryptionStrength {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rc4-128" | "rc4" => Ok(EncryptionStrength::Rc4_128),
            "aes128" | "aes-128" | "aes" => Ok(EncryptionStrength::Aes128),
            other => Err(PdfError::InvalidInput(format!(
                "Unknown encryption strength: {other}"
            ))),
        }
    }
}

/// Security attached to a document by [`encrypt`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecuritySettings {
    user_password: String,
    owner_password: String,
    permissions: Permissions,
    strength: EncryptionStrength,
}

impl SecuritySettings {
    pub fn user_password(&self) -> &str {
        &self.user_password
    }

    pub fn owner_password(&self) -> &str {
        &self.owner_password
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn strength(&self) -> EncryptionStrength {
        self.strength
    }
}

// Passwords stay out of logs.
impl fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("permissions", &self.permissions)
            .field("strength", &self.strength)
            .finish_non_exhaustive()
    }
}

/// Protects `document` with `password`.
///
/// The password becomes both the user and the owner password and the
/// print-only permission policy is applied. An empty password leaves the
/// document untouched. A document can only be encrypted once.
pub fn encrypt(document: &mut Document, password: &str, strength: EncryptionStrength) -> Result<()> {
    if password.is_empty() {
        return Ok(());
    }
    if document.is_encrypted() {
        return Err(PdfError::AlreadyEncrypted);
    }

    document.set_security(SecuritySettings {
        user_password: password.to_string(),
        owner_password: password.to_string(),
        permissions: Permissions::print_only(),
        strength,
    });
    tracing::debug!(%strength, "Document encryption configured");
    Ok(())
}

/// Keys and hashes derived for one serialized file.
#[derive(Debug, Clone)]
pub struct SecurityState {
    handler: StandardSecurityHandler,
    key: EncryptionKey,
    owner_hash: Vec<u8>,
    user_hash: Vec<u8>,
    permissions: Permissions,
}

impl SecurityState {
    /// Derives `/O`, `/U` and the file key for the first `/ID` element.
    pub fn derive(settings: &SecuritySettings, file_id: &[u8]) -> Self {
        let handler = settings.strength.handler();
        let owner_hash =
            handler.compute_owner_hash(&settings.owner_password, &settings.user_password);
        let key = handler.compute_encryption_key(
            &settings.user_password,
            &owner_hash,
            settings.permissions,
            file_id,
        );
        let user_hash = handler.compute_user_hash(&key, file_id);

        Self {
            handler,
            key,
            owner_hash,
            user_hash,
            permissions: settings.permissions,
        }
    }

    pub fn handler(&self) -> StandardSecurityHandler {
        self.handler
    }

    pub fn key(&self) -> &EncryptionKey {
        &self.key
    }

    /// The `/Encrypt` dictionary, which is itself never encrypted.
    pub fn encrypt_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Filter", Object::name("Standard"));
        dict.set("V", self.handler.version());
        dict.set("R", self.handler.revision() as i64);
        dict.set("Length", self.handler.key_length_bits());

        if self.handler.revision() == SecurityHandlerRevision::R4 {
            let mut std_cf = Dictionary::typed("CryptFilter");
            std_cf.set("CFM", Object::name("AESV2"));
            std_cf.set("AuthEvent", Object::name("DocOpen"));
            std_cf.set("Length", 16);

            let mut cf = Dictionary::new();
            cf.set("StdCF", std_cf);
            dict.set("CF", cf);
            dict.set("StmF", Object::name("StdCF"));
            dict.set("StrF", Object::name("StdCF"));
        }

        dict.set("O", Object::HexString(self.owner_hash.clone()));
        dict.set("U", Object::HexString(self.user_hash.clone()));
        dict.set("P", i64::from(self.permissions.p_value()));
        dict
    }

    pub fn encrypt_bytes(&self, data: &[u8], obj_id: ObjectId) -> Result<Vec<u8>> {
        self.handler.encrypt_bytes(data, &self.key, obj_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_empty_password_is_noop() {
        let mut doc = Document::default();
        encrypt(&mut doc, "", EncryptionStrength::Aes128).unwrap();
        assert!(!doc.is_encrypted());
    }

    #[test]
    fn test_encrypt_sets_policy() {
        let mut doc = Document::default();
        encrypt(&mut doc, "secret1", EncryptionStrength::Aes128).unwrap();

        let settings = doc.security().unwrap();
        assert_eq!(settings.user_password(), "secret1");
        assert_eq!(settings.owner_password(), "secret1");
        assert_eq!(settings.permissions(), Permissions::print_only());
        assert_eq!(settings.strength(), EncryptionStrength::Aes128);
    }

    #[test]
    fn test_encrypt_twice_fails() {
        let mut doc = Document::default();
        encrypt(&mut doc, "secret1", EncryptionStrength::Rc4_128).unwrap();

        let result = encrypt(&mut doc, "secret2", EncryptionStrength::Rc4_128);
        assert!(matches!(result, Err(PdfError::AlreadyEncrypted)));
        assert_eq!(doc.security().unwrap().user_password(), "secret1");
    }

    #[test]
    fn test_debug_hides_passwords() {
        let mut doc = Document::default();
        encrypt(&mut doc, "hunter22", EncryptionStrength::Aes128).unwrap();
        let debug = format!("{:?}", doc.security().unwrap());
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_strength_from_str() {
        assert_eq!(
            "aes128".parse::<EncryptionStrength>().unwrap(),
            EncryptionStrength::Aes128
        );
        assert_eq!(
            "RC4-128".parse::<EncryptionStrength>().unwrap(),
            EncryptionStrength::Rc4_128
        );
        assert!("des".parse::<EncryptionStrength>().is_err());
        assert_eq!(EncryptionStrength::default().to_string(), "aes128");
    }

    #[test]
    fn test_encrypt_dictionary_aes() {
        let mut doc = Document::default();
        encrypt(&mut doc, "secret1", EncryptionStrength::Aes128).unwrap();
        let state = SecurityState::derive(doc.security().unwrap(), b"0123456789abcdef");
        let dict = state.encrypt_dictionary();

        assert_eq!(dict.get("V"), Some(&Object::Integer(4)));
        assert_eq!(dict.get("R"), Some(&Object::Integer(4)));
        assert_eq!(dict.get("P"), Some(&Object::Integer(-1852)));
        assert_eq!(dict.get("StmF"), Some(&Object::name("StdCF")));
        let std_cf = dict
            .get("CF")
            .and_then(Object::as_dict)
            .and_then(|cf| cf.get("StdCF"))
            .and_then(Object::as_dict)
            .unwrap();
        assert_eq!(std_cf.get("CFM"), Some(&Object::name("AESV2")));
        assert_eq!(dict.get("O").and_then(Object::as_bytes).map(<[u8]>::len), Some(32));
        assert_eq!(dict.get("U").and_then(Object::as_bytes).map(<[u8]>::len), Some(32));
    }

    #[test]
    fn test_encrypt_dictionary_rc4() {
        let mut doc = Document::default();
        encrypt(&mut doc, "secret1", EncryptionStrength::Rc4_128).unwrap();
        let state = SecurityState::derive(doc.security().unwrap(), b"0123456789abcdef");
        let dict = state.encrypt_dictionary();

        assert_eq!(dict.get("V"), Some(&Object::Integer(2)));
        assert_eq!(dict.get("R"), Some(&Object::Integer(3)));
        assert_eq!(dict.get("Length"), Some(&Object::Integer(128)));
        assert!(!dict.contains_key("CF"));
    }
}
