//! Password protection of generated documents

mod common;

use std::sync::Arc;

use common::{timestamp, Inspector};
use pdfgen::encryption::Permissions;
use pdfgen::{
    encrypt, serialize, EncryptionStrength, FontTable, GeneratorOptions, LayoutEngine,
    PageGeometry, PdfError, PdfGenerator, PdfModel, WriterOptions,
};

fn generate(password: Option<&str>, strength: EncryptionStrength) -> Vec<u8> {
    let generator = PdfGenerator::new(
        Arc::new(FontTable::empty()),
        GeneratorOptions {
            strength,
            ..Default::default()
        },
    );
    let model = PdfModel::new(
        Some("Report".to_string()),
        "Line1\nLine2\n\nLine3",
        password.map(str::to_string),
    );
    generator.generate(&model, timestamp()).unwrap()
}

#[test]
fn test_correct_password_recovers_text() {
    for strength in [EncryptionStrength::Aes128, EncryptionStrength::Rc4_128] {
        let bytes = generate(Some("secret1"), strength);
        let pdf = Inspector::open(&bytes, Some("secret1")).unwrap();

        assert!(pdf.is_encrypted());
        assert_eq!(pdf.page_count(), 1);
        let texts = &pdf.page_texts()[0];
        for expected in ["Report", "Line1", "Line2", "Line3", "Page 1"] {
            assert!(texts.iter().any(|t| t == expected), "{strength}: missing {expected}");
        }
        assert_eq!(pdf.string(pdf.info(), "Title"), b"Report".to_vec());
    }
}

#[test]
fn test_wrong_password_is_rejected() {
    for strength in [EncryptionStrength::Aes128, EncryptionStrength::Rc4_128] {
        let bytes = generate(Some("secret1"), strength);
        assert!(Inspector::open(&bytes, Some("secret2")).is_err());
        assert!(Inspector::open(&bytes, None).is_err());
    }
}

#[test]
fn test_plain_text_not_visible_in_encrypted_file() {
    let bytes = generate(Some("secret1"), EncryptionStrength::Rc4_128);
    let raw = String::from_utf8_lossy(&bytes);
    assert!(!raw.contains("Line1"));
    assert!(!raw.contains("(Report)"));
}

#[test]
fn test_permission_policy() {
    let bytes = generate(Some("secret1"), EncryptionStrength::Aes128);
    let raw = String::from_utf8_lossy(&bytes);
    assert!(raw.contains("/P -1852"));

    let permissions = Permissions::from_bits(-1852_i32 as u32);
    assert!(permissions.can_print());
    assert!(permissions.can_print_high_quality());
    assert!(!permissions.can_modify_contents());
    assert!(!permissions.can_copy());
    assert!(!permissions.can_modify_annotations());
    assert!(!permissions.can_fill_forms());
    assert!(!permissions.can_extract_for_accessibility());
    assert!(!permissions.can_assemble());
}

#[test]
fn test_missing_or_blank_password_leaves_file_unencrypted() {
    for password in [None, Some(""), Some("   ")] {
        let bytes = generate(password, EncryptionStrength::Aes128);
        let pdf = Inspector::open(&bytes, None).unwrap();
        assert!(!pdf.is_encrypted());
        assert!(pdf.page_texts()[0].iter().any(|t| t == "Line1"));
    }
}

#[test]
fn test_document_encrypted_only_once() {
    let fonts = FontTable::empty();
    let mut doc = LayoutEngine::new(&fonts, PageGeometry::default()).layout("t", "x", timestamp());

    encrypt(&mut doc, "", EncryptionStrength::Aes128).unwrap();
    assert!(!doc.is_encrypted());

    encrypt(&mut doc, "secret1", EncryptionStrength::Aes128).unwrap();
    assert!(matches!(
        encrypt(&mut doc, "secret2", EncryptionStrength::Aes128),
        Err(PdfError::AlreadyEncrypted)
    ));

    // The first password still opens the file
    let bytes = serialize(&doc, &fonts, &WriterOptions::default()).unwrap();
    assert!(Inspector::open(&bytes, Some("secret1")).is_ok());
    assert!(Inspector::open(&bytes, Some("secret2")).is_err());
}

#[test]
fn test_documents_with_different_content_use_different_keys() {
    let fonts = FontTable::empty();
    let engine = LayoutEngine::new(&fonts, PageGeometry::default());
    let options = WriterOptions { compress: false };

    let protected = |content: &str| {
        let mut doc = engine.layout("Payroll", content, timestamp());
        encrypt(&mut doc, "secret1", EncryptionStrength::Rc4_128).unwrap();
        let bytes = serialize(&doc, &fonts, &options).unwrap();
        Inspector::open(&bytes, Some("secret1")).unwrap()
    };

    let first = protected("salary: 100000 USD");
    let second = protected("salary: 999999 EUR");
    assert_ne!(first.file_id, second.file_id);
    assert_ne!(first.encrypt_entry("U"), second.encrypt_entry("U"));

    // Same content, same key
    let again = protected("salary: 100000 USD");
    assert_eq!(first.file_id, again.file_id);
    assert_eq!(first.encrypt_entry("U"), again.encrypt_entry("U"));
}
