use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Document is already encrypted")]
    AlreadyEncrypted,
}

pub type Result<T> = std::result::Result<T, PdfError>;
