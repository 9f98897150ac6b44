//! # Server Configuration
//!
//! Settings come from command-line arguments, then environment variables,
//! then the defaults below.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser, ValueEnum};
use pdfgen::EncryptionStrength;
use serde::Serialize;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_FONTS_DIR: &str = "Fonts";
pub const DEFAULT_FILE_PREFIX: &str = "encrypted_document";
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Cipher used for protected documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
pub enum EncryptionMode {
    #[default]
    #[value(name = "aes128")]
    #[serde(rename = "aes128")]
    Aes128,
    #[value(name = "rc4-128")]
    #[serde(rename = "rc4-128")]
    Rc4_128,
}

impl From<EncryptionMode> for EncryptionStrength {
    fn from(mode: EncryptionMode) -> Self {
        match mode {
            EncryptionMode::Aes128 => EncryptionStrength::Aes128,
            EncryptionMode::Rc4_128 => EncryptionStrength::Rc4_128,
        }
    }
}

#[derive(Debug, Clone, Parser, Serialize)]
#[command(
    name = "pdfgen-api",
    about = "HTTP service generating password-protected PDF documents",
    version,
    long_about = None
)]
pub struct ServerConfig {
    /// Network address to bind the server to
    #[arg(
        short = 'b',
        long = "bind",
        value_name = "ADDRESS:PORT",
        default_value = DEFAULT_BIND_ADDR,
        env = "PDFGEN_BIND_ADDR"
    )]
    pub bind_addr: SocketAddr,

    /// Directory holding `static/NotoSansTC-*.ttf`
    #[arg(long, value_name = "PATH", default_value = DEFAULT_FONTS_DIR, env = "PDFGEN_FONTS_DIR")]
    pub fonts_dir: PathBuf,

    /// Default log filter, overridden by `RUST_LOG`
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Reject requests without a password
    #[arg(long, action = ArgAction::Set, default_value_t = true, env = "PDFGEN_REQUIRE_PASSWORD")]
    pub require_password: bool,

    #[arg(long, default_value_t = DEFAULT_MIN_PASSWORD_LENGTH, env = "PDFGEN_MIN_PASSWORD_LENGTH")]
    pub min_password_length: usize,

    /// Download file name prefix, followed by `_yyyyMMddHHmmss.pdf`
    #[arg(long, default_value = DEFAULT_FILE_PREFIX, env = "PDFGEN_FILE_PREFIX")]
    pub file_prefix: String,

    #[arg(long, value_enum, default_value_t = EncryptionMode::Aes128, env = "PDFGEN_ENCRYPTION")]
    pub encryption: EncryptionMode,

    /// Largest accepted request body
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "PDFGEN_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Include the failure cause in generation error responses
    #[arg(long, action = ArgAction::Set, default_value_t = false, env = "PDFGEN_EXPOSE_ERROR_DETAILS")]
    pub expose_error_details: bool,

    /// Value of the document's `/Author` entry
    #[arg(long, default_value = pdfgen::generator::DEFAULT_AUTHOR, env = "PDFGEN_AUTHOR")]
    pub author: String,
}

impl ServerConfig {
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.ip().is_unspecified() {
            tracing::warn!(
                bind_addr = %self.bind_addr,
                "Binding to wildcard address"
            );
        }

        if !self.fonts_dir.is_dir() {
            tracing::warn!(
                path = %self.fonts_dir.display(),
                "Fonts directory not found, falling back to standard fonts"
            );
        }

        if self.min_password_length == 0 {
            bail!("Minimum password length cannot be zero");
        }

        if self.max_body_bytes == 0 {
            bail!("Maximum body size cannot be zero");
        }

        if self.file_prefix.trim().is_empty() {
            bail!("File name prefix cannot be empty");
        }

        if self
            .file_prefix
            .chars()
            .any(|c| matches!(c, '"' | '/' | '\\') || c.is_control())
        {
            bail!("File name prefix contains invalid characters: {}", self.file_prefix);
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            log_level: "info".to_string(),
            require_password: true,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            encryption: EncryptionMode::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            expose_error_details: false,
            author: pdfgen::generator::DEFAULT_AUTHOR.to_string(),
        }
    }
}
