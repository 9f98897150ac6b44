mod encoding;
mod metrics;
mod wrap;

pub use encoding::{decode_win_ansi, encode_win_ansi, win_ansi_byte};
pub use metrics::StandardFont;
pub use wrap::{split_into_words, wrap_text};
