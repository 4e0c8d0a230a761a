//! Formatting helpers and value encodings used by the main executable
use colored::{ColoredString, Colorize};
use std::fmt::Display;
use std::path::Path;

use crate::opt::Encoding;
use crate::{Error, Result};

pub fn fmt_err<E: Display>(err: E) -> String {
    format!(
        "{} {}",
        "ERROR".red().bold(),
        format!("{}", err).white().bold()
    )
}

pub fn fmt_path<P: AsRef<Path>>(path: P) -> ColoredString {
    path.as_ref().display().to_string().bold().blue()
}

pub fn fmt_name(name: &str) -> ColoredString {
    name.yellow().bold()
}

/// Renders a raw attribute value as text using `encoding`.
pub fn encode_value(value: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Text => String::from_utf8_lossy(value).into_owned(),
        Encoding::Hex => hex::encode(value),
        Encoding::Base64 => base64::encode(value),
    }
}

/// Parses a value provided on the command line using `encoding`.
pub fn decode_value(value: &str, encoding: Encoding) -> Result<Vec<u8>> {
    let invalid = |reason: String| Error::InvalidValue { encoding, reason };

    match encoding {
        Encoding::Text => Ok(value.as_bytes().to_vec()),
        Encoding::Hex => hex::decode(value).map_err(|e| invalid(e.to_string())),
        Encoding::Base64 => base64::decode(value).map_err(|e| invalid(e.to_string())),
    }
}
