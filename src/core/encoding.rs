//! Text encoding of input and output files
//!
//! Records are newline-delimited bytes, so only encodings where `\n` is the
//! single byte 0x0A are usable. That is exactly the set `encoding_rs` calls
//! ASCII-compatible.

use crate::domain::{FerryError, Result};
use encoding_rs::Encoding;

/// A resolved file encoding
#[derive(Debug, Clone, Copy)]
pub struct FileEncoding {
    encoding: &'static Encoding,
}

/// Resolve a WHATWG label (`utf-8`, `latin1`, `windows-1252`, ...)
///
/// # Errors
///
/// Returns a configuration error for unknown labels and for encodings that
/// are not ASCII-compatible (UTF-16 and friends).
pub fn resolve(label: &str) -> Result<FileEncoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        FerryError::Configuration(format!("Unknown file encoding '{label}'"))
    })?;

    if !encoding.is_ascii_compatible() {
        return Err(FerryError::Configuration(format!(
            "File encoding '{label}' is not supported: only ASCII-compatible encodings can be used for line-delimited files"
        )));
    }

    Ok(FileEncoding { encoding })
}

impl FileEncoding {
    /// UTF-8
    pub fn utf8() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Canonical name of the encoding
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode one line; malformed input is an error, never replaced
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<String, String> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| format!("line is not valid {}", self.encoding.name()))
    }

    /// Encode one line; characters the encoding cannot represent are an error
    pub fn encode(&self, text: &str) -> std::result::Result<Vec<u8>, String> {
        let (bytes, _, unmappable) = self.encoding.encode(text);
        if unmappable {
            return Err(format!(
                "document contains characters that cannot be represented in {}",
                self.encoding.name()
            ));
        }
        Ok(bytes.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_labels() {
        assert_eq!(resolve("utf-8").unwrap().name(), "UTF-8");
        assert_eq!(resolve("UTF8").unwrap().name(), "UTF-8");
        assert_eq!(resolve("latin1").unwrap().name(), "windows-1252");
        assert_eq!(resolve("shift_jis").unwrap().name(), "Shift_JIS");
    }

    #[test]
    fn test_resolve_rejects_unknown_and_utf16() {
        assert!(matches!(
            resolve("ebcdic-klingon"),
            Err(FerryError::Configuration(_))
        ));
        assert!(matches!(
            resolve("utf-16le"),
            Err(FerryError::Configuration(_))
        ));
    }

    #[test]
    fn test_decode_latin1() {
        let encoding = resolve("latin1").unwrap();
        assert_eq!(encoding.decode(b"caf\xe9").unwrap(), "café");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let encoding = FileEncoding::utf8();
        assert!(encoding.decode(b"{\"a\":\"\xff\"}").is_err());
    }

    #[test]
    fn test_encode_unmappable() {
        let encoding = resolve("latin1").unwrap();
        assert_eq!(encoding.encode("café").unwrap(), b"caf\xe9".to_vec());
        assert!(encoding.encode("日本").is_err());
    }
}
