/// Byte patterns and the text encodings they are derived from.
use crate::error::{Result, SearchError};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use memchr::memmem::Finder;

/// Encoding preselected when the user has not chosen one.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Encoding labels offered in the charset picker.
pub const SUPPORTED_ENCODINGS: &[&str] = &[
    "UTF-8",
    "UTF-16LE",
    "UTF-16BE",
    "windows-1250",
    "windows-1251",
    "windows-1252",
    "ISO-8859-2",
    "ISO-8859-5",
    "ISO-8859-7",
    "ISO-8859-15",
    "KOI8-R",
    "Shift_JIS",
    "EUC-JP",
    "EUC-KR",
    "GBK",
    "gb18030",
    "Big5",
];

/// An immutable, non-empty byte sequence to look for.
///
/// Holds a prebuilt substring finder so every file scan reuses the same
/// search tables.
#[derive(Clone, Debug)]
pub struct Pattern {
    finder: Finder<'static>,
}

#[allow(clippy::len_without_is_empty)]
impl Pattern {
    /// Wrap raw bytes. Empty input is rejected.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(SearchError::EmptyPattern);
        }
        Ok(Self {
            finder: Finder::new(bytes).into_owned(),
        })
    }

    /// Encode `text` under the encoding named `encoding` and wrap the bytes.
    ///
    /// Labels are matched the way browsers match them (case-insensitive,
    /// common aliases accepted). Text with characters the encoding cannot
    /// represent is rejected instead of being silently substituted.
    pub fn encode(text: &str, encoding: &str) -> Result<Self> {
        let enc = resolve_encoding(encoding)?;

        let bytes: Vec<u8> = if enc == UTF_16LE {
            text.encode_utf16().flat_map(u16::to_le_bytes).collect()
        } else if enc == UTF_16BE {
            text.encode_utf16().flat_map(u16::to_be_bytes).collect()
        } else {
            let (bytes, _, unmappable) = enc.encode(text);
            if unmappable {
                return Err(SearchError::Unmappable {
                    encoding: enc.name(),
                });
            }
            bytes.into_owned()
        };

        Self::new(&bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.finder.needle()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Offset of the first occurrence in `haystack`, if any.
    #[inline]
    pub fn find_in(&self, haystack: &[u8]) -> Option<usize> {
        self.finder.find(haystack)
    }
}

/// Look up an encoding by label.
///
/// The WHATWG "replacement" encoding is a decode-only sink and is treated as
/// unknown.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .filter(|enc| *enc != encoding_rs::REPLACEMENT)
        .ok_or_else(|| SearchError::UnknownEncoding(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(Pattern::new(b""), Err(SearchError::EmptyPattern)));
        assert!(matches!(
            Pattern::encode("", "UTF-8"),
            Err(SearchError::EmptyPattern)
        ));
    }

    #[test]
    fn test_utf8_encoding() {
        let p = Pattern::encode("héllo", "utf-8").unwrap();
        assert_eq!(p.as_bytes(), "héllo".as_bytes());
        assert_eq!(p.len(), 6);
    }

    #[test]
    fn test_single_byte_encoding() {
        let p = Pattern::encode("héllo", "windows-1252").unwrap();
        assert_eq!(p.as_bytes(), &[b'h', 0xE9, b'l', b'l', b'o']);
    }

    #[test]
    fn test_utf16_encodings() {
        let le = Pattern::encode("ab", "UTF-16LE").unwrap();
        assert_eq!(le.as_bytes(), &[b'a', 0, b'b', 0]);
        let be = Pattern::encode("ab", "UTF-16BE").unwrap();
        assert_eq!(be.as_bytes(), &[0, b'a', 0, b'b']);
    }

    #[test]
    fn test_unknown_encoding() {
        let err = Pattern::encode("abc", "no-such-charset").unwrap_err();
        assert!(matches!(err, SearchError::UnknownEncoding(ref l) if l == "no-such-charset"));
        assert!(resolve_encoding("iso-2022-kr").is_err());
    }

    #[test]
    fn test_unmappable_text_rejected() {
        let err = Pattern::encode("日本", "windows-1252").unwrap_err();
        assert!(matches!(err, SearchError::Unmappable { .. }));
    }

    #[test]
    fn test_supported_encodings_resolve() {
        for label in SUPPORTED_ENCODINGS {
            assert!(resolve_encoding(label).is_ok(), "{label} should resolve");
        }
        assert!(SUPPORTED_ENCODINGS.contains(&DEFAULT_ENCODING));
    }

    #[test]
    fn test_find_in() {
        let p = Pattern::new(b"wor").unwrap();
        assert_eq!(p.find_in(b"hello world"), Some(6));
        assert_eq!(p.find_in(b"goodbye"), None);
    }
}
