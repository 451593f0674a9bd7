//! Signature extraction from descriptor files
//!
//! Descriptor files are INI-like and often carry legacy bytes and trailing junk,
//! so only a bounded head of the file is read, bytes are decoded as ISO-8859-1,
//! and the parser ignores lines it does not understand.

use crate::errors::{ManifestError, SignatureError};
use ahash::AHashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Synthetic section wrapped around content that precedes any real header
pub const LEADING_SECTION: &str = "DUMMY_SECTION";

/// Default number of descriptor lines considered
pub const DEFAULT_LINES_TO_READ: usize = 200;

/// Where the signature lives and how its raw value is cleaned up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRule {
    pub section: String,
    pub key: String,
    pub comment_delimiter: char,
    pub prefix: String,
}

impl Default for SignatureRule {
    fn default() -> Self {
        SignatureRule {
            section: "TunerStudio".to_string(),
            key: "signature".to_string(),
            comment_delimiter: ';',
            prefix: "rusEFI ".to_string(),
        }
    }
}

// =============================================================================
// INI DOCUMENT - lenient section/key parser
// =============================================================================

/// Sections of an INI-like document, keys lower-cased
#[derive(Debug, Default)]
pub struct IniDocument {
    sections: AHashMap<String, AHashMap<String, String>>,
}

impl IniDocument {
    /// Parse text into sections.
    ///
    /// Duplicate sections merge, duplicate keys keep the last value, and lines
    /// that are neither headers, comments nor `key = value` pairs are skipped.
    pub fn parse(text: &str) -> Self {
        let mut doc = IniDocument::default();
        let mut section: Option<String> = None;
        // key of the value currently open for continuation, and its indent
        let mut open_key: Option<(String, usize)> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                open_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indent = line.len() - line.trim_start().len();

            if let (Some(name), Some((key, key_indent))) = (&section, &open_key) {
                if indent > *key_indent {
                    if let Some(value) = doc
                        .sections
                        .get_mut(name)
                        .and_then(|keys| keys.get_mut(key))
                    {
                        value.push('\n');
                        value.push_str(trimmed);
                    }
                    continue;
                }
            }

            if let Some(name) = parse_section_header(trimmed) {
                doc.sections.entry(name.to_string()).or_default();
                section = Some(name.to_string());
                open_key = None;
                continue;
            }

            let Some(name) = &section else {
                continue;
            };

            match parse_key_value(trimmed) {
                Some((key, value)) => {
                    doc.sections
                        .entry(name.clone())
                        .or_default()
                        .insert(key.clone(), value.to_string());
                    open_key = Some((key, indent));
                }
                None => {
                    debug!("Ignoring unparsable descriptor line: {}", trimmed);
                    open_key = None;
                }
            }
        }

        doc
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Look up a key; section names are case-sensitive, keys are not
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(&key.to_lowercase())
            .map(String::as_str)
    }
}

/// `[name]` with the name running up to the last closing bracket
fn parse_section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let close = rest.rfind(']')?;
    let name = &rest[..close];
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Split at the first `=` or `:`, lower-casing the key
fn parse_key_value(line: &str) -> Option<(String, &str)> {
    let idx = line.find(|c: char| c == '=' || c == ':')?;
    let key = line[..idx].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_lowercase(), line[idx + 1..].trim()))
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Extract and normalize the signature from descriptor text
pub fn extract_signature(text: &str, rule: &SignatureRule) -> Result<String, SignatureError> {
    let wrapped = format!("[{}]\n{}", LEADING_SECTION, text);
    let doc = IniDocument::parse(&wrapped);

    if !doc.has_section(&rule.section) {
        return Err(SignatureError::MissingSection(rule.section.clone()));
    }
    let raw = doc
        .get(&rule.section, &rule.key)
        .ok_or_else(|| SignatureError::MissingKey {
            section: rule.section.clone(),
            key: rule.key.clone(),
        })?;

    let signature = normalize_signature(raw, rule);
    if signature.is_empty() {
        return Err(SignatureError::Empty);
    }
    Ok(signature)
}

/// Drop the trailing comment, surrounding quotes and the known prefix
pub fn normalize_signature(raw: &str, rule: &SignatureRule) -> String {
    let before_comment = raw.split(rule.comment_delimiter).next().unwrap_or_default();
    let unquoted = before_comment.trim().trim_matches('"');
    let unprefixed = unquoted
        .strip_prefix(rule.prefix.as_str())
        .unwrap_or(unquoted);
    unprefixed.trim().to_string()
}

/// Decode bytes as ISO-8859-1, which maps every byte to a code point
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Read at most `max_lines` lines from the start of a file
pub fn read_head(path: &Path, max_lines: usize) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut text = String::new();
    let mut line = Vec::new();

    for _ in 0..max_lines {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        text.push_str(&decode_latin1(&line));
    }

    Ok(text)
}

/// Reads descriptor files and pulls their signature out
#[derive(Debug, Clone)]
pub struct SignatureExtractor {
    rule: SignatureRule,
    lines_to_read: usize,
}

impl Default for SignatureExtractor {
    fn default() -> Self {
        SignatureExtractor::new(SignatureRule::default(), DEFAULT_LINES_TO_READ)
    }
}

impl SignatureExtractor {
    pub fn new(rule: SignatureRule, lines_to_read: usize) -> Self {
        SignatureExtractor {
            rule,
            lines_to_read,
        }
    }

    /// Extract the signature of a descriptor on disk
    pub fn extract_file(&self, path: &Path) -> Result<String, ManifestError> {
        let head = read_head(path, self.lines_to_read).map_err(|source| {
            ManifestError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;

        extract_signature(&head, &self.rule)
            .map_err(|err| ManifestError::from_signature(path.to_path_buf(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn extract(text: &str) -> Result<String, SignatureError> {
        extract_signature(text, &SignatureRule::default())
    }

    #[test]
    fn test_extract_strips_comment_quotes_and_prefix() {
        let text = "[TunerStudio]\nsignature = \"rusEFI testecu ; note\"\n";
        assert_eq!(extract(text), Ok("testecu".to_string()));
    }

    #[test]
    fn test_extract_real_world_layout() {
        let text = r#"; rusEFI generated file
#unset tuneByMAF

[MegaTune]
   ; https://rusefi.com/forum
   MTversion      = 2.25 ; MegaTune itself; needs to match 3rd parameter in the query command

[TunerStudio]
   queryCommand   = "S"
   signature      = "rusEFI master.2024.05.01.proteus_f4.1234567" ; signature is expected to be 7 or more characters.
   versionInfo    = "V"
"#;
        assert_eq!(
            extract(text),
            Ok("master.2024.05.01.proteus_f4.1234567".to_string())
        );
    }

    #[test]
    fn test_missing_section_and_key() {
        assert_eq!(
            extract("[Constants]\nsignature = \"x\"\n"),
            Err(SignatureError::MissingSection("TunerStudio".to_string()))
        );
        assert_eq!(
            extract("[TunerStudio]\nqueryCommand = \"S\"\n"),
            Err(SignatureError::MissingKey {
                section: "TunerStudio".to_string(),
                key: "signature".to_string(),
            })
        );
    }

    #[test]
    fn test_section_name_is_case_sensitive() {
        assert!(matches!(
            extract("[tunerstudio]\nsignature = \"abc\"\n"),
            Err(SignatureError::MissingSection(_))
        ));
    }

    #[test]
    fn test_key_is_case_insensitive() {
        assert_eq!(
            extract("[TunerStudio]\nSIGNATURE = \"abc\"\n"),
            Ok("abc".to_string())
        );
    }

    #[test]
    fn test_empty_signature() {
        assert_eq!(
            extract("[TunerStudio]\nsignature = \"rusEFI \" ; nothing\n"),
            Err(SignatureError::Empty)
        );
        assert_eq!(
            extract("[TunerStudio]\nsignature = ; all comment\n"),
            Err(SignatureError::Empty)
        );
    }

    #[test]
    fn test_prefix_removed_once_and_case_sensitive() {
        assert_eq!(
            extract("[TunerStudio]\nsignature = \"rusEFI rusEFI x\"\n"),
            Ok("rusEFI x".to_string())
        );
        assert_eq!(
            extract("[TunerStudio]\nsignature = \"rusefi x\"\n"),
            Ok("rusefi x".to_string())
        );
    }

    #[test]
    fn test_content_before_first_header_is_tolerated() {
        let text = "stray = value\n[TunerStudio]\nsignature = abc\n";
        assert_eq!(extract(text), Ok("abc".to_string()));

        let doc = IniDocument::parse(&format!("[{}]\n{}", LEADING_SECTION, text));
        assert_eq!(doc.get(LEADING_SECTION, "stray"), Some("value"));
    }

    #[test]
    fn test_duplicates_and_malformed_lines_do_not_abort() {
        let text = r#"[TunerStudio]
signature = "first"
this line has no delimiter
[Other]
key = 1
[TunerStudio]
signature = "second"
"#;
        assert_eq!(extract(text), Ok("second".to_string()));
    }

    #[test]
    fn test_colon_delimiter_and_continuation() {
        let doc = IniDocument::parse("[S]\nname: first\n    second\nother = 2\n");
        assert_eq!(doc.get("S", "name"), Some("first\nsecond"));
        assert_eq!(doc.get("S", "other"), Some("2"));
    }

    #[test]
    fn test_header_with_trailing_comment() {
        let doc = IniDocument::parse("[TunerStudio] ; main\nsignature = x\n");
        assert_eq!(doc.get("TunerStudio", "signature"), Some("x"));
    }

    #[test]
    fn test_decode_latin1_never_fails() {
        assert_eq!(decode_latin1(&[0x63, 0x61, 0x66, 0xE9]), "café");
        assert_eq!(decode_latin1(&[0xFF, 0x80]).chars().count(), 2);
    }

    #[test]
    fn test_read_head_is_bounded() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("engine.ini");
        let mut content = String::new();
        for i in 0..10 {
            content.push_str(&format!("line{} = {}\n", i, i));
        }
        content.push_str("[TunerStudio]\nsignature = \"late\"\n");
        assert!(fs::write(&path, content).is_ok());

        let head = read_head(&path, 5);
        assert!(head.is_ok_and(|h| h.lines().count() == 5));

        let narrow = SignatureExtractor::new(SignatureRule::default(), 5);
        assert!(narrow
            .extract_file(&path)
            .is_err_and(|e| e.kind() == ErrorKind::Missing));

        let wide = SignatureExtractor::default();
        assert!(wide.extract_file(&path).is_ok_and(|s| s == "late"));
    }

    #[test]
    fn test_short_file_and_legacy_bytes() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("legacy.ini");
        let mut bytes = b"; caf\xE9 \xFF\r\n[TunerStudio]\r\nsignature = \"rusEFI legacy\"".to_vec();
        bytes.push(b'\n');
        assert!(fs::write(&path, bytes).is_ok());

        let extractor = SignatureExtractor::default();
        assert!(extractor.extract_file(&path).is_ok_and(|s| s == "legacy"));
    }

    #[test]
    fn test_unreadable_descriptor() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let extractor = SignatureExtractor::default();
        let result = extractor.extract_file(&temp_dir.path().join("absent.ini"));
        assert!(result.is_err_and(|e| e.kind() == ErrorKind::Unreadable));
    }
}
