//! Short language codes and their Input Tools tags.
//!
//! The widget speaks full input-tool tags (`te-t-i0-und` = Telugu
//! transliteration from Latin). Users and config files may use the short
//! ISO code instead.

use phf::phf_map;

/// Short code -> (input-tool tag, display name)
pub static LANGUAGES: phf::Map<&'static str, (&'static str, &'static str)> = phf_map! {
    "am" => ("am-t-i0-und", "Amharic"),
    "ar" => ("ar-t-i0-und", "Arabic"),
    "bn" => ("bn-t-i0-und", "Bengali"),
    "el" => ("el-t-i0-und", "Greek"),
    "fa" => ("fa-t-i0-und", "Persian"),
    "gu" => ("gu-t-i0-und", "Gujarati"),
    "hi" => ("hi-t-i0-und", "Hindi"),
    "kn" => ("kn-t-i0-und", "Kannada"),
    "ml" => ("ml-t-i0-und", "Malayalam"),
    "mr" => ("mr-t-i0-und", "Marathi"),
    "ne" => ("ne-t-i0-und", "Nepali"),
    "or" => ("or-t-i0-und", "Odia"),
    "pa" => ("pa-t-i0-und", "Punjabi"),
    "ru" => ("ru-t-i0-und", "Russian"),
    "sa" => ("sa-t-i0-und", "Sanskrit"),
    "si" => ("si-t-i0-und", "Sinhala"),
    "sr" => ("sr-t-i0-und", "Serbian"),
    "ta" => ("ta-t-i0-und", "Tamil"),
    "te" => ("te-t-i0-und", "Telugu"),
    "ti" => ("ti-t-i0-und", "Tigrinya"),
    "ur" => ("ur-t-i0-und", "Urdu"),
};

/// Input-tool tag for a short code.
pub fn input_tool_tag(code: &str) -> Option<&'static str> {
    LANGUAGES.get(code).map(|(tag, _)| *tag)
}

/// Display name for a short code or a full tag.
pub fn language_name(code_or_tag: &str) -> Option<&'static str> {
    let code = code_or_tag.split('-').next().unwrap_or(code_or_tag);
    LANGUAGES.get(code).map(|(_, name)| *name)
}

/// Accept either a short code (`te`) or a full tag and return the tag.
///
/// Unknown values are passed through unchanged so that tags not listed
/// here still reach the service.
pub fn resolve_lang(code_or_tag: &str) -> String {
    let trimmed = code_or_tag.trim();
    match input_tool_tag(&trimmed.to_ascii_lowercase()) {
        Some(tag) => tag.to_string(),
        None => trimmed.to_string(),
    }
}
