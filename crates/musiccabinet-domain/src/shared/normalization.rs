use unicode_normalization::UnicodeNormalization;

/// Identity key for artist, album and track names.
///
/// Names are trimmed, composed to NFC and upper-cased with full Unicode case
/// mapping, so "Björk", "BJÖRK" and a decomposed "Bjo\u{308}rk" share one key.
pub fn normalize_name(name: &str) -> String {
    name.trim().nfc().collect::<String>().to_uppercase()
}
