// raw line handling - bytes off the wire to a clean text line

const BOM: char = '\u{feff}';

/// Decode a datagram into a single text line.
///
/// Invalid UTF-8 is replaced (U+FFFD) rather than rejected, surrounding
/// whitespace is trimmed and a leading byte-order mark is dropped.
pub fn decode_datagram(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    strip_bom(text.trim()).trim_start().to_string()
}

pub fn strip_bom(line: &str) -> &str {
    line.strip_prefix(BOM).unwrap_or(line)
}
