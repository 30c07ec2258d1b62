//! Printable string extraction from raw memory.

/// Minimum run length used when none (or zero) is configured.
pub const DEFAULT_MIN_STRING_LENGTH: usize = 4;

/// Number of strings shown per region in console and log previews.
pub const PREVIEW_STRING_COUNT: usize = 3;

/// Resolves the configured minimum, treating unset and zero as the default.
pub fn effective_min_length(configured: Option<usize>) -> usize {
    match configured {
        Some(n) if n > 0 => n,
        _ => DEFAULT_MIN_STRING_LENGTH,
    }
}

/// ASCII letters, digits, punctuation and the standard whitespace characters.
pub fn is_printable(b: u8) -> bool {
    b.is_ascii_graphic() || matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Single-pass iterator over printable runs in a byte buffer.
#[derive(Debug)]
pub struct PrintableStrings<'a> {
    bytes: &'a [u8],
    pos: usize,
    min_length: usize,
}

impl<'a> PrintableStrings<'a> {
    pub fn new(bytes: &'a [u8], min_length: usize) -> Self {
        Self {
            bytes,
            pos: 0,
            min_length: min_length.max(1),
        }
    }
}

impl Iterator for PrintableStrings<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let run = self.bytes[start..]
                .iter()
                .take_while(|&&b| is_printable(b))
                .count();
            // Step past the run and the terminating non-printable byte
            self.pos = start + run + 1;

            if run >= self.min_length {
                let text = &self.bytes[start..start + run];
                return Some(text.iter().map(|&b| b as char).collect());
            }
        }
        None
    }
}

/// Lazily yields printable runs of at least `min_length` bytes.
pub fn extract_strings(bytes: &[u8], min_length: Option<usize>) -> PrintableStrings<'_> {
    PrintableStrings::new(bytes, effective_min_length(min_length))
}

/// First few strings of a chunk, for previews.
pub fn preview_strings(bytes: &[u8], min_length: Option<usize>) -> Vec<String> {
    extract_strings(bytes, min_length)
        .take(PREVIEW_STRING_COUNT)
        .collect()
}
