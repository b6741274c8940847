/// File extension every page file carries
pub const PAGE_EXTENSION: &str = ".txt";

/// A title is non-empty and made of ASCII letters and digits only.
/// Nothing is trimmed or case-folded.
pub fn is_valid_title(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Map a file name back to its page title, if it is a page file
pub fn page_stem(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(PAGE_EXTENSION)
        .filter(|stem| !stem.is_empty())
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// First value of `key` in an `application/x-www-form-urlencoded` string.
///
/// Values come back as raw bytes, so `%FF` stays a single 0xFF byte. Pairs
/// with a malformed percent escape are skipped.
pub fn form_value(encoded: &[u8], key: &str) -> Option<Vec<u8>> {
    for pair in encoded.split(|&b| b == b'&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = match pair.iter().position(|&b| b == b'=') {
            Some(eq) => (&pair[..eq], &pair[eq + 1..]),
            None => (pair, &[][..]),
        };
        let Some(decoded_key) = percent_decode(raw_key) else {
            continue;
        };
        if decoded_key != key.as_bytes() {
            continue;
        }
        if let Some(value) = percent_decode(raw_value) {
            return Some(value);
        }
    }
    None
}

/// Decode `+` and `%XX` escapes, or `None` on a broken escape
fn percent_decode(input: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hi = hex_value(*input.get(i + 1)?)?;
                let lo = hex_value(*input.get(i + 2)?)?;
                out.push((hi << 4) | lo);
                i += 2;
            }
            b => out.push(b),
        }
        i += 1;
    }
    Some(out)
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
