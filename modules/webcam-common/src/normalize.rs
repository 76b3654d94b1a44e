use unicode_normalization::UnicodeNormalization;

/// Make a video title safe for an M3U `#EXTINF` line.
///
/// Compatibility-decomposes the title (so `é` becomes `e` + combining accent
/// and fullwidth letters become ASCII) and keeps only printable ASCII. Runs
/// of ASCII whitespace become a single space and both ends are trimmed.
/// Non-ASCII separators (U+2028, U+1680, U+0085) are dropped like any other
/// non-ASCII character, so they never split words.
pub fn clean_title(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.nfkd() {
        if is_ascii_space(c) {
            pending_space = true;
            continue;
        }
        if !c.is_ascii_graphic() {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

/// ASCII whitespace including vertical tab, which `char::is_ascii_whitespace`
/// leaves out.
fn is_ascii_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}
