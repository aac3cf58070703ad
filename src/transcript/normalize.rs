/// Clean a raw transcript payload.
///
/// HTML entities are decoded until none remain, so double-encoded payloads
/// (`&amp;amp;`) come out fully decoded and the function is idempotent. Lines
/// break on `\n`, `\r` and the Unicode line separators; empty and
/// whitespace-only lines are dropped and the rest are joined with `\n`.
pub fn normalize(raw: &str) -> String {
    let decoded = decode_entities(raw);

    decoded
        .split(is_line_break)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn decode_entities(raw: &str) -> String {
    let mut text = raw.to_string();

    // every successful decode shortens the text, so this terminates
    loop {
        let decoded = html_escape::decode_html_entities(&text).into_owned();
        if decoded == text {
            return text;
        }
        text = decoded;
    }
}
