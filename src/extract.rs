/// Normalize whitespace and punctuation spacing in text lifted out of
/// display markup.
///
/// - non-breaking spaces become ordinary spaces
/// - runs of inline whitespace collapse to a single space
/// - newline runs, together with whitespace around them, collapse to a
///   single newline
/// - a missing space is inserted after sentence punctuation
/// - leading and trailing whitespace is trimmed
pub fn normalize_extracted_text(text: &str) -> String {
    let text = text.replace('\u{00A0}', " ");
    let text = collapse_whitespace(&text);
    let text = space_after_punctuation(&text);
    text.trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    let mut run_has_newline = false;

    for c in text.chars() {
        if c.is_whitespace() {
            in_run = true;
            if c == '\n' {
                run_has_newline = true;
            }
            continue;
        }

        if in_run {
            out.push(if run_has_newline { '\n' } else { ' ' });
            in_run = false;
            run_has_newline = false;
        }
        out.push(c);
    }

    out
}

fn space_after_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if matches!(c, '.' | ',' | '!' | '?' | ';' | ':') {
            if let Some(next) = chars.peek() {
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
        }
    }

    out
}
