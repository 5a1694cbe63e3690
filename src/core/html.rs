// src/core/html.rs
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    super::sanitize::normalize_ws(&out)
}

/// Every double-quoted string in `s`, in order, with `\"` and `\\` unescaped.
/// Whatever sits between the quotes (brackets, commas, whitespace) is ignored.
pub fn quoted_strings(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch != '"' { continue; }

        let mut cur = s!();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(esc) = chars.next() { cur.push(esc); }
                }
                '"' => { closed = true; break; }
                _ => cur.push(c),
            }
        }
        if closed { out.push(cur); }
    }
    out
}
