use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Escapes `&`, `<`, `>`, `"` and `'` for use in text or attribute values.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    escape_with(input, true)
}

/// Escapes `&`, `<` and `>` only; enough for text node content.
pub fn escape_text(input: &str) -> Cow<'_, str> {
    escape_with(input, false)
}

fn escape_with(input: &str, quotes: bool) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    let needs_escape = memchr3(b'&', b'<', b'>', bytes).is_some()
        || (quotes && (memchr(b'"', bytes).is_some() || memchr(b'\'', bytes).is_some()));
    if !needs_escape {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        _ => return None,
    })
}

/// Decodes character references. Unknown or malformed references are kept
/// verbatim.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len());
    out.push_str(&input[..first]);
    let mut rest = &input[first..];

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        // Only look for the `;` within the next 34 chars.
        let window_end = rest
            .char_indices()
            .take(34)
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(rest.len());
        let consumed = rest[..window_end]
            .find(';')
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|s| (s, semi + 1)));
        match consumed {
            Some((decoded, len)) => {
                out.push_str(&decoded);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        let ch = char::from_u32(code).filter(|c| *c != '\0').unwrap_or('\u{fffd}');
        return Some(ch.to_string());
    }
    named_entity(body).map(str::to_string)
}
