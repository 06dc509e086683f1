use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};

const SCHEMES: &[&str] = &["https://", "http://", "www."];

/// Byte range and href of the next bare URL in `text` at or after `from`.
fn next_url(text: &str, from: usize) -> Option<(usize, usize, String)> {
    let lower = text.to_ascii_lowercase();
    let mut search = from;
    loop {
        let (start, scheme) = SCHEMES
            .iter()
            .filter_map(|s| lower[search..].find(s).map(|i| (search + i, *s)))
            .min_by_key(|(i, _)| *i)?;

        let boundary_ok = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric() && c != '@' && c != '/' && c != '.');
        let raw_end = text[start..]
            .find(|c: char| c.is_whitespace() || c == '<' || c == '>' || c == '`')
            .map(|i| start + i)
            .unwrap_or(text.len());
        let end = trim_trailing(text, start, raw_end);

        if boundary_ok && end > start + scheme.len() && has_host(&text[start + scheme.len()..end]) {
            let url = &text[start..end];
            let href = if scheme == "www." {
                format!("http://{url}")
            } else {
                url.to_string()
            };
            return Some((start, end, href));
        }
        search = start + scheme.len();
    }
}

fn has_host(after_scheme: &str) -> bool {
    let host: &str = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("");
    !host.is_empty() && host.chars().any(|c| c.is_alphanumeric())
}

/// Drops trailing punctuation and unbalanced closing parens.
fn trim_trailing(text: &str, start: usize, mut end: usize) -> usize {
    loop {
        let Some(last) = text[start..end].chars().next_back() else {
            return end;
        };
        let drop = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '\'' | '"' | '*' | '_' | '~' => true,
            ')' => {
                let slice = &text[start..end];
                slice.matches(')').count() > slice.matches('(').count()
            }
            _ => false,
        };
        if !drop {
            return end;
        }
        end -= last.len_utf8();
    }
}

/// Pushes `text` as events, turning bare URLs into autolinks.
pub(super) fn push_linkified<'a>(events: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    let mut cursor = 0;
    let mut found = false;
    while let Some((start, end, href)) = next_url(&text, cursor) {
        found = true;
        if start > cursor {
            events.push(Event::Text(CowStr::from(text[cursor..start].to_string())));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(href),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(CowStr::from(text[start..end].to_string())));
        events.push(Event::End(TagEnd::Link));
        cursor = end;
    }
    if !found {
        events.push(Event::Text(text));
    } else if cursor < text.len() {
        events.push(Event::Text(CowStr::from(text[cursor..].to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(text: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = 0;
        while let Some((_, end, href)) = next_url(text, cursor) {
            out.push(href);
            cursor = end;
        }
        out
    }

    #[test]
    fn finds_scheme_and_www_urls() {
        assert_eq!(
            urls("see https://example.com/a?b=1 and www.rust-lang.org."),
            vec!["https://example.com/a?b=1", "http://www.rust-lang.org"]
        );
    }

    #[test]
    fn trims_punctuation_and_unbalanced_parens() {
        assert_eq!(urls("(https://example.com/x)"), vec!["https://example.com/x"]);
        assert_eq!(
            urls("https://en.wikipedia.org/wiki/Rust_(language)!"),
            vec!["https://en.wikipedia.org/wiki/Rust_(language)"]
        );
    }

    #[test]
    fn ignores_embedded_and_hostless_matches() {
        assert!(urls("mailto:someonehttps://x").is_empty());
        assert!(urls("https:// nothing here").is_empty());
        assert!(urls("plain words only").is_empty());
    }

    #[test]
    fn untouched_text_is_pushed_as_is() {
        let mut events = Vec::new();
        push_linkified(&mut events, CowStr::Borrowed("no links"));
        assert_eq!(events, vec![Event::Text(CowStr::Borrowed("no links"))]);
    }
}
