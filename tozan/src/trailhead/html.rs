//! Label/value extraction from trailhead pages.
//!
//! Trailhead pages lay facts out as `<dt>label</dt><dd>value</dd>` pairs.
//! These helpers are deliberately naive string scanners tailored to that
//! layout. Tag names are matched case-insensitively on ASCII.

use super::record::Record;

/// Extract the record from a trailhead page.
///
/// Each fact on the page is followed by a note `<dt>` with no matching
/// `<dd>`, and the first pair is a page header, so value `i` belongs to
/// label `2i - 1` for `i >= 1`.
pub fn extract_record(html: &str) -> Record {
    let labels = tag_texts(html, "dt");
    let values = tag_texts(html, "dd");
    pair_fields(&labels, &values)
}

/// Pair label `2i - 1` with value `i`, for `i >= 1`.
///
/// Stops at the first `i` that runs past either list.
pub fn pair_fields(labels: &[String], values: &[String]) -> Record {
    (1..labels.len().min(values.len()))
        .map_while(|i| Some((labels.get(2 * i - 1)?.as_str(), values[i].as_str())))
        .collect()
}

/// One element found by [`elements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// Raw attribute text of the opening tag.
    pub attrs: &'a str,
    /// Raw markup between the opening and closing tags.
    pub inner: &'a str,
}

/// Every `<tag>` element in `html`, in document order.
///
/// Elements of the same name are assumed not to nest. A missing closing tag
/// runs to the end of the input.
pub fn elements<'a>(html: &'a str, tag: &str) -> Vec<Element<'a>> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lc = html.to_ascii_lowercase();
    let open = format!("<{}", tag.to_ascii_lowercase());
    let close = format!("</{}>", tag.to_ascii_lowercase());

    let mut out = Vec::new();
    let mut from = 0;
    while let Some(rel) = lc[from..].find(&open) {
        let start = from + rel;
        let after_name = start + open.len();

        // `<dt` must be followed by `>` or whitespace, not `<dtx`.
        let boundary = lc[after_name..].chars().next();
        if !matches!(boundary, Some(c) if c == '>' || c.is_ascii_whitespace() || c == '/') {
            from = after_name;
            continue;
        }

        let Some(tag_end) = lc[after_name..].find('>').map(|i| after_name + i) else {
            break;
        };
        let open_end = tag_end + 1;
        let (inner_end, next) = match lc[open_end..].find(&close) {
            Some(i) => (open_end + i, open_end + i + close.len()),
            None => (html.len(), html.len()),
        };

        out.push(Element {
            attrs: html[after_name..tag_end].trim_end_matches('/').trim(),
            inner: &html[open_end..inner_end],
        });
        from = next;
    }
    out
}

/// First line of the text content of every `<tag>` element, in order.
pub fn tag_texts(html: &str, tag: &str) -> Vec<String> {
    elements(html, tag)
        .into_iter()
        .map(|e| text_content(e.inner))
        .collect()
}

/// First line of the text inside some markup, with tags removed and
/// entities decoded.
pub fn text_content(markup: &str) -> String {
    first_line(&decode_entities(&strip_tags(markup)))
}

/// The value of attribute `name` in an opening tag's attribute text.
///
/// ```
/// use tozan::trailhead::attr_value;
///
/// assert_eq!(attr_value(r#"class="th_data" id=x"#, "id"), Some("x"));
/// assert_eq!(attr_value(r#"data-href="a" href='b'"#, "href"), Some("b"));
/// ```
pub fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let lc = attrs.to_ascii_lowercase();
    let needle = format!("{}=", name.to_ascii_lowercase());
    let mut from = 0;
    while let Some(rel) = lc[from..].find(&needle) {
        let start = from + rel;
        let value_start = start + needle.len();
        if start > 0 && !lc.as_bytes()[start - 1].is_ascii_whitespace() {
            from = value_start;
            continue;
        }
        let rest = &attrs[value_start..];
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                &body[..body.find(quote).unwrap_or(body.len())]
            }
            _ => &rest[..rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len())],
        };
        return Some(value);
    }
    None
}

/// Whether an opening tag's `class` attribute lists `class`.
pub fn has_class(attrs: &str, class: &str) -> bool {
    attr_value(attrs, "class").is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
}

/// Remove all `<...>` tags, keeping text. `<br>` becomes a newline.
fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut tag = String::new();
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name = tag.trim_start_matches('/').to_ascii_lowercase();
                if name.starts_with("br") {
                    out.push('\n');
                }
            }
            _ if in_tag => tag.push(ch),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode the handful of entities the pages use.
fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// The first line of `s`, trimmed.
fn first_line(s: &str) -> String {
    s.trim().lines().next().unwrap_or("").trim().to_string()
}
