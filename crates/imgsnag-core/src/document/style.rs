//! Inline style and `srcset` parsing for the static HTML adapter.

/// Splits `s` on `sep` outside of quotes and parentheses.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                c if c == sep && depth == 0 => {
                    parts.push(&s[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Parses a `style` attribute into `(lowercased property, value)` pairs in
/// declaration order, with `!important` stripped.
pub(super) fn parse_declarations(style: &str) -> Vec<(String, String)> {
    split_top_level(style, ';')
        .into_iter()
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            let mut value = value.trim();
            if let Some(idx) = value.to_ascii_lowercase().rfind("!important") {
                value = value[..idx].trim_end();
            }
            Some((name, value.to_string()))
        })
        .collect()
}

/// Inline style properties relevant to the background pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub(super) struct InlineStyle {
    pub background_image: Option<String>,
    pub display: Option<String>,
    pub visibility: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl InlineStyle {
    /// Later declarations win, and the `background` shorthand resets the image.
    pub fn parse(style: &str) -> Self {
        let mut out = InlineStyle::default();
        for (name, value) in parse_declarations(style) {
            match name.as_str() {
                "background-image" | "background" => out.background_image = Some(value),
                "display" => out.display = Some(value),
                "visibility" => out.visibility = Some(value),
                "width" => out.width = parse_length(&value),
                "height" => out.height = parse_length(&value),
                _ => {}
            }
        }
        out
    }
}

/// Parses `12`, `12px` or `12.5px`. Relative units are unknown (`None`).
pub(super) fn parse_length(value: &str) -> Option<f64> {
    let v = value.trim();
    let number = v
        .strip_suffix("px")
        .or_else(|| v.strip_suffix("PX"))
        .unwrap_or(v)
        .trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Picks the largest candidate of a `srcset` value.
///
/// Width descriptors (`640w`) and density descriptors (`2x`) are compared by
/// their number; a candidate without a descriptor counts as `1x`. Returns
/// `None` when the attribute has no candidates.
pub(super) fn best_srcset_candidate(srcset: &str) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    let mut rest = srcset;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let mut url = &rest[..url_end];
        rest = &rest[url_end..];

        let descriptor = if url.ends_with(',') {
            url = url.trim_end_matches(',');
            ""
        } else {
            let desc_end = rest.find(',').unwrap_or(rest.len());
            let d = rest[..desc_end].trim();
            rest = &rest[desc_end..];
            d
        };
        if url.is_empty() {
            continue;
        }

        let weight = descriptor
            .split_whitespace()
            .find_map(|d| {
                let unit = d.chars().last()?;
                if unit == 'w' || unit == 'x' {
                    d[..d.len() - 1].parse::<f64>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(1.0);
        if best.map_or(true, |(_, w)| weight > w) {
            best = Some((url, weight));
        }
    }
    best.map(|(url, _)| url)
}
