//! Pull the raw description out of a watch page.
//!
//! Tried in order, first non-empty result wins:
//! 1. `videoDetails.shortDescription` of the embedded `ytInitialPlayerResponse` JSON
//! 2. any `"shortDescription":"…"` JSON string in the page
//! 3. `<meta name="description">`
//! 4. `<meta property="og:description">`

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

static SHORT_DESCRIPTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r#""shortDescription"\s*:\s*"((?:[^"\\]|\\.)*)""#));
static META_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"(?is)<meta\b[^>]*>"));
static ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#));
static NUMERIC_ENTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"&#(?:[xX]([0-9A-Fa-f]{1,6})|([0-9]{1,7}));"));

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Covered by the `patterns_compile` test.
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

/// Raw description text, or `None` if the page has none.
pub fn extract_description(html: &str) -> Option<String> {
    from_player_response(html)
        .or_else(|| from_raw_field(html))
        .or_else(|| from_meta(html, "name", "description"))
        .or_else(|| from_meta(html, "property", "og:description"))
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn from_player_response(html: &str) -> Option<String> {
    let at = html.find(PLAYER_RESPONSE_MARKER)?;
    let rest = &html[at + PLAYER_RESPONSE_MARKER.len()..];
    let open = rest.find('{')?;
    let json = balanced_object(&rest[open..])?;
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let text = value.pointer("/videoDetails/shortDescription")?.as_str()?;
    non_empty(text.to_string())
}

/// The `{…}` prefix of `s` with balanced braces, ignoring braces inside strings.
fn balanced_object(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn from_raw_field(html: &str) -> Option<String> {
    let caps = SHORT_DESCRIPTION_REGEX.captures(html)?;
    let literal = format!("\"{}\"", caps.get(1)?.as_str());
    let text: String = serde_json::from_str(&literal).ok()?;
    non_empty(text)
}

fn from_meta(html: &str, key_attr: &str, key: &str) -> Option<String> {
    META_TAG_REGEX.find_iter(html).find_map(|tag| {
        let attrs: HashMap<String, &str> = ATTR_REGEX
            .captures_iter(tag.as_str())
            .filter_map(|c| {
                let name = c.get(1)?.as_str().to_ascii_lowercase();
                let value = c.get(2).or_else(|| c.get(3))?.as_str();
                Some((name, value))
            })
            .collect();
        if !attrs.get(key_attr)?.eq_ignore_ascii_case(key) {
            return None;
        }
        non_empty(decode_entities(attrs.get("content")?))
    })
}

/// Decode the HTML entities that show up in meta attributes.
pub fn decode_entities(s: &str) -> String {
    let numeric = NUMERIC_ENTITY_REGEX.replace_all(s, |c: &regex::Captures<'_>| {
        let code = match (c.get(1), c.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| c[0].to_string())
    });
    numeric
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
