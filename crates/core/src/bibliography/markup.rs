//! Line-level recognition and cleanup of wiki markup.
//!
//! Only what the volume-list template family needs: headings, the
//! `{{Graphic novel list}}` template and its `| Field = value` lines,
//! `{{:Sub page}}` transclusions and the print infobox.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(=+)\s*(.*?)\s*(=+)\s*$").unwrap());

static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\|\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$").unwrap());

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static REF_SELF_CLOSING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<ref\b[^>]*/>").unwrap());

static REF_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<ref\b[^>]*>.*?</ref\s*>").unwrap());

/// Unterminated `<ref>` left on a line whose closing tag sits further down.
static REF_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<ref\b[^>]*>.*$").unwrap());

static BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static PIPED_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[[^\]|]*\|([^\]]*)\]\]").unwrap());

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\]]*)\]\]").unwrap());

static TRANSCLUSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\{\{\s*:\s*([^{}|]+?)\s*\}\}\s*$").unwrap());

const VOLUME_TEMPLATE: &str = "{{graphic novel list";

/// Templates whose positional arguments make up a date.
const DATE_TEMPLATES: &[&str] = &["start date", "start date and age", "dts", "date"];

/// A heading line: `== Text ==` through `==== Text ====`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// Recognize a level 2-4 heading line. Other levels are treated as ordinary text.
pub fn parse_heading(line: &str) -> Option<Heading> {
    let line = COMMENT_RE.replace_all(line, "");
    let caps = HEADING_RE.captures(line.trim())?;
    let level = caps[1].len().min(caps[3].len());
    if !(2..=4).contains(&level) {
        return None;
    }

    Some(Heading {
        level: level as u8,
        text: heading_label(&caps[2]),
    })
}

/// Display text of a heading. Template-only headings such as
/// `{{nihongo|Title|原題}}` fall back to the template's first positional argument.
fn heading_label(raw: &str) -> String {
    let cleaned = clean_field_value(raw).replace("''", "");
    let cleaned = cleaned.trim();
    if !cleaned.is_empty() {
        return cleaned.to_string();
    }

    if let Some(start) = raw.find("{{") {
        if let Some(len) = matching_close(&raw[start..]) {
            let inner = &raw[start + 2..start + len - 2];
            let label = split_template_args(inner)
                .into_iter()
                .skip(1)
                .filter(|arg| !arg.contains('='))
                .map(|arg| clean_field_value(arg).replace("''", ""))
                .find(|arg| !arg.trim().is_empty());
            if let Some(label) = label {
                return label.trim().to_string();
            }
        }
    }

    raw.trim().to_string()
}

/// True when the line opens a `{{Graphic novel list}}` entry (not its header or footer).
pub fn is_volume_template_open(line: &str) -> bool {
    let lower = line.to_lowercase();
    let Some(pos) = lower.find(VOLUME_TEMPLATE) else {
        return false;
    };
    let rest = lower[pos + VOLUME_TEMPLATE.len()..].trim_start();
    !(rest.starts_with("/header") || rest.starts_with("/footer"))
}

/// Split a `| FieldName = value` line into a lower-cased name and a cleaned value.
pub fn parse_field_line(line: &str) -> Option<(String, String)> {
    let caps = FIELD_RE.captures(line)?;
    let name = caps[1].to_lowercase();
    let value = clean_field_value(&caps[2]);
    Some((name, value))
}

/// Title of a `{{:Sub page}}` transclusion listing chapters or volumes.
pub fn transclusion_target(line: &str) -> Option<String> {
    let caps = TRANSCLUSION_RE.captures(line)?;
    let title = caps[1].trim();
    let lower = title.to_lowercase();
    if lower.contains("chapter") || lower.contains("volume") {
        Some(title.to_string())
    } else {
        None
    }
}

/// Strip references and templates, resolve links and drop bold markup.
pub fn clean_field_value(raw: &str) -> String {
    let text = COMMENT_RE.replace_all(raw, "");
    let text = REF_SELF_CLOSING_RE.replace_all(&text, "");
    let text = REF_BLOCK_RE.replace_all(&text, "");
    let text = REF_OPEN_RE.replace_all(&text, "");
    let text = BREAK_RE.replace_all(&text, " ");
    let text = render_templates(&text);
    let text = PIPED_LINK_RE.replace_all(&text, "$1");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = text.replace("'''", "");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace every top-level `{{...}}` with its rendering.
fn render_templates(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        match matching_close(&rest[start..]) {
            Some(len) => {
                let inner = &rest[start + 2..start + len - 2];
                out.push_str(&render_template(inner));
                rest = &rest[start + len..];
            }
            None => {
                // Unbalanced: drop the remainder of the template.
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length of the balanced `{{...}}` starting at the beginning of `text`.
fn matching_close(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'}' && bytes[i + 1] == b'}' {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return Some(i);
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Split template arguments on `|`, ignoring pipes inside nested templates and links.
fn split_template_args(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'[' if i + 1 < bytes.len() && bytes[i + 1] == bytes[i] => {
                depth += 1;
                i += 2;
                continue;
            }
            b'}' | b']' if i + 1 < bytes.len() && bytes[i + 1] == bytes[i] => {
                depth -= 1;
                i += 2;
                continue;
            }
            b'|' if depth == 0 => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    args.push(&inner[start..]);
    args
}

fn render_template(inner: &str) -> String {
    let args = split_template_args(inner);
    let name = args[0].trim().to_lowercase();
    let positional: Vec<&str> = args[1..]
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty() && !a.contains('='))
        .collect();

    if DATE_TEMPLATES.contains(&name.as_str()) {
        let parts: Vec<&str> = positional
            .iter()
            .copied()
            .filter(|a| a.chars().all(|c| c.is_ascii_digit()))
            .collect();
        return parts.join("-");
    }

    if name == "isbn" {
        return positional
            .first()
            .map(|a| clean_field_value(a))
            .unwrap_or_default();
    }

    String::new()
}

/// Series-level facts read from the print infobox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesMetadata {
    pub author: Option<String>,
    pub is_complete: bool,
}

/// Read author and completion status from the first `{{Infobox animanga/Print}}` block.
pub fn extract_series_metadata(markup: &str) -> SeriesMetadata {
    let mut metadata = SeriesMetadata::default();
    let mut in_infobox = false;
    let mut last: Option<String> = None;

    for line in markup.lines() {
        let lower = line.to_lowercase();
        if !in_infobox {
            if lower.contains("{{infobox animanga/print") {
                in_infobox = true;
            }
            continue;
        }

        if line.trim_start().starts_with("}}") || lower.contains("{{infobox") {
            break;
        }

        let Some((name, value)) = parse_field_line(line) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match name.as_str() {
            "author" | "writer" if metadata.author.is_none() => {
                metadata.author = Some(value);
            }
            "last" => last = Some(value),
            _ => {}
        }
    }

    metadata.is_complete = last
        .map(|l| {
            let l = l.to_lowercase();
            !l.contains("present") && !l.contains("ongoing")
        })
        .unwrap_or(false);

    metadata
}
