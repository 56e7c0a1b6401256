//! Structured message text.
//!
//! Messages are assembled as a list of [`Segment`]s and turned into
//! Telegram MarkdownV2 by [`RichText::to_markdown_v2`], the only place that
//! knows the dialect's escaping rules. Text pushed into a segment is raw;
//! it is escaped on the way out.
//!
//! Mention handles are the exception: they arrive pre-formatted from the
//! engine, so [`Mention::parse`] checks that every control character in them
//! is already escaped before accepting them.

use crate::errors::ViewError;
use std::fmt;

/// Characters that carry meaning in MarkdownV2 outside of an entity.
pub const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

pub fn is_special(c: char) -> bool {
    MARKDOWN_V2_SPECIAL.contains(&c)
}

/// Escapes `text` for use in plain text or inside bold/italic spans.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_special(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes the target part of an inline link, where only `)` and `\` matter.
fn escape_link_target(target: &str) -> String {
    let mut out = String::with_capacity(target.len());
    for c in target.chars() {
        if c == ')' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Reads already-escaped MarkdownV2 text until an unescaped `stop` char
/// (or the end). Returns the unescaped text and the byte offset of `stop`.
fn unescape_until(
    input: &str,
    start: usize,
    stop: Option<char>,
) -> Result<(String, Option<usize>), ViewError> {
    let mut out = String::new();
    let mut chars = input[start..].char_indices();
    while let Some((offset, c)) = chars.next() {
        if Some(c) == stop {
            return Ok((out, Some(start + offset)));
        }
        if c == '\\' {
            match chars.next() {
                Some((_, escaped)) if (escaped as u32) >= 1 && (escaped as u32) <= 126 => {
                    out.push(escaped);
                }
                Some((_, escaped)) => {
                    return Err(ViewError::invalid_markup(
                        input,
                        format!("'{escaped}' cannot be escaped"),
                    ))
                }
                None => return Err(ViewError::invalid_markup(input, "dangling '\\'")),
            }
            continue;
        }
        if c.is_control() {
            return Err(ViewError::invalid_markup(input, "contains a control character"));
        }
        if is_special(c) {
            return Err(ViewError::invalid_markup(input, format!("unescaped '{c}'")));
        }
        out.push(c);
    }
    Ok((out, None))
}

/// Checks that `input` is valid escaped MarkdownV2 text with no entities.
pub fn ensure_escaped(input: &str) -> Result<String, ViewError> {
    unescape_until(input, 0, None).map(|(text, _)| text)
}

/// A reference to a chat user, safe to embed in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    label: String,
    link: Option<String>,
}

impl Mention {
    /// Builds a mention linking to a Telegram user id. `name` is raw text.
    pub fn user(name: impl Into<String>, user_id: i64) -> Self {
        let name = name.into();
        let label = if name.trim().is_empty() {
            user_id.to_string()
        } else {
            name
        };
        Self {
            label,
            link: Some(format!("tg://user?id={user_id}")),
        }
    }

    /// Validates a pre-formatted handle, either escaped plain text
    /// (`@poker\_fan`) or an inline link (`[Alice](tg://user?id=42)`).
    pub fn parse(handle: &str) -> Result<Self, ViewError> {
        if handle.trim().is_empty() {
            return Err(ViewError::invalid_markup(handle, "empty mention"));
        }
        if !handle.starts_with('[') {
            let label = ensure_escaped(handle)?;
            return Ok(Self { label, link: None });
        }

        let (label, close) = unescape_until(handle, 1, Some(']'))?;
        let close = close.ok_or_else(|| ViewError::invalid_markup(handle, "unclosed '['"))?;
        if label.trim().is_empty() {
            return Err(ViewError::invalid_markup(handle, "empty link text"));
        }
        let rest = &handle[close + 1..];
        let target = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| ViewError::invalid_markup(handle, "expected '(target)' after ']'"))?;
        if target.is_empty() {
            return Err(ViewError::invalid_markup(handle, "empty link target"));
        }
        if let Some(bad) = target
            .chars()
            .find(|&c| c == ')' || c == '(' || c == '\\' || c.is_whitespace() || c.is_control())
        {
            return Err(ViewError::invalid_markup(
                handle,
                format!("link target contains {bad:?}"),
            ));
        }
        Ok(Self {
            label,
            link: Some(target.to_string()),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    fn write_markdown_v2(&self, out: &mut String) {
        match &self.link {
            Some(link) => {
                out.push('[');
                out.push_str(&escape_markdown_v2(&self.label));
                out.push_str("](");
                out.push_str(&escape_link_target(link));
                out.push(')');
            }
            None => out.push_str(&escape_markdown_v2(&self.label)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Bold(String),
    Italic(String),
    Mention(Mention),
    LineBreak,
}

/// Message text as an ordered list of styled segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    segments: Vec<Segment>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Plain(text.into()));
        self
    }

    pub fn bold(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Bold(text.into()));
        self
    }

    pub fn italic(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Italic(text.into()));
        self
    }

    pub fn mention(mut self, mention: Mention) -> Self {
        self.segments.push(Segment::Mention(mention));
        self
    }

    pub fn line_break(mut self) -> Self {
        self.segments.push(Segment::LineBreak);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|segment| match segment {
            Segment::Plain(text) | Segment::Bold(text) | Segment::Italic(text) => text.is_empty(),
            Segment::Mention(_) | Segment::LineBreak => false,
        })
    }

    /// Serializes to Telegram MarkdownV2.
    pub fn to_markdown_v2(&self) -> String {
        let mut out = String::new();
        let mut after_italic = false;
        for segment in &self.segments {
            match segment {
                // empty entities are rejected by the Bot API
                Segment::Bold(text) | Segment::Italic(text) if text.is_empty() => continue,
                Segment::Plain(text) => out.push_str(&escape_markdown_v2(text)),
                Segment::Bold(text) => {
                    out.push('*');
                    out.push_str(&escape_markdown_v2(text));
                    out.push('*');
                }
                Segment::Italic(text) => {
                    // "__" would open an underline; Telegram drops the '\r'
                    if after_italic {
                        out.push('\r');
                    }
                    out.push('_');
                    out.push_str(&escape_markdown_v2(text));
                    out.push('_');
                }
                Segment::Mention(mention) => mention.write_markdown_v2(&mut out),
                Segment::LineBreak => out.push('\n'),
            }
            after_italic = matches!(segment, Segment::Italic(_));
        }
        out
    }

    /// The text without any styling, as a reader would see it.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Plain(text) | Segment::Bold(text) | Segment::Italic(text) => {
                    out.push_str(text)
                }
                Segment::Mention(mention) => out.push_str(mention.label()),
                Segment::LineBreak => out.push('\n'),
            }
        }
        out
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        RichText::new().plain(text)
    }
}

impl From<String> for RichText {
    fn from(text: String) -> Self {
        RichText::new().plain(text)
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain())
    }
}
