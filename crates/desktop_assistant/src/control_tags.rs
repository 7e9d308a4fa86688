//! The `<app:launch id="..."/>` / `<app:close id="..."/>` control mini-language.
//!
//! Only the exact self-closing form is recognized. Tags naming an unknown application, and
//! anything else that merely looks like a tag, stay in the text untouched.

use std::ops::Range;

use desktop_app_contract::AppId;
use once_cell::sync::Lazy;
use regex::Regex;

/// What a control tag asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Launch or focus the application.
    Launch,
    /// Close every open instance of the application.
    Close,
}

/// One recognized control tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTag {
    /// Requested action.
    pub action: ControlAction,
    /// Target application.
    pub app_id: AppId,
    /// Byte range of the tag in the scanned text.
    pub span: Range<usize>,
}

impl ControlTag {
    /// Human-readable replacement shown in place of the tag.
    pub fn marker(&self) -> String {
        match self.action {
            ControlAction::Launch => format!("*opened {}*", self.app_id.title()),
            ControlAction::Close => format!("*closed {}*", self.app_id.title()),
        }
    }
}

/// Extracts control tags from assistant text.
pub trait ControlTagParser {
    /// Returns recognized tags in document order. Failure to parse yields no tags.
    fn parse(&self, text: &str) -> Vec<ControlTag>;
}

static CONTROL_TAG: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"<app:(launch|close) id="([a-z0-9-]+)"\s*/>"#).ok());

/// Regex-backed [`ControlTagParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexControlTagParser;

impl ControlTagParser for RegexControlTagParser {
    fn parse(&self, text: &str) -> Vec<ControlTag> {
        let Some(pattern) = CONTROL_TAG.as_ref() else {
            return Vec::new();
        };
        pattern
            .captures_iter(text)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let action = match captures.get(1)?.as_str() {
                    "launch" => ControlAction::Launch,
                    _ => ControlAction::Close,
                };
                let app_id = AppId::from_canonical_id(captures.get(2)?.as_str())?;
                Some(ControlTag {
                    action,
                    app_id,
                    span: whole.range(),
                })
            })
            .collect()
    }
}

/// Replaces each tag in `text` with its marker. `tags` must come from parsing `text`.
pub fn render_markers(text: &str, tags: &[ControlTag]) -> String {
    let mut rendered = String::with_capacity(text.len());
    let mut cursor = 0;
    for tag in tags {
        if tag.span.start < cursor || tag.span.end > text.len() {
            continue;
        }
        rendered.push_str(&text[cursor..tag.span.start]);
        rendered.push_str(&tag.marker());
        cursor = tag.span.end;
    }
    rendered.push_str(&text[cursor..]);
    rendered
}
