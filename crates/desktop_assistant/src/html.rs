//! Splits HTML documents out of assistant text for the sandboxed preview.

use system_shell_contract::HtmlPreview;

const FENCE_OPEN: &str = "```html";
const FENCE: &str = "```";

/// Assistant text with any HTML document separated out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlSplit {
    /// Text to show as plain output.
    pub text: String,
    /// HTML to render, if any.
    pub preview: Option<HtmlPreview>,
}

/// Finds the first fenced ```` ```html ```` block, complete or still streaming, or else a bare
/// document starting at `<!DOCTYPE html` or `<html`.
pub fn extract_html(content: &str) -> HtmlSplit {
    let lower = content.to_ascii_lowercase();
    if let Some(open) = lower.find(FENCE_OPEN) {
        let body_start = content[open + FENCE_OPEN.len()..]
            .find('\n')
            .map_or(content.len(), |newline| open + FENCE_OPEN.len() + newline + 1);
        let before = &content[..open];
        return match content[body_start..].find(FENCE) {
            Some(close) => split(
                before,
                &content[body_start..body_start + close],
                &content[body_start + close + FENCE.len()..],
                false,
            ),
            None => split(before, &content[body_start..], "", true),
        };
    }

    let bare = [lower.find("<!doctype html"), lower.find("<html")]
        .into_iter()
        .flatten()
        .min();
    if let Some(start) = bare {
        return match lower[start..].find("</html>") {
            Some(close) => {
                let end = start + close + "</html>".len();
                split(&content[..start], &content[start..end], &content[end..], false)
            }
            None => split(&content[..start], &content[start..], "", true),
        };
    }

    HtmlSplit {
        text: content.to_string(),
        preview: None,
    }
}

fn split(before: &str, html: &str, after: &str, is_streaming: bool) -> HtmlSplit {
    let text = [before.trim(), after.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    HtmlSplit {
        text,
        preview: Some(HtmlPreview {
            html: html.trim().to_string(),
            is_streaming,
        }),
    }
}
