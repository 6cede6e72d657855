use serde::Serialize;
use uuid::Uuid;

use crate::error::GenerationError;

/// A generated practice page ready to be written or sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HtmlArtifact {
    /// The HTML document.
    pub html: String,
    /// Randomized file name, `<uuid>.html`.
    pub file_name: String,
}

impl HtmlArtifact {
    /// Validate raw model output.
    ///
    /// Surrounding whitespace and a Markdown code fence are removed. The rest
    /// must contain `<html` in any letter case.
    pub fn from_response(raw: &str) -> Result<Self, GenerationError> {
        let html = strip_code_fence(raw.trim()).trim();
        if !html.to_ascii_lowercase().contains("<html") {
            return Err(GenerationError::MalformedHtml);
        }

        Ok(Self {
            html: html.to_string(),
            file_name: format!("{}.html", Uuid::new_v4()),
        })
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> usize {
        self.html.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Remove a leading ```` ```lang ```` line and trailing ```` ``` ```` if both exist.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string on the opening line.
    match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_document() {
        let artifact = HtmlArtifact::from_response("  <!DOCTYPE html><html><body>x</body></html>\n").unwrap();
        assert_eq!(artifact.html, "<!DOCTYPE html><html><body>x</body></html>");
        assert!(artifact.file_name.ends_with(".html"));
        assert_eq!(artifact.file_name.len(), 36 + 5);
    }

    #[test]
    fn test_fenced_document() {
        let raw = "```html\n<HTML><body>fenced</body></HTML>\n```";
        let artifact = HtmlArtifact::from_response(raw).unwrap();
        assert_eq!(artifact.html, "<HTML><body>fenced</body></HTML>");
    }

    #[test]
    fn test_unclosed_fence_is_kept() {
        let raw = "```html\n<html></html>";
        let artifact = HtmlArtifact::from_response(raw).unwrap();
        assert_eq!(artifact.html, raw);
    }

    #[test]
    fn test_missing_html_tag() {
        assert!(matches!(
            HtmlArtifact::from_response("Sorry, I cannot help with that."),
            Err(GenerationError::MalformedHtml)
        ));
        assert!(matches!(
            HtmlArtifact::from_response(""),
            Err(GenerationError::MalformedHtml)
        ));
    }

    #[test]
    fn test_file_names_are_unique() {
        let a = HtmlArtifact::from_response("<html></html>").unwrap();
        let b = HtmlArtifact::from_response("<html></html>").unwrap();
        assert_ne!(a.file_name, b.file_name);
    }
}
