//! Passage / question / answer segmentation.

use serde::Serialize;
use tracing::debug;

use super::rules::{extract_answers, AnswerToken, IndicatorRules, PatternRule, QUESTION_MARKER};
use crate::error::ReadprepError;
use crate::models::config::SegmentationConfig;

/// Why the split landed where it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rule", rename_all = "snake_case")]
pub enum SplitReason {
    /// No usable input.
    EmptyInput,
    /// First line matched the named indicator rule.
    Indicator(String),
    /// A blank or "passage"/"questions" line near the midpoint.
    Landmark,
    /// Plain midpoint.
    Midpoint,
}

/// A document divided into reading passage, questions and expected answers.
///
/// `questions` and `answers` are independent sequences and may differ in
/// length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    /// Lines before the split, joined by newline.
    pub passage: String,
    /// Question fragments, each starting at a numeric marker.
    pub questions: Vec<String>,
    /// Answer tokens found in the question block.
    pub answers: Vec<AnswerToken>,
    /// Index of the first question-block line among non-empty lines.
    pub split_index: usize,
    /// How `split_index` was chosen.
    pub split_reason: SplitReason,
}

impl Segmentation {
    /// The result for input with no content.
    pub fn empty() -> Self {
        Self {
            passage: String::new(),
            questions: Vec::new(),
            answers: Vec::new(),
            split_index: 0,
            split_reason: SplitReason::EmptyInput,
        }
    }

    /// True when there is neither passage nor questions to work with.
    pub fn is_empty(&self) -> bool {
        self.passage.is_empty() && self.questions.is_empty()
    }

    /// Questions joined by newline, as embedded in the prompt.
    pub fn questions_text(&self) -> String {
        self.questions.join("\n")
    }
}

impl Default for Segmentation {
    fn default() -> Self {
        Self::empty()
    }
}

/// Splits extracted text using an ordered indicator rule set.
#[derive(Debug)]
pub struct Segmenter {
    rules: IndicatorRules,
    fallback_window: usize,
    case_sensitive_answers: bool,
}

impl Segmenter {
    /// Segmenter with the built-in IELTS indicators.
    pub fn new() -> Self {
        Self {
            rules: IndicatorRules::ielts(),
            fallback_window: 5,
            case_sensitive_answers: false,
        }
    }

    /// Build from configuration, compiling any extra indicator patterns.
    pub fn from_config(config: &SegmentationConfig) -> Result<Self, ReadprepError> {
        let mut rules = IndicatorRules::ielts();
        for (i, source) in config.extra_indicators.iter().enumerate() {
            rules.push(PatternRule::parse(format!("custom-{}", i + 1), source)?);
        }

        Ok(Self {
            rules,
            fallback_window: config.fallback_window,
            case_sensitive_answers: config.case_sensitive_answers,
        })
    }

    /// Replace the indicator rules.
    pub fn with_rules(mut self, rules: IndicatorRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the midpoint search radius.
    pub fn with_fallback_window(mut self, window: usize) -> Self {
        self.fallback_window = window;
        self
    }

    /// Only accept uppercase answer tokens.
    pub fn with_case_sensitive_answers(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_answers = case_sensitive;
        self
    }

    /// Segment a document. `None` and blank input give an empty result.
    pub fn segment<'a>(&self, text: impl Into<Option<&'a str>>) -> Segmentation {
        let Some(text) = text.into() else {
            return Segmentation::empty();
        };

        let lines: Vec<&str> = text
            .split(is_line_break)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Segmentation::empty();
        }

        let (split_index, split_reason) = self.find_split(&lines);
        debug!(
            "Split {} lines at {} ({:?})",
            lines.len(),
            split_index,
            split_reason
        );

        let passage = lines[..split_index].join("\n");
        let block = lines[split_index..].join("\n");

        let questions = split_questions(&block);
        let answers = extract_answers(&block, self.case_sensitive_answers);

        debug!(
            "Segmented: {} passage chars, {} questions, {} answers",
            passage.len(),
            questions.len(),
            answers.len()
        );

        Segmentation {
            passage,
            questions,
            answers,
            split_index,
            split_reason,
        }
    }

    fn find_split(&self, lines: &[&str]) -> (usize, SplitReason) {
        if let Some((index, rule)) = self.rules.first_indicator(lines.iter().copied()) {
            return (index, SplitReason::Indicator(rule.to_string()));
        }

        let mid = lines.len() / 2;
        let start = mid.saturating_sub(self.fallback_window);
        let end = (mid + self.fallback_window).min(lines.len());

        (start..end)
            .find(|&i| is_landmark(lines[i]))
            .map(|i| (i, SplitReason::Landmark))
            .unwrap_or((mid, SplitReason::Midpoint))
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Line terminators, form feed and Unicode separators included.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn is_landmark(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.is_empty() || lower.contains("passage") || lower.contains("questions")
}

/// Split a question block at numeric markers (`12. `), keeping each marker
/// with the text that follows it.
///
/// Text ahead of the first marker is a heading and is dropped. A block with
/// no marker at all is returned whole.
pub fn split_questions(block: &str) -> Vec<String> {
    let starts: Vec<usize> = QUESTION_MARKER.find_iter(block).map(|m| m.start()).collect();

    if starts.is_empty() {
        let whole = block.trim();
        return if whole.is_empty() {
            Vec::new()
        } else {
            vec![whole.to_string()]
        };
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(block.len());
            block[start..end].trim()
        })
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Segment with the default rules.
pub fn segment<'a>(text: impl Into<Option<&'a str>>) -> Segmentation {
    Segmenter::new().segment(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered_prose(count: usize) -> String {
        (0..count)
            .map(|i| format!("Sentence number {} of the reading text", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(segment(""), Segmentation::empty());
        assert_eq!(segment(None), Segmentation::empty());
        assert_eq!(segment(" \n \n\t"), Segmentation::empty());
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_indicator_takes_priority_over_midpoint() {
        let text = "Alpha\nBeta\nGamma\nDelta\nEpsilon\nQuestions 1-13\nZeta\nEta\nTheta\nIota\nKappa\nLambda";
        let result = segment(text);
        assert_eq!(result.split_index, 5);
        assert_eq!(
            result.split_reason,
            SplitReason::Indicator("questions-range".to_string())
        );
        assert_eq!(result.passage, "Alpha\nBeta\nGamma\nDelta\nEpsilon");
    }

    #[test]
    fn test_midpoint_fallback() {
        let result = segment(numbered_prose(20).as_str());
        assert_eq!(result.split_index, 10);
        assert_eq!(result.split_reason, SplitReason::Midpoint);
        assert_eq!(result.passage.lines().count(), 10);
    }

    #[test]
    fn test_landmark_near_midpoint() {
        let mut lines: Vec<String> = numbered_prose(20).lines().map(String::from).collect();
        lines[7] = "End of passage".to_string();
        lines[12] = "See the questions".to_string();

        let result = segment(lines.join("\n").as_str());
        // The window is scanned from its lower edge.
        assert_eq!(result.split_index, 7);
        assert_eq!(result.split_reason, SplitReason::Landmark);
    }

    #[test]
    fn test_landmark_outside_window_is_ignored() {
        let mut lines: Vec<String> = numbered_prose(20).lines().map(String::from).collect();
        lines[4] = "Reading passage".to_string();
        // Window is [5, 15): line 15 is past the end.
        lines[15] = "questions".to_string();

        let result = segment(lines.join("\n").as_str());
        assert_eq!(result.split_index, 10);
    }

    #[test]
    fn test_custom_window() {
        let mut lines: Vec<String> = numbered_prose(20).lines().map(String::from).collect();
        lines[9] = "passage ends".to_string();

        let narrow = Segmenter::new().with_fallback_window(0).segment(lines.join("\n").as_str());
        assert_eq!(narrow.split_index, 10);

        let wide = Segmenter::new().with_fallback_window(1).segment(lines.join("\n").as_str());
        assert_eq!(wide.split_index, 9);
    }

    #[test]
    fn test_short_document_may_degenerate() {
        let result = segment("Only one line");
        assert_eq!(result.split_index, 0);
        assert_eq!(result.passage, "");
        assert_eq!(result.questions, vec!["Only one line"]);
    }

    #[test]
    fn test_split_questions() {
        assert_eq!(
            split_questions("1. First question\n2. Second question"),
            vec!["1. First question", "2. Second question"]
        );
    }

    #[test]
    fn test_split_questions_multi_digit_and_heading() {
        assert_eq!(
            split_questions("Questions 9-11\n9. Nine\n10. Ten\n11. Eleven"),
            vec!["9. Nine", "10. Ten", "11. Eleven"]
        );
    }

    #[test]
    fn test_split_questions_without_markers() {
        assert_eq!(
            split_questions("(1) Which paragraph\n(2) Which writer"),
            vec!["(1) Which paragraph\n(2) Which writer"]
        );
        assert!(split_questions("  ").is_empty());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let text = "Intro paragraph.\n\nQuestions 1-3\n1. Is X true?\nTRUE\n2. Is Y true?\nFALSE";

        let strict = Segmenter::new().with_case_sensitive_answers(true).segment(text);
        assert_eq!(strict.passage, "Intro paragraph.");
        assert_eq!(
            strict.questions,
            vec!["1. Is X true?\nTRUE", "2. Is Y true?\nFALSE"]
        );
        assert_eq!(strict.answers, vec!["TRUE", "FALSE"]);
        assert_eq!(strict.split_index, 1);

        // Default matching also sees "true" inside the question prose.
        let loose = segment(text);
        assert_eq!(loose.questions, strict.questions);
        assert_eq!(loose.answers, vec!["TRUE", "TRUE", "TRUE", "FALSE"]);
    }

    #[test]
    fn test_form_feed_and_carriage_return_break_lines() {
        let result = segment("Intro paragraph.\x0cQuestions 1-3\n1. Is X?\nTRUE");
        assert_eq!(result.passage, "Intro paragraph.");
        assert_eq!(result.split_index, 1);
        assert_eq!(result.questions, vec!["1. Is X?\nTRUE"]);

        let result = segment("First line.\rSecond line.\rQuestions 1-2\r1. Why?");
        assert_eq!(result.passage, "First line.\nSecond line.");
        assert_eq!(result.split_index, 2);
        assert_eq!(result.questions, vec!["1. Why?"]);
    }

    #[test]
    fn test_unicode_separators_and_crlf() {
        let result = segment("Para one.\u{2029}Para two.\u{2028}Questions 1-1\r\n1. Who?\u{85}B");
        assert_eq!(result.passage, "Para one.\nPara two.");
        assert_eq!(result.questions, vec!["1. Who?\nB"]);
        assert_eq!(result.answers, vec!["B"]);
    }

    #[test]
    fn test_answers_and_questions_are_not_aligned() {
        let text = "Passage text here.\n1. Choose A or B\n2. Which one?\nC";
        let result = segment(text);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.answers, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_extra_indicator_from_config() {
        let config = SegmentationConfig {
            extra_indicators: vec![r"^section\s+[ivx]+$".to_string()],
            ..Default::default()
        };
        let segmenter = Segmenter::from_config(&config).unwrap();
        let result = segmenter.segment("Story line one\nStory line two\nSection IV\n1. First");
        assert_eq!(result.split_index, 2);
        assert_eq!(
            result.split_reason,
            SplitReason::Indicator("custom-1".to_string())
        );
    }

    #[test]
    fn test_bad_extra_indicator_is_config_error() {
        let config = SegmentationConfig {
            extra_indicators: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            Segmenter::from_config(&config),
            Err(ReadprepError::Config(_))
        ));
    }
}
