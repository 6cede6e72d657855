//! Answer-token extraction.
//!
//! Tokens are collected from anywhere in the question block, in order of
//! appearance and with duplicates kept. Nothing ties a token to the question
//! it came from, so `answers[i]` need not belong to `questions[i]`.

use serde::{Serialize, Serializer};

use super::patterns::{ANSWER_TOKEN, ANSWER_TOKEN_UPPER};

/// Multiple-choice letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// A normalized expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerToken {
    True,
    False,
    NotGiven,
    Choice(Choice),
}

impl AnswerToken {
    /// Parse a token case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        match upper.as_str() {
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "NOT GIVEN" => Some(Self::NotGiven),
            "A" => Some(Self::Choice(Choice::A)),
            "B" => Some(Self::Choice(Choice::B)),
            "C" => Some(Self::Choice(Choice::C)),
            "D" => Some(Self::Choice(Choice::D)),
            _ => None,
        }
    }

    /// Uppercase textual form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::NotGiven => "NOT GIVEN",
            Self::Choice(choice) => choice.as_str(),
        }
    }
}

impl std::fmt::Display for AnswerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for AnswerToken {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for AnswerToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Collect answer tokens from a question block.
///
/// With `case_sensitive` unset, lowercase words such as "true" or the article
/// "a" are picked up as well.
pub fn extract_answers(block: &str, case_sensitive: bool) -> Vec<AnswerToken> {
    let pattern = if case_sensitive {
        &*ANSWER_TOKEN_UPPER
    } else {
        &*ANSWER_TOKEN
    };

    pattern
        .find_iter(block)
        .filter_map(|m| AnswerToken::parse(m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_order_and_duplicates() {
        let block = "1. ... TRUE ... answer is B ... NOT GIVEN\n2. FALSE\n3. TRUE";
        assert_eq!(
            extract_answers(block, false),
            vec!["TRUE", "B", "NOT GIVEN", "FALSE", "TRUE"]
        );
    }

    #[test]
    fn test_case_insensitive_picks_up_prose() {
        let block = "Is a cat true?";
        assert_eq!(extract_answers(block, false), vec!["A", "TRUE"]);
        assert!(extract_answers(block, true).is_empty());
    }

    #[test]
    fn test_word_boundaries() {
        assert!(extract_answers("TRUEST FALSEHOOD BAD ABCD", false).is_empty());
        assert_eq!(extract_answers("(C) d.", false), vec!["C", "D"]);
    }

    #[test]
    fn test_not_given_is_one_token() {
        assert_eq!(extract_answers("not given", false), vec![AnswerToken::NotGiven]);
        assert_eq!(extract_answers("NOT  GIVEN", true), Vec::<AnswerToken>::new());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(AnswerToken::parse("b"), Some(AnswerToken::Choice(Choice::B)));
        assert_eq!(AnswerToken::parse("e"), None);
        assert_eq!(AnswerToken::parse("AB"), None);
        assert_eq!(AnswerToken::NotGiven.to_string(), "NOT GIVEN");
        assert_eq!(
            serde_json::to_string(&vec![AnswerToken::True, AnswerToken::Choice(Choice::D)]).unwrap(),
            r#"["TRUE","D"]"#
        );
    }

    #[test]
    fn test_every_choice_renders_its_own_letter() {
        let letters: Vec<String> = [Choice::A, Choice::B, Choice::C, Choice::D]
            .into_iter()
            .map(|c| AnswerToken::Choice(c).to_string())
            .collect();
        assert_eq!(letters, vec!["A", "B", "C", "D"]);
    }
}
