//! Regex patterns for reading-test segmentation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Section headings
    pub static ref QUESTIONS_RANGE: Regex = Regex::new(
        r"(?i)questions\s+\d+-\d+"
    ).unwrap();

    pub static ref TASK_HEADING: Regex = Regex::new(
        r"(?i)task\s+\d+"
    ).unwrap();

    pub static ref TIME_INSTRUCTION: Regex = Regex::new(
        r"(?i)you should spend about \d+ minutes on questions"
    ).unwrap();

    // Line-leading question markers
    pub static ref NUMBERED_LINE: Regex = Regex::new(
        r"^\d+\.\s+"
    ).unwrap();

    pub static ref PARENTHESIZED_LINE: Regex = Regex::new(
        r"^\(\d+\)\s+"
    ).unwrap();

    pub static ref JUDGEMENT_LINE: Regex = Regex::new(
        r"(?i)^(true|false|not given)"
    ).unwrap();

    pub static ref CHOICE_LINE: Regex = Regex::new(
        r"(?i)^[a-d]\.\s+"
    ).unwrap();

    // Question splitting: digits, a dot, then whitespace
    pub static ref QUESTION_MARKER: Regex = Regex::new(
        r"\d+\.\s"
    ).unwrap();

    // Answer tokens
    pub static ref ANSWER_TOKEN: Regex = Regex::new(
        r"(?i)\b(TRUE|FALSE|NOT GIVEN|[A-D])\b"
    ).unwrap();

    pub static ref ANSWER_TOKEN_UPPER: Regex = Regex::new(
        r"\b(TRUE|FALSE|NOT GIVEN|[A-D])\b"
    ).unwrap();
}
