//! Reading-test segmentation: passage, questions and answers.

pub mod rules;
mod segmenter;

pub use rules::{AnswerToken, Choice, IndicatorRules, LineRule, PatternRule};
pub use segmenter::{segment, split_questions, Segmentation, Segmenter, SplitReason};
