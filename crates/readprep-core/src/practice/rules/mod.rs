//! Ordered line rules that detect where the question section starts.

pub mod answers;
pub mod patterns;

pub use answers::{extract_answers, AnswerToken, Choice};
pub use patterns::*;

use regex::Regex;

use crate::error::ReadprepError;

/// A predicate over a single trimmed line.
pub trait LineRule: Send + Sync {
    /// Short name used in logs and split diagnostics.
    fn name(&self) -> &str;

    /// Whether the line satisfies the rule.
    fn matches(&self, line: &str) -> bool;
}

/// A rule backed by a regular expression searched anywhere in the line.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    pattern: Regex,
}

impl PatternRule {
    /// Create a rule from a compiled pattern.
    pub fn new(name: impl Into<String>, pattern: Regex) -> Self {
        Self {
            name: name.into(),
            pattern,
        }
    }

    /// Compile a case-insensitive rule from source.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, ReadprepError> {
        let pattern = Regex::new(&format!("(?i){}", source))
            .map_err(|e| ReadprepError::Config(format!("invalid indicator pattern {:?}: {}", source, e)))?;
        Ok(Self::new(name, pattern))
    }
}

impl LineRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

/// Ordered set of question-start indicators.
///
/// A line is an indicator when any rule matches; the first matching rule in
/// order is reported.
pub struct IndicatorRules {
    rules: Vec<Box<dyn LineRule>>,
}

impl IndicatorRules {
    /// An empty rule set.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in IELTS reading indicators.
    pub fn ielts() -> Self {
        let builtin = [
            ("questions-range", &*QUESTIONS_RANGE),
            ("task-heading", &*TASK_HEADING),
            ("time-instruction", &*TIME_INSTRUCTION),
            ("numbered-line", &*NUMBERED_LINE),
            ("parenthesized-line", &*PARENTHESIZED_LINE),
            ("judgement-line", &*JUDGEMENT_LINE),
            ("choice-line", &*CHOICE_LINE),
        ];

        let mut rules = Self::empty();
        for (name, pattern) in builtin {
            rules.push(PatternRule::new(name, pattern.clone()));
        }
        rules
    }

    /// Append a rule after the existing ones.
    pub fn push(&mut self, rule: impl LineRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_rule(mut self, rule: impl LineRule + 'static) -> Self {
        self.push(rule);
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Name of the first rule matching `line`.
    pub fn matching_rule(&self, line: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(line))
            .map(|rule| rule.name())
    }

    /// Index of the first indicator line and the rule that matched it.
    pub fn first_indicator<'a, I>(&self, lines: I) -> Option<(usize, &str)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .enumerate()
            .find_map(|(i, line)| self.matching_rule(line).map(|name| (i, name)))
    }
}

impl Default for IndicatorRules {
    fn default() -> Self {
        Self::ielts()
    }
}

impl std::fmt::Debug for IndicatorRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name()))
            .finish()
    }
}
