//! Prompt composition for the practice-page generator.

mod composer;
mod escape;

pub use composer::{compose_prompt, compose_prompt_from_text, render_answers};
pub use escape::escape_html;
