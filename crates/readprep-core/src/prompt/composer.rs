//! Renders a segmentation into the practice-page instruction document.

use super::escape::escape_html;
use crate::practice::{segment, AnswerToken, Segmentation};

/// Render answers as a script-level array literal, e.g. `["TRUE", "B"]`.
pub fn render_answers(answers: &[AnswerToken]) -> String {
    let quoted: Vec<String> = answers.iter().map(|a| format!("\"{}\"", a)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Build the generation prompt for a segmented document.
///
/// Only the passage, question and answer slots vary between calls.
pub fn compose_prompt(segmentation: &Segmentation) -> String {
    let passage = escape_html(&segmentation.passage);
    let questions = escape_html(&segmentation.questions_text());
    let answers = render_answers(&segmentation.answers);

    format!(
        r#"
Create a complete IELTS Reading Practice HTML page based on the provided content. The page must be a single, standalone HTML file with all CSS and JavaScript inline.

1.  **Structure and Layout:**
    -   Use a two-column layout. The left column is for the reading passage, and the right column is for questions and answer fields.
    -   Include a fixed header at the top with the title "IELTS Reading Practice", a 20-minute countdown timer, and two buttons: "Start Test" and "Check Answers".
    -   The header must be compact. The timer and buttons must be visually grouped together and centered horizontally within the header.
    -   The layout must be responsive.

2.  **Header Section:**
    -   Title: "IELTS Reading Practice".
    -   A 20-minute countdown timer.
    -   Two buttons: "Start Test" and "Check Answers".
    -   The timer and buttons must be visually grouped together and centered horizontally within the header.

3.  **Passage Content (Left Column):**
    -   The passage text is: {passage}
    -   Split the passage into paragraphs, each wrapped in a `<p>` tag, to maintain clear visual separation as in the source text.
    -   The passage should have the title "READING PASSAGE 1" and the instruction "You should spend about 20 minutes on Questions 1-13, which are based on Reading Passage 1 below."

4.  **Questions and Answers (Right Column):**
    -   The questions block is: {questions}
    -   Render each question with its appropriate input type (radio buttons for TRUE/FALSE/NOT GIVEN or multiple choice, text input for ONE WORD answers).
    -   The correct answers for checking are stored in a JavaScript object named `correctAnswers`. The object must be formatted like this: `{answers}`. Ensure this object is properly populated with the answers extracted from the source document.

5.  **Functionality (JavaScript):**
    -   **"Start Test" button:** When clicked, it should start a 20-minute countdown timer. The "Check Answers" button should be enabled.
    -   **"Check Answers" button:**
        -   Disable the button after it's clicked.
        -   Stop the timer.
        -   Loop through each question to compare the user's answer with the `correctAnswers` object.
        -   Display feedback directly below each question.
        -   Feedback messages must be in Uzbek:
            -   **Correct answer:** `✓ To'g'ri`
            -   **Incorrect answer:** `✗ Xato! [question_number]-savol. To'g'ri javob: [correctAnswer]`
            -   **Unanswered (radio/checkbox):** `✗ Javob tanlanmagan. To'g'ri javob: [correctAnswer]`
            -   **Empty (text input):** `✗ Javob kiritilmagan. To'g'ri javob: [correctAnswer]`
        -   Count the total correct answers.
        -   Display the final score and a calculated Band Score at the bottom of the right column.

6.  **Styling (CSS):**
    -   Use a modern, clean design similar to official IELTS tests, but with a more compact layout.
    -   Font family: Arial.
    -   Background color: `#f4f4f4`.
    -   Use green (`#5cb85c`) for correct feedback and red (`#d9534f`) for incorrect feedback.
    -   All elements, including the header, columns, and question blocks, must use smaller font sizes and reduced padding/margins to achieve a more compact look.
    -   The HTML, CSS, and JavaScript must be entirely contained within the single HTML file, with no external links or files.

The final output must be a single, complete, and valid HTML document that can be saved as an `.html` file and function offline.
"#
    )
}

/// Segment raw (or OCR-normalized) text and build its prompt.
pub fn compose_prompt_from_text(raw: &str) -> String {
    compose_prompt(&segment(raw))
}
