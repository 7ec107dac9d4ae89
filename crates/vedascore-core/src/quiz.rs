//! Quiz markdown parser and renderer.
//!
//! The dashboard quiz endpoint returns a loose markdown dialect:
//!
//! ```text
//! ### Question 1
//! What is 2+2?
//! a) 3
//! b) 4
//! Correct Answer: b
//!
//! ### Important Exam Questions
//! - anything below here is plain markdown
//! ```
//!
//! Parsing is line-oriented and never fails: a line that fits nowhere else is
//! either question text or pass-through markdown.

const QUESTION_HEADER: &str = "### Question";
const EXAM_SECTION_HEADER: &str = "### Important Exam Questions";
const ANSWER_PREFIX: &str = "Correct Answer:";

/// A question being accumulated from quiz markdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Question {
    /// Prompt text, possibly spanning several lines.
    pub text: String,
    /// Raw option lines in document order (`a) ...`, `b) ...`).
    pub options: Vec<String>,
    /// Lowercase answer key, e.g. `"b"` or `"ac"`.
    pub correct_answer: String,
}

impl Question {
    fn open(header: &str) -> Self {
        let text = header
            .split_once(' ')
            .map(|(_, rest)| rest)
            .unwrap_or(header)
            .trim()
            .to_string();
        Self {
            text,
            ..Default::default()
        }
    }

    /// Whether the answer key designates this option as correct.
    ///
    /// Matching is by substring, so a key of `"ac"` marks both `a)` and `c)`.
    pub fn is_correct(&self, option: &str) -> bool {
        let letter = option_letter(option);
        !letter.is_empty() && self.correct_answer.contains(letter.as_str())
    }
}

/// One rendered unit of a quiz document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizBlock {
    Question(Question),
    /// A line rendered as generic markdown.
    Markdown(String),
}

/// Split quiz markdown into questions and pass-through lines.
pub fn parse_quiz(markdown: &str) -> Vec<QuizBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<Question> = None;
    let mut pass_through = false;

    for line in markdown.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if pass_through {
            blocks.push(QuizBlock::Markdown(line.to_string()));
            continue;
        }

        if line.starts_with(QUESTION_HEADER) {
            if let Some(done) = current.take() {
                blocks.push(QuizBlock::Question(done));
            }
            current = Some(Question::open(line));
        } else if is_option_line(line) {
            // an option with no open question is dropped
            if let Some(q) = current.as_mut() {
                q.options.push(line.trim().to_string());
            }
        } else if let Some(rest) = line.strip_prefix(ANSWER_PREFIX) {
            // the key stops at the next colon; anything after it is commentary
            if let Some(q) = current.as_mut() {
                let key = rest.split(':').next().unwrap_or_default();
                q.correct_answer = key.trim().to_lowercase();
            }
        } else if line.starts_with(EXAM_SECTION_HEADER) {
            if let Some(done) = current.take() {
                blocks.push(QuizBlock::Question(done));
            }
            pass_through = true;
            blocks.push(QuizBlock::Markdown(line.to_string()));
        } else {
            match current.as_mut() {
                Some(q) if q.options.is_empty() => {
                    q.text.push('\n');
                    q.text.push_str(line.trim());
                }
                _ => blocks.push(QuizBlock::Markdown(line.to_string())),
            }
        }
    }

    if let Some(done) = current.take() {
        blocks.push(QuizBlock::Question(done));
    }

    blocks
}

/// Render quiz markdown to HTML with the correct options highlighted.
pub fn render_quiz(markdown: &str) -> String {
    let blocks = parse_quiz(markdown);
    tracing::debug!(blocks = blocks.len(), "rendering quiz");

    let mut html = String::new();
    for block in &blocks {
        match block {
            QuizBlock::Question(q) => html.push_str(&render_question(q)),
            QuizBlock::Markdown(line) => {
                html.push_str(&crate::markup::render_markdown(&format!("{line}\n")))
            }
        }
    }
    html
}

/// Render a single question block.
pub fn render_question(question: &Question) -> String {
    use crate::markup::{html_escape, render_markdown};

    let mut html = String::from("<div class=\"quiz-question\" style=\"margin-bottom: 20px;\">");
    html.push_str(&render_markdown(&format!("{}\n", question.text)));

    html.push_str("<ul class=\"quiz-options\" style=\"list-style-type: none; padding-left: 0;\">");
    for option in &question.options {
        let class = if question.is_correct(option) {
            "quiz-option quiz-option-correct"
        } else {
            "quiz-option"
        };
        html.push_str(&format!(
            "<li style=\"margin-bottom: 5px;\"><span class=\"{class}\">{}</span></li>",
            html_escape(option)
        ));
    }
    html.push_str("</ul>");

    if !question.correct_answer.is_empty() {
        html.push_str(&format!(
            "<p style=\"margin-top: 10px; font-weight: bold;\">Correct Answer: {}</p>",
            html_escape(&question.correct_answer.to_uppercase())
        ));
    }
    html.push_str("</div>");
    html
}

fn is_option_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 2 && (b'a'..=b'd').contains(&bytes[0]) && bytes[1] == b')'
}

fn option_letter(option: &str) -> String {
    option
        .split_once(')')
        .map(|(letter, _)| letter)
        .unwrap_or("")
        .trim()
        .to_lowercase()
}
