//! Extraction of question/answer pairs from paragraph text.
//!
//! A document is a sequence of paragraphs. `Q:` opens a question, the next `A:`
//! answers it. Everything else is skipped without error.

use crate::model::{QuestionAnswerPair, QuestionId};

const QUESTION_PREFIX: &str = "Q:";
const ANSWER_PREFIX: &str = "A:";

/// Two-state scanner: waiting for a question, or holding one and waiting for its answer.
#[derive(Debug, Default)]
pub struct PairScanner {
    pending: Option<String>,
    pairs: Vec<QuestionAnswerPair>,
}

impl PairScanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one paragraph.
    pub fn push(&mut self, paragraph: &str) {
        let text = paragraph.trim();
        if let Some(question) = text.strip_prefix(QUESTION_PREFIX) {
            // An unanswered pending question is dropped here.
            let question = question.trim();
            self.pending = (!question.is_empty()).then(|| question.to_string());
        } else if let Some(answer) = text.strip_prefix(ANSWER_PREFIX) {
            if let Some(question) = self.pending.take() {
                let id = QuestionId::from_index(self.pairs.len());
                self.pairs
                    .push(QuestionAnswerPair::new(id, question, answer.trim()));
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> Vec<QuestionAnswerPair> {
        self.pairs
    }
}

/// Parse pairs from paragraphs in document order.
#[must_use]
pub fn parse_paragraphs<I, S>(paragraphs: I) -> Vec<QuestionAnswerPair>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scanner = PairScanner::new();
    for paragraph in paragraphs {
        scanner.push(paragraph.as_ref());
    }
    scanner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_question_without_answer_is_dropped() {
        let pairs = parse_paragraphs(["Q: 2+2?", "A: 4", "Q: 3+3?"]);
        assert_eq!(
            pairs,
            vec![QuestionAnswerPair::new(QuestionId::from_index(0), "2+2?", "4")]
        );
    }

    #[test]
    fn later_question_overwrites_pending_one() {
        let pairs = parse_paragraphs(["Q: first", "Q: second", "A: answer"]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question(), "second");
        assert_eq!(pairs[0].id().as_str(), "0");
    }

    #[test]
    fn stray_text_and_orphan_answers_are_ignored() {
        let pairs = parse_paragraphs([
            "Chapter 1",
            "A: orphan",
            "   Q:   What is Rust?  ",
            "some note",
            "A:  A language ",
            "A: second answer",
            "",
        ]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question(), "What is Rust?");
        assert_eq!(pairs[0].answer(), "A language");
    }

    #[test]
    fn ids_count_recognized_pairs_only() {
        let pairs = parse_paragraphs(["intro", "Q: a", "A: 1", "noise", "Q: b", "A: 2"]);
        let ids: Vec<&str> = pairs.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, ["0", "1"]);
    }

    #[test]
    fn empty_question_clears_pending_slot() {
        let pairs = parse_paragraphs(["Q: real", "Q:", "A: lost"]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn empty_answer_still_completes_pair() {
        let pairs = parse_paragraphs(["Q: blank?", "A:"]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer(), "");
    }

    #[test]
    fn prefixes_are_case_sensitive() {
        let pairs = parse_paragraphs(["q: lower", "a: lower"]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn scanner_accumulates_pushed_paragraphs() {
        let mut scanner = PairScanner::new();
        scanner.push("Q: waiting");
        scanner.push("A: done");
        scanner.push("Q: unanswered");
        let pairs = scanner.finish();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].question(), "waiting");
    }

    #[test]
    fn empty_document_yields_no_pairs() {
        assert!(parse_paragraphs(Vec::<String>::new()).is_empty());
    }
}
