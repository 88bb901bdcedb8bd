use crate::model::ids::QuestionId;

/// One flashcard: a prompt and its expected response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionAnswerPair {
    id: QuestionId,
    question: String,
    answer: String,
}

impl QuestionAnswerPair {
    #[must_use]
    pub fn new(id: QuestionId, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }
}
