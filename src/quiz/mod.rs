use std::sync::atomic::{AtomicU64, Ordering};

pub mod trivia;

// Unique across every session and restart in the process.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub text: String,
    pub answers: Vec<Answer>,
}
impl Question {
    pub fn new(text: String, answers: Vec<Answer>) -> Self {
        Self { text, answers }
    }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.answers.iter().map(|a| a.text.as_str())
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.is_correct)
            .map(|a| a.text.as_str())
    }

    pub fn has_option(&self, text: &str) -> bool {
        self.options().any(|o| o == text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
}
impl Answer {
    pub fn new(text: String, is_correct: bool) -> Self {
        Self { text, is_correct }
    }
}

/// Handle for the delayed move to the next question. Only the handle issued
/// for the current question of the current epoch has any effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    epoch: u64,
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Stale,
    Next(usize),
    Finished { score: usize, total: usize },
}

/// One run through a fixed list of questions.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    selected_answer: Option<String>,
    is_correct: Option<bool>,
    epoch: u64,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            epoch: next_epoch(),
            ..Default::default()
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.questions.len()
    }

    /// Records the answer for the current question. Returns `None` without
    /// touching the session when the question was already answered or the
    /// quiz is over.
    pub fn submit_answer(&mut self, chosen: &str) -> Option<PendingAdvance> {
        if self.selected_answer.is_some() {
            return None;
        }
        let question = self.questions.get(self.current_index)?;

        let correct = question.correct_answer() == Some(chosen);
        self.selected_answer = Some(chosen.to_string());
        self.is_correct = Some(correct);
        if correct {
            self.score += 1;
        }

        Some(PendingAdvance {
            epoch: self.epoch,
            index: self.current_index,
        })
    }

    /// Applies a transition previously handed out by [`Self::submit_answer`].
    pub fn advance(&mut self, pending: PendingAdvance) -> Progress {
        if pending.epoch != self.epoch
            || pending.index != self.current_index
            || self.selected_answer.is_none()
        {
            return Progress::Stale;
        }

        self.current_index += 1;
        self.selected_answer = None;
        self.is_correct = None;

        if self.is_complete() {
            Progress::Finished {
                score: self.score,
                total: self.total(),
            }
        } else {
            Progress::Next(self.current_index)
        }
    }

    /// Starts over with the same questions. Outstanding transitions go stale.
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.score = 0;
        self.selected_answer = None;
        self.is_correct = None;
        self.epoch = next_epoch();
    }

    pub fn verdict(&self) -> &'static str {
        let total = self.total();
        if self.score == total {
            "Perfect score! You're a space expert! 🚀"
        } else if self.score * 10 >= total * 7 {
            "Great job! You really know your space facts! 🌟"
        } else {
            "Keep exploring and learning about space! 🌎"
        }
    }
}
