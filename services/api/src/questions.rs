//! services/api/src/questions.rs
//!
//! The static interview question pool: ten professional questions issued in
//! order, each with the keywords the scoring pass looks for.

use interview_core::domain::{Question, QuestionKind};

struct PoolEntry {
    id: &'static str,
    text: &'static str,
    kind: QuestionKind,
    keywords: &'static [&'static str],
}

const POOL: &[PoolEntry] = &[
    PoolEntry {
        id: "q_1",
        text: "Tell us about yourself and your professional experience. Which skills and \
               achievements do you consider most important?",
        kind: QuestionKind::Technical,
        keywords: &["skills", "experience", "achievements", "professional"],
    },
    PoolEntry {
        id: "q_2",
        text: "Describe your ideal working day. What would you do and how would you feel?",
        kind: QuestionKind::Soft,
        keywords: &["motivation", "ideal", "comfort", "working day"],
    },
    PoolEntry {
        id: "q_3",
        text: "Tell us about a situation where you had to solve a difficult problem. How did \
               you approach the solution?",
        kind: QuestionKind::Technical,
        keywords: &["problem", "solution", "analysis", "approach"],
    },
    PoolEntry {
        id: "q_4",
        text: "How do you handle stress and pressure at work? Give a concrete example.",
        kind: QuestionKind::Soft,
        keywords: &["stress", "pressure", "example", "cope"],
    },
    PoolEntry {
        id: "q_5",
        text: "Tell us about your experience working in a team. What role do you usually take \
               in a group?",
        kind: QuestionKind::Soft,
        keywords: &["team", "role", "group", "collaboration"],
    },
    PoolEntry {
        id: "q_6",
        text: "Which technologies, methods or skills have you learned in the last year? What \
               do you plan to learn next?",
        kind: QuestionKind::Technical,
        keywords: &["technologies", "learning", "plans", "growth"],
    },
    PoolEntry {
        id: "q_7",
        text: "Describe a situation where you had to adapt to major changes. How did you do it?",
        kind: QuestionKind::Soft,
        keywords: &["adapt", "changes", "flexibility", "adjust"],
    },
    PoolEntry {
        id: "q_8",
        text: "Tell us about your career goals. Where do you see yourself in two to three years?",
        kind: QuestionKind::Soft,
        keywords: &["career", "goals", "plans", "future"],
    },
    PoolEntry {
        id: "q_9",
        text: "What motivates you most in your work? What gives you the energy for \
               professional growth?",
        kind: QuestionKind::Soft,
        keywords: &["motivation", "energy", "growth", "drive"],
    },
    PoolEntry {
        id: "q_10",
        text: "Why are you interested in working at our company? What contribution do you \
               want to make?",
        kind: QuestionKind::Soft,
        keywords: &["interest", "company", "contribution", "value"],
    },
];

/// Materializes the full pool in issue order.
pub fn question_pool() -> Vec<Question> {
    POOL.iter()
        .map(|entry| Question {
            id: entry.id.to_string(),
            text: entry.text.to_string(),
            kind: entry.kind,
            keywords: entry.keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

/// Looks up a pool question by id; used by the scoring pass to recover the
/// keywords for an answered question.
pub fn pool_question(id: &str) -> Option<Question> {
    question_pool().into_iter().find(|q| q.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_has_ten_unique_questions() {
        let pool = question_pool();
        assert_eq!(pool.len(), 10);
        let mut ids: Vec<_> = pool.iter().map(|q| q.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
