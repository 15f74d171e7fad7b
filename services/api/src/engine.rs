//! services/api/src/engine.rs
//!
//! The interview engine: the in-process implementation of the
//! `InterviewBackend` port. It owns all session rules: the one-hour token
//! TTL, the no-repeat question invariant, last-write-wins answers, and the
//! scoring-derived result, summary and glyph artifacts.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use interview_core::domain::{
    AnswerReceipt, AnswerRecord, AnswerSubmission, AskedQuestion, Glyph, InterviewResult,
    Question, QuestionKind, Session, SessionStatus, TurnContext,
};
use interview_core::ports::{
    InterviewBackend, PortError, PortResult, QuestionGenerationService, SessionStore,
};
use interview_core::scoring::{
    self, compose_summary, performance_score, render_glyph, AnswerAnalysis,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Engine tunables, fixed at startup.
#[derive(Clone)]
pub struct EngineConfig {
    pub total_questions: usize,
    pub session_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_questions: 10,
            session_ttl: Duration::hours(1),
        }
    }
}

pub struct InterviewEngine {
    store: Arc<dyn SessionStore>,
    /// Used only when the static pool runs out before the configured bound.
    question_gen: Option<Arc<dyn QuestionGenerationService>>,
    pool: Vec<Question>,
    config: EngineConfig,
}

impl InterviewEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        question_gen: Option<Arc<dyn QuestionGenerationService>>,
        pool: Vec<Question>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            question_gen,
            pool,
            config,
        }
    }

    /// Loads a session and enforces the token TTL.
    async fn load_active(&self, token: &str) -> PortResult<Session> {
        let session = self.store.load(token).await?;
        if session.is_expired(self.config.session_ttl, Utc::now()) {
            return Err(PortError::Expired);
        }
        Ok(session)
    }

    fn find_pool_question(&self, id: &str) -> Option<&Question> {
        self.pool.iter().find(|q| q.id == id)
    }

    /// Scores every answer whose question resolves in the pool.
    fn analyses(&self, session: &Session) -> Vec<AnswerAnalysis> {
        session
            .answers
            .iter()
            .filter_map(|(id, record)| {
                self.find_pool_question(id)
                    .map(|q| scoring::analyze_answer(&record.text, &q.keywords))
            })
            .collect()
    }

    /// Picks the kind for a generated question: keep technical and soft
    /// questions roughly in balance.
    fn generated_kind(&self, session: &Session) -> QuestionKind {
        let technical = session
            .asked
            .iter()
            .filter(|a| {
                self.find_pool_question(&a.question_id)
                    .map(|q| q.kind == QuestionKind::Technical)
                    .unwrap_or(false)
            })
            .count();
        let soft = session.asked.len() - technical;
        if technical < soft {
            QuestionKind::Technical
        } else {
            QuestionKind::Soft
        }
    }

    fn total_time_seconds(&self, session: &Session) -> u64 {
        let end = session.completed_at.unwrap_or_else(Utc::now);
        (end - session.created_at).num_seconds().max(0) as u64
    }
}

#[async_trait]
impl InterviewBackend for InterviewEngine {
    async fn create_session(&self) -> PortResult<String> {
        let token = Uuid::new_v4().to_string();
        let session = Session::new(token.clone(), Utc::now());
        self.store.create(session).await?;
        info!(token = %token, "session created");
        Ok(token)
    }

    async fn session_status(&self, token: &str) -> PortResult<SessionStatus> {
        let session = self.load_active(token).await?;
        let analyses = self.analyses(&session);
        Ok(SessionStatus {
            token: session.token.clone(),
            created_at: session.created_at,
            completed: session.completed,
            questions_answered: session.questions_answered(),
            total_questions: self.config.total_questions,
            asked_questions: session.asked.len(),
            current_performance: performance_score(&analyses, self.config.total_questions),
        })
    }

    async fn next_question(&self, token: &str, turn: &TurnContext) -> PortResult<Option<Question>> {
        let mut session = self.load_active(token).await?;
        if session.completed {
            return Err(PortError::AlreadyCompleted);
        }
        debug!(
            token = %token,
            client_index = turn.question_index,
            asked = session.asked.len(),
            "question requested"
        );

        // The bound is on questions issued, not answered.
        if session.asked.len() >= self.config.total_questions {
            return Ok(None);
        }

        let question = match self.pool.get(session.asked.len()) {
            Some(q) => q.clone(),
            None => match &self.question_gen {
                Some(generator) => {
                    let kind = self.generated_kind(&session);
                    generator
                        .generate_question(kind, session.asked.len())
                        .await?
                }
                None => return Ok(None),
            },
        };

        session.asked.push(AskedQuestion {
            question_id: question.id.clone(),
            issued_at: Utc::now(),
        });
        session.touch(Utc::now());
        self.store.save(&session).await?;
        Ok(Some(question))
    }

    async fn submit_answer(
        &self,
        token: &str,
        answer: &AnswerSubmission,
    ) -> PortResult<AnswerReceipt> {
        let mut session = self.load_active(token).await?;
        if session.completed {
            return Err(PortError::AlreadyCompleted);
        }
        if answer.text.trim().is_empty() {
            return Err(PortError::Invalid("answer text is empty".to_string()));
        }
        let issued_at = session
            .issued_at(&answer.question_id)
            .ok_or_else(|| PortError::Invalid("question was not asked".to_string()))?;

        let now = Utc::now();
        // The server-side measurement wins over the client's.
        let time_spent = (now - issued_at).num_seconds().max(0) as u32;
        let time_spent = if time_spent > 0 {
            time_spent
        } else {
            answer.time_spent_seconds.unwrap_or(0)
        };

        // Last write wins on resubmission.
        session.answers.insert(
            answer.question_id.clone(),
            AnswerRecord {
                text: answer.text.clone(),
                time_spent_seconds: time_spent,
                submitted_at: now,
            },
        );
        session.touch(now);
        self.store.save(&session).await?;

        let saved = session.questions_answered();
        info!(token = %token, question_id = %answer.question_id, saved, "answer recorded");
        Ok(AnswerReceipt {
            answers_saved: saved,
            total_questions: self.config.total_questions,
            remaining_questions: self.config.total_questions.saturating_sub(saved),
            time_spent_seconds: time_spent,
        })
    }

    async fn complete_session(&self, token: &str) -> PortResult<()> {
        let mut session = self.load_active(token).await?;
        let now = Utc::now();
        session.completed = true;
        session.completed_at = Some(now);
        session.touch(now);
        self.store.save(&session).await?;
        info!(token = %token, "session completed");
        Ok(())
    }

    async fn fetch_result(&self, token: &str) -> PortResult<InterviewResult> {
        // Results stay readable after the token TTL; expiry is not checked here.
        let session = self.store.load(token).await?;
        let analyses = self.analyses(&session);
        let answered = session.questions_answered();
        let total_time = self.total_time_seconds(&session);
        Ok(InterviewResult {
            session_id: session.token.clone(),
            total_time_seconds: total_time,
            questions_answered: answered,
            completion_rate: if self.config.total_questions == 0 {
                0.0
            } else {
                answered as f32 / self.config.total_questions as f32 * 100.0
            },
            average_time_per_question: if answered == 0 {
                0
            } else {
                total_time / answered as u64
            },
            performance_score: performance_score(&analyses, self.config.total_questions),
            created_at: session.created_at,
            completed_at: session.completed_at.unwrap_or_else(Utc::now),
        })
    }

    async fn generate_glyph(&self, token: &str) -> PortResult<Glyph> {
        let session = self.store.load(token).await?;
        let analyses = self.analyses(&session);
        let score = performance_score(&analyses, self.config.total_questions);
        Ok(render_glyph(
            score,
            session.questions_answered(),
            self.config.total_questions,
        ))
    }

    async fn fetch_summary(&self, token: &str) -> PortResult<String> {
        let session = self.store.load(token).await?;
        let analyses = self.analyses(&session);
        Ok(compose_summary(
            &analyses,
            self.config.total_questions,
            self.total_time_seconds(&session),
        ))
    }

    async fn discard_session(&self, token: &str) -> PortResult<()> {
        self.store.delete(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemorySessionStore;
    use crate::questions::question_pool;

    fn engine() -> InterviewEngine {
        InterviewEngine::new(
            Arc::new(MemorySessionStore::new()),
            None,
            question_pool(),
            EngineConfig::default(),
        )
    }

    fn submission(id: &str, text: &str) -> AnswerSubmission {
        AnswerSubmission {
            question_id: id.to_string(),
            text: text.to_string(),
            time_spent_seconds: Some(12),
        }
    }

    #[tokio::test]
    async fn serves_ten_questions_in_order_then_none() {
        let engine = engine();
        let token = engine.create_session().await.unwrap();
        let turn = TurnContext::default();

        let mut seen = Vec::new();
        for _ in 0..10 {
            let q = engine.next_question(&token, &turn).await.unwrap().unwrap();
            assert!(!seen.contains(&q.id), "question {} repeated", q.id);
            seen.push(q.id);
        }
        assert_eq!(seen[0], "q_1");
        assert_eq!(seen[9], "q_10");
        assert!(engine.next_question(&token, &turn).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_answers_for_unasked_questions() {
        let engine = engine();
        let token = engine.create_session().await.unwrap();
        let err = engine
            .submit_answer(&token, &submission("q_7", "an answer"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
    }

    #[tokio::test]
    async fn rejects_empty_answers() {
        let engine = engine();
        let token = engine.create_session().await.unwrap();
        engine
            .next_question(&token, &TurnContext::default())
            .await
            .unwrap();
        let err = engine
            .submit_answer(&token, &submission("q_1", "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
    }

    #[tokio::test]
    async fn resubmission_overwrites_the_previous_answer() {
        let engine = engine();
        let token = engine.create_session().await.unwrap();
        engine
            .next_question(&token, &TurnContext::default())
            .await
            .unwrap();
        engine
            .submit_answer(&token, &submission("q_1", "first version"))
            .await
            .unwrap();
        let receipt = engine
            .submit_answer(&token, &submission("q_1", "second version"))
            .await
            .unwrap();
        // Still a single recorded answer.
        assert_eq!(receipt.answers_saved, 1);

        let status = engine.session_status(&token).await.unwrap();
        assert_eq!(status.questions_answered, 1);
    }

    #[tokio::test]
    async fn status_reflects_submitted_answers() {
        let engine = engine();
        let token = engine.create_session().await.unwrap();
        let turn = TurnContext::default();
        for n in 1..=3 {
            engine.next_question(&token, &turn).await.unwrap();
            engine
                .submit_answer(
                    &token,
                    &submission(
                        &format!("q_{n}"),
                        "a considered answer with enough words to be scored",
                    ),
                )
                .await
                .unwrap();
        }
        let status = engine.session_status(&token).await.unwrap();
        assert_eq!(status.questions_answered, 3);
        assert_eq!(status.asked_questions, 3);
        assert_eq!(status.total_questions, 10);
        assert!(!status.completed);
    }

    #[tokio::test]
    async fn completed_sessions_reject_further_exchange() {
        let engine = engine();
        let token = engine.create_session().await.unwrap();
        engine
            .next_question(&token, &TurnContext::default())
            .await
            .unwrap();
        engine.complete_session(&token).await.unwrap();

        let err = engine
            .next_question(&token, &TurnContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::AlreadyCompleted));
        let err = engine
            .submit_answer(&token, &submission("q_1", "too late"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::AlreadyCompleted));
    }

    #[tokio::test]
    async fn expired_tokens_are_refused() {
        let store = Arc::new(MemorySessionStore::new());
        let engine = InterviewEngine::new(
            store.clone(),
            None,
            question_pool(),
            EngineConfig::default(),
        );
        let token = engine.create_session().await.unwrap();

        // Backdate the session past the TTL.
        let mut session = store.load(&token).await.unwrap();
        session.created_at = Utc::now() - Duration::hours(2);
        store.save(&session).await.unwrap();

        let err = engine
            .next_question(&token, &TurnContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Expired));
    }

    #[tokio::test]
    async fn unknown_tokens_are_not_found() {
        let engine = engine();
        let err = engine.session_status("missing").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn result_and_artifacts_for_a_finished_run() {
        let engine = engine();
        let token = engine.create_session().await.unwrap();
        let turn = TurnContext::default();
        for n in 1..=10 {
            engine.next_question(&token, &turn).await.unwrap();
            engine
                .submit_answer(
                    &token,
                    &submission(
                        &format!("q_{n}"),
                        "For example, in my last team I specifically led the migration \
                         project, planned the milestones, and coached two junior \
                         colleagues through the rollout. It shipped on schedule.",
                    ),
                )
                .await
                .unwrap();
        }
        engine.complete_session(&token).await.unwrap();

        let result = engine.fetch_result(&token).await.unwrap();
        assert_eq!(result.questions_answered, 10);
        assert!((result.completion_rate - 100.0).abs() < f32::EPSILON);
        assert!(result.performance_score > 50);

        let glyph = engine.generate_glyph(&token).await.unwrap();
        assert!(glyph.svg.starts_with("<svg"));
        assert!(!glyph.profile.is_empty());

        let summary = engine.fetch_summary(&token).await.unwrap();
        assert!(summary.contains("10 of 10"));
    }

    #[tokio::test]
    async fn generator_covers_the_pool_shortfall() {
        struct CannedGenerator;

        #[async_trait]
        impl QuestionGenerationService for CannedGenerator {
            async fn generate_question(
                &self,
                kind: QuestionKind,
                asked_count: usize,
            ) -> PortResult<Question> {
                Ok(Question {
                    id: format!("gen_q_{}", asked_count + 1),
                    text: "Tell us more about your recent work.".to_string(),
                    kind,
                    keywords: vec![],
                })
            }
        }

        // A pool of two questions with a bound of three: the third question
        // must come from the generator.
        let engine = InterviewEngine::new(
            Arc::new(MemorySessionStore::new()),
            Some(Arc::new(CannedGenerator)),
            question_pool().into_iter().take(2).collect(),
            EngineConfig {
                total_questions: 3,
                session_ttl: Duration::hours(1),
            },
        );
        let token = engine.create_session().await.unwrap();
        let turn = TurnContext::default();

        let ids: Vec<String> = {
            let mut ids = Vec::new();
            for _ in 0..3 {
                ids.push(
                    engine
                        .next_question(&token, &turn)
                        .await
                        .unwrap()
                        .unwrap()
                        .id,
                );
            }
            ids
        };
        assert_eq!(ids, vec!["q_1", "q_2", "gen_q_3"]);
        assert!(engine.next_question(&token, &turn).await.unwrap().is_none());
    }
}
