//! crates/interview_core/src/flow.rs
//!
//! The candidate-facing interview flow: a bounded sequence of timed turns
//! driven against an `InterviewBackend`, ending in the completion pipeline.
//! This is the control loop a frontend (or the terminal runner) sits on top
//! of: it owns the per-question countdown, the no-repeat invariant, and the
//! degraded-mode synthesis of the terminal report.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::{
    AnswerSubmission, AutosaveSnapshot, Glyph, InterviewResult, Question, QualityTier,
    TurnContext,
};
use crate::ports::{AutosaveStore, InterviewBackend, PortResult};
use crate::scoring::{classify_tier, fallback_summary, placeholder_svg};

/// Returns true once the interview bound is reached.
pub fn is_complete(question_index: usize, total_questions: usize) -> bool {
    question_index >= total_questions
}

/// Tunables for one interview run.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub total_questions: usize,
    pub question_time_limit: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            total_questions: 10,
            question_time_limit: Duration::from_secs(90),
        }
    }
}

/// The lifecycle phases of one interview run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Uninitialized,
    Initializing,
    InProgress,
    Completing,
    Completed,
    Errored,
}

/// Candidate inputs, fed to the flow over a channel.
#[derive(Debug, Clone)]
pub enum FlowCommand {
    /// Replaces the draft text for the current question.
    Draft(String),
    /// Submits the current draft immediately.
    Submit,
    /// Abandons the whole session.
    Abandon,
}

/// Observable progress, emitted on the event channel.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    Phase(FlowPhase),
    QuestionPresented {
        index: usize,
        question: Question,
        time_limit: Duration,
    },
    Tick {
        seconds_left: u64,
    },
    AnswerRecorded {
        question_id: String,
        accepted_by_backend: bool,
    },
    TurnAbandoned {
        question_id: String,
    },
    Completed(Box<FinalReport>),
    Error {
        message: String,
    },
}

/// Where a terminal artifact came from: the backend, or the local heuristic
/// substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOrigin {
    Backend,
    Heuristic,
}

/// The terminal screen's content. Always produced, even under total backend
/// failure: missing pieces are synthesized from the answer-length heuristic.
#[derive(Debug, Clone)]
pub struct FinalReport {
    pub tier: QualityTier,
    pub completion_confirmed: bool,
    pub result: Option<InterviewResult>,
    pub summary: String,
    pub summary_origin: ArtifactOrigin,
    pub glyph: Glyph,
    pub glyph_origin: ArtifactOrigin,
    pub answers: HashMap<String, String>,
}

/// How a run ended.
#[derive(Debug)]
pub enum FlowOutcome {
    Completed(Box<FinalReport>),
    Abandoned,
}

/// The caller's half of a flow: command sender, event receiver, cancellation.
pub struct FlowHandle {
    pub commands: mpsc::Sender<FlowCommand>,
    pub events: mpsc::Receiver<FlowEvent>,
    pub cancel: CancellationToken,
}

enum TurnOutcome {
    Submitted,
    Expired,
    Abandoned,
}

enum TurnSignal {
    Command(Option<FlowCommand>),
    Tick,
    Cancelled,
}

/// One candidate's interview run. Construct with [`InterviewFlow::new`], then
/// drive with [`InterviewFlow::run`] while interacting through the handle.
pub struct InterviewFlow {
    backend: Arc<dyn InterviewBackend>,
    autosave: Option<Arc<dyn AutosaveStore>>,
    config: FlowConfig,
    events: mpsc::Sender<FlowEvent>,
    commands: mpsc::Receiver<FlowCommand>,
    cancel: CancellationToken,

    token: String,
    phase: FlowPhase,
    question_index: usize,
    asked_questions: Vec<String>,
    answers: HashMap<String, String>,
}

impl InterviewFlow {
    pub fn new(
        backend: Arc<dyn InterviewBackend>,
        autosave: Option<Arc<dyn AutosaveStore>>,
        config: FlowConfig,
    ) -> (Self, FlowHandle) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(256);
        let cancel = CancellationToken::new();
        let flow = Self {
            backend,
            autosave,
            config,
            events: event_tx,
            commands: command_rx,
            cancel: cancel.clone(),
            token: String::new(),
            phase: FlowPhase::Uninitialized,
            question_index: 0,
            asked_questions: Vec::new(),
            answers: HashMap::new(),
        };
        let handle = FlowHandle {
            commands: command_tx,
            events: event_rx,
            cancel,
        };
        (flow, handle)
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Runs the interview to its terminal state. Returns `Abandoned` when
    /// cancelled; `Err` only when the session cannot even be created.
    pub async fn run(mut self) -> PortResult<FlowOutcome> {
        self.set_phase(FlowPhase::Initializing);
        self.token = match self.backend.create_session().await {
            Ok(token) => token,
            Err(e) => {
                self.set_phase(FlowPhase::Errored);
                self.emit(FlowEvent::Error {
                    message: format!("could not create a session: {e}"),
                });
                return Err(e);
            }
        };
        info!(token = %self.token, "interview session created");
        self.set_phase(FlowPhase::InProgress);

        while !is_complete(self.question_index, self.config.total_questions) {
            let question = match self.fetch_next_question().await {
                Some(q) => q,
                // "No more questions" in any form: proceed to completion.
                None => break,
            };
            if let TurnOutcome::Abandoned = self.run_turn(question).await {
                let _ = self.backend.discard_session(&self.token).await;
                info!(token = %self.token, "interview abandoned");
                return Ok(FlowOutcome::Abandoned);
            }
        }

        let report = self.finish().await;
        self.emit(FlowEvent::Completed(Box::new(report.clone())));
        self.set_phase(FlowPhase::Completed);
        Ok(FlowOutcome::Completed(Box::new(report)))
    }

    /// Fetches the next question, mapping every degenerate case (backend
    /// error, exhausted source, repeated question id) to `None`.
    async fn fetch_next_question(&mut self) -> Option<Question> {
        let turn = TurnContext {
            question_index: self.question_index,
            asked_questions: self.asked_questions.clone(),
            answers: self.answers.clone(),
        };
        let question = match self.backend.next_question(&self.token, &turn).await {
            Ok(q) => q?,
            Err(e) => {
                warn!(error = %e, "question fetch failed, treating as exhausted");
                return None;
            }
        };
        if self.asked_questions.iter().any(|id| *id == question.id) {
            warn!(question_id = %question.id, "duplicate question suppressed");
            return None;
        }
        self.asked_questions.push(question.id.clone());
        Some(question)
    }

    /// Runs one timed turn. The select loop below is the only place a submit
    /// can be triggered, and every trigger leaves the loop before the submit
    /// call is issued, so a manual submit racing the countdown's expiry can
    /// never produce a second submission for the same question.
    async fn run_turn(&mut self, question: Question) -> TurnOutcome {
        // Inputs addressed to the previous question are stale; drop them.
        while self.commands.try_recv().is_ok() {}

        self.emit(FlowEvent::QuestionPresented {
            index: self.question_index,
            question: question.clone(),
            time_limit: self.config.question_time_limit,
        });

        let mut draft = String::new();
        let mut seconds_left = self.config.question_time_limit.as_secs();
        let mut tick = tokio::time::interval(Duration::from_secs(1));
        // The first tick of a tokio interval completes immediately.
        tick.tick().await;

        let outcome = loop {
            let signal = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => TurnSignal::Cancelled,
                cmd = self.commands.recv() => TurnSignal::Command(cmd),
                _ = tick.tick() => TurnSignal::Tick,
            };
            match signal {
                TurnSignal::Cancelled => break TurnOutcome::Abandoned,
                TurnSignal::Command(Some(FlowCommand::Draft(text))) => {
                    draft = text;
                    self.autosave_draft(&question.id, &draft).await;
                }
                TurnSignal::Command(Some(FlowCommand::Submit)) => break TurnOutcome::Submitted,
                TurnSignal::Command(Some(FlowCommand::Abandon)) | TurnSignal::Command(None) => {
                    break TurnOutcome::Abandoned
                }
                TurnSignal::Tick => {
                    seconds_left = seconds_left.saturating_sub(1);
                    self.emit(FlowEvent::Tick { seconds_left });
                    if seconds_left == 0 {
                        break if draft.trim().is_empty() {
                            TurnOutcome::Expired
                        } else {
                            TurnOutcome::Submitted
                        };
                    }
                }
            }
        };

        match outcome {
            TurnOutcome::Submitted => {
                let time_spent = self
                    .config
                    .question_time_limit
                    .as_secs()
                    .saturating_sub(seconds_left);
                self.submit(question, draft, time_spent as u32).await;
                TurnOutcome::Submitted
            }
            TurnOutcome::Expired => {
                // The budget ran out with nothing typed: forward progress wins.
                info!(question_id = %question.id, "turn expired without an answer");
                self.emit(FlowEvent::TurnAbandoned {
                    question_id: question.id,
                });
                self.question_index += 1;
                TurnOutcome::Expired
            }
            TurnOutcome::Abandoned => TurnOutcome::Abandoned,
        }
    }

    /// Records the answer locally and advances the index before the network
    /// call, so a failed save never stalls the time-boxed assessment.
    async fn submit(&mut self, question: Question, draft: String, time_spent: u32) {
        self.answers.insert(question.id.clone(), draft.clone());
        self.question_index += 1;

        let submission = AnswerSubmission {
            question_id: question.id.clone(),
            text: draft,
            time_spent_seconds: Some(time_spent),
        };
        let accepted = match self.backend.submit_answer(&self.token, &submission).await {
            Ok(_) => true,
            Err(e) => {
                warn!(question_id = %question.id, error = %e, "answer save failed, advancing anyway");
                false
            }
        };
        if accepted {
            if let Some(store) = &self.autosave {
                let _ = store.clear().await;
            }
        }
        self.emit(FlowEvent::AnswerRecorded {
            question_id: question.id,
            accepted_by_backend: accepted,
        });
    }

    /// The completion pipeline: complete, result, summary, glyph. Independent
    /// calls; each failed step degrades to the heuristic substitute so the
    /// candidate always reaches a finished terminal screen.
    async fn finish(&mut self) -> FinalReport {
        self.set_phase(FlowPhase::Completing);
        let tier = classify_tier(self.answers.values().map(String::as_str));

        let completion_confirmed = match self.backend.complete_session(&self.token).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "completion call failed");
                false
            }
        };

        let result = match self.backend.fetch_result(&self.token).await {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(error = %e, "result fetch failed");
                None
            }
        };

        let (summary, summary_origin) = match self.backend.fetch_summary(&self.token).await {
            Ok(s) => (s, ArtifactOrigin::Backend),
            Err(e) => {
                warn!(error = %e, "summary fetch failed, synthesizing");
                (fallback_summary(tier).to_string(), ArtifactOrigin::Heuristic)
            }
        };

        let (glyph, glyph_origin) = match self.backend.generate_glyph(&self.token).await {
            Ok(g) => (g, ArtifactOrigin::Backend),
            Err(e) => {
                warn!(error = %e, "glyph fetch failed, synthesizing");
                let glyph = Glyph {
                    svg: placeholder_svg(tier),
                    profile: fallback_summary(tier).to_string(),
                };
                (glyph, ArtifactOrigin::Heuristic)
            }
        };

        FinalReport {
            tier,
            completion_confirmed,
            result,
            summary,
            summary_origin,
            glyph,
            glyph_origin,
            answers: self.answers.clone(),
        }
    }

    async fn autosave_draft(&self, question_id: &str, draft: &str) {
        if let Some(store) = &self.autosave {
            let snapshot = AutosaveSnapshot {
                token: self.token.clone(),
                question_id: question_id.to_string(),
                draft: draft.to_string(),
                saved_at: Utc::now(),
            };
            if let Err(e) = store.save(&snapshot).await {
                warn!(error = %e, "autosave failed");
            }
        }
    }

    fn set_phase(&mut self, phase: FlowPhase) {
        self.phase = phase;
        self.emit(FlowEvent::Phase(phase));
    }

    /// A caller that stops listening must not stall the countdown, so event
    /// delivery is best-effort.
    fn emit(&self, event: FlowEvent) {
        let _ = self.events.try_send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnswerReceipt, QuestionKind, SessionStatus};
    use crate::ports::PortError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A scripted backend that records every call.
    struct ScriptedBackend {
        questions: Vec<Question>,
        submits: AtomicUsize,
        submitted: Mutex<Vec<AnswerSubmission>>,
        fail_submits: bool,
        fail_terminal_calls: bool,
        repeat_first_question: bool,
        served: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(questions: Vec<Question>) -> Self {
            Self {
                questions,
                submits: AtomicUsize::new(0),
                submitted: Mutex::new(Vec::new()),
                fail_submits: false,
                fail_terminal_calls: false,
                repeat_first_question: false,
                served: AtomicUsize::new(0),
            }
        }
    }

    fn question(n: usize) -> Question {
        Question {
            id: format!("q_{n}"),
            text: format!("question number {n}"),
            kind: QuestionKind::Soft,
            keywords: vec![],
        }
    }

    #[async_trait]
    impl InterviewBackend for ScriptedBackend {
        async fn create_session(&self) -> PortResult<String> {
            Ok("test-token".to_string())
        }

        async fn session_status(&self, _token: &str) -> PortResult<SessionStatus> {
            unimplemented!("not exercised by the flow")
        }

        async fn next_question(
            &self,
            _token: &str,
            _turn: &TurnContext,
        ) -> PortResult<Option<Question>> {
            if self.repeat_first_question {
                return Ok(self.questions.first().cloned());
            }
            let idx = self.served.fetch_add(1, Ordering::SeqCst);
            Ok(self.questions.get(idx).cloned())
        }

        async fn submit_answer(
            &self,
            _token: &str,
            answer: &AnswerSubmission,
        ) -> PortResult<AnswerReceipt> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            self.submitted.lock().unwrap().push(answer.clone());
            if self.fail_submits {
                return Err(PortError::Network("connection reset".to_string()));
            }
            Ok(AnswerReceipt {
                answers_saved: 1,
                total_questions: 10,
                remaining_questions: 9,
                time_spent_seconds: answer.time_spent_seconds.unwrap_or(0),
            })
        }

        async fn complete_session(&self, _token: &str) -> PortResult<()> {
            if self.fail_terminal_calls {
                return Err(PortError::Network("down".to_string()));
            }
            Ok(())
        }

        async fn fetch_result(&self, _token: &str) -> PortResult<InterviewResult> {
            Err(PortError::Network("down".to_string()))
        }

        async fn generate_glyph(&self, _token: &str) -> PortResult<Glyph> {
            if self.fail_terminal_calls {
                return Err(PortError::Network("down".to_string()));
            }
            Ok(Glyph {
                svg: "<svg/>".to_string(),
                profile: "backend profile".to_string(),
            })
        }

        async fn fetch_summary(&self, _token: &str) -> PortResult<String> {
            if self.fail_terminal_calls {
                return Err(PortError::Network("down".to_string()));
            }
            Ok("backend summary".to_string())
        }

        async fn discard_session(&self, _token: &str) -> PortResult<()> {
            Ok(())
        }
    }

    fn flow_with(backend: Arc<ScriptedBackend>, total: usize) -> (InterviewFlow, FlowHandle) {
        InterviewFlow::new(
            backend,
            None,
            FlowConfig {
                total_questions: total,
                question_time_limit: Duration::from_secs(90),
            },
        )
    }

    #[test]
    fn bound_check_is_pure() {
        assert!(!is_complete(0, 10));
        assert!(!is_complete(9, 10));
        assert!(is_complete(10, 10));
        assert!(is_complete(11, 10));
    }

    #[tokio::test(start_paused = true)]
    async fn answers_all_questions_and_completes() {
        let backend = Arc::new(ScriptedBackend::new((1..=3).map(question).collect()));
        let (flow, mut handle) = flow_with(backend.clone(), 3);
        let run = tokio::spawn(flow.run());

        let mut submitted = 0;
        while submitted < 3 {
            match handle.events.recv().await.expect("flow ended early") {
                FlowEvent::QuestionPresented { .. } => {
                    handle
                        .commands
                        .send(FlowCommand::Draft("a reasonably long answer".into()))
                        .await
                        .unwrap();
                    handle.commands.send(FlowCommand::Submit).await.unwrap();
                }
                FlowEvent::AnswerRecorded { .. } => submitted += 1,
                _ => {}
            }
        }

        match run.await.unwrap().unwrap() {
            FlowOutcome::Completed(report) => {
                // Index equals the number of successful submits and never
                // passed the bound before completion.
                assert_eq!(report.answers.len(), 3);
                assert_eq!(backend.submits.load(Ordering::SeqCst), 3);
            }
            FlowOutcome::Abandoned => panic!("expected completion"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_question_id_ends_the_interview() {
        let backend = Arc::new(ScriptedBackend {
            repeat_first_question: true,
            ..ScriptedBackend::new(vec![question(1)])
        });
        let (flow, mut handle) = flow_with(backend.clone(), 10);
        let run = tokio::spawn(flow.run());

        // Answer the first question; the backend then repeats it forever.
        loop {
            match handle.events.recv().await.expect("flow ended early") {
                FlowEvent::QuestionPresented { .. } => {
                    handle
                        .commands
                        .send(FlowCommand::Draft("an answer".into()))
                        .await
                        .unwrap();
                    handle.commands.send(FlowCommand::Submit).await.unwrap();
                }
                FlowEvent::Completed(_) => break,
                _ => {}
            }
        }

        match run.await.unwrap().unwrap() {
            FlowOutcome::Completed(report) => {
                // q_1 was asked exactly once; its repeat ended the run.
                assert_eq!(report.answers.len(), 1);
                assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
            }
            FlowOutcome::Abandoned => panic!("expected completion"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_with_draft_submits_exactly_once() {
        let backend = Arc::new(ScriptedBackend::new(vec![question(1)]));
        let (flow, mut handle) = flow_with(backend.clone(), 1);
        let run = tokio::spawn(flow.run());

        // Type a draft, then let the countdown run out. A manual submit sent
        // right at the expiry moment must not produce a second submission.
        loop {
            match handle.events.recv().await.expect("flow ended early") {
                FlowEvent::QuestionPresented { .. } => {
                    handle
                        .commands
                        .send(FlowCommand::Draft("typed but never submitted".into()))
                        .await
                        .unwrap();
                }
                FlowEvent::Tick { seconds_left: 0 } => {
                    // Races the auto-submit; the turn is already over.
                    let _ = handle.commands.send(FlowCommand::Submit).await;
                }
                FlowEvent::Completed(_) => break,
                _ => {}
            }
        }

        run.await.unwrap().unwrap();
        assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted[0].text, "typed but never submitted");
        assert_eq!(submitted[0].time_spent_seconds, Some(90));
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_with_empty_draft_abandons_the_turn() {
        let backend = Arc::new(ScriptedBackend::new(vec![question(1), question(2)]));
        let (flow, mut handle) = flow_with(backend.clone(), 2);
        let run = tokio::spawn(flow.run());

        let mut abandoned = 0;
        loop {
            match handle.events.recv().await.expect("flow ended early") {
                FlowEvent::TurnAbandoned { .. } => abandoned += 1,
                FlowEvent::Completed(_) => break,
                _ => {}
            }
        }

        run.await.unwrap().unwrap();
        // Both turns expired empty: no submits, but the flow still advanced
        // through the bound and completed.
        assert_eq!(abandoned, 2);
        assert_eq!(backend.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_still_advances_locally() {
        let backend = Arc::new(ScriptedBackend {
            fail_submits: true,
            ..ScriptedBackend::new(vec![question(1)])
        });
        let (flow, mut handle) = flow_with(backend.clone(), 1);
        let run = tokio::spawn(flow.run());

        let mut rejected = false;
        loop {
            match handle.events.recv().await.expect("flow ended early") {
                FlowEvent::QuestionPresented { .. } => {
                    handle
                        .commands
                        .send(FlowCommand::Draft("saved locally only".into()))
                        .await
                        .unwrap();
                    handle.commands.send(FlowCommand::Submit).await.unwrap();
                }
                FlowEvent::AnswerRecorded {
                    accepted_by_backend,
                    ..
                } => rejected = !accepted_by_backend,
                FlowEvent::Completed(_) => break,
                _ => {}
            }
        }

        match run.await.unwrap().unwrap() {
            FlowOutcome::Completed(report) => {
                assert!(rejected);
                // Optimistic advance: the answer is retained locally.
                assert_eq!(report.answers["q_1"], "saved locally only");
            }
            FlowOutcome::Abandoned => panic!("expected completion"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failures_synthesize_heuristic_report() {
        let backend = Arc::new(ScriptedBackend {
            fail_terminal_calls: true,
            ..ScriptedBackend::new((1..=2).map(question).collect())
        });
        let (flow, mut handle) = flow_with(backend.clone(), 2);
        let run = tokio::spawn(flow.run());

        loop {
            match handle.events.recv().await.expect("flow ended early") {
                FlowEvent::QuestionPresented { .. } => {
                    handle
                        .commands
                        .send(FlowCommand::Draft("a substantive answer with detail".into()))
                        .await
                        .unwrap();
                    handle.commands.send(FlowCommand::Submit).await.unwrap();
                }
                FlowEvent::Completed(_) => break,
                _ => {}
            }
        }

        match run.await.unwrap().unwrap() {
            FlowOutcome::Completed(report) => {
                assert!(!report.completion_confirmed);
                assert_eq!(report.summary_origin, ArtifactOrigin::Heuristic);
                assert_eq!(report.glyph_origin, ArtifactOrigin::Heuristic);
                assert_eq!(report.tier, QualityTier::Excellent);
                assert!(report.glyph.svg.contains("svg"));
            }
            FlowOutcome::Abandoned => panic!("expected completion"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_the_run() {
        let backend = Arc::new(ScriptedBackend::new(vec![question(1)]));
        let (flow, mut handle) = flow_with(backend.clone(), 1);
        let run = tokio::spawn(flow.run());

        loop {
            if let FlowEvent::QuestionPresented { .. } =
                handle.events.recv().await.expect("flow ended early")
            {
                handle.cancel.cancel();
                break;
            }
        }

        match run.await.unwrap().unwrap() {
            FlowOutcome::Abandoned => {}
            FlowOutcome::Completed(_) => panic!("expected abandonment"),
        }
    }
}
