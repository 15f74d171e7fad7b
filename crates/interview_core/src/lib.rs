pub mod domain;
pub mod flow;
pub mod ports;
pub mod scoring;

pub use domain::{
    AnswerReceipt, AnswerRecord, AnswerSubmission, AskedQuestion, AutosaveSnapshot, ChatMessage,
    ChatRole, Glyph, InterviewResult, QualityTier, Question, QuestionKind, Session, SessionStatus,
    TurnContext,
};
pub use flow::{
    is_complete, ArtifactOrigin, FinalReport, FlowCommand, FlowConfig, FlowEvent, FlowHandle,
    FlowOutcome, FlowPhase, InterviewFlow,
};
pub use ports::{
    AutosaveStore, ChatService, InterviewBackend, PortError, PortResult,
    QuestionGenerationService, SessionStore,
};
