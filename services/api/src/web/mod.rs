pub mod admin;
pub mod chat;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

// Re-export the handlers the binary wires into the router.
pub use chat::{chat_handler, health_handler};
pub use middleware::require_admin;
pub use rest::{
    complete_session_handler, create_session_handler, discard_session_handler, glyph_handler,
    next_question_handler, result_handler, session_status_handler, submit_answer_handler,
    summary_handler,
};
