pub mod autosave_file;
pub mod backend_http;
pub mod chat_llm;
pub mod memory_store;
pub mod pg_store;
pub mod question_llm;

pub use autosave_file::FileAutosaveStore;
pub use backend_http::HttpInterviewBackend;
pub use chat_llm::OpenAiChatAdapter;
pub use memory_store::MemorySessionStore;
pub use pg_store::PgSessionStore;
pub use question_llm::OpenAiQuestionAdapter;
