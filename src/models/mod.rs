pub mod catalog;
pub mod loaders;
pub mod question;
pub mod request;

pub use catalog::{Catalog, ResolvedRequest, SavedConfig, SubjectEntry, TopicKey, TopicTable};
pub use loaders::{load_all_request_files, load_catalog, load_material, load_toml_to_request};
pub use question::{BatchOutcome, BatchTarget, GenerationOutcome, QuestionRecord};
pub use request::{Difficulty, GenerationMode, GenerationRequest, RequestSpec, MAX_QUESTIONS, UNTITLED_QUIZ};
