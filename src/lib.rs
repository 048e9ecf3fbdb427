pub mod agent;
pub mod config;
pub mod data_files;
pub mod errors;
pub mod generate;
pub mod instructions;
pub mod logging;
pub mod models;
pub mod progress;
pub mod stream;
pub mod ui;
pub mod workspace;
pub mod writer_config;

pub use generate::{GenerationRequest, Generator, generate_paper};
pub use models::{GenerationRecord, GenerationResult, ProgressUpdate, ResultStatus};
