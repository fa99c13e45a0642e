//! # Vector SQL
//!
//! This crate turns natural-language questions into vector-aware SQL with a
//! configurable AI provider, runs the SQL against a storage provider, and can
//! summarize the rows back into an answer. It also ships a small synthetic
//! dataset generator built on the same AI provider abstraction.
//!
//! The main entry points are:
//!
//! - [`VectorSqlDatabaseChain`]: question -> SQL -> rows -> answer.
//! - [`VectorSqlOutputParser`] / [`VectorSqlRetrieveAllOutputParser`]: resolve
//!   `NeuralArray(...)` markers and the `DISTANCE` placeholder in model output.
//! - [`DatasetGenerator`]: one generated sentence per field-set.

pub mod callbacks;
pub mod chain;
pub mod constants;
pub mod errors;
pub mod literal;
pub mod llm_chain;
pub mod parser;
pub mod prompts;
pub mod providers;
pub mod synthetic;
pub mod types;

pub use chain::{VectorSqlDatabaseChain, VectorSqlDatabaseChainBuilder};
pub use errors::PromptError;
pub use llm_chain::LlmChain;
pub use parser::{SqlOutputParser, VectorSqlOutputParser, VectorSqlRetrieveAllOutputParser};
pub use prompts::PromptTemplate;
pub use synthetic::{create_data_generation_chain, DatasetGenerator};
pub use types::{
    ChainInput, ChainOutput, ChainResult, ExecutionMode, FetchMode, IntermediateStep, SqlResult,
};
