//! # Shared Constants
//!
//! Marker tokens and defaults shared by the parser, the chain and the providers.

/// The pseudo-function the model writes in place of a literal embedding vector.
pub const NEURAL_ARRAY_MARKER: &str = "NeuralArray(";

/// The placeholder the model writes in place of the backend's distance function.
pub const DISTANCE_PLACEHOLDER: &str = "DISTANCE";

/// The distance function name used when none is configured.
pub const DEFAULT_DISTANCE_FUNC_NAME: &str = "distance";

/// Stop sequence for the SQL generation step, so the model does not invent results.
pub const SQL_RESULT_STOP: &str = "\nSQLResult:";

/// Default upper bound on rows the generated query should return.
pub const DEFAULT_TOP_K: usize = 5;

/// Number of sample rows appended to each table description.
pub const DEFAULT_SAMPLE_ROWS_IN_TABLE_INFO: usize = 3;

/// Key under which an `LlmChain` stores its generated text.
pub const DEFAULT_OUTPUT_KEY: &str = "text";
