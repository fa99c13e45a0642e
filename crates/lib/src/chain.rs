//! # Vector SQL Database Chain
//!
//! One natural-language question in, one answer out:
//!
//! 1. the model writes vector-aware SQL for the question,
//! 2. the configured `SqlOutputParser` makes it executable,
//! 3. an optional checker pass lets the model correct the query,
//! 4. the storage provider runs it,
//! 5. the model turns the rows into an answer, unless the caller asked for the
//!    SQL or the rows themselves.
//!
//! Every stage input and output is recorded as an `IntermediateStep`. On failure
//! the recorded steps travel with the error in `PromptError::Chain`.
//!
//! *Security note*: the chain runs whatever statement the model writes. Use
//! database credentials scoped to exactly the permissions the chain needs.

use crate::{
    callbacks::{ChainCallback, TextColor, TracingCallback},
    constants::{DEFAULT_TOP_K, SQL_RESULT_STOP},
    errors::PromptError,
    literal::coerce_value,
    llm_chain::LlmChain,
    parser::SqlOutputParser,
    prompts::{
        vector_sql::{QUERY_CHECKER_PROMPT, VECTOR_SQL_PROMPT, VECTOR_SQL_SYSTEM_PROMPT},
        PromptTemplate,
    },
    providers::{ai::AiProvider, db::storage::Storage},
    types::{ChainInput, ChainOutput, ChainResult, ExecutionMode, FetchMode, IntermediateStep},
};
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::{error, info};

/// The chain. Build it with `VectorSqlDatabaseChainBuilder`.
pub struct VectorSqlDatabaseChain {
    llm_chain: LlmChain,
    query_checker_chain: Option<LlmChain>,
    storage_provider: Box<dyn Storage>,
    sql_cmd_parser: Box<dyn SqlOutputParser>,
    callback: Box<dyn ChainCallback>,
    top_k: usize,
    mode: ExecutionMode,
    return_intermediate_steps: bool,
    fetch_mode: FetchMode,
    verbose: bool,
}

impl fmt::Debug for VectorSqlDatabaseChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorSqlDatabaseChain")
            .field("storage", &self.storage_provider.name())
            .field("parser", &self.sql_cmd_parser.parser_type())
            .field("top_k", &self.top_k)
            .field("mode", &self.mode)
            .field("use_query_checker", &self.query_checker_chain.is_some())
            .field("return_intermediate_steps", &self.return_intermediate_steps)
            .finish_non_exhaustive()
    }
}

impl VectorSqlDatabaseChain {
    pub fn builder() -> VectorSqlDatabaseChainBuilder {
        VectorSqlDatabaseChainBuilder::new()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Answers a question against every table.
    pub async fn run(&self, question: &str) -> Result<ChainOutput, PromptError> {
        Ok(self.call(ChainInput::from(question)).await?.result)
    }

    /// Runs the chain once.
    ///
    /// Errors are returned as `PromptError::Chain`, carrying the steps recorded
    /// before the failure.
    pub async fn call(&self, input: ChainInput) -> Result<ChainResult, PromptError> {
        info!(query = %input.query, mode = ?self.mode, "Running vector SQL chain.");
        let mut intermediate_steps = Vec::new();

        let outcome = self.run_steps(&input, &mut intermediate_steps).await;
        match outcome {
            Ok(result) => Ok(ChainResult {
                result,
                intermediate_steps: self
                    .return_intermediate_steps
                    .then_some(intermediate_steps),
            }),
            Err(e) => {
                error!(
                    steps = intermediate_steps.len(),
                    "Vector SQL chain failed: {e}"
                );
                Err(e.with_intermediate_steps(intermediate_steps))
            }
        }
    }

    async fn run_steps(
        &self,
        input: &ChainInput,
        steps: &mut Vec<IntermediateStep>,
    ) -> Result<ChainOutput, PromptError> {
        let mut input_text = format!("{}\nSQLQuery:", input.query);
        self.on_text(&input_text, None);

        let table_info = self
            .storage_provider
            .get_table_info(input.table_names_to_use.as_deref())
            .await?;
        let stop = vec![SQL_RESULT_STOP.to_string()];

        let mut llm_inputs = Map::new();
        llm_inputs.insert("input".to_string(), json!(input_text));
        llm_inputs.insert("top_k".to_string(), json!(self.top_k.to_string()));
        llm_inputs.insert(
            "dialect".to_string(),
            json!(self.storage_provider.dialect()),
        );
        llm_inputs.insert("table_info".to_string(), json!(table_info));
        llm_inputs.insert("stop".to_string(), json!(stop));

        // --- Generate ---
        steps.push(IntermediateStep::Input(llm_inputs.clone()));
        let llm_out = self.llm_chain.predict(&llm_inputs, &stop).await?;
        steps.push(IntermediateStep::Output(llm_out.clone()));

        // --- Parse ---
        let mut sql_cmd = self.sql_cmd_parser.parse(&llm_out).await?;
        if self.mode == ExecutionMode::ReturnSql {
            self.on_text(&sql_cmd, Some(TextColor::Green));
            return Ok(ChainOutput::Sql(sql_cmd));
        }

        // --- Check ---
        if let Some(checker) = &self.query_checker_chain {
            let mut checker_inputs = Map::new();
            checker_inputs.insert("query".to_string(), json!(llm_out));
            checker_inputs.insert(
                "dialect".to_string(),
                json!(self.storage_provider.dialect()),
            );
            steps.push(IntermediateStep::Input(checker_inputs.clone()));
            let checked_llm_out = checker.predict(&checker_inputs, &[]).await?;
            steps.push(IntermediateStep::Output(checked_llm_out.clone()));
            sql_cmd = self.sql_cmd_parser.parse(&checked_llm_out).await?;
        }
        self.on_text(&sql_cmd, Some(TextColor::Green));

        // --- Execute ---
        let mut sql_inputs = Map::new();
        sql_inputs.insert("sql_cmd".to_string(), json!(sql_cmd));
        steps.push(IntermediateStep::Input(sql_inputs));
        let result = self
            .storage_provider
            .execute(&sql_cmd, self.fetch_mode)
            .await?
            .map_values(coerce_value);
        let result_text = result.to_string();
        steps.push(IntermediateStep::Output(result_text.clone()));
        info!(rows = result.len(), "Vector SQL query executed.");

        self.on_text("\nSQLResult: ", None);
        self.on_text(&result_text, Some(TextColor::Yellow));

        if self.mode == ExecutionMode::ReturnDirect {
            return Ok(ChainOutput::Rows(result));
        }

        // --- Answer ---
        self.on_text("\nAnswer:", None);
        input_text.push_str(&format!("{sql_cmd}\nSQLResult: {result_text}\nAnswer:"));
        llm_inputs.insert("input".to_string(), Value::String(input_text));
        steps.push(IntermediateStep::Input(llm_inputs.clone()));
        let final_result = self
            .llm_chain
            .predict(&llm_inputs, &stop)
            .await?
            .trim()
            .to_string();
        steps.push(IntermediateStep::Output(final_result.clone()));
        self.on_text(&final_result, Some(TextColor::Green));

        Ok(ChainOutput::Answer(final_result))
    }

    fn on_text(&self, text: &str, color: Option<TextColor>) {
        self.callback.on_text(text, color, self.verbose);
    }
}

/// A builder for `VectorSqlDatabaseChain`.
///
/// The AI provider, storage provider and parser are required. Everything else
/// has a default: the built-in prompts, `top_k = 5`, `ExecutionMode::Answer`,
/// no query checker, no retained steps, `FetchMode::All`, `TracingCallback`.
pub struct VectorSqlDatabaseChainBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    storage_provider: Option<Box<dyn Storage>>,
    sql_cmd_parser: Option<Box<dyn SqlOutputParser>>,
    prompt: Option<PromptTemplate>,
    query_checker_prompt: Option<PromptTemplate>,
    system_prompt: String,
    callback: Box<dyn ChainCallback>,
    top_k: usize,
    mode: ExecutionMode,
    use_query_checker: bool,
    return_intermediate_steps: bool,
    fetch_mode: FetchMode,
    verbose: bool,
}

impl Default for VectorSqlDatabaseChainBuilder {
    fn default() -> Self {
        Self {
            ai_provider: None,
            storage_provider: None,
            sql_cmd_parser: None,
            prompt: None,
            query_checker_prompt: None,
            system_prompt: VECTOR_SQL_SYSTEM_PROMPT.to_string(),
            callback: Box::new(TracingCallback),
            top_k: DEFAULT_TOP_K,
            mode: ExecutionMode::default(),
            use_query_checker: false,
            return_intermediate_steps: false,
            fetch_mode: FetchMode::default(),
            verbose: false,
        }
    }
}

impl VectorSqlDatabaseChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    pub fn storage_provider(mut self, storage_provider: Box<dyn Storage>) -> Self {
        self.storage_provider = Some(storage_provider);
        self
    }

    pub fn sql_cmd_parser(mut self, parser: Box<dyn SqlOutputParser>) -> Self {
        self.sql_cmd_parser = Some(parser);
        self
    }

    /// Overrides the generation prompt. It must use `{input}` and `{table_info}`.
    pub fn prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Overrides the checker prompt. It must use `{query}`.
    pub fn query_checker_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.query_checker_prompt = Some(prompt);
        self
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn callback(mut self, callback: Box<dyn ChainCallback>) -> Self {
        self.callback = callback;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn use_query_checker(mut self, enabled: bool) -> Self {
        self.use_query_checker = enabled;
        self
    }

    pub fn return_intermediate_steps(mut self, enabled: bool) -> Self {
        self.return_intermediate_steps = enabled;
        self
    }

    pub fn fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = fetch_mode;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validates the configuration and builds the chain.
    pub fn build(self) -> Result<VectorSqlDatabaseChain, PromptError> {
        let ai_provider = self.ai_provider.ok_or_else(|| {
            PromptError::InvalidConfiguration("an AI provider must be set".to_string())
        })?;
        let storage_provider = self.storage_provider.ok_or_else(|| {
            PromptError::InvalidConfiguration("a storage provider must be set".to_string())
        })?;
        let sql_cmd_parser = self.sql_cmd_parser.ok_or_else(|| {
            PromptError::InvalidConfiguration("a SQL output parser must be set".to_string())
        })?;

        if self.top_k == 0 {
            return Err(PromptError::InvalidConfiguration(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if self.mode == ExecutionMode::ReturnSql && self.use_query_checker {
            return Err(PromptError::InvalidConfiguration(
                "the query checker never runs when only the SQL is returned".to_string(),
            ));
        }

        let prompt = match self.prompt {
            Some(prompt) => prompt,
            None => PromptTemplate::new(VECTOR_SQL_PROMPT)?,
        };
        prompt.require_variables(&["input", "table_info"])?;

        let query_checker_chain = if self.use_query_checker {
            let checker_prompt = match self.query_checker_prompt {
                Some(prompt) => prompt,
                None => PromptTemplate::new(QUERY_CHECKER_PROMPT)?,
            };
            checker_prompt.require_variables(&["query"])?;
            Some(
                LlmChain::new(ai_provider.clone(), checker_prompt)
                    .with_system_prompt(self.system_prompt.clone()),
            )
        } else {
            None
        };

        Ok(VectorSqlDatabaseChain {
            llm_chain: LlmChain::new(ai_provider, prompt).with_system_prompt(self.system_prompt),
            query_checker_chain,
            storage_provider,
            sql_cmd_parser,
            callback: self.callback,
            top_k: self.top_k,
            mode: self.mode,
            return_intermediate_steps: self.return_intermediate_steps,
            fetch_mode: self.fetch_mode,
            verbose: self.verbose,
        })
    }
}
