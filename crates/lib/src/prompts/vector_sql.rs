//! # Vector SQL Prompts
//!
//! Default templates for the vector SQL chain.
//!
//! Generation placeholders: `{dialect}`, `{top_k}`, `{table_info}`, `{input}`.
//! Query checker placeholders: `{query}`, `{dialect}`.

/// The default system prompt for every call the chain makes.
pub const VECTOR_SQL_SYSTEM_PROMPT: &str = "You are a careful SQL assistant. Follow the format shown in the user's message exactly and never add markdown formatting.";

/// The default prompt for vector-aware SQL generation.
pub const VECTOR_SQL_PROMPT: &str = r#"You are a {dialect} expert. Given an input question, first create a syntactically correct {dialect} query to run, then look at the results of the query and return the answer to the input question.
{dialect} queries can use a vector search function, `DISTANCE(column, NeuralArray(entity))`, which measures how far the embedding stored in `column` is from the embedding of `entity`. Smaller values mean more similar.
When the question asks for rows that are similar to, related to or about something, you MUST order the results by `DISTANCE(column, NeuralArray(entity))` ascending. Write the entity as plain text inside `NeuralArray(...)`, without quotes or parentheses, and only ever use the name `DISTANCE` for this function.
Unless the user specifies in the question a specific number of examples to obtain, query for at most {top_k} results using the LIMIT clause. You can order the results to return the most informative data in the database.
Never query for all columns from a table. You must query only the columns that are needed to answer the question.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.

Use the following format:

Question: Question here
SQLQuery: SQL Query to run
SQLResult: Result of the SQLQuery
Answer: Final answer here

Only use the following tables:
{table_info}

Question: {input}"#;

/// The default prompt for the optional query checker.
pub const QUERY_CHECKER_PROMPT: &str = r#"{query}
Double check the {dialect} query above for common mistakes, including:
- Using NOT IN with NULL values
- Using UNION when UNION ALL should have been used
- Using BETWEEN for exclusive ranges
- Data type mismatch in predicates
- Properly quoting identifiers
- Using the correct number of arguments for functions
- Casting to the correct data type
- Using the proper columns for joins

Keep every `DISTANCE(...)` and `NeuralArray(...)` call exactly as written.
If there are any of the above mistakes, rewrite the query. If there are no mistakes, just reproduce the original query.

Output the final SQL query only.

SQL Query: "#;
