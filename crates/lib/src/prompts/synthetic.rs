//! # Synthetic Data Prompts

/// The default prompt for generating one sentence from a set of fields.
///
/// Placeholders: `{fields}`, `{preferences}`
pub const SENTENCE_PROMPT: &str = r#"Given the following fields, create a sentence about them. Make the sentence detailed and interesting. Use every given field.
If any additional preferences are given, use them during sentence construction as well.
Fields:
{fields}
Preferences:
{preferences}
Sentence:
"#;
