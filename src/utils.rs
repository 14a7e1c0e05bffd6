use std::io;
use thiserror::Error;

/// Custom error types for the phrase generator
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rule '{keyword}' has no replacements")]
    EmptyRule { keyword: String },
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Upper-case the first character of `text`, leaving the rest untouched.
pub fn capitalize(text: &str) -> String {
    let mut c = text.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hello world"), "Hello world");
        assert_eq!(capitalize("hello World"), "Hello World");
        assert_eq!(capitalize("Already"), "Already");
        assert_eq!(capitalize("[ FOO ]"), "[ FOO ]");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_empty_rule_message() {
        let err = GrammarError::EmptyRule {
            keyword: "noun".to_string(),
        };
        assert_eq!(format!("{}", err), "Rule 'noun' has no replacements");
    }
}
