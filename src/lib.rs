//! Phrase-Gen expands keyword grammars into random sentences.
//!
//! A grammar is a set of rules, each mapping a keyword to one or more
//! replacement texts. Expanding a sentence replaces every `{keyword}`
//! placeholder with a randomly chosen replacement, over and over, until no
//! placeholder is left. Replacements may contain further placeholders,
//! which is how hierarchical grammars are written.
//!
//! # Example
//!
//! ```rust
//! use phrase_gen::RuleSet;
//!
//! let rules: RuleSet = "
//!     SENTENCE --> {subject} sleeps
//!     subject  --> the cat
//!     subject  --> a dog
//! "
//! .parse()
//! .unwrap();
//!
//! let text = rules.evaluate("{SENTENCE}").unwrap();
//! assert!(text == "The cat sleeps" || text == "A dog sleeps");
//! ```

pub mod grammar;
pub mod rule;
pub mod utils;

pub use grammar::{RuleSet, START_KEYWORD};
pub use rule::Rule;
pub use utils::{GrammarError, Result};
