use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::utils::{GrammarError, Result};

/// A keyword together with the replacement texts it may expand to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    keyword: String,
    replacements: Vec<String>,
}

impl Rule {
    /// Create a rule with no replacements yet
    pub fn new(keyword: &str) -> Self {
        Rule {
            keyword: keyword.to_string(),
            replacements: Vec::new(),
        }
    }

    /// Append a replacement. It may be empty and may itself contain
    /// `{keyword}` placeholders; those are resolved by the rule set.
    pub fn add(&mut self, replacement: &str) {
        self.replacements.push(replacement.to_string());
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Replacements in insertion order
    pub fn replacements(&self) -> &[String] {
        &self.replacements
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Pick a replacement uniformly at random using the thread RNG
    pub fn pick_random(&self) -> Result<&str> {
        self.pick_random_with(&mut rand::thread_rng())
    }

    /// Pick a replacement uniformly at random using the given RNG
    pub fn pick_random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str> {
        if self.replacements.is_empty() {
            return Err(GrammarError::EmptyRule {
                keyword: self.keyword.clone(),
            });
        }

        let idx = rng.gen_range(0..self.replacements.len());
        Ok(&self.replacements[idx])
    }
}

/// Renders as `keyword --> first` with every further replacement on its
/// own line, aligned under the first one.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = format!("{} --> ", self.keyword);
        let indent = " ".repeat(prefix.chars().count());

        f.write_str(&prefix)?;
        for (i, replacement) in self.replacements.iter().enumerate() {
            if i > 0 {
                write!(f, "\n{}", indent)?;
            }
            f.write_str(replacement)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_add_preserves_order() {
        let mut rule = Rule::new("noun");
        rule.add("fox");
        rule.add("");
        rule.add("{adjective} dog");

        assert_eq!(rule.keyword(), "noun");
        assert_eq!(rule.replacements(), &["fox", "", "{adjective} dog"]);
        assert_eq!(rule.len(), 3);
    }

    #[test]
    fn test_pick_random_covers_all() {
        let mut rule = Rule::new("noun");
        rule.add("fox");
        rule.add("dog");
        rule.add("cat");

        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(rule.pick_random_with(&mut rng).unwrap().to_string());
        }

        let expected: HashSet<String> = ["fox", "dog", "cat"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_pick_random_is_reproducible() {
        let mut rule = Rule::new("n");
        for i in 0..10 {
            rule.add(&i.to_string());
        }

        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| rule.pick_random_with(&mut rng).unwrap().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
    }

    #[test]
    fn test_pick_random_empty_rule() {
        let rule = Rule::new("nothing");
        match rule.pick_random() {
            Err(GrammarError::EmptyRule { keyword }) => assert_eq!(keyword, "nothing"),
            other => panic!("Expected EmptyRule, got {:?}", other),
        }
    }

    #[test]
    fn test_display_aligns_replacements() {
        let mut rule = Rule::new("verb");
        rule.add("jumps over");
        rule.add("runs around");
        rule.add("observes");

        assert_eq!(
            rule.to_string(),
            "verb --> jumps over\n         runs around\n         observes"
        );
    }

    #[test]
    fn test_display_single_and_empty() {
        let mut rule = Rule::new("x");
        assert_eq!(rule.to_string(), "x --> ");

        rule.add("y");
        assert_eq!(rule.to_string(), "x --> y");
    }
}
