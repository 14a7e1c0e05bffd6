use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use log::{debug, trace};
use rand::Rng;
use regex::Regex;

use crate::rule::Rule;
use crate::utils::{capitalize, Result};

/// `{` + word characters + `}`
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\w+\}").expect("placeholder pattern is valid"));

/// Separator between keyword and replacement in rule definition lines
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" *--> *").expect("separator pattern is valid"));

/// The reserved root keyword
pub const START_KEYWORD: &str = "SENTENCE";

/// A set of rules keyed by keyword, and the engine that expands sentences
/// against them.
///
/// Expansion works in passes: every `{keyword}` placeholder present at the
/// start of a pass is replaced, then the rebuilt string is scanned again,
/// until no placeholder remains. Placeholders without a rule become
/// `[ keyword ]` so they show up in the output.
///
/// Cyclic rules make expansion loop forever; avoiding them is up to whoever
/// writes the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<String, Rule>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        RuleSet {
            rules: BTreeMap::new(),
        }
    }

    /// Read rule definitions from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Read rule definitions from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut rules = RuleSet::new();
        rules.extend_from_reader(reader)?;
        Ok(rules)
    }

    /// Add the rule definitions from `reader` to this set
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
        Ok(self.load(lines))
    }

    /// Parse rule definitions from a block of text
    pub fn parse(&mut self, text: &str) -> usize {
        self.load(text.lines())
    }

    /// Register every well-formed `keyword --> replacement` line.
    ///
    /// Lines that do not split into exactly one keyword and one replacement
    /// are skipped. Returns the number of lines accepted.
    pub fn load<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = 0;
        let mut skipped = 0;

        for line in lines {
            match split_definition(line.as_ref()) {
                Some((keyword, replacement)) => {
                    self.add_replacement(keyword, replacement);
                    accepted += 1;
                }
                None => {
                    trace!("skipping line {:?}", line.as_ref());
                    skipped += 1;
                }
            }
        }

        debug!(
            "loaded {} rule lines ({} skipped), {} keywords total",
            accepted,
            skipped,
            self.rules.len()
        );
        accepted
    }

    /// Append `replacement` to the rule for `keyword`, creating the rule on
    /// first use
    pub fn add_replacement(&mut self, keyword: &str, replacement: &str) -> &mut Self {
        self.add_rule(keyword).add(replacement);
        self
    }

    /// Get the rule for `keyword`, registering an empty one if needed
    pub fn add_rule(&mut self, keyword: &str) -> &mut Rule {
        self.rules
            .entry(keyword.to_string())
            .or_insert_with(|| Rule::new(keyword))
    }

    pub fn get(&self, keyword: &str) -> Option<&Rule> {
        self.rules.get(keyword)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.rules.contains_key(keyword)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the defined keywords in order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Expand `sentence` using the thread RNG
    pub fn evaluate(&self, sentence: &str) -> Result<String> {
        self.evaluate_with(sentence, &mut rand::thread_rng())
    }

    /// Expand every placeholder in `sentence` until none remain, then
    /// upper-case the first character.
    ///
    /// Fails if a rule with no replacements is selected; no partial result
    /// is returned in that case.
    pub fn evaluate_with<R: Rng + ?Sized>(&self, sentence: &str, rng: &mut R) -> Result<String> {
        let mut current = sentence.to_string();
        let mut passes = 0usize;

        while !Self::is_complete(&current) {
            current = self.substitute_pass(&current, rng)?;
            passes += 1;
        }

        debug!("expanded {:?} in {} passes", sentence, passes);
        Ok(capitalize(&current))
    }

    /// Replace every placeholder found in `sentence` once. Replacement text
    /// is not rescanned until the next pass.
    fn substitute_pass<R: Rng + ?Sized>(&self, sentence: &str, rng: &mut R) -> Result<String> {
        let mut result = String::with_capacity(sentence.len());
        let mut last = 0;

        for m in PLACEHOLDER.find_iter(sentence) {
            result.push_str(&sentence[last..m.start()]);
            let keyword = placeholder_keyword(m.as_str());

            match self.rules.get(keyword) {
                Some(rule) => result.push_str(rule.pick_random_with(rng)?),
                None => {
                    trace!("no rule for keyword {:?}", keyword);
                    result.push_str("[ ");
                    result.push_str(keyword);
                    result.push_str(" ]");
                }
            }
            last = m.end();
        }

        result.push_str(&sentence[last..]);
        Ok(result)
    }

    /// A sentence is complete once it holds no `{keyword}` placeholder
    pub fn is_complete(sentence: &str) -> bool {
        !PLACEHOLDER.is_match(sentence)
    }

    /// Keywords referenced by placeholders in `sentence`, in order of
    /// appearance
    pub fn placeholders(sentence: &str) -> Vec<&str> {
        PLACEHOLDER
            .find_iter(sentence)
            .map(|m| placeholder_keyword(m.as_str()))
            .collect()
    }

    /// Keywords referenced by some replacement but never defined.
    /// These expand to `[ keyword ]` rather than failing.
    pub fn undefined_keywords(&self) -> BTreeSet<String> {
        self.rules
            .values()
            .flat_map(|rule| rule.replacements().iter())
            .flat_map(|replacement| Self::placeholders(replacement))
            .filter(|keyword| !self.rules.contains_key(*keyword))
            .map(str::to_string)
            .collect()
    }

    /// Every rule rendered with `Rule`'s display format, one per line
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// Export the rules as a JSON array of `{keyword, replacements}` objects
    pub fn to_json(&self) -> Result<String> {
        let rules: Vec<&Rule> = self.rules.values().collect();
        Ok(serde_json::to_string_pretty(&rules)?)
    }

    /// Import rules previously written by [`RuleSet::to_json`]. Repeated
    /// keywords accumulate replacements.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Vec<Rule> = serde_json::from_str(json)?;
        let mut rules = RuleSet::new();
        for rule in parsed {
            let target = rules.add_rule(rule.keyword());
            for replacement in rule.replacements() {
                target.add(replacement);
            }
        }
        Ok(rules)
    }
}

/// Split a trimmed `keyword --> replacement` line into its two parts
fn split_definition(line: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = SEPARATOR.split(line.trim()).collect();
    match parts.as_slice() {
        [keyword, replacement] if !keyword.is_empty() && !replacement.is_empty() => {
            Some((keyword, replacement))
        }
        _ => None,
    }
}

/// Strip the braces from a matched placeholder
fn placeholder_keyword(placeholder: &str) -> &str {
    &placeholder[1..placeholder.len() - 1]
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.values().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl FromStr for RuleSet {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut rules = RuleSet::new();
        rules.parse(s);
        Ok(rules)
    }
}
