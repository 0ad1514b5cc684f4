//! The tracked keyword list and its mutation operations.

use crate::error::{Result, WordwatchError};
use crate::keywords::parser::KeywordSpec;

/// A tracked keyword with its running count and mention target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub name: String,
    /// Alternate spellings matched alongside the name.
    pub aliases: Vec<String>,
    pub count: u32,
    pub target: u32,
    /// Transient flag raised when the count reaches the target, lowered
    /// again after the mention pulse.
    pub is_mentioned: bool,
}

impl Keyword {
    fn from_spec(spec: KeywordSpec) -> Self {
        Self {
            name: spec.name,
            aliases: Vec::new(),
            count: 0,
            target: spec.target,
            is_mentioned: false,
        }
    }
}

/// Ordered collection of tracked keywords. Names are unique
/// case-insensitively.
#[derive(Debug, Default)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set from parsed specs, discarding counts.
    pub fn replace_from_specs(&mut self, specs: Vec<KeywordSpec>) {
        self.keywords = specs.into_iter().map(Keyword::from_spec).collect();
    }

    /// Adds one keyword with a zeroed count.
    ///
    /// # Errors
    /// `EmptyKeyword` for a blank name, `DuplicateKeyword` when a keyword
    /// with the same name (ignoring case) already exists.
    pub fn add(&mut self, spec: KeywordSpec) -> Result<()> {
        if spec.name.trim().is_empty() {
            return Err(WordwatchError::EmptyKeyword);
        }
        if self.find_index(&spec.name).is_some() {
            return Err(WordwatchError::DuplicateKeyword { name: spec.name });
        }
        self.keywords.push(Keyword::from_spec(spec));
        Ok(())
    }

    /// Renames or retargets an existing keyword, preserving its aliases
    /// and resetting its count.
    ///
    /// # Errors
    /// `EmptyKeyword` for a blank new name, `KeywordNotFound` for an
    /// unknown original name, `DuplicateKeyword` when the new name
    /// collides with a different keyword.
    pub fn edit(&mut self, original_name: &str, spec: KeywordSpec) -> Result<()> {
        if spec.name.trim().is_empty() {
            return Err(WordwatchError::EmptyKeyword);
        }
        let index = self
            .find_index(original_name)
            .ok_or_else(|| WordwatchError::KeywordNotFound {
                name: original_name.to_string(),
            })?;

        if let Some(other) = self.find_index(&spec.name)
            && other != index
        {
            return Err(WordwatchError::DuplicateKeyword { name: spec.name });
        }

        let aliases = std::mem::take(&mut self.keywords[index].aliases);
        let mut replacement = Keyword::from_spec(spec);
        replacement.aliases = aliases;
        self.keywords[index] = replacement;
        Ok(())
    }

    /// Removes a keyword by name.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let index = self
            .find_index(name)
            .ok_or_else(|| WordwatchError::KeywordNotFound {
                name: name.to_string(),
            })?;
        self.keywords.remove(index);
        Ok(())
    }

    /// Zeroes all counts and lowers all mention flags for a new session.
    pub fn reset_counts(&mut self) {
        for kw in &mut self.keywords {
            kw.count = 0;
            kw.is_mentioned = false;
        }
    }

    /// Sets the count for the named keyword, raising the mention flag
    /// when asked.
    pub fn apply_count(&mut self, name: &str, count: u32, reached_target: bool) {
        if let Some(index) = self.find_index(name) {
            self.keywords[index].count = count;
            if reached_target {
                self.keywords[index].is_mentioned = true;
            }
        }
    }

    /// Replaces the alias list for the named keyword.
    pub fn set_aliases(&mut self, name: &str, aliases: Vec<String>) -> Result<()> {
        let index = self
            .find_index(name)
            .ok_or_else(|| WordwatchError::KeywordNotFound {
                name: name.to_string(),
            })?;
        self.keywords[index].aliases = aliases;
        Ok(())
    }

    /// Lowers the mention flag on the named keywords. Called when the
    /// mention pulse expires.
    pub fn clear_mentioned(&mut self, names: &[String]) {
        for kw in &mut self.keywords {
            if names.iter().any(|n| n.eq_ignore_ascii_case(&kw.name)) {
                kw.is_mentioned = false;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Keyword> {
        self.find_index(name).map(|i| &self.keywords[i])
    }

    fn find_index(&self, name: &str) -> Option<usize> {
        self.keywords
            .iter()
            .position(|k| k.name.eq_ignore_ascii_case(name))
    }
}
