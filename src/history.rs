//! Command history and `!`-expansion.
//!
//! The store is an append-only log owned by whoever drives the read loop.
//! It is handed to [`Interpreter::execute`](crate::Interpreter::execute) by
//! reference, so each test (or each embedding) can use a fresh one.

use crate::error::ResolutionError;

/// Prefix that marks a history expansion token.
pub const EXPANSION_PREFIX: char = '!';

/// One submitted command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Position in insertion order, starting at 0.
    pub sequence: usize,
    /// The line as submitted, without the trailing newline.
    pub text: String,
}

impl Entry {
    /// Whether this entry was itself a history expansion (`!!`, `!3`, ...).
    pub fn is_expansion(&self) -> bool {
        self.text.trim_start().starts_with(EXPANSION_PREFIX)
    }
}

#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<Entry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the end of the log and return its sequence number.
    pub fn append(&mut self, line: &str) -> usize {
        let sequence = self.entries.len();
        self.entries.push(Entry {
            sequence,
            text: line.trim_end().to_string(),
        });
        sequence
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at absolute position `index`, counting from the oldest.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Oldest entry first.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Newest entry first. Each call starts a fresh traversal.
    pub fn iter_most_recent_first(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().rev()
    }

    /// Resolve a single expansion token (`!!` or `!N`) to the entry it names.
    ///
    /// `!!` skips entries that are expansions themselves, so repeating `!!`
    /// keeps recalling the same original command. `!N` addresses entries by
    /// absolute position, oldest first.
    pub fn resolve(&self, token: &str) -> Result<&Entry, ResolutionError> {
        let selector = token
            .strip_prefix(EXPANSION_PREFIX)
            .ok_or_else(|| ResolutionError::InvalidIndex(token.to_string()))?;

        if selector == "!" {
            return self
                .iter_most_recent_first()
                .find(|entry| !entry.is_expansion())
                .ok_or(ResolutionError::NoHistory);
        }

        selector
            .parse::<usize>()
            .ok()
            .and_then(|index| self.get(index))
            .ok_or_else(|| ResolutionError::InvalidIndex(token.to_string()))
    }
}

/// Expand a command whose first token is a history reference.
///
/// Words following the reference are appended to the recalled line, so
/// `!3 -l` re-runs entry 3 with an extra `-l`.
pub fn expand(history: &History, argv: &[String]) -> Result<String, ResolutionError> {
    let Some((token, rest)) = argv.split_first() else {
        return Err(ResolutionError::NoHistory);
    };
    let entry = history.resolve(token)?;
    let mut line = entry.text.clone();
    for word in rest {
        line.push(' ');
        line.push_str(word);
    }
    Ok(line)
}

/// Whether `token` asks for a history expansion.
pub fn is_expansion(token: &str) -> bool {
    token.starts_with(EXPANSION_PREFIX)
}
