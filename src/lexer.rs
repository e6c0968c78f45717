//! Splits a command line into plain string tokens.
//!
//! Words are separated by blanks and `|` is always a token on its own, so
//! `ls|wc` and `ls | wc` tokenize the same way. No quoting, escaping or
//! expansion takes place: every word reaches the program loader verbatim.

use crate::error::UsageError;

/// Longest line accepted, in bytes.
pub const MAX_LINE_LEN: usize = 4096;
/// Largest number of tokens accepted on one line.
pub const MAX_TOKENS: usize = 128;

/// The token separating two pipeline segments.
pub const PIPE: &str = "|";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Blank,
    ReadingWord,
}

struct LexingFSM<'a> {
    input: &'a str,
    state: LexingState,
    word_start: usize,
    out: Vec<String>,
}

impl<'a> LexingFSM<'a> {
    fn new(input: &'a str) -> Self {
        LexingFSM {
            input,
            state: LexingState::Blank,
            word_start: 0,
            out: Vec::new(),
        }
    }

    fn make_tokens(mut self) -> Vec<String> {
        for (pos, ch) in self.input.char_indices() {
            match (self.state, ch) {
                (_, '|') => {
                    self.finish_word(pos);
                    self.out.push(PIPE.to_string());
                }
                (LexingState::Blank, c) if c.is_whitespace() => {}
                (LexingState::Blank, _) => {
                    self.word_start = pos;
                    self.state = LexingState::ReadingWord;
                }
                (LexingState::ReadingWord, c) if c.is_whitespace() => self.finish_word(pos),
                (LexingState::ReadingWord, _) => {}
            }
        }
        self.finish_word(self.input.len());
        self.out
    }

    fn finish_word(&mut self, end: usize) {
        if self.state == LexingState::ReadingWord {
            self.out.push(self.input[self.word_start..end].to_string());
        }
        self.state = LexingState::Blank;
    }
}

/// Tokenize one command line. A blank line yields no tokens.
pub fn split_into_tokens(line: &str) -> Result<Vec<String>, UsageError> {
    if line.len() > MAX_LINE_LEN {
        return Err(UsageError::LineTooLong {
            len: line.len(),
            limit: MAX_LINE_LEN,
        });
    }
    let tokens = LexingFSM::new(line).make_tokens();
    if tokens.len() > MAX_TOKENS {
        return Err(UsageError::TooManyTokens {
            count: tokens.len(),
            limit: MAX_TOKENS,
        });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(line: &str) -> Vec<String> {
        split_into_tokens(line).unwrap()
    }

    #[test]
    fn test_simple_words() {
        assert_eq!(lex("ls -al /tmp\n"), ["ls", "-al", "/tmp"]);
    }

    #[test]
    fn test_blank_line_has_no_tokens() {
        assert!(lex("").is_empty());
        assert!(lex("   \t \n").is_empty());
    }

    #[test]
    fn test_pipe_is_its_own_token() {
        assert_eq!(lex("ls|wc -l"), ["ls", "|", "wc", "-l"]);
        assert_eq!(lex("ls | wc"), ["ls", "|", "wc"]);
        assert_eq!(lex("|"), ["|"]);
        assert_eq!(lex("a||b"), ["a", "|", "|", "b"]);
    }

    #[test]
    fn test_history_tokens_pass_through() {
        assert_eq!(lex("!!"), ["!!"]);
        assert_eq!(lex("  !12 extra"), ["!12", "extra"]);
    }

    #[test]
    fn test_quotes_are_not_special() {
        assert_eq!(lex("echo 'a b'"), ["echo", "'a", "b'"]);
    }

    #[test]
    fn test_line_too_long() {
        let line = "x".repeat(MAX_LINE_LEN + 1);
        assert!(matches!(
            split_into_tokens(&line),
            Err(UsageError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_too_many_tokens() {
        let line = "a ".repeat(MAX_TOKENS + 1);
        assert!(matches!(
            split_into_tokens(&line),
            Err(UsageError::TooManyTokens { .. })
        ));
    }
}
