//! Command tokenizer.

/// Delimiters separating command tokens.
pub const COMMAND_DELIMITERS: &[char] = &[':', ' '];

/// Split `line` on any character in `delimiters`.
///
/// Always yields at least one token. Adjacent delimiters yield empty tokens
/// rather than being merged, so later stages can index positionally.
pub fn tokenize<'a>(line: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    line.split(|c: char| delimiters.contains(&c)).collect()
}
