use regex::Regex;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\[[^\]]+\]|Br|Cl|%\d{2}|.)").expect("token pattern is a valid regex")
});

/// Splits a SMILES string into tokens.
///
/// Bracket atoms, two-letter halogens and `%nn` ring labels are single
/// tokens; everything else is one character per token. Every character of the
/// input ends up in exactly one token.
pub fn tokenize(smiles: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(smiles)
        .map(|m| m.as_str().to_string())
        .collect()
}
