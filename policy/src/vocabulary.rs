//! Token vocabulary shared by a policy and its checkpoints.

use crate::error::{PolicyError, PolicyResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Start-of-sequence token, always index 0.
pub const START_TOKEN: &str = "^";
/// End-of-sequence token, always index 1.
pub const END_TOKEN: &str = "$";

pub const START: usize = 0;
pub const END: usize = 1;

/// Ordered SMILES tokens with the reserved start and end tokens first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary from an ordered token list that already starts
    /// with `^` and `$`.
    pub fn new(tokens: Vec<String>) -> PolicyResult<Self> {
        if tokens.first().map(String::as_str) != Some(START_TOKEN)
            || tokens.get(1).map(String::as_str) != Some(END_TOKEN)
        {
            return Err(PolicyError::InvalidVocabulary {
                reason: format!("must start with {START_TOKEN:?} and {END_TOKEN:?}"),
            });
        }
        let mut index = HashMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if index.insert(token.clone(), i).is_some() {
                return Err(PolicyError::InvalidVocabulary {
                    reason: format!("duplicate token {token:?}"),
                });
            }
        }
        Ok(Self { tokens, index })
    }

    /// Reserved tokens followed by every token of the corpus in sorted order.
    pub fn from_smiles<'a>(corpus: impl IntoIterator<Item = &'a str>) -> PolicyResult<Self> {
        let mut seen = BTreeSet::new();
        for smiles in corpus {
            for token in chem::tokenize(smiles) {
                if token != START_TOKEN && token != END_TOKEN {
                    seen.insert(token);
                }
            }
        }
        let mut tokens = vec![START_TOKEN.to_string(), END_TOKEN.to_string()];
        tokens.extend(seen);
        Self::new(tokens)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// `^ tokens… $` as indices, `None` if any token is unknown or is a
    /// reserved token (a quadruple bond `$` would end the sequence).
    pub fn encode(&self, smiles: &str) -> Option<Vec<usize>> {
        let tokens = chem::tokenize(smiles);
        let mut encoded = Vec::with_capacity(tokens.len() + 2);
        encoded.push(START);
        for token in &tokens {
            match self.index_of(token)? {
                START | END => return None,
                index => encoded.push(index),
            }
        }
        encoded.push(END);
        Some(encoded)
    }

    /// Concatenates tokens, skipping the start token and stopping at the end
    /// token.
    pub fn decode(&self, indices: &[usize]) -> String {
        let mut smiles = String::new();
        for &i in indices {
            match i {
                START => {}
                END => break,
                _ => {
                    if let Some(token) = self.token(i) {
                        smiles.push_str(token);
                    }
                }
            }
        }
        smiles
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = PolicyError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.tokens
    }
}
