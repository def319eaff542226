//! Word lists used by the fallback instruction parser
//!
//! These are locale-specific. The built-in set is English; deployments for
//! another language replace them through the `[parser]` config section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Functional words dropped by keyword fallback tokenization
    pub stop_words: Vec<String>,
    /// Generic words stripped from either end of an extracted location
    pub modifier_words: Vec<String>,
    /// Transport-mode phrases that are never locations
    pub transport_words: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::english()
    }
}

impl Lexicon {
    pub fn english() -> Self {
        Self {
            stop_words: to_owned(&[
                "from", "to", "go", "get", "going", "route", "path", "way", "how", "please",
                "help", "take", "me", "i", "want", "would", "like", "show", "there", "the", "a",
                "an", "can", "you", "do", "should", "is", "what", "best", "directions",
                "navigate", "towards", "toward", "and", "then", "need", "my", "we", "us",
            ]),
            modifier_words: to_owned(&["building", "plaza", "institute"]),
            transport_words: to_owned(&[
                "walking", "on foot", "cycling", "by bike", "by bicycle", "driving", "by car",
                "by taxi", "by bus",
            ]),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.iter().any(|w| w == word)
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
