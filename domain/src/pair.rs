use std::fmt;

use serde::{Deserialize, Serialize};

/// An unordered token pair.
///
/// Policy-side pair membership is symmetric: a maker that allows `A/B` also
/// quotes `B/A`. `canonical_key` sorts the two legs so that both directions
/// map to the same identifier.
#[derive(Debug, Clone, Eq, PartialEq, std::hash::Hash, Serialize, Deserialize)]
pub struct Pair {
    pub base: String,
    pub quote: String,
}

impl Pair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Directional identifier, `base/quote`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// Direction-independent identifier: the two legs in lexicographic order.
    pub fn canonical_key(&self) -> String {
        if self.base <= self.quote {
            format!("{}/{}", self.base, self.quote)
        } else {
            format!("{}/{}", self.quote, self.base)
        }
    }

    /// True when this pair covers the `(a, b)` trade in either direction.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.base == a && self.quote == b) || (self.base == b && self.quote == a)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}
