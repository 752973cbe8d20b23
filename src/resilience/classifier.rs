//! Error classification against caller-supplied sentinel sets.
//!
//! # Responsibilities
//! - Decide whether a broadcast error belongs to an "expected" set
//!   (swallowed) or an "unrecoverable" set (aborts retrying)
//!
//! # Design Decisions
//! - Matching is textual: an error matches when its rendered message contains
//!   the rendered message of any sentinel in the set
//! - A sentinel with a short or generic description matches unrelated errors
//!   too (an empty description matches everything); callers own the precision
//!   of their sets
//! - The engine only talks to `ErrorClassifier`, so typed matching can replace
//!   the substring rule without touching the retry loop

use std::borrow::Cow;
use std::fmt;

/// A registered chain error used purely for classification.
///
/// Mirrors the `(codespace, code, description)` triple chain modules register
/// their errors under. Only the description takes part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentinel {
    codespace: Cow<'static, str>,
    code: u32,
    desc: Cow<'static, str>,
}

impl Sentinel {
    /// Declare a sentinel with static strings (usable in `const` items).
    pub const fn register(codespace: &'static str, code: u32, desc: &'static str) -> Self {
        Self {
            codespace: Cow::Borrowed(codespace),
            code,
            desc: Cow::Borrowed(desc),
        }
    }

    /// Build a sentinel from owned strings.
    pub fn new(codespace: impl Into<String>, code: u32, desc: impl Into<String>) -> Self {
        Self {
            codespace: Cow::Owned(codespace.into()),
            code,
            desc: Cow::Owned(desc.into()),
        }
    }

    pub fn codespace(&self) -> &str {
        &self.codespace
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.desc)
    }
}

impl std::error::Error for Sentinel {}

/// Cosmos SDK root errors that callers commonly classify.
pub mod sdk {
    use super::Sentinel;

    pub const ERR_OUT_OF_GAS: Sentinel = Sentinel::register("sdk", 11, "out of gas");
    pub const ERR_INSUFFICIENT_FEE: Sentinel = Sentinel::register("sdk", 13, "insufficient fee");
    pub const ERR_TX_IN_MEMPOOL_CACHE: Sentinel =
        Sentinel::register("sdk", 19, "tx already in mempool");
    pub const ERR_MEMPOOL_IS_FULL: Sentinel = Sentinel::register("sdk", 20, "mempool is full");
    pub const ERR_WRONG_SEQUENCE: Sentinel =
        Sentinel::register("sdk", 32, "incorrect account sequence");
}

/// Decides membership of an error in a sentinel set.
pub trait ErrorClassifier: Send + Sync {
    /// Returns true when `err` is considered one of `set`.
    fn contains(&self, err: &dyn fmt::Display, set: &[Sentinel]) -> bool;
}

/// Substring matching on rendered messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringClassifier;

impl ErrorClassifier for SubstringClassifier {
    fn contains(&self, err: &dyn fmt::Display, set: &[Sentinel]) -> bool {
        error_contained(err, set)
    }
}

/// True iff the rendered `err` contains the rendered message of any sentinel.
pub fn error_contained(err: &dyn fmt::Display, set: &[Sentinel]) -> bool {
    if set.is_empty() {
        return false;
    }
    let rendered = err.to_string();
    set.iter().any(|sentinel| rendered.contains(sentinel.desc()))
}
