//! Dictionaries the classifier is configured with.
//!
//! - [`Lexicon`](lexicon::Lexicon): negation and ignorable triggers with
//!   grammar hints.
//! - [`SynonymDictionary`](synonym::SynonymDictionary): priority-ordered
//!   keyword → category mapping for substring search.
//! - [`ReadyAnswerDictionary`](ready::ReadyAnswerDictionary): exact text →
//!   final category.
//!
//! All of them are loaded once at startup and shared read-only.

pub mod lexicon;
pub mod loader;
pub mod ready;
pub mod synonym;

pub use lexicon::Lexicon;
pub use loader::{read_csv_dictionaries, read_wordlists};
pub use ready::ReadyAnswerDictionary;
pub use synonym::SynonymDictionary;
