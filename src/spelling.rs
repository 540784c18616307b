//! Spelling correction for answers the dictionaries could not resolve.
//!
//! Correction is a last resort: only words the morphological analyzer could
//! not recognize are rewritten, each to the closest word of a spelling word
//! list.

pub mod corrector;
pub mod dictionary;
pub mod levenshtein;
pub mod normalizer;

pub use corrector::{DictionarySpellChecker, IdentitySpellChecker, SpellChecker};
pub use dictionary::SpellingDictionary;
pub use normalizer::SpellingNormalizer;
