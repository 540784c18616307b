//! Negation detection.
//!
//! Answers often open with a negation trigger ("нет скамеек", "не хватает
//! урн") or with filler words ("очень хотелось бы ..."). The
//! [`NegationParser`] strips them from a lemma sequence and reports the
//! polarity and the grammar hints of the last trigger, which the clause
//! segmenter uses to decide whether a following clause continues the
//! negated topic.

pub mod parser;

pub use parser::{NegationOutcome, NegationParser};
