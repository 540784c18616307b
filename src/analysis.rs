//! Text analysis for survey answers.
//!
//! This module wraps the external morphological analyzer behind the
//! [`MorphAnalyzer`](analyzer::MorphAnalyzer) trait and turns its output into
//! [`AnswerText`](answer::AnswerText), the lemmatized view every later stage
//! of classification works on.

pub mod analyzer;
pub mod answer;
pub mod token;
