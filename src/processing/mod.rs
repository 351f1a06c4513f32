//! Request types, tokenizer, offline scorer, result parser and the analysis engine

pub mod analyzer;
pub mod ats_scorer;
pub mod result_parser;
pub mod tokenizer;
pub mod types;
