//! Local persistence of interview attempts
//!
//! Entities and the JSON-file backed store. Results own their questions
//! and report by value; category membership is a plain id recomputed by
//! query.

mod entities;
mod store;

pub use entities::{
    Category, InterviewQuestion, InterviewReport, InterviewResult, ANSWER_PLACEHOLDER,
};
pub use store::{ResultStore, StoreError};
