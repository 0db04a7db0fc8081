pub mod admin;
pub mod documents;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod session;
pub mod summaries;
pub mod summarizer;
