//! Request client: verb helpers over one shared JSON exchange routine.

pub mod client;
pub mod types;

pub use client::RequestClient;
pub use reqwest::Method;
pub use types::{Headers, RequestError, RequestOutcome, RequestState};
