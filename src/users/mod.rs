use crate::state::AppState;
use axum::Router;
use lazy_static::lazy_static;
use regex::Regex;

mod dto;
pub mod handlers;
mod repo;
pub mod repo_types;

pub use repo_types::User;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
