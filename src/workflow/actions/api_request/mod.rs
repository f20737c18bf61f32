mod action;
mod models;

pub use action::ApiRequestAction;
pub use models::HttpRequestMethod;
