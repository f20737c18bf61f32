mod action;
mod models;

pub use action::ConditionalAction;
pub use models::ComparisonOperator;
