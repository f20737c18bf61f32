pub mod actions;
pub mod coerce;
pub mod edge;
mod flow;
pub mod input;
pub mod node;
pub mod output;
pub mod template;

pub use flow::Flow;
