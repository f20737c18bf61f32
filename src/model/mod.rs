mod edge;
mod flow;
mod node;

pub use edge::EdgeModel;
pub use flow::FlowModel;
pub use node::{NodeModel, Position};
