pub mod builder;
pub mod dispatch;
mod error;
pub mod merge;
mod multi_broker;
pub mod registry;

pub use error::RoutingError;
pub use multi_broker::MultiBroker;
