pub mod engine;
pub mod message;

pub use engine::Broker;
