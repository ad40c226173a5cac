mod load;
mod network;

pub use load::load_network;
pub use network::{Contact, Network, Relationship};
