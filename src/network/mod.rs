pub mod change;
pub mod connectivity;
pub mod layer;
pub mod network;
pub mod spec;
pub mod unit;

pub use change::{LayerChange, NetworkChange, WeightChange};
pub use connectivity::{Connectivity, Edge};
pub use layer::Layer;
pub use network::Network;
pub use spec::NetworkSpec;
pub use unit::{Unit, Upstream};
