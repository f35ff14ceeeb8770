// Network reachability: the connectivity signal and the primitives that feed it.

pub mod connectivity;
pub mod manual;
pub mod probe;

pub use connectivity::{Connectivity, ConnectivityMonitor, Transition};
pub use manual::ManualReachability;
pub use probe::{spawn_probe, ProbeConfig};
