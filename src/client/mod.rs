// Outbound HTTP: the round-trip seam and the counting wrapper
pub mod counting;
pub mod transport;

pub use counting::CountingTransport;
pub use transport::{build_client, default_client, RoundTrip};
