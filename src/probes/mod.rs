/// HTTP probe for connector status endpoints
pub mod connector;

/// Database probe for round-interaction latency samples
pub mod replay;

/// In-memory probes for tests
pub mod mock;

pub use connector::{ConnectorProbe, HttpConnectorProbe, StatusResponse};
pub use mock::{MockConnectorProbe, MockReplayProbe, MockReplaySource};
pub use replay::{PostgresReplayProbe, PostgresReplaySource, ReplayProbe, ReplaySource};
