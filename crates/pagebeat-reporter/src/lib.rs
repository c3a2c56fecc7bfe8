pub mod beacon;
pub mod config;
pub mod reporter;
pub mod transport;

pub use beacon::BeaconTransport;
pub use config::{ConfigError, ReporterConfig};
pub use reporter::Reporter;
pub use transport::{FileTransport, LogTransport, RecordingTransport, Transport};
