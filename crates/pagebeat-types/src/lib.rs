pub mod codes;
pub mod envelope;
pub mod ids;
pub mod scalar;
pub mod sink;

pub use envelope::{Envelope, EnvelopeHead, LIB_TAG, LIB_VERSION};
pub use ids::{AnonymousId, SessionId};
pub use scalar::{Properties, Scalar};
pub use sink::TrackSink;
