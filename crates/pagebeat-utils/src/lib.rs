pub mod bounded_queue;
pub mod throttle;

pub use bounded_queue::BoundedQueue;
pub use throttle::Throttle;
