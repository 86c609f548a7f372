pub mod clock;
pub mod gpu_context;
pub mod timer;

pub use clock::Clock;
pub use gpu_context::GpuContext;
pub use timer::{Countdown, Throttled};
