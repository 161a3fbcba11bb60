//! Application use cases / business logic

pub mod invoke;
pub mod publish;
pub mod resolve;

pub use invoke::{InvocationConfig, InvocationError, InvocationHandler};
pub use publish::{ImagePublishResult, PostPublishError, PostPublisher};
pub use resolve::{ContentResolver, ImageResolution, Resolution, ResolveError};
