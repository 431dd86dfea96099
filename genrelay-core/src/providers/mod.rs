//! Backend abstraction
//!
//! The `Backend` trait is the seam between the relay core and the
//! generative-language service; `gemini` is the production implementation.

pub mod adapter;
pub mod error;
pub mod gemini;

pub use adapter::{Backend, FragmentStream};
pub use error::{BackendError, BackendResult};
pub use gemini::GeminiBackend;
