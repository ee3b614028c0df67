pub mod backend;

pub use backend::{BackendClient, BackendError};
