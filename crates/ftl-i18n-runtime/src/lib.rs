#![forbid(unsafe_code)]

mod backend;
mod error;
mod flatten;
mod transport;

pub use crate::backend::{Backend, BackendOptions, interpolate_path};
pub use crate::error::{BackendError, FlattenError, TransportError};
pub use crate::flatten::{
    FlatEntry, FlatRecord, FlatResource, FlattenOptions, flatten, ftl_to_flat,
};
pub use crate::transport::{FileTransport, Response, Transport};
