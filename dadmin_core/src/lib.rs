mod adapter;
mod context;
mod debug;
pub mod error;
mod params;
mod response;
mod secret;
pub mod transport;
pub mod wire;

pub mod prelude {
    pub use crate::adapter::Adapter;
    pub use crate::context::{Context, ContextBuilder, Credential, Scope};
    pub use crate::debug::DebugLevel;
    pub use crate::error::{AdapterError, BoxError};
    pub use crate::params::{Params, Value};
    pub use crate::response::Response;
    pub use crate::secret::SecretString;
    pub use crate::transport::{ReqwestTransport, Transport};
}
