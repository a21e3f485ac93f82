//! Proxy domain - Operation classification and construction-time configuration

mod configuration;
mod dispatch;
mod operation;

pub use configuration::{CachePolicy, ConfigurationResolver, ProxyConfiguration, DEFAULT_TTL};
pub use dispatch::{DispatchPolicy, Strategy};
pub use operation::{validate_key_segment, CacheOwner, OperationSpec, ResultShape};
