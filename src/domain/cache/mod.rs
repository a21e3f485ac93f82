//! Cache domain - Key derivation and the remote store contract

mod key;
mod store;

pub use key::{
    CacheKey, KeyArg, KeyBuilder, OperationIdentity, ARG_SEPARATOR, KEY_NAMESPACE,
};
pub use store::{decode_value, encode_value, Cache, CacheExt};

#[cfg(test)]
pub use store::mock::MockCache;
