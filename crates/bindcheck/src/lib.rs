pub mod client;
pub mod cluster;
pub mod common;
pub mod probe;
pub mod transfer;
pub mod validate;
pub mod workflow;

#[cfg(test)]
pub(crate) mod tests;

pub type Error = crate::common::error::BindCheckError;
pub type Result<T> = std::result::Result<T, Error>;

pub type Map<K, V> = std::collections::BTreeMap<K, V>;
pub type Set<T> = std::collections::BTreeSet<T>;

/// Name of the environment variable set by the workflow manager for every
/// executed action. It holds the cluster the job was submitted to.
pub const ACTION_CLUSTER: &str = "ACTION_CLUSTER";

pub const BINDCHECK_VERSION: &str = {
    match option_env!("BINDCHECK_BUILD_VERSION") {
        Some(version) => version,
        None => const_format::concatcp!(env!("CARGO_PKG_VERSION"), "-dev"),
    }
};
