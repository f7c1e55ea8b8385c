pub mod pool_id;
pub mod version;

pub use pool_id::PoolId;
pub use version::VersionInfo;
