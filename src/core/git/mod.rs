pub mod baseline;
pub mod bundle;
pub mod cmd;
pub mod inventory;
pub mod ops_lock;
pub mod repo;
pub mod rollback;
pub mod update;

pub use baseline::{BaselineArtifact, create_baseline};
pub use bundle::verify_bundle;
pub use repo::{discover_root, open_repo};
pub use rollback::{RollbackResult, rollback};
pub use update::{UpdateArtifact, create_update};
