pub mod clean;
pub mod direct;
pub mod error;
pub mod ops;
pub mod owned;
pub mod path;
pub mod persist;
pub mod reconcile;
pub mod retract;
pub mod store;

pub use clean::*;
pub use error::{Error, IncompleteBundle, LoadError, ParseError, PathError, PersistError, Result};
pub use ops::{apply_bundle, retract_file, Applied, ApplyOptions, Retracted};
pub use owned::{OwnedEntry, OWNED_CLUSTER_NAME, OWNED_CONTEXT_NAME, OWNED_IDENTITY_NAME};
pub use persist::{persist, Mode, Persisted};
pub use reconcile::{reconcile, Changes, EntryChange, MergePolicy, Reconciliation};
pub use retract::{retract, Retraction};
pub use store::load;
