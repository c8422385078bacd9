mod error;
mod manifest;
mod record;
mod version;

pub use error::UpdateError;
pub use manifest::{artifact_file_name, PackageManifest, ARTIFACT_EXTENSION, MANIFEST_ENTRY};
pub use record::{PackageRecord, ProjectRecord, RunContext};
pub use version::{aggregate_version, next_version, PRE_RELEASE_TAG};
