use semver::{Prerelease, Version};

use crate::UpdateError;

pub const PRE_RELEASE_TAG: &str = "beta";

pub fn next_version(
    package: &Version,
    assembly: &Version,
    pre_release: bool,
) -> Result<Version, UpdateError> {
    if assembly <= package {
        return Err(UpdateError::OutOfSync {
            package: package.clone(),
            assembly: assembly.clone(),
        });
    }
    Ok(apply_pre_release(assembly.clone(), pre_release))
}

pub fn aggregate_version<'a>(
    current: &Version,
    updated_dependencies: impl Iterator<Item = &'a Version>,
    pre_release: bool,
) -> Version {
    let base = updated_dependencies
        .max()
        .cloned()
        .unwrap_or_else(|| current.clone());
    apply_pre_release(base, pre_release)
}

fn apply_pre_release(mut version: Version, pre_release: bool) -> Version {
    if pre_release {
        if let Ok(pre) = Prerelease::new(PRE_RELEASE_TAG) {
            version.pre = pre;
        }
    }
    version
}
