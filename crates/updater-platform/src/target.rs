//! Platform identifiers used to pick the release asset built for this host.
//!
//! Published assets follow the `updater-<os>-<arch>` convention with the
//! identifiers the release pipeline has always used (`darwin`, `amd64`, ...).
//! Hosts without a mapping fall back to Rust's own names, which simply never
//! match an asset.

use std::env::consts;

pub const ASSET_PREFIX: &str = "updater";

#[must_use]
pub fn target_os() -> &'static str {
    match consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

#[must_use]
pub fn target_arch() -> &'static str {
    match consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// Name of the release asset for the running platform.
#[must_use]
pub fn asset_name() -> String {
    asset_name_for(target_os(), target_arch())
}

#[must_use]
pub fn asset_name_for(os: &str, arch: &str) -> String {
    format!("{ASSET_PREFIX}-{os}-{arch}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_name_joins_prefix_os_and_arch() {
        assert_eq!(asset_name_for("linux", "amd64"), "updater-linux-amd64");
        assert_eq!(asset_name(), format!("updater-{}-{}", target_os(), target_arch()));
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn linux_x86_64_uses_release_naming() {
        assert_eq!(asset_name(), "updater-linux-amd64");
    }

    #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
    #[test]
    fn macos_arm_uses_release_naming() {
        assert_eq!(asset_name(), "updater-darwin-arm64");
    }

    #[test]
    fn identifiers_are_never_empty() {
        assert!(!target_os().is_empty());
        assert!(!target_arch().is_empty());
    }
}
