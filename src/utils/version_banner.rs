use crate::models::{VersionInfo, UNKNOWN_FIELD};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

// <any prefix>: 3.20.1 platform Linux x86_64 linked at Mar 12 2024 09:41:03 (4f1c2ab)
static FULL_BANNER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r":\s*(\d+\.\d+\.\d+)\s+platform\s+(\S+)\s+(\S+)\s+linked at\s+(.+?)\s*\(([^)]+)\)",
    )
    .expect("full banner pattern")
});

static PLATFORM_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.\d+\.\d+)\s+platform\s+(\S+)\s+(\S+)").expect("platform banner pattern")
});

static BARE_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("bare version pattern"));

/// Decodes the `-version` banner.
///
/// Tries the full banner first, then version + platform + arch, then any
/// `x.y.z` substring. Each tier is tried on every line before falling back to
/// the next one. Returns `None` only if not even a bare version is present.
pub fn parse_version_banner(output: &str, executable_path: &Path) -> Option<VersionInfo> {
    let info = |version: &str, platform: &str, arch: &str, build: &str, commit: &str| VersionInfo {
        version: version.to_string(),
        platform: platform.to_string(),
        architecture: arch.to_string(),
        build_date: build.trim().to_string(),
        commit_hash: commit.trim().to_string(),
        raw_output: output.to_string(),
        executable_path: executable_path.to_path_buf(),
    };

    if let Some(cap) = output.lines().find_map(|l| FULL_BANNER.captures(l)) {
        return Some(info(&cap[1], &cap[2], &cap[3], &cap[4], &cap[5]));
    }

    if let Some(cap) = output.lines().find_map(|l| PLATFORM_ONLY.captures(l)) {
        return Some(info(&cap[1], &cap[2], &cap[3], UNKNOWN_FIELD, UNKNOWN_FIELD));
    }

    output
        .lines()
        .find_map(|l| BARE_VERSION.find(l))
        .map(|m| {
            info(
                m.as_str(),
                UNKNOWN_FIELD,
                UNKNOWN_FIELD,
                UNKNOWN_FIELD,
                UNKNOWN_FIELD,
            )
        })
}
