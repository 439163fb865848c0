//! Version comparison between the catalog platform and the codestart bundle

use semver::Version;

/// Compare the catalog's platform version against the bundle version.
/// Returns a warning message if the platform is older than the bundle expects.
pub fn check_compatibility(platform_version: &str, bundle_version: &str) -> Option<String> {
    let platform_ver = parse_version(platform_version)?;
    let bundle_ver = parse_version(bundle_version)?;

    if platform_ver < bundle_ver {
        Some(format!(
            "Template bundle requires platform {} or newer, but the extension catalog targets {}",
            bundle_version, platform_version
        ))
    } else {
        None
    }
}

/// Parse a version string, tolerating a leading `v`
fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).ok()
}
