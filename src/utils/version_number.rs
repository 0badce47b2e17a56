/// Turns a dotted version string into a comparable number.
///
/// Missing or non-numeric components count as 0, so `"3.20"` and `"3.20.0"`
/// compare equal and `"3.9" < "3.10"`.
pub fn parse_version_string(version: &str) -> u32 {
    let mut parts = version
        .trim()
        .split('.')
        .map(|p| p.trim().parse::<u32>().unwrap_or(0));

    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);

    major
        .saturating_mul(10_000)
        .saturating_add(minor.saturating_mul(100))
        .saturating_add(patch)
}
