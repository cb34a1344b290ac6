use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static POSTGRES_BANNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"PostgreSQL ([0-9.]+)").expect("valid regex"));

/// Compare dotted numeric versions component by component. Missing trailing
/// components count as zero, so `"12"` equals `"12.0.0"`. Non-numeric
/// components also count as zero.
pub fn version_compare(v1: &str, v2: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .split('.')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect()
    };

    let a = parse(v1);
    let b = parse(v2);
    let len = a.len().max(b.len());

    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Extract `16.2` out of `PostgreSQL 16.2 on x86_64-pc-linux-gnu, ...`
pub fn extract_postgres_version(banner: &str) -> Option<String> {
    POSTGRES_BANNER
        .captures(banner)
        .map(|caps| caps[1].trim_end_matches('.').to_string())
}
