//! Cache key derivation.
//!
//! A key encodes the full identity of a cached read:
//! `"{METHOD}:{basePath}?{queryString}:{discriminator}"`. Query parameters
//! are canonicalized by sorting on `(name, value)` before serialization, so
//! two requests carrying the same parameter set in different order derive the
//! same key. Names and values are percent-encoded so a value containing `&`
//! or `=` cannot masquerade as extra parameters. The discriminator separates
//! logically distinct payload shapes served from one route (e.g. a list page
//! vs. a count-only view).

/// Derive the cache key for a read request.
///
/// Pure; absent query parameters yield an empty query segment
/// (`"GET:/orders?:list"`).
pub fn derive_key(
    method: &str,
    base_path: &str,
    query: &[(&str, &str)],
    discriminator: &str,
) -> String {
    let mut pairs: Vec<&(&str, &str)> = query.iter().collect();
    pairs.sort();

    let query_string = pairs
        .iter()
        .map(|(name, value)| {
            format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{method}:{base_path}?{query_string}:{discriminator}")
}

/// Derive the key of one dashboard sub-aggregate under an umbrella key.
pub fn sub_key(key: &str, name: &str) -> String {
    format!("{key}-{name}")
}
