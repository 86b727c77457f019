//! Static category affinity used by cross-sell scoring

/// Categories whose items complement purchases in the key category.
const CATEGORY_AFFINITY: &[(&str, &[&str])] = &[
    ("phones", &["accessories", "audio", "wearables"]),
    ("computers", &["accessories", "audio", "software"]),
    ("tablets", &["accessories", "audio"]),
    ("audio", &["phones", "accessories"]),
    ("tv", &["audio", "accessories", "furniture"]),
    ("fashion", &["shoes", "bags", "jewelry", "beauty"]),
    ("shoes", &["fashion", "bags"]),
    ("beauty", &["fashion", "health", "hair"]),
    ("hair", &["beauty"]),
    ("home", &["kitchen", "appliances", "furniture"]),
    ("furniture", &["home", "bedding"]),
    ("kitchen", &["home", "groceries", "appliances"]),
    ("appliances", &["home", "kitchen"]),
    ("groceries", &["kitchen", "beverages"]),
    ("sports", &["fashion", "shoes", "health"]),
    ("baby", &["toys", "health"]),
];

/// Complementary categories for `category`, matched case-insensitively.
pub fn complementary_categories(category: &str) -> &'static [&'static str] {
    let category = category.trim();
    CATEGORY_AFFINITY
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(category))
        .map(|(_, related)| *related)
        .unwrap_or(&[])
}

/// Whether `candidate` is listed as complementary to `reference`.
pub fn is_complementary(reference: &str, candidate: &str) -> bool {
    let candidate = candidate.trim();
    complementary_categories(reference).iter().any(|related| related.eq_ignore_ascii_case(candidate))
}
