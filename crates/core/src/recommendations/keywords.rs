//! Keyword extraction over item titles and descriptions

use std::collections::BTreeSet;

use super::MIN_SIGNIFICANT_TOKEN_CHARS;

/// Normalized keywords for one item. Rebuilt per ranking call, never stored.
pub type KeywordSet = BTreeSet<String>;

/// Domain terms and the vocabulary that travels with them in a basket.
const LEXICON: &[(&str, &[&str])] = &[
    ("smartphone", &["coque", "écouteurs", "chargeur", "protection", "powerbank", "téléphone"]),
    ("téléphone", &["coque", "chargeur", "écouteurs", "smartphone"]),
    ("iphone", &["coque", "chargeur", "écouteurs", "smartphone"]),
    ("tablette", &["housse", "stylet", "chargeur", "clavier"]),
    ("ordinateur", &["souris", "clavier", "sacoche", "écran", "laptop"]),
    ("laptop", &["souris", "clavier", "sacoche", "ordinateur"]),
    ("écouteurs", &["audio", "bluetooth", "casque"]),
    ("casque", &["audio", "bluetooth", "écouteurs"]),
    ("montre", &["bracelet", "chargeur", "connectée"]),
    ("télévision", &["support", "barre", "décodeur", "hdmi"]),
    ("robe", &["chaussures", "sac", "bijoux", "mode"]),
    ("chemise", &["pantalon", "cravate", "ceinture", "mode"]),
    ("chaussures", &["chaussettes", "cirage", "semelles", "mode"]),
    ("parfum", &["beauté", "cosmétique", "soin"]),
    ("crème", &["beauté", "soin", "cosmétique"]),
    ("maquillage", &["beauté", "pinceaux", "démaquillant"]),
    ("mèches", &["perruque", "coiffure", "beauté"]),
    ("réfrigérateur", &["congélateur", "électroménager", "cuisine"]),
    ("climatiseur", &["ventilateur", "électroménager", "stabilisateur"]),
    ("ventilateur", &["climatiseur", "électroménager"]),
    ("marmite", &["cuisine", "ustensiles", "casserole"]),
    ("mixeur", &["blender", "cuisine", "électroménager"]),
    ("riz", &["huile", "épices", "alimentation"]),
    ("matelas", &["oreiller", "draps", "literie"]),
    ("canapé", &["coussin", "table", "salon"]),
    ("ballon", &["maillot", "crampons", "sport"]),
    ("maillot", &["short", "ballon", "sport"]),
    ("biberon", &["couches", "lait", "bébé"]),
];

/// Words too common to signal similarity
const STOP_WORDS: &[&str] = &[
    "about", "after", "avant", "autre", "aussi", "cette", "comme", "depuis", "entre",
    "leurs", "moins", "notre", "other", "plusieurs", "there", "their", "these", "those", "toute",
    "toutes", "vendu", "vente", "votre", "where", "which", "while", "without",
    "would", "nouveau", "nouvelle", "qualité", "produit", "article",
];

/// Builds the keyword set for an item from its title and description.
///
/// Lexicon keys found anywhere in the text contribute themselves and their
/// related terms; whitespace tokens longer than four characters contribute
/// themselves unless they are stop words. Empty text yields an empty set.
pub fn extract_keywords(title: &str, description: &str) -> KeywordSet {
    let normalized = format!("{title} {description}").to_lowercase();
    let mut keywords = KeywordSet::new();

    for (term, related) in LEXICON {
        if normalized.contains(term) {
            keywords.insert((*term).to_owned());
            keywords.extend(related.iter().map(|word| (*word).to_owned()));
        }
    }

    for token in normalized.split_whitespace() {
        let token = token.trim_matches(|ch: char| !ch.is_alphanumeric());
        if token.chars().count() > MIN_SIGNIFICANT_TOKEN_CHARS && !STOP_WORDS.contains(&token) {
            keywords.insert(token.to_owned());
        }
    }

    keywords
}

/// Share of the reference keywords that the candidate also carries.
pub(crate) fn overlap_ratio(reference: &KeywordSet, candidate: &KeywordSet) -> f64 {
    let shared = reference.intersection(candidate).count();
    shared as f64 / reference.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::{extract_keywords, overlap_ratio, KeywordSet, MIN_SIGNIFICANT_TOKEN_CHARS, STOP_WORDS};

    #[test]
    fn lexicon_terms_expand_to_related_vocabulary() {
        let keywords = extract_keywords("Smartphone X", "");

        assert!(keywords.contains("smartphone"));
        assert!(keywords.contains("coque"));
        assert!(keywords.contains("écouteurs"));
        assert!(keywords.contains("chargeur"));
        assert!(!keywords.contains("x"));
    }

    #[test]
    fn significant_words_are_kept_and_stop_words_dropped() {
        let keywords = extract_keywords("Lampe Solaire", "Très pratique, cette lampe éclaire longtemps.");

        assert!(keywords.contains("lampe"));
        assert!(keywords.contains("solaire"));
        assert!(keywords.contains("pratique"));
        assert!(keywords.contains("éclaire"));
        assert!(keywords.contains("longtemps"));
        assert!(!keywords.contains("cette"));
        assert!(!keywords.contains("très"));
    }

    #[test]
    fn short_tokens_count_characters_not_bytes() {
        // "bébé" is four characters but six bytes.
        let keywords = extract_keywords("bébé", "");
        assert!(!keywords.contains("bébé"));

        let keywords = extract_keywords("pagne wax", "");
        assert!(keywords.contains("pagne"));
        assert!(!keywords.contains("wax"));
    }

    #[test]
    fn every_stop_word_is_long_enough_to_be_filtered() {
        for word in STOP_WORDS {
            assert!(
                word.chars().count() > MIN_SIGNIFICANT_TOKEN_CHARS,
                "`{word}` is dropped by length already"
            );
        }
    }

    #[test]
    fn empty_text_yields_empty_set() {
        assert!(extract_keywords("", "").is_empty());
        assert!(extract_keywords("   ", "\n").is_empty());
    }

    #[test]
    fn overlap_ratio_is_relative_to_reference_size() {
        let reference: KeywordSet = ["coque", "chargeur", "smartphone", "écouteurs"]
            .into_iter()
            .map(String::from)
            .collect();
        let candidate: KeywordSet = ["coque", "chargeur"].into_iter().map(String::from).collect();

        assert!((overlap_ratio(&reference, &candidate) - 0.5).abs() < 1e-9);
        assert_eq!(overlap_ratio(&KeywordSet::new(), &candidate), 0.0);
        assert_eq!(overlap_ratio(&reference, &KeywordSet::new()), 0.0);
    }
}
