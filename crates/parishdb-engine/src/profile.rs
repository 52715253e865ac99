//! What to search for: query strategies and category keywords.
//!
//! The engine itself is category-agnostic; everything specific to the kind
//! of place being discovered lives in one [`DiscoveryProfile`] value.

use parishdb_core::Region;

/// Category-specific search configuration for a discovery run.
///
/// `core_keyword` is the word that marks a name as belonging to the target
/// category. `sibling_keywords` are phrases from *adjacent* categories that
/// share surface vocabulary with the target; a name carrying one of those
/// without the core keyword is a false positive from fuzzy text search.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryProfile {
    pub core_keyword: &'static str,
    pub sibling_keywords: &'static [&'static str],
    /// Query templates; `{}` is replaced with the region's display name.
    pub query_templates: &'static [&'static str],
    /// Generic words stripped during name normalization so trivial textual
    /// variants collapse to one dedup key.
    pub boilerplate_words: &'static [&'static str],
}

impl DiscoveryProfile {
    /// The query strings to run for one region, in order.
    #[must_use]
    pub fn queries_for(&self, region: &Region) -> Vec<String> {
        self.query_templates
            .iter()
            .map(|t| t.replace("{}", region.display_name))
            .collect()
    }
}

/// Profile for Coptic Orthodox churches, the catalog this project ships.
///
/// One broad query plus name-pattern variants per region: the broad query
/// alone misses parishes whose listing leads with the patron saint's name.
pub static COPTIC_CHURCHES: DiscoveryProfile = DiscoveryProfile {
    core_keyword: "coptic",
    sibling_keywords: &[
        "greek orthodox",
        "russian orthodox",
        "serbian orthodox",
        "romanian orthodox",
        "antiochian orthodox",
        "ukrainian orthodox",
        "macedonian orthodox",
        "ethiopian orthodox",
        "eritrean orthodox",
    ],
    query_templates: &[
        "Coptic Orthodox Church in {}",
        "Coptic Church {}",
        "St. Mary Coptic Church {}",
        "St. Mark Coptic Church {}",
    ],
    boilerplate_words: &["coptic", "orthodox", "church", "the", "of"],
};
