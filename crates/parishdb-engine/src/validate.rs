//! Region and category membership checks.
//!
//! A broad text query leaks: it returns places across a state line, across a
//! border, and places from sibling categories that merely share vocabulary.
//! Everything accepted into the catalog passes through here first.

use parishdb_core::{Entity, Region};

use crate::profile::DiscoveryProfile;

/// Why a candidate was dropped before reaching the identity index.
///
/// These are expected outcomes, not errors; the engine logs them and moves
/// on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No state and no country in the structured address components; the
    /// entity cannot be safely attributed to any region.
    MissingLocation,
    /// Coordinates outside the plausible lat/lng range.
    ImplausibleCoordinates,
    /// Resolved country does not match the region's expected country.
    WrongCountry { found: Option<String> },
    /// Resolved state code does not match the region's expected state.
    WrongState { found: Option<String> },
    /// Name carries a sibling-category keyword without the core keyword.
    SiblingCategory { keyword: &'static str },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MissingLocation => write!(f, "no state or country in address"),
            RejectReason::ImplausibleCoordinates => write!(f, "coordinates out of range"),
            RejectReason::WrongCountry { found } => {
                write!(f, "wrong country: {}", found.as_deref().unwrap_or("<none>"))
            }
            RejectReason::WrongState { found } => {
                write!(f, "wrong state: {}", found.as_deref().unwrap_or("<none>"))
            }
            RejectReason::SiblingCategory { keyword } => {
                write!(f, "sibling category keyword '{keyword}'")
            }
        }
    }
}

/// Checks that an entity genuinely belongs to `region` and to the profile's
/// category. All rules must pass.
///
/// The sibling-category rule is a heuristic: a legitimate entity whose name
/// omits the core keyword and happens to mention a sibling phrase would be
/// over-rejected, and a sibling entity whose name includes the core keyword
/// slips through. Observed precision has been good enough to keep it.
///
/// # Errors
///
/// Returns the first [`RejectReason`] that applies.
pub fn validate(
    entity: &Entity,
    region: &Region,
    profile: &DiscoveryProfile,
) -> Result<(), RejectReason> {
    if entity.state.is_none() && entity.country.is_none() {
        return Err(RejectReason::MissingLocation);
    }

    if !entity.coordinates_plausible() {
        return Err(RejectReason::ImplausibleCoordinates);
    }

    // For sub-national regions the state check below is authoritative; the
    // country only has to match when the API reported one. Country-level
    // regions have nothing else to go on, so a missing country rejects.
    let expected_country = region.expected_country.to_lowercase();
    match entity.country.as_deref() {
        Some(country) => {
            if !country.to_lowercase().contains(&expected_country) {
                return Err(RejectReason::WrongCountry {
                    found: entity.country.clone(),
                });
            }
        }
        None => {
            if region.expected_state.is_none() {
                return Err(RejectReason::WrongCountry { found: None });
            }
        }
    }

    if let Some(expected_state) = region.expected_state {
        let state_matches = entity
            .state
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(expected_state));
        if !state_matches {
            return Err(RejectReason::WrongState {
                found: entity.state.clone(),
            });
        }
    }

    let name = entity.name.to_lowercase();
    if !name.contains(profile.core_keyword) {
        for keyword in profile.sibling_keywords {
            if name.contains(keyword) {
                return Err(RejectReason::SiblingCategory { keyword });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::COPTIC_CHURCHES;

    fn nj() -> Region {
        Region {
            code: "NJ",
            display_name: "New Jersey",
            expected_country: "United States",
            expected_state: Some("NJ"),
        }
    }

    fn egypt() -> Region {
        Region {
            code: "EG",
            display_name: "Egypt",
            expected_country: "Egypt",
            expected_state: None,
        }
    }

    fn entity(name: &str, state: Option<&str>, country: Option<&str>) -> Entity {
        Entity {
            place_id: "p1".to_owned(),
            name: name.to_owned(),
            formatted_address: Some("10 Main St, Jersey City, NJ 07302, USA".to_owned()),
            latitude: Some(40.7178),
            longitude: Some(-74.0431),
            phone: None,
            website: None,
            rating: None,
            review_count: None,
            city: Some("Jersey City".to_owned()),
            state: state.map(str::to_owned),
            country: country.map(str::to_owned),
            postal_code: None,
            category_tags: None,
            business_status: None,
            maps_url: None,
            region_code: "NJ".to_owned(),
        }
    }

    #[test]
    fn accepts_matching_state_and_country() {
        let e = entity(
            "St. Mark Coptic Orthodox Church",
            Some("NJ"),
            Some("United States"),
        );
        assert_eq!(validate(&e, &nj(), &COPTIC_CHURCHES), Ok(()));
    }

    #[test]
    fn rejects_missing_state_and_country() {
        let e = entity("St. Mark Coptic Orthodox Church", None, None);
        assert_eq!(
            validate(&e, &nj(), &COPTIC_CHURCHES),
            Err(RejectReason::MissingLocation)
        );
    }

    #[test]
    fn rejects_neighboring_state() {
        let e = entity(
            "St. Mark Coptic Orthodox Church",
            Some("NY"),
            Some("United States"),
        );
        assert!(matches!(
            validate(&e, &nj(), &COPTIC_CHURCHES),
            Err(RejectReason::WrongState { .. })
        ));
    }

    #[test]
    fn state_match_is_case_insensitive() {
        let e = entity(
            "St. Mark Coptic Orthodox Church",
            Some("nj"),
            Some("United States"),
        );
        assert_eq!(validate(&e, &nj(), &COPTIC_CHURCHES), Ok(()));
    }

    #[test]
    fn country_match_is_substring_insensitive() {
        let mut e = entity("St. Mary Coptic Orthodox Church", None, Some("Egypt"));
        e.state = None;
        e.country = Some("Arab Republic of Egypt".to_owned());
        assert_eq!(validate(&e, &egypt(), &COPTIC_CHURCHES), Ok(()));
    }

    #[test]
    fn state_alone_satisfies_a_sub_national_region() {
        let e = entity("St. Mark Coptic Orthodox Church", Some("NJ"), None);
        assert_eq!(validate(&e, &nj(), &COPTIC_CHURCHES), Ok(()));
    }

    #[test]
    fn country_region_rejects_entity_without_country() {
        let e = entity("St. Mary Coptic Orthodox Church", Some("Cairo"), None);
        assert!(matches!(
            validate(&e, &egypt(), &COPTIC_CHURCHES),
            Err(RejectReason::WrongCountry { found: None })
        ));
    }

    #[test]
    fn rejects_cross_border_leakage() {
        let e = entity(
            "St. Mark Coptic Orthodox Church",
            Some("ON"),
            Some("Canada"),
        );
        assert!(matches!(
            validate(&e, &nj(), &COPTIC_CHURCHES),
            Err(RejectReason::WrongCountry { .. })
        ));
    }

    #[test]
    fn rejects_sibling_category_without_core_keyword() {
        let e = entity(
            "St. Nicholas Greek Orthodox Church",
            Some("NJ"),
            Some("United States"),
        );
        assert_eq!(
            validate(&e, &nj(), &COPTIC_CHURCHES),
            Err(RejectReason::SiblingCategory {
                keyword: "greek orthodox"
            })
        );
    }

    #[test]
    fn core_keyword_shields_sibling_phrase() {
        // Heuristic as observed: the core keyword anywhere in the name wins.
        let e = entity(
            "Coptic and Greek Orthodox Community Center",
            Some("NJ"),
            Some("United States"),
        );
        assert_eq!(validate(&e, &nj(), &COPTIC_CHURCHES), Ok(()));
    }

    #[test]
    fn plain_name_without_keywords_is_accepted() {
        let e = entity("St. Mark Parish", Some("NJ"), Some("United States"));
        assert_eq!(validate(&e, &nj(), &COPTIC_CHURCHES), Ok(()));
    }

    #[test]
    fn rejects_implausible_coordinates() {
        let mut e = entity(
            "St. Mark Coptic Orthodox Church",
            Some("NJ"),
            Some("United States"),
        );
        e.latitude = Some(123.4);
        assert_eq!(
            validate(&e, &nj(), &COPTIC_CHURCHES),
            Err(RejectReason::ImplausibleCoordinates)
        );
    }
}
