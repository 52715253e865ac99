//! The static region catalog driving a discovery run.
//!
//! Iteration order is fixed and determines the order entities are
//! first-seen, which matters for deterministic test fixtures. Every code is
//! unique across the catalog because the resume checkpoint
//! (`discovery_run_regions`) keys coverage on it; country codes that would
//! collide with a US state or Canadian province code use their three-letter
//! ISO form instead.

use parishdb_core::Region;

const fn us_state(code: &'static str, display_name: &'static str) -> Region {
    Region {
        code,
        display_name,
        expected_country: "United States",
        expected_state: Some(code),
    }
}

const fn country(code: &'static str, display_name: &'static str) -> Region {
    Region {
        code,
        display_name,
        expected_country: display_name,
        expected_state: None,
    }
}

const fn country_named(
    code: &'static str,
    display_name: &'static str,
    expected_country: &'static str,
) -> Region {
    Region {
        code,
        display_name,
        expected_country,
        expected_state: None,
    }
}

/// All regions searched by a full run, in traversal order.
pub static REGIONS: &[Region] = &[
    // United States, all 50 states plus DC
    us_state("AL", "Alabama"),
    us_state("AK", "Alaska"),
    us_state("AZ", "Arizona"),
    us_state("AR", "Arkansas"),
    us_state("CA", "California"),
    us_state("CO", "Colorado"),
    us_state("CT", "Connecticut"),
    us_state("DE", "Delaware"),
    us_state("DC", "Washington DC"),
    us_state("FL", "Florida"),
    us_state("GA", "Georgia"),
    us_state("HI", "Hawaii"),
    us_state("ID", "Idaho"),
    us_state("IL", "Illinois"),
    us_state("IN", "Indiana"),
    us_state("IA", "Iowa"),
    us_state("KS", "Kansas"),
    us_state("KY", "Kentucky"),
    us_state("LA", "Louisiana"),
    us_state("ME", "Maine"),
    us_state("MD", "Maryland"),
    us_state("MA", "Massachusetts"),
    us_state("MI", "Michigan"),
    us_state("MN", "Minnesota"),
    us_state("MS", "Mississippi"),
    us_state("MO", "Missouri"),
    us_state("MT", "Montana"),
    us_state("NE", "Nebraska"),
    us_state("NV", "Nevada"),
    us_state("NH", "New Hampshire"),
    us_state("NJ", "New Jersey"),
    us_state("NM", "New Mexico"),
    us_state("NY", "New York"),
    us_state("NC", "North Carolina"),
    us_state("ND", "North Dakota"),
    us_state("OH", "Ohio"),
    us_state("OK", "Oklahoma"),
    us_state("OR", "Oregon"),
    us_state("PA", "Pennsylvania"),
    us_state("RI", "Rhode Island"),
    us_state("SC", "South Carolina"),
    us_state("SD", "South Dakota"),
    us_state("TN", "Tennessee"),
    us_state("TX", "Texas"),
    us_state("UT", "Utah"),
    us_state("VT", "Vermont"),
    us_state("VA", "Virginia"),
    us_state("WA", "Washington"),
    us_state("WV", "West Virginia"),
    us_state("WI", "Wisconsin"),
    us_state("WY", "Wyoming"),
    // Canada, provinces and territories. Validation checks the country only:
    // the API reports province names inconsistently across locales.
    country_named("AB", "Alberta, Canada", "Canada"),
    country_named("BC", "British Columbia, Canada", "Canada"),
    country_named("MB", "Manitoba, Canada", "Canada"),
    country_named("NB", "New Brunswick, Canada", "Canada"),
    country_named("NFL", "Newfoundland and Labrador, Canada", "Canada"),
    country_named("NS", "Nova Scotia, Canada", "Canada"),
    country_named("ON", "Ontario, Canada", "Canada"),
    country_named("PEI", "Prince Edward Island, Canada", "Canada"),
    country_named("QC", "Quebec, Canada", "Canada"),
    country_named("SK", "Saskatchewan, Canada", "Canada"),
    // Middle East
    country("EG", "Egypt"),
    country("JO", "Jordan"),
    country("LB", "Lebanon"),
    country("PS", "Palestine"),
    country("ISR", "Israel"),
    country("AE", "United Arab Emirates"),
    country("KW", "Kuwait"),
    country("SAU", "Saudi Arabia"),
    country("QA", "Qatar"),
    country("BH", "Bahrain"),
    country("OM", "Oman"),
    country("IQ", "Iraq"),
    country("SY", "Syria"),
    country("YE", "Yemen"),
    // Europe
    country("GB", "United Kingdom"),
    country("IE", "Ireland"),
    country("FR", "France"),
    country("DEU", "Germany"),
    country("IT", "Italy"),
    country("ES", "Spain"),
    country("PT", "Portugal"),
    country("NLD", "Netherlands"),
    country("BE", "Belgium"),
    country("CH", "Switzerland"),
    country("AT", "Austria"),
    country("GR", "Greece"),
    country("SE", "Sweden"),
    country("NO", "Norway"),
    country("DK", "Denmark"),
    country("FI", "Finland"),
    country("PL", "Poland"),
    country("CZ", "Czech Republic"),
    country("HU", "Hungary"),
    country("RO", "Romania"),
    country("BG", "Bulgaria"),
    country("RS", "Serbia"),
    country("HR", "Croatia"),
    country("SI", "Slovenia"),
    // Africa
    country("KE", "Kenya"),
    country("UG", "Uganda"),
    country("TZ", "Tanzania"),
    country("ET", "Ethiopia"),
    country("SDN", "Sudan"),
    country("SS", "South Sudan"),
    country("ZA", "South Africa"),
    country("ZW", "Zimbabwe"),
    country("BW", "Botswana"),
    country("NAM", "Namibia"),
    country("ZM", "Zambia"),
    country("MW", "Malawi"),
    country("GH", "Ghana"),
    country("NG", "Nigeria"),
    country("CI", "Ivory Coast"),
    country("SN", "Senegal"),
    // Oceania. Australian states validate against the country only.
    country_named("AU-NSW", "New South Wales, Australia", "Australia"),
    country_named("AU-VIC", "Victoria, Australia", "Australia"),
    country_named("AU-QLD", "Queensland, Australia", "Australia"),
    country_named("AU-WA", "Western Australia", "Australia"),
    country_named("AU-SA", "South Australia", "Australia"),
    country("NZ", "New Zealand"),
    // Asia
    country("JP", "Japan"),
    country("KR", "South Korea"),
    country("CN", "China"),
    country("HK", "Hong Kong"),
    country("SG", "Singapore"),
    country("MY", "Malaysia"),
    country("TH", "Thailand"),
    country("PH", "Philippines"),
    country("IND", "India"),
    country("PK", "Pakistan"),
    country("BD", "Bangladesh"),
    // South and Central America
    country("BR", "Brazil"),
    country("ARG", "Argentina"),
    country("CL", "Chile"),
    country("COL", "Colombia"),
    country("PER", "Peru"),
    country("VE", "Venezuela"),
    country("MX", "Mexico"),
    country("PAN", "Panama"),
    country("CR", "Costa Rica"),
    country("GT", "Guatemala"),
];

/// Looks up a region by its code, case-insensitively.
#[must_use]
pub fn find_region(code: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(code))
}
