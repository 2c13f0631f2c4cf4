//! Region and sub-region taxonomy.
//!
//! The taxonomy is fixed at build time: every [`SubRegion`] belongs to
//! exactly one [`Region`] and the mapping never changes at runtime. Numeric
//! codes are stable and shared with the database schema and HTTP payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level market region.
///
/// # Examples
///
/// ```
/// # use market_backend::domain::Region;
/// assert_eq!(Region::Laapa.code(), 2);
/// assert_eq!("NOAM".parse::<Region>(), Ok(Region::Noam));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    /// Europe.
    Euro,
    /// Latin America, Asia Pacific and Africa.
    Laapa,
    /// North America.
    Noam,
}

/// Second-level classification inside a [`Region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubRegion {
    Europe,
    LatinAmerica,
    AsiaPacific,
    Africa,
    America,
    Canada,
}

/// Raised when a raw value does not name a known region or sub-region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {input}")]
pub struct ParseTaxonomyError {
    kind: &'static str,
    input: String,
}

impl ParseTaxonomyError {
    fn region(input: impl Into<String>) -> Self {
        Self {
            kind: "region",
            input: input.into(),
        }
    }

    fn sub_region(input: impl Into<String>) -> Self {
        Self {
            kind: "sub-region",
            input: input.into(),
        }
    }
}

const TAXONOMY: [(Region, &[SubRegion]); 3] = [
    (Region::Euro, &[SubRegion::Europe]),
    (
        Region::Laapa,
        &[
            SubRegion::LatinAmerica,
            SubRegion::AsiaPacific,
            SubRegion::Africa,
        ],
    ),
    (Region::Noam, &[SubRegion::America, SubRegion::Canada]),
];

impl Region {
    /// Every region in declaration order.
    pub const ALL: [Region; 3] = [Region::Euro, Region::Laapa, Region::Noam];

    /// Stable numeric code.
    pub const fn code(self) -> i16 {
        match self {
            Self::Euro => 1,
            Self::Laapa => 2,
            Self::Noam => 3,
        }
    }

    /// Resolve a region from its numeric code.
    pub fn from_code(code: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.code() == code)
    }

    /// Canonical name, as used in payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Euro => "EURO",
            Self::Laapa => "LAAPA",
            Self::Noam => "NOAM",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ParseTaxonomyError;

    /// Accepts the canonical name in any case or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i16>() {
            return Self::from_code(code).ok_or_else(|| ParseTaxonomyError::region(s));
        }
        Self::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseTaxonomyError::region(s))
    }
}

impl SubRegion {
    /// Every sub-region in declaration order.
    pub const ALL: [SubRegion; 6] = [
        SubRegion::Europe,
        SubRegion::LatinAmerica,
        SubRegion::AsiaPacific,
        SubRegion::Africa,
        SubRegion::America,
        SubRegion::Canada,
    ];

    /// Stable numeric code.
    pub const fn code(self) -> i16 {
        match self {
            Self::Europe => 1,
            Self::LatinAmerica => 2,
            Self::AsiaPacific => 3,
            Self::Africa => 4,
            Self::America => 5,
            Self::Canada => 6,
        }
    }

    /// Resolve a sub-region from its numeric code.
    pub fn from_code(code: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|sub| sub.code() == code)
    }

    /// Canonical name, as used in payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Europe => "Europe",
            Self::LatinAmerica => "LatinAmerica",
            Self::AsiaPacific => "AsiaPacific",
            Self::Africa => "Africa",
            Self::America => "America",
            Self::Canada => "Canada",
        }
    }

    /// The region this sub-region belongs to.
    pub fn region(self) -> Region {
        TAXONOMY
            .iter()
            .find(|(_, subs)| subs.contains(&self))
            .map_or(Region::Euro, |(region, _)| *region)
    }
}

impl fmt::Display for SubRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubRegion {
    type Err = ParseTaxonomyError;

    /// Accepts the canonical name in any case or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i16>() {
            return Self::from_code(code).ok_or_else(|| ParseTaxonomyError::sub_region(s));
        }
        Self::ALL
            .into_iter()
            .find(|sub| sub.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseTaxonomyError::sub_region(s))
    }
}

/// Sub-regions allowed for `region`.
///
/// # Examples
///
/// ```
/// # use market_backend::domain::{Region, SubRegion, sub_regions_of};
/// assert_eq!(sub_regions_of(Region::Euro), &[SubRegion::Europe]);
/// ```
pub fn sub_regions_of(region: Region) -> &'static [SubRegion] {
    TAXONOMY
        .iter()
        .find(|(candidate, _)| *candidate == region)
        .map_or(&[], |(_, subs)| *subs)
}

/// Sub-regions for a raw region name or code; unknown input yields an empty
/// slice rather than an error.
pub fn sub_regions_for_name(raw: &str) -> &'static [SubRegion] {
    raw.parse::<Region>().map_or(&[], sub_regions_of)
}

/// Whether `sub_region` belongs to `region`.
pub fn is_valid_sub_region(region: Region, sub_region: SubRegion) -> bool {
    sub_regions_of(region).contains(&sub_region)
}

#[cfg(test)]
mod tests {
    //! Taxonomy lookups and parsing.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Region::Euro, SubRegion::Europe, true)]
    #[case(Region::Euro, SubRegion::LatinAmerica, false)]
    #[case(Region::Laapa, SubRegion::LatinAmerica, true)]
    #[case(Region::Laapa, SubRegion::AsiaPacific, true)]
    #[case(Region::Laapa, SubRegion::Africa, true)]
    #[case(Region::Laapa, SubRegion::Canada, false)]
    #[case(Region::Noam, SubRegion::America, true)]
    #[case(Region::Noam, SubRegion::Canada, true)]
    #[case(Region::Noam, SubRegion::Europe, false)]
    fn validity_matches_table(
        #[case] region: Region,
        #[case] sub_region: SubRegion,
        #[case] expected: bool,
    ) {
        assert_eq!(is_valid_sub_region(region, sub_region), expected);
    }

    #[rstest]
    fn validity_agrees_with_membership_for_every_pair() {
        for region in Region::ALL {
            for sub_region in SubRegion::ALL {
                assert_eq!(
                    is_valid_sub_region(region, sub_region),
                    sub_regions_of(region).contains(&sub_region),
                    "{region}/{sub_region}"
                );
            }
        }
    }

    #[rstest]
    fn every_sub_region_has_exactly_one_region() {
        for sub_region in SubRegion::ALL {
            let owners = Region::ALL
                .into_iter()
                .filter(|region| sub_regions_of(*region).contains(&sub_region))
                .count();
            assert_eq!(owners, 1, "{sub_region}");
            assert!(is_valid_sub_region(sub_region.region(), sub_region));
        }
    }

    #[rstest]
    #[case("euro", Some(Region::Euro))]
    #[case(" LAAPA ", Some(Region::Laapa))]
    #[case("3", Some(Region::Noam))]
    #[case("9", None)]
    #[case("ASIA", None)]
    fn region_parses_names_and_codes(#[case] raw: &str, #[case] expected: Option<Region>) {
        assert_eq!(raw.parse::<Region>().ok(), expected);
    }

    #[rstest]
    fn unknown_region_name_has_no_sub_regions() {
        assert!(sub_regions_for_name("ATLANTIS").is_empty());
        assert_eq!(sub_regions_for_name("noam"), &[SubRegion::America, SubRegion::Canada]);
    }

    #[rstest]
    fn codes_round_trip() {
        for region in Region::ALL {
            assert_eq!(Region::from_code(region.code()), Some(region));
        }
        for sub_region in SubRegion::ALL {
            assert_eq!(SubRegion::from_code(sub_region.code()), Some(sub_region));
        }
    }
}
