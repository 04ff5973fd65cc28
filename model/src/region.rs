use std::{fmt, str::FromStr};

use anyhow::bail;
use serde_with::{DeserializeFromStr, SerializeDisplay};

const GEOFABRIK: &str = "https://download.geofabrik.de";

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Country {
    Gb,
    Fr,
    De,
    Se,
    Za,
    Au,
}

impl Country {
    pub fn all() -> Vec<Self> {
        vec![
            Country::Gb,
            Country::Fr,
            Country::De,
            Country::Se,
            Country::Za,
            Country::Au,
        ]
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Gb => "gb",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Se => "se",
            Self::Za => "za",
            Self::Au => "au",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gb => "Great Britain",
            Self::Fr => "France",
            Self::De => "Germany",
            Self::Se => "Sweden",
            Self::Za => "South Africa",
            Self::Au => "Australia",
        }
    }

    fn extract(&self) -> &'static str {
        match self {
            Self::Gb => "europe/great-britain",
            Self::Fr => "europe/france",
            Self::De => "europe/germany",
            Self::Se => "europe/sweden",
            Self::Za => "africa/south-africa",
            Self::Au => "australia-oceania/australia",
        }
    }
}

/// Geofabrik slug and postal code of every US state extract.
const US_STATES: [(&str, &str); 51] = [
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("district-of-columbia", "DC"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new-hampshire", "NH"),
    ("new-jersey", "NJ"),
    ("new-mexico", "NM"),
    ("new-york", "NY"),
    ("north-carolina", "NC"),
    ("north-dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode-island", "RI"),
    ("south-carolina", "SC"),
    ("south-dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west-virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UsState(usize);

impl UsState {
    pub fn all() -> Vec<Self> {
        (0..US_STATES.len()).map(UsState).collect()
    }

    pub fn slug(&self) -> &'static str {
        US_STATES[self.0].0
    }

    pub fn code(&self) -> &'static str {
        US_STATES[self.0].1
    }

    pub fn name(&self) -> String {
        title_case(&self.slug().replace('-', " "))
    }

    fn find(s: &str) -> Option<Self> {
        US_STATES
            .iter()
            .position(|(slug, code)| *slug == s || code.eq_ignore_ascii_case(s))
            .map(UsState)
    }
}

/// One Geofabrik extract and the dataset built from it.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum Region {
    Country(Country),
    UsState(UsState),
}

impl Region {
    pub fn all() -> Vec<Self> {
        let mut all: Vec<_> = Country::all().into_iter().map(Region::Country).collect();
        all.extend(UsState::all().into_iter().map(Region::UsState));
        all
    }

    pub fn code(&self) -> String {
        match self {
            Self::Country(x) => x.slug().to_uppercase(),
            Self::UsState(x) => x.code().to_string(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Country(x) => x.name().to_string(),
            Self::UsState(x) => x.name(),
        }
    }

    pub fn url(&self) -> String {
        match self {
            Self::Country(x) => format!("{GEOFABRIK}/{}-latest.osm.pbf", x.extract()),
            Self::UsState(x) => {
                format!("{GEOFABRIK}/north-america/us/{}-latest.osm.pbf", x.slug())
            }
        }
    }

    /// Path of the downloaded extract, relative to the cache directory.
    pub fn extract_file(&self) -> String {
        match self {
            Self::Country(x) => format!("{}-latest.osm.pbf", x.slug()),
            Self::UsState(x) => format!("us/{}-latest.osm.pbf", x.slug()),
        }
    }

    /// Path of the built dataset, relative to the output directory.
    pub fn output_file(&self) -> String {
        match self {
            Self::Country(x) => format!("{}.json", x.slug()),
            Self::UsState(x) => format!("us/{}.json", x.code()),
        }
    }

    /// Locality given to courses that carry no address tags of their own.
    pub fn meta(&self) -> &'static str {
        match self {
            Self::Country(_) => "",
            Self::UsState(x) => x.code(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Country(x) => write!(f, "{}", x.slug()),
            Self::UsState(x) => write!(f, "us/{}", x.slug()),
        }
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if let Some(x) = Country::all().into_iter().find(|x| x.slug() == s) {
            return Ok(Self::Country(x));
        }
        if let Some(x) = UsState::find(s.strip_prefix("us/").unwrap_or(&s)) {
            return Ok(Self::UsState(x));
        }
        bail!("Unknown region: {s}")
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_region() {
        assert_eq!("gb".parse::<Region>().unwrap(), Region::Country(Country::Gb));
        let nj: Region = "us/new-jersey".parse().unwrap();
        assert_eq!(nj.code(), "NJ");
        assert_eq!("NJ".parse::<Region>().unwrap(), nj);
        assert_eq!("new-jersey".parse::<Region>().unwrap(), nj);
        assert!("atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn layout() {
        let dc: Region = "dc".parse().unwrap();
        assert_eq!(dc.name(), "District Of Columbia");
        assert_eq!(dc.output_file(), "us/DC.json");
        assert_eq!(dc.extract_file(), "us/district-of-columbia-latest.osm.pbf");
        assert_eq!(
            dc.url(),
            "https://download.geofabrik.de/north-america/us/district-of-columbia-latest.osm.pbf"
        );
        assert_eq!(dc.meta(), "DC");

        let za = Region::Country(Country::Za);
        assert_eq!(
            za.url(),
            "https://download.geofabrik.de/africa/south-africa-latest.osm.pbf"
        );
        assert_eq!(za.output_file(), "za.json");
        assert_eq!(za.meta(), "");
    }

    #[test]
    fn all_regions() {
        assert_eq!(Region::all().len(), 57);
        for x in Region::all() {
            assert_eq!(x.to_string().parse::<Region>().unwrap(), x);
        }
    }
}
