use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CDS_CATALOG, MARS_CATALOG};

/// Remote archive serving GFAS v1.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Archive {
    /// Copernicus Data Store, semantic variable names.
    #[default]
    Cds,
    /// ECMWF MARS through the Web API, GRIB parameter codes.
    Mars,
}

impl Archive {
    pub fn name(self) -> &'static str {
        match self {
            Archive::Cds => "cds",
            Archive::Mars => "mars",
        }
    }

    /// Dataset identifier passed to the retrieval client.
    pub fn dataset(self) -> &'static str {
        match self {
            Archive::Cds => "cams-global-fire-emissions-gfas",
            Archive::Mars => "cams_gfas",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Archive::Cds => "https://ads.atmosphere.copernicus.eu/api/v2",
            Archive::Mars => "https://api.ecmwf.int/v1",
        }
    }

    pub fn catalog(self) -> &'static Catalog {
        match self {
            Archive::Cds => &CDS_CATALOG,
            Archive::Mars => &MARS_CATALOG,
        }
    }

    /// Token placed between the first and last day of a date range.
    pub fn date_separator(self) -> &'static str {
        match self {
            Archive::Cds => "/",
            Archive::Mars => "/to/",
        }
    }
}

impl fmt::Display for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archives_use_their_own_catalog() {
        assert_eq!(Archive::Cds.catalog().archive(), Archive::Cds);
        assert_eq!(Archive::Mars.catalog().archive(), Archive::Mars);
    }

    #[test]
    fn deserializes_lowercase_names() {
        let a: Archive = serde_json::from_str("\"mars\"").unwrap();
        assert_eq!(a, Archive::Mars);
        assert_eq!(Archive::Cds.to_string(), "cds");
    }
}
