use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::archive::Archive;
use crate::catalog::Catalog;
use crate::date::DateRange;
use crate::error::Result;

/// Product prefix of every output filename.
pub const PRODUCT: &str = "GFASv1.2";
pub const EXTENSION: &str = "nc";

/// Archive request body expressed as keyword/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Payload {
    inner: BTreeMap<String, String>,
}

impl Payload {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    /// Insert a keyword/value pair.
    pub fn kw(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.insert(key.into(), value.into());
        self
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut r = Self::new();
        for (k, v) in pairs {
            r = r.kw(k, v);
        }
        r
    }

    pub fn format(self, v: impl Into<String>) -> Self {
        self.kw("format", v)
    }

    pub fn date(self, v: impl Into<String>) -> Self {
        self.kw("date", v)
    }

    pub fn variable(self, v: impl Into<String>) -> Self {
        self.kw("variable", v)
    }

    pub fn param(self, v: impl Into<String>) -> Self {
        self.kw("param", v)
    }

    pub fn target(self, v: impl Into<String>) -> Self {
        self.kw("target", v)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Number of keywords.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One `(year, month, parameter)` retrieval, built fresh per iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub year: i32,
    pub month: u32,
    pub parameter_code: String,
    pub date_range: DateRange,
    pub output_filename: String,
    pub payload: Payload,
}

impl DownloadRequest {
    pub fn target_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.output_filename)
    }
}

pub fn output_filename(year: i32, month: u32, code: &str) -> String {
    format!("{PRODUCT}_{year}_{month:02}_{code}.{EXTENSION}")
}

#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder {
    archive: Archive,
    catalog: &'static Catalog,
}

impl RequestBuilder {
    pub fn new(archive: Archive) -> Self {
        Self {
            archive,
            catalog: archive.catalog(),
        }
    }

    pub fn build(&self, year: i32, month: u32, code: &str) -> Result<DownloadRequest> {
        let parameter = self.catalog.lookup(code)?;
        let date_range = DateRange::for_month(year, month);
        let output_filename = output_filename(year, month, code);
        let dates = date_range.to_archive_string(self.archive.date_separator());

        let payload = match self.archive {
            Archive::Cds => Payload::new()
                .format("netcdf")
                .date(dates)
                .variable(parameter.identifier),
            Archive::Mars => Payload::from_pairs([
                ("class", "mc"),
                ("dataset", self.archive.dataset()),
                ("expver", "0001"),
                ("levtype", "sfc"),
                ("step", "0-24"),
                ("stream", "gfas"),
                ("time", "00"),
                ("type", "ga"),
            ])
            .format("netcdf")
            .date(dates)
            .param(parameter.identifier)
            .target(&output_filename),
        };

        Ok(DownloadRequest {
            year,
            month,
            parameter_code: code.to_string(),
            date_range,
            output_filename,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::error::Error;

    #[test]
    fn cds_request_for_january_2003() {
        let r = RequestBuilder::new(Archive::Cds).build(2003, 1, "CO").unwrap();
        assert_eq!(r.output_filename, "GFASv1.2_2003_01_CO.nc");
        assert_eq!(r.payload.get("date"), Some("2003-01-01/2003-01-31"));
        assert_eq!(
            r.payload.get("variable"),
            Some("wildfire_flux_of_carbon_monoxide")
        );
        assert_eq!(r.payload.get("format"), Some("netcdf"));
        assert_eq!(r.payload.len(), 3);
    }

    #[test]
    fn mars_request_carries_fixed_fields() {
        let r = RequestBuilder::new(Archive::Mars).build(2003, 1, "CO").unwrap();
        assert_eq!(r.payload.get("date"), Some("2003-01-01/to/2003-01-31"));
        assert_eq!(r.payload.get("param"), Some("81.210"));
        assert_eq!(r.payload.get("target"), Some("GFASv1.2_2003_01_CO.nc"));
        assert_eq!(r.payload.get("class"), Some("mc"));
        assert_eq!(r.payload.get("dataset"), Some("cams_gfas"));
        assert_eq!(r.payload.get("step"), Some("0-24"));
        assert_eq!(r.payload.get("type"), Some("ga"));
        assert_eq!(r.payload.len(), 12);
    }

    #[test]
    fn date_range_ends_on_last_day() {
        let b = RequestBuilder::new(Archive::Cds);
        for year in 2003..=2023 {
            for month in 1..=12 {
                let r = b.build(year, month, "BC").unwrap();
                assert_eq!(r.date_range.first_day, 1);
                assert_eq!(r.date_range.last_day, crate::date::days_in_month(year, month));
            }
        }
    }

    #[test]
    fn filenames_unique_over_grid() {
        let b = RequestBuilder::new(Archive::Mars);
        let codes = ["CO", "BC", "OC", "NOx", "SO2"];
        let mut seen = BTreeSet::new();
        for year in 2003..=2005 {
            for month in 1..=12 {
                for code in codes {
                    let r = b.build(year, month, code).unwrap();
                    assert_eq!(r.output_filename, format!("GFASv1.2_{year}_{month:02}_{code}.nc"));
                    assert!(seen.insert(r.output_filename));
                }
            }
        }
        assert_eq!(seen.len(), 3 * 12 * codes.len());
    }

    #[test]
    fn unknown_code_fails() {
        let err = RequestBuilder::new(Archive::Cds).build(2003, 1, "VA").unwrap_err();
        assert!(matches!(err, Error::MissingParameter { .. }));
    }

    #[test]
    fn payload_serializes_flat() {
        let p = Payload::new().format("netcdf").param("81.210");
        assert_eq!(p.to_json().unwrap(), r#"{"format":"netcdf","param":"81.210"}"#);
    }
}
