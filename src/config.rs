use std::collections::BTreeSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::archive::Archive;
use crate::error::{Error, Result};

/// What to do when a single request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the batch at the first failure.
    #[default]
    Abort,
    /// Record the failure and continue with the next request.
    Skip,
}

pub const DEFAULT_OUTPUT_ROOT: &str = "GFASv1p2";
const CDS_DEFAULT_PARAMETERS: &[&str] = &["CO", "CO2", "CH4", "OC", "BC", "PM2p5"];
const MARS_DEFAULT_PARAMETERS: &[&str] = &["CO", "BC", "OC", "NOx", "SO2"];

/// Fully resolved batch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub archive: Archive,
    pub output_root: PathBuf,
    /// Inclusive `[start, end]`.
    pub years: [i32; 2],
    /// Inclusive `[start, end]`, within 1-12.
    pub months: [u32; 2],
    pub parameters: Vec<String>,
    pub on_error: ErrorPolicy,
}

impl BatchConfig {
    /// The grid each archive's download script was run with.
    pub fn defaults(archive: Archive) -> Self {
        let (years, parameters) = match archive {
            Archive::Cds => ([2003, 2022], CDS_DEFAULT_PARAMETERS),
            Archive::Mars => ([2003, 2003], MARS_DEFAULT_PARAMETERS),
        };
        Self {
            archive,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            years,
            months: [1, 12],
            parameters: parameters.iter().map(|s| s.to_string()).collect(),
            on_error: ErrorPolicy::default(),
        }
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.years[0]..=self.years[1]
    }

    pub fn months(&self) -> RangeInclusive<u32> {
        self.months[0]..=self.months[1]
    }

    /// Number of requests the grid expands to.
    pub fn request_count(&self) -> usize {
        self.years().count() * self.months().count() * self.parameters.len()
    }

    pub fn validate(&self) -> Result<()> {
        let [y0, y1] = self.years;
        if y0 > y1 {
            return Err(Error::InvalidConfig(format!("year range {y0}..{y1} is empty")));
        }
        let [m0, m1] = self.months;
        if !(1..=12).contains(&m0) || !(1..=12).contains(&m1) {
            return Err(Error::InvalidConfig(format!(
                "months must be within 1-12, got {m0}..{m1}"
            )));
        }
        if m0 > m1 {
            return Err(Error::InvalidConfig(format!("month range {m0}..{m1} is empty")));
        }
        if self.parameters.is_empty() {
            return Err(Error::InvalidConfig("no parameters requested".into()));
        }

        let catalog = self.archive.catalog();
        let mut seen = BTreeSet::new();
        for code in &self.parameters {
            catalog.lookup(code)?;
            if !seen.insert(code.as_str()) {
                return Err(Error::InvalidConfig(format!("parameter {code} listed twice")));
            }
        }
        Ok(())
    }
}

/// Partial configuration, as read from a config file or the command line.
/// Unset fields fall through to the next layer. Range bounds are layered one
/// at a time, so a start year alone can replace the start of a file's range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overrides {
    pub archive: Option<Archive>,
    pub output_root: Option<PathBuf>,
    #[serde(default)]
    pub years: [Option<i32>; 2],
    #[serde(default)]
    pub months: [Option<u32>; 2],
    pub parameters: Option<Vec<String>>,
    pub on_error: Option<ErrorPolicy>,
}

impl Overrides {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("cannot read config {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| Error::InvalidConfig(format!("invalid config {}: {e}", path.display())))
    }

    /// Combine two layers, values in `top` winning.
    pub fn merge(self, top: Overrides) -> Overrides {
        Overrides {
            archive: top.archive.or(self.archive),
            output_root: top.output_root.or(self.output_root),
            years: layer(top.years, self.years),
            months: layer(top.months, self.months),
            parameters: top.parameters.or(self.parameters),
            on_error: top.on_error.or(self.on_error),
        }
    }

    /// Apply on top of the archive defaults and validate the result.
    pub fn resolve(self) -> Result<BatchConfig> {
        let defaults = BatchConfig::defaults(self.archive.unwrap_or_default());
        let config = BatchConfig {
            archive: defaults.archive,
            output_root: self.output_root.unwrap_or(defaults.output_root),
            years: fill(self.years, defaults.years),
            months: fill(self.months, defaults.months),
            parameters: self.parameters.unwrap_or(defaults.parameters),
            on_error: self.on_error.unwrap_or(defaults.on_error),
        };
        config.validate()?;
        Ok(config)
    }
}

fn layer<T>(top: [Option<T>; 2], below: [Option<T>; 2]) -> [Option<T>; 2] {
    let [t0, t1] = top;
    let [b0, b1] = below;
    [t0.or(b0), t1.or(b1)]
}

fn fill<T: Copy>(bounds: [Option<T>; 2], defaults: [T; 2]) -> [T; 2] {
    [bounds[0].unwrap_or(defaults[0]), bounds[1].unwrap_or(defaults[1])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        for archive in [Archive::Cds, Archive::Mars] {
            BatchConfig::defaults(archive).validate().unwrap();
        }
        assert_eq!(BatchConfig::defaults(Archive::Cds).request_count(), 20 * 12 * 6);
        assert_eq!(BatchConfig::defaults(Archive::Mars).request_count(), 12 * 5);
    }

    #[test]
    fn rejects_parameter_absent_from_catalog() {
        let mut c = BatchConfig::defaults(Archive::Cds);
        c.parameters.push("MaxFRP".into());
        assert!(matches!(c.validate(), Err(Error::MissingParameter { .. })));
    }

    #[test]
    fn rejects_bad_ranges() {
        let mut c = BatchConfig::defaults(Archive::Mars);
        c.months = [0, 12];
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
        c.months = [6, 5];
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
        c.months = [1, 12];
        c.years = [2010, 2003];
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_duplicates_and_empty_lists() {
        let mut c = BatchConfig::defaults(Archive::Mars);
        c.parameters = vec!["CO".into(), "CO".into()];
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
        c.parameters.clear();
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn layers_override_in_order() {
        let file: Overrides = serde_json::from_str(
            r#"{"archive": "mars", "years": [2005, 2006], "parameters": ["FRP"]}"#,
        )
        .unwrap();
        let cli = Overrides {
            years: [Some(2007), Some(2007)],
            on_error: Some(ErrorPolicy::Skip),
            ..Overrides::default()
        };
        let c = file.merge(cli).resolve().unwrap();
        assert_eq!(c.archive, Archive::Mars);
        assert_eq!(c.years, [2007, 2007]);
        assert_eq!(c.months, [1, 12]);
        assert_eq!(c.parameters, vec!["FRP".to_string()]);
        assert_eq!(c.on_error, ErrorPolicy::Skip);
        assert_eq!(c.output_root, PathBuf::from(DEFAULT_OUTPUT_ROOT));
    }

    #[test]
    fn single_bound_overrides_one_end() {
        let file: Overrides = serde_json::from_str(r#"{"years": [2005, 2010], "months": [3, 4]}"#).unwrap();
        let cli = Overrides {
            years: [None, Some(2006)],
            months: [Some(4), None],
            ..Overrides::default()
        };
        let c = file.merge(cli).resolve().unwrap();
        assert_eq!(c.years, [2005, 2006]);
        assert_eq!(c.months, [4, 4]);

        let c = Overrides {
            months: [None, Some(2)],
            ..Overrides::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(c.months, [1, 2]);
        assert_eq!(c.years, [2003, 2022]);
    }

    #[test]
    fn command_line_repairs_file_range() {
        let file: Overrides = serde_json::from_str(r#"{"years": [2010, 2003]}"#).unwrap();
        assert!(matches!(file.clone().resolve(), Err(Error::InvalidConfig(_))));

        let cli = Overrides {
            years: [Some(2001), None],
            ..Overrides::default()
        };
        let c = file.merge(cli).resolve().unwrap();
        assert_eq!(c.years, [2001, 2003]);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.json");
        let err = Overrides::from_file(&path).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn unknown_file_keys_are_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gfas.json");
        fs::write(&path, r#"{"yeras": [2003, 2004]}"#).unwrap();
        let err = Overrides::from_file(&path).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("yeras"));
    }

    #[test]
    fn malformed_config_file_is_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gfas.json");
        fs::write(&path, "{\"years\": [2003,").unwrap();
        assert!(Overrides::from_file(&path).unwrap_err().is_config());
    }

    #[test]
    fn reads_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gfas.json");
        fs::write(&path, r#"{"output_root": "/data/gfas", "on_error": "skip"}"#).unwrap();
        let c = Overrides::from_file(&path).unwrap().resolve().unwrap();
        assert_eq!(c.archive, Archive::Cds);
        assert_eq!(c.output_root, PathBuf::from("/data/gfas"));
        assert_eq!(c.on_error, ErrorPolicy::Skip);
    }
}
