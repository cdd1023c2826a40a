//! API key discovery.
//!
//! Both archives follow the conventions of their reference Python clients:
//! environment variables first, then an rc file in the home directory.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::archive::Archive;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub key: String,
    /// Required by the ECMWF Web API, unused by the Data Store.
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EcmwfApiRc {
    url: Option<String>,
    key: Option<String>,
    email: Option<String>,
}

impl Credentials {
    pub fn load(archive: Archive) -> Result<Self> {
        Self::resolve(archive, |name| std::env::var(name).ok())
    }

    /// Resolve credentials with a custom environment lookup.
    pub fn resolve(archive: Archive, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match archive {
            Archive::Cds => Self::resolve_cds(&env),
            Archive::Mars => Self::resolve_mars(&env),
        }
    }

    fn resolve_cds(env: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut url = env("CDSAPI_URL");
        let mut key = env("CDSAPI_KEY");

        if url.is_none() || key.is_none() {
            let path = env("CDSAPI_RC")
                .map(PathBuf::from)
                .or_else(|| dirs::home_dir().map(|h| h.join(".cdsapirc")));
            if let Some(path) = path.filter(|p| p.is_file()) {
                debug!(path = %path.display(), "reading cds credentials");
                let (file_url, file_key) = parse_cdsapirc(&fs::read_to_string(&path)?);
                url = url.or(file_url);
                key = key.or(file_key);
            }
        }

        let key = key.ok_or_else(|| {
            Error::Credentials("no CDS API key: set CDSAPI_KEY or create ~/.cdsapirc".into())
        })?;
        Ok(Self {
            url: url.unwrap_or_else(|| Archive::Cds.default_base_url().to_string()),
            key,
            email: None,
        })
    }

    fn resolve_mars(env: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut url = env("ECMWF_API_URL");
        let mut key = env("ECMWF_API_KEY");
        let mut email = env("ECMWF_API_EMAIL");

        if key.is_none() || email.is_none() {
            let path = env("ECMWF_API_RC_FILE")
                .map(PathBuf::from)
                .or_else(|| dirs::home_dir().map(|h| h.join(".ecmwfapirc")));
            if let Some(path) = path.filter(|p| p.is_file()) {
                debug!(path = %path.display(), "reading ecmwf credentials");
                let rc = parse_ecmwfapirc(&fs::read_to_string(&path)?)?;
                url = url.or(rc.url);
                key = key.or(rc.key);
                email = email.or(rc.email);
            }
        }

        let (Some(key), Some(email)) = (key, email) else {
            return Err(Error::Credentials(
                "no ECMWF API key/email: set ECMWF_API_KEY and ECMWF_API_EMAIL or create ~/.ecmwfapirc"
                    .into(),
            ));
        };
        Ok(Self {
            url: url.unwrap_or_else(|| Archive::Mars.default_base_url().to_string()),
            key,
            email: Some(email),
        })
    }

    /// `UID:KEY` split for HTTP basic auth, the Data Store key format.
    pub fn basic_auth(&self) -> (&str, Option<&str>) {
        match self.key.split_once(':') {
            Some((user, pass)) => (user, Some(pass)),
            None => (self.key.as_str(), None),
        }
    }
}

/// Parse `key: value` lines of a `.cdsapirc`, returning `(url, key)`.
fn parse_cdsapirc(text: &str) -> (Option<String>, Option<String>) {
    let mut url = None;
    let mut key = None;
    for line in text.lines() {
        let Some((k, v)) = line.split_once(':') else {
            continue;
        };
        let v = v.trim().to_string();
        match k.trim() {
            "url" => url = Some(v),
            "key" => key = Some(v),
            _ => {}
        }
    }
    (url, key)
}

fn parse_ecmwfapirc(text: &str) -> Result<EcmwfApiRc> {
    Ok(serde_json::from_str(text)?)
}
