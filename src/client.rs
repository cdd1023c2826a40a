use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, RequestBuilder as HttpRequest};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, LOCATION, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::archive::Archive;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::request::Payload;
use crate::url_builder::{cds_resource_url, cds_task_url, mars_request_url, resolve};

/// Outcome of a successful retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved {
    pub target: PathBuf,
    pub size_bytes: u64,
}

/// Retrieval client seam: submit one payload and block until the file is
/// written to `target` or the archive gives up.
pub trait Retrieve {
    fn retrieve(&self, dataset: &str, payload: &Payload, target: &Path) -> Result<Retrieved>;
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Delay between task status polls. `None` picks the archive default.
    pub poll_interval: Option<Duration>,
    pub verify_tls: bool,
    /// Delete the remote task once the file has been fetched.
    pub cleanup: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            poll_interval: None,
            verify_tls: true,
            cleanup: true,
        }
    }
}

/// Reply of the Data Store `resources` and `tasks` endpoints.
#[derive(Debug, Clone, Deserialize)]
struct CdsReply {
    state: String,
    request_id: Option<String>,
    location: Option<String>,
    error: Option<RemoteError>,
}

#[derive(Debug, Clone, Deserialize)]
struct RemoteError {
    message: Option<String>,
    reason: Option<String>,
}

impl RemoteError {
    fn describe(&self) -> String {
        match (&self.message, &self.reason) {
            (Some(m), Some(r)) => format!("{m}: {r}"),
            (Some(m), None) => m.clone(),
            (None, Some(r)) => r.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

/// Reply of the ECMWF Web API `services/mars/requests` endpoint.
#[derive(Debug, Clone, Deserialize)]
struct MarsReply {
    status: String,
    href: Option<String>,
    reason: Option<String>,
}

/// Blocking HTTP client for one archive.
#[derive(Debug, Clone)]
pub struct ApiClient {
    archive: Archive,
    credentials: Credentials,
    opts: ClientOptions,
    http: HttpClient,
}

impl ApiClient {
    pub fn new(archive: Archive, credentials: Credentials, opts: ClientOptions) -> Result<Self> {
        if !crate::archive::is_http_url(&credentials.url) {
            return Err(Error::Credentials(format!(
                "archive url must be http(s): {}",
                credentials.url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("gfas-fetch-rs/0.1"));

        let mut builder = HttpClient::builder()
            .default_headers(headers)
            .timeout(None::<Duration>);
        if !opts.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build()?;

        Ok(Self {
            archive,
            credentials,
            opts,
            http,
        })
    }

    /// Client configured from the environment / rc files of `archive`.
    pub fn from_env(archive: Archive, opts: ClientOptions) -> Result<Self> {
        Self::new(archive, Credentials::load(archive)?, opts)
    }

    fn poll_interval(&self) -> Duration {
        self.opts.poll_interval.unwrap_or(match self.archive {
            Archive::Cds => Duration::from_secs(5),
            Archive::Mars => Duration::from_secs(10),
        })
    }

    fn with_cds_auth(&self, req: HttpRequest) -> HttpRequest {
        let (user, pass) = self.credentials.basic_auth();
        req.basic_auth(user, pass)
    }

    fn with_mars_auth(&self, req: HttpRequest) -> Result<HttpRequest> {
        let email = self
            .credentials
            .email
            .as_deref()
            .ok_or_else(|| Error::Credentials("ECMWF Web API requires an email".into()))?;
        Ok(req
            .header("From", email)
            .header("X-ECMWF-KEY", &self.credentials.key)
            .header(ACCEPT, "application/json"))
    }

    fn retrieve_cds(&self, dataset: &str, payload: &Payload, target: &Path) -> Result<Retrieved> {
        let base = &self.credentials.url;
        let url = cds_resource_url(base, dataset);
        debug!(%url, "submitting cds request");

        let mut reply: CdsReply = self
            .with_cds_auth(self.http.post(&url))
            .json(payload)
            .send()?
            .error_for_status()?
            .json()?;

        let request_id = reply.request_id.clone();
        loop {
            match reply.state.as_str() {
                "completed" => break,
                "queued" | "running" => {
                    let id = request_id.as_deref().ok_or_else(|| Error::Remote {
                        reason: "reply without request_id".into(),
                    })?;
                    debug!(state = %reply.state, request_id = id, "waiting for cds task");
                    thread::sleep(self.poll_interval());
                    reply = self
                        .with_cds_auth(self.http.get(cds_task_url(base, id)))
                        .send()?
                        .error_for_status()?
                        .json()?;
                }
                "failed" => {
                    return Err(Error::Remote {
                        reason: reply
                            .error
                            .as_ref()
                            .map(RemoteError::describe)
                            .unwrap_or_else(|| "request failed".to_string()),
                    });
                }
                other => {
                    return Err(Error::Remote {
                        reason: format!("unexpected task state: {other}"),
                    });
                }
            }
        }

        let location = reply.location.as_deref().ok_or_else(|| Error::Remote {
            reason: "completed task without location".into(),
        })?;
        let size_bytes = self.download(&resolve(base, location)?, target)?;

        if self.opts.cleanup {
            if let Some(id) = request_id.as_deref() {
                let res = self
                    .with_cds_auth(self.http.delete(cds_task_url(base, id)))
                    .send()
                    .and_then(|r| r.error_for_status());
                if let Err(e) = res {
                    warn!(request_id = id, "could not delete cds task: {e}");
                }
            }
        }

        Ok(Retrieved {
            target: target.to_path_buf(),
            size_bytes,
        })
    }

    fn retrieve_mars(&self, payload: &Payload, target: &Path) -> Result<Retrieved> {
        let base = &self.credentials.url;
        let url = mars_request_url(base);
        debug!(%url, "submitting mars request");

        let resp = self
            .with_mars_auth(self.http.post(&url))?
            .json(payload)
            .send()?
            .error_for_status()?;
        let task_location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let mut reply: MarsReply = resp.json()?;

        let task = match task_location.or_else(|| reply.href.clone()) {
            Some(loc) => resolve(base, &loc)?,
            None => {
                return Err(Error::Remote {
                    reason: "reply without task location".into(),
                });
            }
        };

        loop {
            match reply.status.as_str() {
                "complete" => break,
                "queued" | "submitted" | "active" => {
                    debug!(status = %reply.status, %task, "waiting for mars task");
                    thread::sleep(self.poll_interval());
                    reply = self
                        .with_mars_auth(self.http.get(&task))?
                        .send()?
                        .error_for_status()?
                        .json()?;
                }
                "aborted" => {
                    return Err(Error::Remote {
                        reason: reply.reason.unwrap_or_else(|| "request aborted".to_string()),
                    });
                }
                other => {
                    return Err(Error::Remote {
                        reason: format!("unexpected task status: {other}"),
                    });
                }
            }
        }

        let href = reply.href.as_deref().ok_or_else(|| Error::Remote {
            reason: "completed task without href".into(),
        })?;
        let size_bytes = self.download(&resolve(base, href)?, target)?;

        if self.opts.cleanup {
            let res = self
                .with_mars_auth(self.http.delete(&task))?
                .send()
                .and_then(|r| r.error_for_status());
            if let Err(e) = res {
                warn!(%task, "could not delete mars task: {e}");
            }
        }

        Ok(Retrieved {
            target: target.to_path_buf(),
            size_bytes,
        })
    }

    fn download(&self, url: &str, target: &Path) -> Result<u64> {
        let mut resp = self.http.get(url).send()?.error_for_status()?;
        write_via_part(target, |file| Ok(resp.copy_to(file)?))
    }
}

/// `<target>.part`, the name a file is written under until it is complete.
fn part_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

/// Run `write` against `<target>.part` and move it onto `target` only once it
/// succeeded. A failed transfer leaves neither file behind.
fn write_via_part(target: &Path, write: impl FnOnce(&mut File) -> Result<u64>) -> Result<u64> {
    let part = part_path(target);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&part)?;

    let written = write(&mut file).and_then(|n| {
        file.sync_all()?;
        Ok(n)
    });
    drop(file);

    match written {
        Ok(n) => {
            fs::rename(&part, target)?;
            Ok(n)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&part) {
                warn!(path = %part.display(), "could not remove partial download: {rm}");
            }
            Err(e)
        }
    }
}

impl Retrieve for ApiClient {
    fn retrieve(&self, dataset: &str, payload: &Payload, target: &Path) -> Result<Retrieved> {
        match self.archive {
            Archive::Cds => self.retrieve_cds(dataset, payload, target),
            Archive::Mars => self.retrieve_mars(payload, target),
        }
    }
}

/// Logs every request instead of contacting an archive.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl Retrieve for DryRun {
    fn retrieve(&self, dataset: &str, payload: &Payload, target: &Path) -> Result<Retrieved> {
        info!(dataset, target = %target.display(), payload = %payload.to_json()?, "dry run");
        Ok(Retrieved {
            target: target.to_path_buf(),
            size_bytes: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn decodes_cds_replies() {
        let r: CdsReply = serde_json::from_str(
            r#"{"state": "queued", "request_id": "abc", "sleep": 1}"#,
        )
        .unwrap();
        assert_eq!(r.state, "queued");
        assert_eq!(r.request_id.as_deref(), Some("abc"));

        let r: CdsReply = serde_json::from_str(
            r#"{"state": "failed", "request_id": "abc",
                "error": {"message": "the request you have submitted is not valid", "reason": "unknown variable"}}"#,
        )
        .unwrap();
        assert_eq!(
            r.error.unwrap().describe(),
            "the request you have submitted is not valid: unknown variable"
        );
    }

    #[test]
    fn decodes_mars_replies() {
        let r: MarsReply = serde_json::from_str(
            r#"{"status": "complete", "href": "https://api.ecmwf.int/v1/download/x.nc", "size": 10}"#,
        )
        .unwrap();
        assert_eq!(r.status, "complete");
        assert!(r.href.unwrap().ends_with("x.nc"));
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let creds = Credentials {
            url: "ftp://example".into(),
            key: "1:k".into(),
            email: None,
        };
        let err = ApiClient::new(Archive::Cds, creds, ClientOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }

    #[test]
    fn poll_interval_defaults_per_archive() {
        let creds = Credentials {
            url: "https://api.ecmwf.int/v1".into(),
            key: "k".into(),
            email: Some("me@example.org".into()),
        };
        let c = ApiClient::new(Archive::Mars, creds, ClientOptions::default()).unwrap();
        assert_eq!(c.poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn completed_download_replaces_target() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("GFASv1.2_2003_01_CO.nc");
        let n = write_via_part(&target, |f| {
            f.write_all(b"CDF\x01")?;
            Ok(4)
        })
        .unwrap();
        assert_eq!(n, 4);
        assert_eq!(fs::read(&target).unwrap(), b"CDF\x01");
        assert!(!part_path(&target).exists());
    }

    #[test]
    fn interrupted_download_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("GFASv1.2_2003_01_CO.nc");
        let err = write_via_part(&target, |f| {
            f.write_all(b"CDF")?;
            Err(Error::Remote {
                reason: "connection reset".into(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, Error::Remote { .. }));
        assert!(!target.exists());
        assert!(!part_path(&target).exists());
    }

    #[test]
    fn part_file_sits_next_to_target() {
        let target = Path::new("/data/2003/GFASv1.2_2003_01_CO.nc");
        assert_eq!(part_path(target), Path::new("/data/2003/GFASv1.2_2003_01_CO.nc.part"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("x.nc");
        let r = DryRun
            .retrieve("cams_gfas", &Payload::new().param("81.210"), &target)
            .unwrap();
        assert_eq!(r.size_bytes, 0);
        assert!(!target.exists());
    }
}
