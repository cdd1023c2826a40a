use url::Url;

use crate::error::Result;

pub const CDS_RESOURCE_PATTERN: &str = "{url}/resources/{dataset}";
pub const CDS_TASK_PATTERN: &str = "{url}/tasks/{id}";
pub const MARS_REQUEST_PATTERN: &str = "{url}/services/mars/requests";

pub fn format_url(pattern: &str, base_url: &str, dataset: Option<&str>, id: Option<&str>) -> String {
    let mut url = pattern.replace("{url}", base_url.trim_end_matches('/'));

    if let Some(dataset) = dataset {
        url = url.replace("{dataset}", dataset);
    }
    if let Some(id) = id {
        url = url.replace("{id}", id);
    }

    url
}

pub fn cds_resource_url(base_url: &str, dataset: &str) -> String {
    format_url(CDS_RESOURCE_PATTERN, base_url, Some(dataset), None)
}

pub fn cds_task_url(base_url: &str, request_id: &str) -> String {
    format_url(CDS_TASK_PATTERN, base_url, None, Some(request_id))
}

pub fn mars_request_url(base_url: &str) -> String {
    format_url(MARS_REQUEST_PATTERN, base_url, None, None)
}

/// Resolve a `location`/`href` returned by an archive, which may be relative
/// to the endpoint.
pub fn resolve(base_url: &str, location: &str) -> Result<String> {
    if crate::archive::is_http_url(location) {
        return Ok(location.to_string());
    }
    let mut base = base_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(Url::parse(&base)?.join(location)?.to_string())
}
