//! Origin identity

use url::Url;

use crate::error::SessionError;
use crate::Result;

/// Derive the storage grouping key for a page URL.
///
/// The URL must be absolute. URLs without a host (`about:blank`,
/// `file:///...`) group under the empty hostname.
pub fn hostname_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| SessionError::InvalidUrl(format!("{url}: {e}")))?;
    Ok(parsed.host_str().unwrap_or_default().to_string())
}
