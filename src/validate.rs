//! Syntactic checks on user supplied URLs and paths, run before any network work.

use std::path::PathBuf;

use url::Url;

use crate::error::{Error, Result};

/// Accepts `value` only when it is an absolute URL with both a scheme and a host.
pub fn url(value: &str) -> Result<Url> {
    let parsed = Url::parse(value)
        .map_err(|err| Error::invalid_input(value, format!("Expected valid url: {}", err)))?;

    if parsed.scheme().is_empty() || parsed.host_str().map_or(true, str::is_empty) {
        return Err(Error::invalid_input(value, "Expected valid url"));
    }

    Ok(parsed)
}

/// Accepts any string that can name a filesystem path. Empty is allowed and
/// means "not supplied"; whether the path exists is not checked here.
pub fn path(value: &str) -> Result<PathBuf> {
    if value.contains('\0') {
        return Err(Error::invalid_input(value, "Path contains a NUL byte"));
    }

    Ok(PathBuf::from(value))
}

pub fn url_parser(value: &str) -> std::result::Result<Url, String> {
    url(value).map_err(|err| err.to_string())
}

pub fn path_parser(value: &str) -> std::result::Result<PathBuf, String> {
    path(value).map_err(|err| err.to_string())
}
