use std::path::Path;

use reqwest::Url;

use crate::error::CoreError;

/// Basic-auth credentials sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Credentials {
    pub(super) user: String,
    pub(super) pass: String,
}

/// Pick credentials for the endpoint.
///
/// An explicit user/pass pair wins over the cookie file. Supplying only one
/// half of the pair is a configuration error rather than a silent fallback.
pub(super) fn resolve_auth(
    user: Option<&str>,
    pass: Option<&str>,
    cookie_file: Option<&Path>,
) -> Result<Option<Credentials>, CoreError> {
    match (user, pass) {
        (Some(user), Some(pass)) => {
            return Ok(Some(Credentials {
                user: user.to_owned(),
                pass: pass.to_owned(),
            }))
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(CoreError::Config(
                "rpc user and rpc pass must be set together".to_owned(),
            ));
        }
        (None, None) => {}
    }

    match cookie_file {
        Some(path) => read_cookie(path).map(Some),
        None => Ok(None),
    }
}

/// Read a node cookie file: a single `user:password` line.
fn read_cookie(path: &Path) -> Result<Credentials, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Config(format!("read rpc cookie file {}: {e}", path.display()))
    })?;
    let line = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| CoreError::Config(format!("rpc cookie file {} is empty", path.display())))?;

    match line.split_once(':') {
        Some((user, pass)) if !user.is_empty() && !pass.is_empty() => Ok(Credentials {
            user: user.to_owned(),
            pass: pass.to_owned(),
        }),
        _ => Err(CoreError::Config(format!(
            "rpc cookie file {} must contain non-empty `user:password`",
            path.display()
        ))),
    }
}

pub(super) fn parse_endpoint(url: &str) -> Result<Url, CoreError> {
    let parsed = Url::parse(url)
        .map_err(|e| CoreError::Config(format!("invalid rpc url `{url}`: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CoreError::Config(format!(
            "unsupported rpc url scheme `{other}`; expected http or https"
        ))),
    }
}
