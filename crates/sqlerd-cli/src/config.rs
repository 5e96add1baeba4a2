//! Environment-backed defaults for flags the user did not pass.

use anyhow::{anyhow, Result};
use std::time::Duration;

pub(crate) const SQLERD_RENDER_TIMEOUT_SECS_ENV: &str = "SQLERD_RENDER_TIMEOUT_SECS";
pub(crate) const SQLERD_LOG_ENV: &str = "SQLERD_LOG";

/// Resolve the renderer timeout.
///
/// Precedence:
/// 1) `--timeout-secs`
/// 2) env var `SQLERD_RENDER_TIMEOUT_SECS`
/// 3) no timeout
///
/// `0` disables the timeout.
pub(crate) fn render_timeout(flag: Option<u64>) -> Result<Option<Duration>> {
    let secs = match flag {
        Some(secs) => secs,
        None => match std::env::var(SQLERD_RENDER_TIMEOUT_SECS_ENV) {
            Ok(v) => {
                let v = v.trim();
                if v.is_empty() {
                    return Ok(None);
                }
                v.parse::<u64>().map_err(|_| {
                    anyhow!(
                        "invalid {SQLERD_RENDER_TIMEOUT_SECS_ENV}={v:?} (expected whole seconds)"
                    )
                })?
            }
            Err(std::env::VarError::NotPresent) => return Ok(None),
            Err(e) => {
                return Err(anyhow!(
                    "failed to read {SQLERD_RENDER_TIMEOUT_SECS_ENV}: {e}"
                ))
            }
        },
    };

    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
