use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Failure while compiling a diagram description into an image.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("write diagram source to {tool}: {source}")]
    Write {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("wait for {tool}: {source}")]
    Wait {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("{tool} failed ({status}): {stderr}")]
    Render {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{tool} produced non-UTF-8 output: {source}")]
    Output {
        tool: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("{tool} produced no output")]
    EmptyOutput { tool: String },

    #[error("serialize diagram: {0}")]
    Serialize(#[from] serde_json::Error),
}
