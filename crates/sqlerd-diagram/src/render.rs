//! Compiles a diagram description into an SVG image with an external layout
//! engine (`dot` or `d2`), feeding the source on stdin and reading the image
//! from stdout.

use crate::d2::render_d2;
use crate::dot::render_dot;
use crate::error::DiagramError;
use crate::model::Diagram;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

pub const SQLERD_DOT_BIN_ENV: &str = "SQLERD_DOT_BIN";
pub const SQLERD_D2_BIN_ENV: &str = "SQLERD_D2_BIN";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Dot,
    D2,
}

impl Engine {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dot" | "graphviz" => Ok(Self::Dot),
            "d2" => Ok(Self::D2),
            other => Err(format!("unknown engine `{other}` (expected dot|d2)")),
        }
    }

    fn default_bin(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::D2 => "d2",
        }
    }

    fn bin_env(self) -> &'static str {
        match self {
            Self::Dot => SQLERD_DOT_BIN_ENV,
            Self::D2 => SQLERD_D2_BIN_ENV,
        }
    }

    fn args(self) -> &'static [&'static str] {
        match self {
            Self::Dot => &["-Tsvg"],
            // Read the script from stdin, write the SVG to stdout.
            Self::D2 => &["-", "-"],
        }
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_bin())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub engine: Engine,
    pub theme: Theme,
    /// Kill the renderer after this long; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Overrides the renderer binary resolved by [`resolve_renderer_bin`].
    pub renderer_bin: Option<PathBuf>,
}

/// Diagram description in the engine's input language.
pub fn compile_source(diagram: &Diagram, engine: Engine, theme: Theme) -> String {
    match engine {
        Engine::Dot => render_dot(diagram, theme),
        Engine::D2 => render_d2(diagram, theme),
    }
}

/// The diagram description itself, for custom frontends.
pub fn render_json(diagram: &Diagram) -> Result<String, DiagramError> {
    Ok(serde_json::to_string_pretty(diagram)?)
}

/// Renderer binary for `engine`.
///
/// Precedence:
/// 1) env var `SQLERD_DOT_BIN` / `SQLERD_D2_BIN`
/// 2) `dot` / `d2` on `PATH`
pub fn resolve_renderer_bin(engine: Engine) -> PathBuf {
    if let Ok(p) = std::env::var(engine.bin_env()) {
        let p = p.trim();
        if !p.is_empty() {
            return PathBuf::from(p);
        }
    }
    PathBuf::from(engine.default_bin())
}

/// Compile `diagram` and render it to SVG bytes.
pub fn render_image(diagram: &Diagram, options: &RenderOptions) -> Result<Vec<u8>, DiagramError> {
    let source = compile_source(diagram, options.engine, options.theme);
    let bin = options
        .renderer_bin
        .clone()
        .unwrap_or_else(|| resolve_renderer_bin(options.engine));
    tracing::debug!(
        renderer = %bin.display(),
        engine = %options.engine,
        bytes = source.len(),
        "rendering diagram"
    );

    run_renderer(bin, options.engine.args(), source.into_bytes(), options.timeout)
}

fn run_renderer(
    bin: PathBuf,
    args: &[&str],
    input: Vec<u8>,
    timeout: Option<Duration>,
) -> Result<Vec<u8>, DiagramError> {
    let tool = bin.display().to_string();

    let mut child = Command::new(&bin)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| DiagramError::Spawn {
            tool: tool.clone(),
            source,
        })?;

    // stdin, stdout and stderr are drained on their own threads so a large
    // image cannot fill a pipe while we wait.
    let writer = child.stdin.take().map(|mut stdin| {
        thread::spawn(move || -> std::io::Result<()> {
            stdin.write_all(&input)?;
            stdin.flush()
        })
    });
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = wait_with_timeout(&mut child, timeout, &tool)?;

    let stdout = join_reader(stdout_reader).map_err(|source| DiagramError::Wait {
        tool: tool.clone(),
        source,
    })?;
    // stderr only feeds the error message, so a failed read leaves it empty.
    let stderr = join_reader(stderr_reader).unwrap_or_default();

    if !status.success() {
        return Err(DiagramError::Render {
            tool,
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(source)) => return Err(DiagramError::Write { tool, source }),
            Err(_) => {
                return Err(DiagramError::Write {
                    tool,
                    source: std::io::Error::other("stdin writer panicked"),
                })
            }
        }
    }

    if stdout.is_empty() {
        return Err(DiagramError::EmptyOutput { tool });
    }
    if let Err(source) = std::str::from_utf8(&stdout) {
        return Err(DiagramError::Output { tool, source });
    }
    Ok(stdout)
}

type ReaderHandle = thread::JoinHandle<std::io::Result<Vec<u8>>>;

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> ReaderHandle {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join_reader(handle: Option<ReaderHandle>) -> std::io::Result<Vec<u8>> {
    match handle {
        None => Ok(Vec::new()),
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("pipe reader panicked"))),
    }
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
    tool: &str,
) -> Result<ExitStatus, DiagramError> {
    let wait_err = |source: std::io::Error| DiagramError::Wait {
        tool: tool.to_string(),
        source,
    };

    let Some(timeout) = timeout else {
        return child.wait().map_err(wait_err);
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().map_err(wait_err)? {
            return Ok(status);
        }

        if start.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(DiagramError::Timeout {
                tool: tool.to_string(),
                secs: timeout.as_secs(),
            });
        }

        thread::sleep(Duration::from_millis(20));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engines() {
        assert_eq!(Engine::parse("dot"), Ok(Engine::Dot));
        assert_eq!(Engine::parse("Graphviz"), Ok(Engine::Dot));
        assert_eq!(Engine::parse("d2"), Ok(Engine::D2));
        assert!(Engine::parse("mermaid").is_err());
    }

    #[test]
    fn compile_source_dispatches_by_engine() {
        let diagram = Diagram::default();
        assert!(compile_source(&diagram, Engine::Dot, Theme::Light).starts_with("digraph"));
        assert!(compile_source(&diagram, Engine::D2, Theme::Light).starts_with("vars:"));
    }

    #[test]
    fn json_uses_kebab_case_markers() {
        let diagram = Diagram {
            nodes: vec![],
            edges: vec![crate::model::RelationEdge {
                from_table: "b".to_string(),
                to_table: "a".to_string(),
                label: "a_id".to_string(),
                source_arrowhead: sqlerd_ingest_sql::Cardinality::ZeroOrMore,
                target_arrowhead: sqlerd_ingest_sql::Cardinality::ExactlyOne,
            }],
        };
        let json = render_json(&diagram).expect("json");
        assert!(json.contains("\"source_arrowhead\": \"zero-or-more\""), "{json}");
        assert!(json.contains("\"target_arrowhead\": \"exactly-one\""), "{json}");
    }

    #[test]
    fn missing_renderer_is_a_spawn_error() {
        let options = RenderOptions {
            renderer_bin: Some(PathBuf::from("/nonexistent/sqlerd-renderer")),
            ..RenderOptions::default()
        };
        let err = render_image(&Diagram::default(), &options).expect_err("should fail");
        assert!(matches!(err, DiagramError::Spawn { .. }), "err={err}");
    }

    #[test]
    fn failed_stdout_read_is_a_wait_error() {
        let handle: ReaderHandle = thread::spawn(|| {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
        });
        let err = join_reader(Some(handle)).expect_err("read should fail");
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
        assert!(join_reader(None).expect("no pipe").is_empty());
    }

    /// Writes an executable `/bin/sh` script standing in for a renderer.
    #[cfg(unix)]
    fn fake_renderer(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("renderer.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        let mut perms = std::fs::metadata(&path).expect("stat script").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod script");
        path
    }

    #[cfg(unix)]
    fn sample_diagram() -> Diagram {
        Diagram {
            nodes: vec![crate::model::TableNode {
                name: "users".to_string(),
                fields: vec![crate::model::Field {
                    name: "id".to_string(),
                    data_type: "INT".to_string(),
                    constraint: Some("PK".to_string()),
                }],
            }],
            edges: vec![],
        }
    }

    #[cfg(unix)]
    #[test]
    fn renderer_stdout_is_returned_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let diagram = sample_diagram();
        let options = RenderOptions {
            renderer_bin: Some(fake_renderer(&dir, "exec cat")),
            ..RenderOptions::default()
        };

        let image = render_image(&diagram, &options).expect("render");
        assert_eq!(
            image,
            compile_source(&diagram, options.engine, options.theme).into_bytes()
        );
    }

    #[cfg(unix)]
    #[test]
    fn slow_renderer_is_killed_at_timeout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = RenderOptions {
            timeout: Some(Duration::from_secs(1)),
            renderer_bin: Some(fake_renderer(&dir, "exec sleep 5")),
            ..RenderOptions::default()
        };

        let start = Instant::now();
        let err = render_image(&sample_diagram(), &options).expect_err("should time out");
        assert!(
            matches!(err, DiagramError::Timeout { secs: 1, .. }),
            "err={err}"
        );
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_renderer_output_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = RenderOptions {
            renderer_bin: Some(fake_renderer(&dir, "cat >/dev/null\nprintf '\\377\\376'")),
            ..RenderOptions::default()
        };

        let err = render_image(&sample_diagram(), &options).expect_err("should fail");
        assert!(matches!(err, DiagramError::Output { .. }), "err={err}");
    }

    #[cfg(unix)]
    #[test]
    fn failing_renderer_reports_status() {
        let options = RenderOptions {
            renderer_bin: Some(PathBuf::from("false")),
            ..RenderOptions::default()
        };
        let err = render_image(&Diagram::default(), &options).expect_err("should fail");
        assert!(matches!(err, DiagramError::Render { .. }), "err={err}");
    }
}
