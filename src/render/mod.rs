use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::{Command as StdCommand, ExitStatus};

use serde::Deserialize;
use strum_macros::Display;
use thiserror::Error;

use crate::tracker::{OverlayPaths, TrackingSession};

pub const MARKER_FONT: &str = "/usr/share/xplanet/fonts/FreeMonoBold.ttf";
pub const GLOBAL_CONFIG: &str = "/usr/share/xplanet/config/default";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("renderer exited with {0}")]
    Failed(ExitStatus),
}

/// External globe renderer the overlay files are prepared for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Renderer {
    #[default]
    Xplanet,
    Xearth,
}

impl Renderer {
    pub fn supports_color(&self) -> bool {
        matches!(self, Renderer::Xplanet)
    }

    pub fn uses_config(&self) -> bool {
        matches!(self, Renderer::Xplanet)
    }
}

/// Writes the xplanet config pointing at the overlay files, followed by the
/// system-wide default config when there is one.
pub fn write_config(paths: &OverlayPaths, global_config: &Path) -> Result<(), RenderError> {
    let mut out = BufWriter::new(File::create(&paths.renderer_config)?);
    writeln!(out, "## earthtrack parameters, regenerated on every start")?;
    writeln!(out)?;
    writeln!(out, "marker_file={}", paths.markers.display())?;
    writeln!(out, "arc_file={}", paths.footprints.display())?;
    writeln!(out, "marker_font={}", MARKER_FONT)?;
    writeln!(out)?;

    match fs::read_to_string(global_config) {
        Ok(defaults) => {
            writeln!(out, "## {} follows:", global_config.display())?;
            out.write_all(defaults.as_bytes())?;
        }
        Err(e) => log::warn!(
            "Failed to read renderer defaults {}: {}",
            global_config.display(),
            e
        ),
    }

    out.flush()?;
    Ok(())
}

/// Shell command line for one renderer run over the current overlay.
pub fn command_line(
    renderer: Renderer,
    session: &TrackingSession,
    paths: &OverlayPaths,
    extra: &str,
) -> String {
    let mut cmd = match renderer {
        Renderer::Xplanet => {
            let radius = if session.circle_drawn {
                format!(" -radius {}", session.circle_radius)
            } else {
                String::new()
            };
            format!(
                "xplanet -config \"{}\" -projection orth -latitude {:.6} -longitude {:.6}{} -num_times 1 -starfreq 0.005",
                paths.renderer_config.display(),
                session.map_center_latitude,
                session.map_center_longitude,
                radius
            )
        }
        Renderer::Xearth => format!(
            "xearth -proj orth -grid -night 30 -bigstars 40 -markerfile {} -pos \"fixed {:.6} {:.6}\" -once",
            paths.markers.display(),
            session.map_center_latitude,
            session.map_center_longitude
        ),
    };

    let extra = extra.trim();
    if !extra.is_empty() {
        cmd.push(' ');
        cmd.push_str(extra);
    }
    cmd
}

/// Runs the renderer to completion.
pub fn invoke(cmd: &str) -> Result<(), RenderError> {
    log::info!("Running renderer: {}", cmd);
    let status = StdCommand::new("sh").arg("-c").arg(cmd).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(RenderError::Failed(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::UpdateInterval;

    fn session(circle_drawn: bool) -> TrackingSession {
        let mut session = TrackingSession::new(None, true, UpdateInterval::default());
        session.map_center_latitude = 40.0;
        session.map_center_longitude = 80.0;
        session.circle_radius = 159;
        session.circle_drawn = circle_drawn;
        session
    }

    fn paths() -> OverlayPaths {
        OverlayPaths::in_dir(Path::new("/home/op"))
    }

    #[test]
    fn xplanet_radius_only_with_circle() {
        let with = command_line(Renderer::Xplanet, &session(true), &paths(), "");
        assert_eq!(
            with,
            "xplanet -config \"/home/op/.xplanetconfig\" -projection orth -latitude 40.000000 -longitude 80.000000 -radius 159 -num_times 1 -starfreq 0.005"
        );

        let without = command_line(Renderer::Xplanet, &session(false), &paths(), "-window");
        assert!(!without.contains("-radius"));
        assert!(without.ends_with("-starfreq 0.005 -window"));
    }

    #[test]
    fn xearth_reads_marker_file() {
        let cmd = command_line(Renderer::Xearth, &session(true), &paths(), "");
        assert_eq!(
            cmd,
            "xearth -proj orth -grid -night 30 -bigstars 40 -markerfile /home/op/.markerfile -pos \"fixed 40.000000 80.000000\" -once"
        );
    }

    #[test]
    fn only_xplanet_gets_color() {
        assert!(Renderer::Xplanet.supports_color());
        assert!(!Renderer::Xearth.supports_color());
        assert_eq!(Renderer::Xearth.to_string(), "xearth");
    }

    #[test]
    fn config_names_overlay_files_and_appends_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OverlayPaths::in_dir(dir.path());
        let defaults = dir.path().join("default");
        fs::write(&defaults, "[default]\nmarker_color=red\n").unwrap();

        write_config(&paths, &defaults).unwrap();

        let text = fs::read_to_string(&paths.renderer_config).unwrap();
        assert!(text.contains(&format!("marker_file={}", paths.markers.display())));
        assert!(text.contains(&format!("arc_file={}", paths.footprints.display())));
        assert!(text.ends_with("[default]\nmarker_color=red\n"));
    }

    #[test]
    fn missing_defaults_still_write_header() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OverlayPaths::in_dir(dir.path());
        write_config(&paths, &dir.path().join("nope")).unwrap();
        assert!(fs::read_to_string(&paths.renderer_config)
            .unwrap()
            .contains("marker_font="));
    }

    #[test]
    fn failing_renderer_reports_status() {
        assert!(invoke("true").is_ok());
        assert!(matches!(invoke("exit 3"), Err(RenderError::Failed(_))));
    }
}
