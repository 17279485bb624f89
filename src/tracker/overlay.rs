use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::geo::{range_circle, RangeCircleVertex};
use crate::predict::{GroundStation, MarkerColor, SatelliteObservation};

/// A labelled point for the renderer's marker file.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub color: Option<MarkerColor>,
}

impl Marker {
    pub fn station(station: &GroundStation) -> Self {
        Self {
            latitude: station.latitude_deg,
            longitude: station.longitude_deg,
            label: station.callsign.clone(),
            color: None,
        }
    }

    pub fn satellite(sat: &SatelliteObservation) -> Self {
        Self {
            latitude: sat.sub_latitude_deg,
            longitude: sat.sub_longitude_deg,
            label: sat.name.clone(),
            color: sat.visibility.color(),
        }
    }

    fn line(&self, colored: bool) -> String {
        let line = format!(
            "{:8.3} {:8.3} \"{}\"",
            self.latitude, self.longitude, self.label
        );
        with_color(line, self.color, colored)
    }
}

/// Range circle of one satellite.
#[derive(Debug, Clone)]
pub struct Footprint {
    pub name: String,
    pub vertices: Vec<RangeCircleVertex>,
}

impl Footprint {
    pub fn of(sat: &SatelliteObservation) -> Self {
        Self {
            name: sat.name.clone(),
            vertices: range_circle(
                sat.sub_latitude_deg,
                sat.sub_longitude_west_deg,
                sat.footprint_km,
                &sat.visibility,
            )
            .collect(),
        }
    }
}

/// Markers and footprints produced by one poll cycle.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub markers: Vec<Marker>,
    pub footprints: Vec<Footprint>,
}

impl Overlay {
    pub fn new(station: Marker) -> Self {
        Self {
            markers: vec![station],
            footprints: Vec::new(),
        }
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn add_footprint(&mut self, footprint: Footprint) {
        self.footprints.push(footprint);
    }

    pub fn has_footprints(&self) -> bool {
        !self.footprints.is_empty()
    }

    pub fn write_markers<W: Write>(&self, out: &mut W, colored: bool) -> io::Result<()> {
        for marker in &self.markers {
            writeln!(out, "{}", marker.line(colored))?;
        }
        Ok(())
    }

    pub fn write_footprints<W: Write>(&self, out: &mut W, colored: bool) -> io::Result<()> {
        for footprint in &self.footprints {
            for vertex in &footprint.vertices {
                writeln!(out, "{}", vertex_line(vertex, colored))?;
            }
        }
        Ok(())
    }
}

/// Footprint file line for one vertex.
pub fn vertex_line(vertex: &RangeCircleVertex, colored: bool) -> String {
    let line = format!("{:8.3} {:8.3}", vertex.latitude, vertex.longitude);
    with_color(line, vertex.color, colored)
}

fn with_color(line: String, color: Option<MarkerColor>, colored: bool) -> String {
    match color {
        Some(color) if colored => format!("{} {}", line, color),
        _ => line,
    }
}

/// Where overlay artifacts live between renderer runs.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPaths {
    pub markers: PathBuf,
    pub footprints: PathBuf,
    pub renderer_config: PathBuf,
}

impl OverlayPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            markers: dir.join(".markerfile"),
            footprints: dir.join(".greatarcfile"),
            renderer_config: dir.join(".xplanetconfig"),
        }
    }
}

impl fmt::Display for OverlayPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "markers={} footprints={} config={}",
            self.markers.display(),
            self.footprints.display(),
            self.renderer_config.display()
        )
    }
}

/// Owns the overlay files; they are removed when this is dropped.
#[derive(Debug)]
pub struct OverlayFiles {
    paths: OverlayPaths,
}

impl OverlayFiles {
    pub fn new(paths: OverlayPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &OverlayPaths {
        &self.paths
    }

    /// Replaces both overlay files with the contents of `overlay`.
    pub fn write(&self, overlay: &Overlay, colored: bool) -> io::Result<()> {
        let mut markers = BufWriter::new(File::create(&self.paths.markers)?);
        overlay.write_markers(&mut markers, colored)?;
        markers.flush()?;

        let mut footprints = BufWriter::new(File::create(&self.paths.footprints)?);
        overlay.write_footprints(&mut footprints, colored)?;
        footprints.flush()?;

        log::debug!(
            "wrote {} markers, {} footprints",
            overlay.markers.len(),
            overlay.footprints.len()
        );
        Ok(())
    }
}

impl Drop for OverlayFiles {
    fn drop(&mut self) {
        for path in [
            &self.paths.markers,
            &self.paths.footprints,
            &self.paths.renderer_config,
        ] {
            match fs::remove_file(path) {
                Ok(()) => log::debug!("removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::Visibility;

    fn station() -> GroundStation {
        GroundStation {
            callsign: "W1AW".into(),
            latitude_deg: 41.714,
            longitude_deg: -72.727,
        }
    }

    fn satellite(visibility: Visibility) -> SatelliteObservation {
        SatelliteObservation {
            name: "ISS".into(),
            sub_longitude_west_deg: 100.0,
            sub_longitude_deg: -100.0,
            sub_latitude_deg: 10.0,
            azimuth_deg: 45.0,
            elevation_deg: 30.0,
            next_event_time: 0,
            footprint_km: 4000.0,
            slant_range_km: 500.0,
            altitude_km: 400.0,
            velocity_km_s: 7.6,
            orbit_number: 1,
            visibility,
            trailer: String::new(),
        }
    }

    fn render(overlay: &Overlay, colored: bool) -> (String, String) {
        let mut markers = Vec::new();
        let mut footprints = Vec::new();
        overlay.write_markers(&mut markers, colored).unwrap();
        overlay.write_footprints(&mut footprints, colored).unwrap();
        (
            String::from_utf8(markers).unwrap(),
            String::from_utf8(footprints).unwrap(),
        )
    }

    #[test]
    fn marker_lines_follow_renderer_format() {
        let sat = satellite(Visibility::Visible);
        let mut overlay = Overlay::new(Marker::station(&station()));
        overlay.add_marker(Marker::satellite(&sat));

        let (markers, _) = render(&overlay, true);
        assert_eq!(
            markers,
            "  41.714  -72.727 \"W1AW\"\n  10.000 -100.000 \"ISS\" color=yellow\n"
        );

        let (plain, _) = render(&overlay, false);
        assert!(!plain.contains("color="));
    }

    #[test]
    fn footprint_lines_color_every_other_vertex() {
        let sat = satellite(Visibility::Daylight);
        let mut overlay = Overlay::new(Marker::station(&station()));
        overlay.add_footprint(Footprint::of(&sat));

        let (_, footprints) = render(&overlay, true);
        let lines: Vec<_> = footprints.lines().collect();
        assert_eq!(lines.len(), 360);
        assert!(!lines[0].contains("color="));
        assert!(lines[1].ends_with(" color=white"));
        assert_eq!(lines.iter().filter(|l| l.contains("color=")).count(), 180);
    }

    #[test]
    fn files_are_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OverlayPaths::in_dir(dir.path());
        let overlay = Overlay::new(Marker::station(&station()));

        {
            let files = OverlayFiles::new(paths.clone());
            fs::write(&paths.renderer_config, "marker_file=x\n").unwrap();
            files.write(&overlay, true).unwrap();
            assert!(paths.markers.exists());
            assert!(paths.footprints.exists());
        }

        assert!(!paths.markers.exists());
        assert!(!paths.footprints.exists());
        assert!(!paths.renderer_config.exists());
    }

    #[test]
    fn files_are_removed_when_a_cycle_errors() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OverlayPaths::in_dir(dir.path());

        let result: io::Result<()> = (|| {
            let files = OverlayFiles::new(paths.clone());
            files.write(&Overlay::new(Marker::station(&station())), false)?;
            Err(io::Error::other("cycle failed"))
        })();

        assert!(result.is_err());
        assert!(!paths.markers.exists());
    }
}
