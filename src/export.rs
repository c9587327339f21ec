//! Export collaborators around the routing engine.
//!
//! - Instruction tables: CSV with segment length, angle, progress and a
//!   thread-length summary, or a plain-text step list.
//! - Nail-scheme PNG: circle outline, numbered-milestone nail marks, start
//!   marker, for printing and manual nail placement.
//! - Simulation PNG: alpha-accumulated thread strokes over a paper-white
//!   canvas, previewing the finished piece.
//!
//! Everything here consumes the route report read-only; unit conversion to
//! physical measurements happens in this layer, not in the engine.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::field::Field;
use crate::layout::CircleLayout;
use crate::raster::chord_pixels;
use crate::types::RouteReport;

const PAPER: Rgb<u8> = Rgb([252, 250, 245]);
const THREAD: Rgb<u8> = Rgb([25, 25, 25]);
const INK: Rgb<u8> = Rgb([15, 15, 15]);
const MARKER: Rgb<u8> = Rgb([200, 0, 0]);

/// Physical scale for converting pixel lengths to millimetres.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PhysicalScale {
    pub mm_per_px: f32,
}

impl PhysicalScale {
    /// Scale derived from the physical circle diameter and its pixel radius.
    pub fn from_circle(circle_diameter_mm: f32, radius_px: f32) -> Self {
        Self {
            mm_per_px: circle_diameter_mm / (radius_px * 2.0),
        }
    }
}

impl Default for PhysicalScale {
    /// A 227 mm working circle mapped onto the default 800 px space.
    fn default() -> Self {
        Self::from_circle(227.0, 400.0)
    }
}

/// Total thread consumption for the route, in millimetres.
pub fn total_thread_length_mm(
    report: &RouteReport,
    layout: &CircleLayout,
    scale: PhysicalScale,
) -> f32 {
    report
        .steps
        .iter()
        .map(|s| (layout.nail(s.to) - layout.nail(s.from)).norm() * scale.mm_per_px)
        .sum()
}

/// Write the step table as CSV with a trailing summary block.
pub fn write_instructions_csv(
    path: &Path,
    report: &RouteReport,
    layout: &CircleLayout,
    scale: PhysicalScale,
) -> Result<(), RouteError> {
    let file = File::create(path).map_err(|e| RouteError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut out = BufWriter::new(file);
    let io_err = |e: std::io::Error| RouteError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    writeln!(
        out,
        "Step,From_Nail,To_Nail,Length_mm,Angle_deg,Progress_%,Section"
    )
    .map_err(io_err)?;

    let total_steps = report.steps.len();
    // Ten roughly equal sections make long routes easier to execute.
    let section_len = total_steps / 10 + 1;
    let mut total_length = 0.0f32;

    for record in &report.steps {
        let from = layout.nail(record.from);
        let to = layout.nail(record.to);
        let delta = to - from;
        let length_mm = delta.norm() * scale.mm_per_px;
        total_length += length_mm;

        let angle_deg = delta.y.atan2(delta.x).to_degrees().rem_euclid(360.0);
        let progress = record.step as f32 / total_steps as f32 * 100.0;
        let section = (record.step - 1) / section_len + 1;

        writeln!(
            out,
            "{},{},{},{:.1},{:.1},{:.1},{}",
            record.step, record.from, record.to, length_mm, angle_deg, progress, section
        )
        .map_err(io_err)?;
    }

    writeln!(out).map_err(io_err)?;
    writeln!(out, "SUMMARY,,,,,,").map_err(io_err)?;
    writeln!(out, "Total Steps,{total_steps},,,,,").map_err(io_err)?;
    writeln!(out, "Total Thread Length (mm),{total_length:.1},,,,,").map_err(io_err)?;
    writeln!(out, "Total Thread Length (m),{:.2},,,,,", total_length / 1000.0).map_err(io_err)?;
    writeln!(
        out,
        "Recommended Thread (m),{:.2},(+20% margin),,,,",
        total_length / 1000.0 * 1.2
    )
    .map_err(io_err)?;
    out.flush().map_err(io_err)
}

/// Write the step list as plain text.
pub fn write_instructions_txt(path: &Path, report: &RouteReport) -> Result<(), RouteError> {
    let file = File::create(path).map_err(|e| RouteError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut out = BufWriter::new(file);
    let io_err = |e: std::io::Error| RouteError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    writeln!(out, "STRING ART INSTRUCTIONS").map_err(io_err)?;
    writeln!(out, "{}", "=".repeat(50)).map_err(io_err)?;
    writeln!(out).map_err(io_err)?;
    for record in &report.steps {
        writeln!(
            out,
            "Step {:4}: nail {:3} -> nail {:3}",
            record.step, record.from, record.to
        )
        .map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}

/// Options for the printable nail scheme.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SchemeOptions {
    /// Every Nth nail gets a larger milestone mark.
    pub highlight_every: usize,
    /// Radius of a regular nail mark, in pixels.
    pub nail_radius: i32,
}

impl Default for SchemeOptions {
    fn default() -> Self {
        Self {
            highlight_every: 10,
            nail_radius: 3,
        }
    }
}

/// Render the nail placement scheme: circle outline, nail marks with
/// milestone highlighting, and a start marker on nail 0.
pub fn render_scheme(layout: &CircleLayout, options: &SchemeOptions) -> RgbImage {
    let (w, h) = layout.space();
    let mut img = RgbImage::from_pixel(w as u32, h as u32, PAPER);

    draw_circle_outline(&mut img, layout);

    let highlight = options.highlight_every.max(1);
    for (i, nail) in layout.nails().iter().enumerate() {
        let milestone = i % highlight == 0 && i > 0;
        let radius = if milestone {
            options.nail_radius + 2
        } else {
            options.nail_radius
        };
        let color = if milestone { MARKER } else { INK };
        fill_disc(&mut img, nail.x as i32, nail.y as i32, radius, color);
    }

    // Start marker over nail 0.
    let start = layout.nail(0);
    fill_disc(
        &mut img,
        start.x as i32,
        start.y as i32,
        options.nail_radius + 3,
        MARKER,
    );
    img
}

/// Options for the finished-piece preview.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Opacity contributed by one thread pass, in `(0, 1]`.
    pub stroke_alpha: f32,
    /// Stroke thickness in pixels (odd).
    pub thickness: u32,
    /// Radius of the nail marks, in pixels.
    pub nail_radius: i32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            stroke_alpha: 15.0 / 255.0,
            thickness: 3,
            nail_radius: 3,
        }
    }
}

/// Render a preview of the finished piece by alpha-accumulating every chord
/// of the route over a paper-white canvas.
pub fn render_simulation(
    report: &RouteReport,
    layout: &CircleLayout,
    options: &SimulationOptions,
) -> RgbImage {
    let (w, h) = layout.space();

    // Count thread passes per pixel, then composite once.
    let mut passes = Field::new(w, h);
    for record in &report.steps {
        let pixels = chord_pixels(
            layout.nail_px(record.from),
            layout.nail_px(record.to),
            options.thickness,
            w,
            h,
        );
        for &(x, y) in &pixels {
            let i = passes.idx(x as usize, y as usize);
            passes.data[i] += 1.0;
        }
    }

    let alpha = options.stroke_alpha.clamp(0.0, 1.0);
    let mut img = RgbImage::from_pixel(w as u32, h as u32, PAPER);
    for y in 0..h {
        for x in 0..w {
            let n = passes.get(x, y);
            if n > 0.0 {
                let a = 1.0 - (1.0 - alpha).powf(n);
                img.put_pixel(x as u32, y as u32, blend(PAPER, THREAD, a));
            }
        }
    }

    for nail in layout.nails() {
        fill_disc(&mut img, nail.x as i32, nail.y as i32, options.nail_radius, INK);
    }
    let start = layout.nail(0);
    fill_disc(
        &mut img,
        start.x as i32,
        start.y as i32,
        options.nail_radius + 2,
        MARKER,
    );
    img
}

fn blend(base: Rgb<u8>, over: Rgb<u8>, a: f32) -> Rgb<u8> {
    let mix = |b: u8, o: u8| (b as f32 * (1.0 - a) + o as f32 * a).round() as u8;
    Rgb([
        mix(base[0], over[0]),
        mix(base[1], over[1]),
        mix(base[2], over[2]),
    ])
}

fn draw_circle_outline(img: &mut RgbImage, layout: &CircleLayout) {
    // Sample the circumference densely enough that adjacent samples land on
    // neighbouring pixels.
    let center = layout.center();
    let radius = layout.radius();
    let samples = (radius * std::f32::consts::TAU).ceil().max(64.0) as usize;
    for i in 0..samples {
        let angle = i as f32 / samples as f32 * std::f32::consts::TAU;
        let x = (center.x + radius * angle.cos()) as i32;
        let y = (center.y + radius * angle.sin()) as i32;
        put_pixel_checked(img, x, y, INK);
    }
}

fn fill_disc(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_checked(img, cx + dx, cy + dy, color);
            }
        }
    }
}

#[inline]
fn put_pixel_checked(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutParams;
    use crate::types::{ResidualStats, RouteState, StepRecord, StopReason};
    use nalgebra::Point2;

    fn layout() -> CircleLayout {
        CircleLayout::generate(&LayoutParams {
            num_nails: 8,
            radius: 40.0,
            center: Point2::new(50.0, 50.0),
            space: (100, 100),
        })
        .unwrap()
    }

    fn report() -> RouteReport {
        let stats = ResidualStats { mean: 0.0, max: 0.0 };
        RouteReport {
            state: RouteState::StoppedByLimit,
            reason: StopReason::StepLimit,
            route: vec![0, 4, 1],
            steps: vec![
                StepRecord {
                    step: 1,
                    from: 0,
                    to: 4,
                    score: 0.5,
                },
                StepRecord {
                    step: 2,
                    from: 4,
                    to: 1,
                    score: 0.4,
                },
            ],
            residual_before: stats,
            residual_after: stats,
            elapsed_ms: 0.0,
            final_residual: None,
        }
    }

    #[test]
    fn csv_has_header_one_row_per_step_and_summary() {
        let dir = std::env::temp_dir().join("string_art_csv_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("instructions.csv");
        write_instructions_csv(&path, &report(), &layout(), PhysicalScale::default()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Step,From_Nail,To_Nail,Length_mm,Angle_deg,Progress_%,Section"
        );
        assert!(text.lines().any(|l| l.starts_with("1,0,4,")));
        assert!(text.lines().any(|l| l.starts_with("2,4,1,")));
        assert!(text.contains("Total Steps,2"));
        assert!(text.contains("Recommended Thread"));
    }

    #[test]
    fn thread_length_matches_chord_geometry() {
        let layout = layout();
        let scale = PhysicalScale { mm_per_px: 1.0 };
        let expected: f32 = report()
            .steps
            .iter()
            .map(|s| (layout.nail(s.to) - layout.nail(s.from)).norm())
            .sum();
        let total = total_thread_length_mm(&report(), &layout, scale);
        assert!((total - expected).abs() < 1e-4);
    }

    #[test]
    fn renders_cover_the_layout_space() {
        let scheme = render_scheme(&layout(), &SchemeOptions::default());
        assert_eq!((scheme.width(), scheme.height()), (100, 100));

        let sim = render_simulation(&report(), &layout(), &SimulationOptions::default());
        assert_eq!((sim.width(), sim.height()), (100, 100));
        // Thread accumulation must darken at least some canvas.
        assert!(sim.pixels().any(|p| p.0 != [252, 250, 245]));
    }
}
