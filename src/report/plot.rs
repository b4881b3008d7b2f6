use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use plotters::{
    coord::Shift,
    drawing::DrawingAreaErrorKind,
    prelude::*,
    style::{FontStyle, register_font},
};

use crate::{
    error::{Error, Result},
    management::TrackCollection,
    utils,
};

pub const PLOT_TITLE: &str = "Valence vs Danceability";
pub const X_LABEL: &str = "Danceability";
pub const Y_LABEL: &str = "Valence";
pub const PLOT_SIZE: (u32, u32) = (800, 600);

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans.ttf"
));

/// Registers the bundled font under [`FONT_FAMILY`]. Text layout needs it for
/// every backend, the bitmap backend also rasterizes with it.
fn ensure_font() -> std::result::Result<(), String> {
    static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
                .map_err(|_| "bundled font could not be loaded".to_string())
        })
        .clone()
}

fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[(f64, f64)],
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(PLOT_TITLE, (FONT_FAMILY, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, BLUE.mix(0.5).filled())),
    )?;

    root.present()
}

/// Renders danceability against valence as a scatter plot.
///
/// Each track with both features becomes one point, danceability on the x
/// axis and valence on the y axis, both on `0..1`.
///
/// # Arguments
///
/// * `tracks` - The collected tracks
/// * `save_path` - Where to write the image. `None` only validates the data.
///
/// # Returns
///
/// The path actually written, after [`utils::normalize_output_path`]: a bare
/// path gets `.svg` appended. `.png` goes through the bitmap backend, every
/// other accepted path is SVG. `Ok(None)` when no path was given.
///
/// # Errors
///
/// - [`Error::InsufficientData`] if no track has both features
/// - [`Error::Output`] for an unsupported extension, a directory, a parent
///   directory that cannot be created or a failing backend
///
/// # Example
///
/// ```
/// let written = plot_data(&outcome.tracks, Some(Path::new("out/scatter")))?;
/// assert_eq!(written, Some(PathBuf::from("out/scatter.svg")));
/// ```
pub fn plot_data(tracks: &TrackCollection, save_path: Option<&Path>) -> Result<Option<PathBuf>> {
    let points = tracks.feature_points();
    if points.is_empty() {
        return Err(Error::InsufficientData(
            "no track has both danceability and valence".to_string(),
        ));
    }

    let Some(save_path) = save_path else {
        return Ok(None);
    };

    let path = utils::normalize_output_path(save_path)?;
    let output_error = |reason: String| Error::Output {
        path: path.clone(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| output_error(e.to_string()))?;
    }

    ensure_font().map_err(&output_error)?;

    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));

    let drawn = if is_png {
        let root = BitMapBackend::new(&path, PLOT_SIZE).into_drawing_area();
        draw_scatter(&root, &points).map_err(|e| e.to_string())
    } else {
        let root = SVGBackend::new(&path, PLOT_SIZE).into_drawing_area();
        draw_scatter(&root, &points).map_err(|e| e.to_string())
    };
    drawn.map_err(output_error)?;

    Ok(Some(path))
}
