//! PDF rendering of a [`Figure`] with `printpdf`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference,
    Point, Polygon, Rgb,
};
use tracing::debug;

use crate::error::PlotError;
use crate::figure::{Axis, Color, Figure, Frame, PAGE_HEIGHT, PAGE_WIDTH, Panel, Series, text_width};

const TITLE_SIZE: f64 = 14.0;
const PANEL_TITLE_SIZE: f64 = 9.0;
const LABEL_SIZE: f64 = 8.0;
const TICK_SIZE: f64 = 6.5;
const TICK_LENGTH: f64 = 1.5;
const MARKER_SIZE: f64 = 0.9;

fn render_err(e: impl std::fmt::Display) -> PlotError {
    PlotError::Render {
        reason: e.to_string(),
    }
}

fn mm(v: f64) -> Mm {
    Mm(v as f32)
}

fn point(x: f64, y: f64) -> (Point, bool) {
    (Point::new(mm(x), mm(y)), false)
}

fn pdf_color(c: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(c.r as f32, c.g as f32, c.b as f32, None))
}

/// Render `figure` as a single-page PDF at `path`.
///
/// # Errors
///
/// Returns [`PlotError::EmptyData`] for a figure without panels,
/// [`PlotError::Io`] if the file cannot be created, and
/// [`PlotError::Render`] if the PDF backend fails.
pub fn render_pdf(figure: &Figure, path: &Path) -> Result<(), PlotError> {
    if figure.panels.is_empty() {
        return Err(PlotError::EmptyData {
            what: figure.title.clone(),
        });
    }

    let (doc, page, layer) =
        PdfDocument::new(&figure.title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "figure");
    let layer = doc.get_page(page).get_layer(layer);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_err)?;

    let (tx, ty) = figure.title_anchor(TITLE_SIZE);
    layer.set_fill_color(pdf_color(Color::BLACK));
    layer.use_text(&figure.title, TITLE_SIZE as f32, mm(tx), mm(ty), &font);

    for (panel, frame) in figure.panels.iter().zip(figure.layout()) {
        draw_panel(&layer, &font, panel, &frame);
    }

    let file = File::create(path).map_err(|e| PlotError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    doc.save(&mut BufWriter::new(file)).map_err(render_err)?;
    debug!(path = %path.display(), n_panels = figure.panels.len(), "figure written");
    Ok(())
}

fn draw_panel(layer: &PdfLayerReference, font: &IndirectFontRef, panel: &Panel, cell: &Frame) {
    let area = cell.plot_area();
    let (x_axis, y_axis) = panel.axes();

    // Panel title, centred over the plotting area.
    let w = text_width(&panel.title, PANEL_TITLE_SIZE);
    layer.set_fill_color(pdf_color(Color::BLACK));
    layer.use_text(
        &panel.title,
        PANEL_TITLE_SIZE as f32,
        mm(area.x + (area.width - w) / 2.0),
        mm(area.top() + 2.5),
        font,
    );

    for series in &panel.series {
        draw_series(layer, series, &x_axis, &y_axis, &area);
    }

    draw_frame(layer, &area);
    draw_ticks(layer, font, &x_axis, &y_axis, &area);

    // Axis labels.
    layer.set_fill_color(pdf_color(Color::BLACK));
    let w = text_width(&panel.x_label, LABEL_SIZE);
    layer.use_text(
        &panel.x_label,
        LABEL_SIZE as f32,
        mm(area.x + (area.width - w) / 2.0),
        mm(cell.y + 1.0),
        font,
    );
    layer.use_text(
        &panel.y_label,
        LABEL_SIZE as f32,
        mm(cell.x),
        mm(area.top() + 2.5),
        font,
    );

    draw_legend(layer, font, panel, &area);
}

fn draw_series(layer: &PdfLayerReference, series: &Series, x: &Axis, y: &Axis, area: &Frame) {
    let to_page = |(vx, vy): (f64, f64)| {
        (
            x.map(vx, area.x, area.width),
            y.map(vy, area.y, area.height),
        )
    };
    match series {
        Series::Line { points, color, .. } => {
            layer.set_outline_color(pdf_color(*color));
            layer.set_outline_thickness(1.2);
            // NaN breaks the line into separate runs.
            for run in points.split(|(vx, vy)| !vx.is_finite() || !vy.is_finite()) {
                if run.len() < 2 {
                    continue;
                }
                layer.add_line(Line {
                    points: run
                        .iter()
                        .map(|&p| {
                            let (px, py) = to_page(p);
                            point(px, py)
                        })
                        .collect(),
                    is_closed: false,
                });
            }
        }
        Series::Scatter { points, color } => {
            layer.set_fill_color(pdf_color(*color));
            for &p in points.iter().filter(|(vx, vy)| vx.is_finite() && vy.is_finite()) {
                let (px, py) = to_page(p);
                let half = MARKER_SIZE / 2.0;
                fill_rect(layer, px - half, py - half, MARKER_SIZE, MARKER_SIZE);
            }
        }
        Series::Bars { bars, color } => {
            layer.set_fill_color(pdf_color(*color));
            for bar in bars.iter().filter(|b| b.height.is_finite() && b.height != 0.0) {
                let (x0, y0) = to_page((bar.x0, 0.0));
                let (x1, y1) = to_page((bar.x1, bar.height));
                fill_rect(layer, x0, y0.min(y1), x1 - x0, (y1 - y0).abs());
            }
        }
    }
}

fn fill_rect(layer: &PdfLayerReference, x: f64, y: f64, width: f64, height: f64) {
    layer.add_polygon(Polygon {
        rings: vec![vec![
            point(x, y),
            point(x + width, y),
            point(x + width, y + height),
            point(x, y + height),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

fn draw_frame(layer: &PdfLayerReference, area: &Frame) {
    layer.set_outline_color(pdf_color(Color::BLACK));
    layer.set_outline_thickness(0.6);
    layer.add_line(Line {
        points: vec![
            point(area.x, area.y),
            point(area.right(), area.y),
            point(area.right(), area.top()),
            point(area.x, area.top()),
        ],
        is_closed: true,
    });
}

fn draw_ticks(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    x_axis: &Axis,
    y_axis: &Axis,
    area: &Frame,
) {
    layer.set_fill_color(pdf_color(Color::BLACK));
    for v in x_axis.ticks() {
        let px = x_axis.map(v, area.x, area.width);
        layer.add_line(Line {
            points: vec![point(px, area.y), point(px, area.y - TICK_LENGTH)],
            is_closed: false,
        });
        let label = x_axis.format(v);
        let w = text_width(&label, TICK_SIZE);
        let (lx, ly) = (px - w / 2.0, area.y - TICK_LENGTH - 3.0);
        layer.use_text(label, TICK_SIZE as f32, mm(lx), mm(ly), font);
    }
    for v in y_axis.ticks() {
        let py = y_axis.map(v, area.y, area.height);
        layer.add_line(Line {
            points: vec![point(area.x, py), point(area.x - TICK_LENGTH, py)],
            is_closed: false,
        });
        let label = y_axis.format(v);
        let w = text_width(&label, TICK_SIZE);
        let (lx, ly) = (area.x - TICK_LENGTH - 1.0 - w, py - 0.8);
        layer.use_text(label, TICK_SIZE as f32, mm(lx), mm(ly), font);
    }
}

fn draw_legend(layer: &PdfLayerReference, font: &IndirectFontRef, panel: &Panel, area: &Frame) {
    for (i, (label, color)) in panel.legend().into_iter().enumerate() {
        let y = area.top() - 5.0 - i as f64 * 4.5;
        let x = area.x + 3.0;
        layer.set_outline_color(pdf_color(color));
        layer.set_outline_thickness(1.2);
        layer.add_line(Line {
            points: vec![point(x, y + 0.8), point(x + 6.0, y + 0.8)],
            is_closed: false,
        });
        layer.set_fill_color(pdf_color(Color::BLACK));
        layer.use_text(label, TICK_SIZE as f32, mm(x + 8.0), mm(y), font);
    }
}
