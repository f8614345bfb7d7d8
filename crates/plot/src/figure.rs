//! Backend-agnostic figure description and page layout.
//!
//! All positions are in millimetres on a landscape A4 page with the origin at
//! the bottom-left corner.

/// Page width in mm (landscape A4).
pub const PAGE_WIDTH: f64 = 297.0;
/// Page height in mm (landscape A4).
pub const PAGE_HEIGHT: f64 = 210.0;

const MARGIN: f64 = 12.0;
const TITLE_BAND: f64 = 14.0;
const PANEL_GAP: f64 = 8.0;
/// Space inside a panel cell reserved for tick labels and axis labels.
const AXIS_PAD_LEFT: f64 = 16.0;
const AXIS_PAD_BOTTOM: f64 = 13.0;
const PANEL_TITLE_BAND: f64 = 7.0;

/// Approximate advance of a Helvetica glyph, as a fraction of the font size.
const GLYPH_ASPECT: f64 = 0.5;
const MM_PER_PT: f64 = 25.4 / 72.0;

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const GREY: Color = Color::new(0.6, 0.6, 0.6);
    pub const RED: Color = Color::new(0.84, 0.15, 0.16);
    pub const GREEN: Color = Color::new(0.17, 0.63, 0.17);
    pub const BLUE: Color = Color::new(0.12, 0.47, 0.71);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

/// A bar spanning `[x0, x1]` from zero to `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x0: f64,
    pub x1: f64,
    pub height: f64,
}

/// Something drawn inside a panel, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Line {
        points: Vec<(f64, f64)>,
        color: Color,
        label: Option<String>,
    },
    Scatter {
        points: Vec<(f64, f64)>,
        color: Color,
    },
    Bars {
        bars: Vec<Bar>,
        color: Color,
    },
}

impl Series {
    /// Finite data extents `(x_min, x_max, y_min, y_max)`. Bars always
    /// include zero on the y axis.
    fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let pts: Vec<(f64, f64)> = match self {
            Series::Line { points, .. } | Series::Scatter { points, .. } => points.clone(),
            Series::Bars { bars, .. } => bars
                .iter()
                .flat_map(|b| [(b.x0, 0.0), (b.x1, b.height)])
                .collect(),
        };
        pts.into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .fold(None, |acc, (x, y)| match acc {
                None => Some((x, x, y, y)),
                Some((x0, x1, y0, y1)) => Some((x0.min(x), x1.max(x), y0.min(y), y1.max(y))),
            })
    }
}

/// One set of axes with its series.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Panel {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: Vec::new(),
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// Axes covering every finite point of every series.
    pub fn axes(&self) -> (Axis, Axis) {
        let bounds = self
            .series
            .iter()
            .filter_map(Series::bounds)
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1), a.2.min(b.2), a.3.max(b.3)));
        match bounds {
            Some((x0, x1, y0, y1)) => (Axis::fit(x0, x1), Axis::fit(y0, y1)),
            None => (Axis::fit(0.0, 1.0), Axis::fit(0.0, 1.0)),
        }
    }

    /// Labelled line series, in drawing order.
    pub fn legend(&self) -> Vec<(&str, Color)> {
        self.series
            .iter()
            .filter_map(|s| match s {
                Series::Line {
                    label: Some(label),
                    color,
                    ..
                } => Some((label.as_str(), *color)),
                _ => None,
            })
            .collect()
    }
}

/// A titled page of panels arranged in a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<Panel>,
    pub columns: usize,
}

impl Figure {
    pub fn new(title: impl Into<String>, columns: usize) -> Self {
        Self {
            title: title.into(),
            panels: Vec::new(),
            columns: columns.max(1),
        }
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    /// Page area of each panel's cell, in panel order, filled row by row
    /// from the top.
    pub fn layout(&self) -> Vec<Frame> {
        let n = self.panels.len();
        if n == 0 {
            return Vec::new();
        }
        let cols = self.columns.min(n);
        let rows = n.div_ceil(cols);
        let avail_w = PAGE_WIDTH - 2.0 * MARGIN;
        let avail_h = PAGE_HEIGHT - 2.0 * MARGIN - TITLE_BAND;
        let cell_w = (avail_w - PANEL_GAP * (cols - 1) as f64) / cols as f64;
        let cell_h = (avail_h - PANEL_GAP * (rows - 1) as f64) / rows as f64;
        let top = PAGE_HEIGHT - MARGIN - TITLE_BAND;

        (0..n)
            .map(|i| {
                let (row, col) = (i / cols, i % cols);
                Frame {
                    x: MARGIN + col as f64 * (cell_w + PANEL_GAP),
                    y: top - (row + 1) as f64 * cell_h - row as f64 * PANEL_GAP,
                    width: cell_w,
                    height: cell_h,
                }
            })
            .collect()
    }

    /// Baseline position of the centred page title.
    pub fn title_anchor(&self, font_size: f64) -> (f64, f64) {
        let w = text_width(&self.title, font_size);
        ((PAGE_WIDTH - w) / 2.0, PAGE_HEIGHT - MARGIN - TITLE_BAND / 2.0)
    }
}

/// A rectangle on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    /// The plotting area inside a panel cell, leaving room for the panel
    /// title, tick labels and axis labels.
    pub fn plot_area(&self) -> Frame {
        Frame {
            x: self.x + AXIS_PAD_LEFT,
            y: self.y + AXIS_PAD_BOTTOM,
            width: (self.width - AXIS_PAD_LEFT).max(1.0),
            height: (self.height - AXIS_PAD_BOTTOM - PANEL_TITLE_BAND).max(1.0),
        }
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// A linear axis with "nice" rounded limits and tick positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub lo: f64,
    pub hi: f64,
    pub step: f64,
}

impl Axis {
    const TARGET_TICKS: usize = 6;

    /// Smallest nicely rounded axis containing `[lo, hi]`. A zero-width
    /// range is widened around its value.
    pub fn fit(lo: f64, hi: f64) -> Self {
        let (lo, hi) = if hi - lo > 0.0 {
            (lo, hi)
        } else {
            let pad = if lo == 0.0 { 0.5 } else { 0.1 * lo.abs() };
            (lo - pad, hi + pad)
        };
        let step = nice_step((hi - lo) / (Self::TARGET_TICKS - 1) as f64);
        Self {
            lo: (lo / step).floor() * step,
            hi: (hi / step).ceil() * step,
            step,
        }
    }

    pub fn ticks(&self) -> Vec<f64> {
        let n = ((self.hi - self.lo) / self.step).round() as usize;
        (0..=n).map(|i| self.lo + i as f64 * self.step).collect()
    }

    /// Map a data value onto `[start, start + length]`.
    pub fn map(&self, value: f64, start: f64, length: f64) -> f64 {
        start + (value - self.lo) / (self.hi - self.lo) * length
    }

    /// Tick label with just enough decimals for the step.
    pub fn format(&self, value: f64) -> String {
        let decimals = if self.step >= 1.0 {
            0
        } else {
            (-self.step.log10()).ceil() as usize
        };
        // Adding 0.0 turns -0.0 into 0.0.
        format!("{:.*}", decimals, value + 0.0)
    }
}

/// Round a raw step up to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    let exponent = raw.log10().floor();
    let base = 10f64.powf(exponent);
    let fraction = raw / base;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Estimated width in mm of `text` at `font_size` points.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_ASPECT * MM_PER_PT
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nice_step_rounds_up() {
        assert_relative_eq!(nice_step(0.13), 0.2, epsilon = 1e-12);
        assert_relative_eq!(nice_step(3.0), 5.0, epsilon = 1e-12);
        assert_relative_eq!(nice_step(7.0), 10.0, epsilon = 1e-12);
        assert_relative_eq!(nice_step(100.0), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn axis_contains_range() {
        let axis = Axis::fit(0.3, 9.7);
        assert!(axis.lo <= 0.3 && axis.hi >= 9.7);
        assert_eq!(axis.step, 2.0);
        assert_eq!(axis.ticks(), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn axis_widens_degenerate_range() {
        let axis = Axis::fit(5.0, 5.0);
        assert!(axis.lo < 5.0 && axis.hi > 5.0);
        let zero = Axis::fit(0.0, 0.0);
        assert!(zero.lo < 0.0 && zero.hi > 0.0);
    }

    #[test]
    fn axis_map_and_format() {
        let axis = Axis::fit(0.0, 10.0);
        assert_relative_eq!(axis.map(5.0, 10.0, 100.0), 60.0, epsilon = 1e-12);
        assert_eq!(axis.format(4.0), "4");
        let fine = Axis::fit(0.0, 0.5);
        assert_eq!(fine.format(0.1), "0.1");
        assert_eq!(fine.format(-0.0), "0.0");
    }

    #[test]
    fn layout_grid() {
        let mut fig = Figure::new("four", 2);
        for i in 0..4 {
            fig = fig.with_panel(Panel::new(format!("p{i}"), "x", "y"));
        }
        let frames = fig.layout();
        assert_eq!(frames.len(), 4);
        // Row-major from the top.
        assert_eq!(frames[0].y, frames[1].y);
        assert!(frames[2].y < frames[0].y);
        assert!(frames[1].x > frames[0].x);
        for f in &frames {
            assert!(f.x >= 0.0 && f.right() <= PAGE_WIDTH);
            assert!(f.y >= 0.0 && f.top() <= PAGE_HEIGHT);
            let area = f.plot_area();
            assert!(area.x > f.x && area.top() < f.top());
        }
    }

    #[test]
    fn panel_axes_cover_series() {
        let panel = Panel::new("t", "x", "y")
            .with_series(Series::Line {
                points: vec![(1.0, 2.0), (3.0, f64::NAN), (4.0, 8.0)],
                color: Color::RED,
                label: Some("a".to_string()),
            })
            .with_series(Series::Bars {
                bars: vec![Bar {
                    x0: 4.0,
                    x1: 5.0,
                    height: 3.0,
                }],
                color: Color::BLUE,
            });
        let (x, y) = panel.axes();
        assert!(x.lo <= 1.0 && x.hi >= 5.0);
        assert!(y.lo <= 0.0 && y.hi >= 8.0);
        assert_eq!(panel.legend(), vec![("a", Color::RED)]);
    }

    #[test]
    fn empty_panel_has_unit_axes() {
        let (x, y) = Panel::new("t", "x", "y").axes();
        assert!(x.lo <= 0.0 && x.hi >= 1.0);
        assert!(y.lo <= 0.0 && y.hi >= 1.0);
    }
}
