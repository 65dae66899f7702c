use std::fmt::Write;

use crate::fmt::money_whole;
use crate::forecast::Prediction;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 64.0;
const GRID_LINES: usize = 4;

const PALETTE: &[&str] = &[
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

const AXIS_COLOR: &str = "#888";
const GRID_COLOR: &str = "#e5e5e5";
const PREDICTION_COLOR: &str = "#ef553b";

pub fn color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

/// Escape text for SVG and HTML content.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// SVG builder
// ---------------------------------------------------------------------------

struct Svg {
    body: String,
}

impl Svg {
    fn new(title: &str) -> Self {
        let mut svg = Self { body: String::new() };
        svg.text(WIDTH / 2.0, 28.0, title, 16.0, "middle", "#222");
        svg
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        let _ = write!(
            self.body,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"/>"#
        );
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        let _ = write!(
            self.body,
            r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" stroke="{stroke}" stroke-width="1"/>"#
        );
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str) {
        let pts: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
        let _ = write!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{stroke}" stroke-width="2"/>"#,
            pts.join(" ")
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        let _ = write!(
            self.body,
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{fill}"/>"#
        );
    }

    fn path(&mut self, d: &str, fill: &str) {
        let _ = write!(
            self.body,
            r##"<path d="{d}" fill="{fill}" stroke="#fff" stroke-width="1"/>"##
        );
    }

    fn text(&mut self, x: f64, y: f64, s: &str, size: f64, anchor: &str, fill: &str) {
        let _ = write!(
            self.body,
            r#"<text x="{x:.1}" y="{y:.1}" font-size="{size}" text-anchor="{anchor}" fill="{fill}" font-family="sans-serif">{}</text>"#,
            escape(s)
        );
    }

    fn placeholder(&mut self, message: &str) {
        self.text(WIDTH / 2.0, HEIGHT / 2.0, message, 13.0, "middle", AXIS_COLOR);
    }

    fn finish(self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" width="100%" role="img">{}</svg>"#,
            self.body
        )
    }
}

// ---------------------------------------------------------------------------
// Value axis
// ---------------------------------------------------------------------------

struct Scale {
    lo: f64,
    hi: f64,
}

impl Scale {
    fn fit(values: impl Iterator<Item = f64>) -> Self {
        let (mut lo, mut hi) = (0.0f64, 0.0f64);
        for v in values.filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if hi - lo < f64::EPSILON {
            hi = lo + 1.0;
        }
        Self { lo, hi }
    }

    fn y(&self, v: f64) -> f64 {
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        MARGIN_TOP + plot_h * (1.0 - (v - self.lo) / (self.hi - self.lo))
    }

    fn draw_axis(&self, svg: &mut Svg, symbol: &str) {
        for i in 0..=GRID_LINES {
            let v = self.lo + (self.hi - self.lo) * i as f64 / GRID_LINES as f64;
            let y = self.y(v);
            svg.line(MARGIN_LEFT, y, WIDTH - MARGIN_RIGHT, y, GRID_COLOR);
            svg.text(MARGIN_LEFT - 6.0, y + 4.0, &money_whole(v, symbol), 11.0, "end", AXIS_COLOR);
        }
        let base = self.y(0.0);
        svg.line(MARGIN_LEFT, base, WIDTH - MARGIN_RIGHT, base, AXIS_COLOR);
    }
}

fn slot_x(i: usize, n: usize) -> (f64, f64) {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let slot = plot_w / n.max(1) as f64;
    (MARGIN_LEFT + slot * i as f64, slot)
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// One colored bar per item, labels along the x axis.
pub fn bar_chart(title: &str, items: &[(String, f64)], symbol: &str) -> String {
    let mut svg = Svg::new(title);
    if items.is_empty() {
        svg.placeholder("No expenses in the current selection");
        return svg.finish();
    }
    let scale = Scale::fit(items.iter().map(|(_, v)| *v));
    scale.draw_axis(&mut svg, symbol);
    for (i, (label, value)) in items.iter().enumerate() {
        let (x, slot) = slot_x(i, items.len());
        let (top, bottom) = (scale.y(value.max(0.0)), scale.y(value.min(0.0)));
        svg.rect(x + slot * 0.15, top, slot * 0.7, bottom - top, color(i));
        svg.text(x + slot / 2.0, HEIGHT - MARGIN_BOTTOM + 18.0, label, 11.0, "middle", "#333");
    }
    svg.finish()
}

/// Donut of each item's share of the positive total, with a legend.
pub fn donut_chart(title: &str, items: &[(String, f64)]) -> String {
    let mut svg = Svg::new(title);
    let total: f64 = items.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        svg.placeholder("No expenses in the current selection");
        return svg.finish();
    }
    let (cx, cy) = (WIDTH * 0.35, HEIGHT / 2.0 + 12.0);
    let (outer, inner) = (120.0, 120.0 * 0.3);
    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (i, (label, value)) in items.iter().enumerate() {
        let share = value.max(0.0) / total;
        if share > 0.0 {
            // A full circle cannot be drawn as a single arc.
            let sweep = (share * std::f64::consts::TAU).min(std::f64::consts::TAU - 1e-4);
            svg.path(&donut_segment(cx, cy, outer, inner, angle, angle + sweep), color(i));
            angle += sweep;
        }
        let ly = MARGIN_TOP + 20.0 * i as f64;
        svg.rect(WIDTH * 0.68, ly - 10.0, 12.0, 12.0, color(i));
        svg.text(
            WIDTH * 0.68 + 18.0,
            ly,
            &format!("{label} ({:.1}%)", share * 100.0),
            12.0,
            "start",
            "#333",
        );
    }
    svg.finish()
}

fn donut_segment(cx: f64, cy: f64, outer: f64, inner: f64, start: f64, end: f64) -> String {
    let large = if end - start > std::f64::consts::PI { 1 } else { 0 };
    let p = |r: f64, a: f64| (cx + r * a.cos(), cy + r * a.sin());
    let (ox1, oy1) = p(outer, start);
    let (ox2, oy2) = p(outer, end);
    let (ix1, iy1) = p(inner, end);
    let (ix2, iy2) = p(inner, start);
    format!(
        "M{ox1:.2},{oy1:.2} A{outer},{outer} 0 {large} 1 {ox2:.2},{oy2:.2} \
         L{ix1:.2},{iy1:.2} A{inner},{inner} 0 {large} 0 {ix2:.2},{iy2:.2} Z"
    )
}

/// Line with point markers through labelled values.
pub fn line_chart(title: &str, points: &[(String, f64)], symbol: &str) -> String {
    let mut svg = Svg::new(title);
    if points.is_empty() {
        svg.placeholder("No dated transactions in the current selection");
        return svg.finish();
    }
    let scale = Scale::fit(points.iter().map(|(_, v)| *v));
    scale.draw_axis(&mut svg, symbol);
    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| {
            let (x, slot) = slot_x(i, points.len());
            (x + slot / 2.0, scale.y(*v))
        })
        .collect();
    svg.polyline(&coords, color(0));
    for ((x, y), (label, _)) in coords.iter().zip(points) {
        svg.circle(*x, *y, 4.0, color(0));
        svg.text(*x, HEIGHT - MARGIN_BOTTOM + 18.0, label, 11.0, "middle", "#333");
    }
    svg.finish()
}

/// Actual monthly expenses with the predicted next month as a separate marker.
pub fn forecast_chart(prediction: &Prediction, symbol: &str) -> String {
    let mut svg = Svg::new("Actual Expenses vs Prediction");
    let mut labels: Vec<String> = prediction.history.iter().map(|m| m.month.to_string()).collect();
    labels.push(prediction.next_month.to_string());
    let values = prediction
        .history
        .iter()
        .map(|m| m.total)
        .chain(std::iter::once(prediction.predicted));
    let scale = Scale::fit(values);
    scale.draw_axis(&mut svg, symbol);

    let n = labels.len();
    let center = |i: usize| {
        let (x, slot) = slot_x(i, n);
        x + slot / 2.0
    };
    let actual: Vec<(f64, f64)> = prediction
        .history
        .iter()
        .enumerate()
        .map(|(i, m)| (center(i), scale.y(m.total)))
        .collect();
    svg.polyline(&actual, color(0));
    for (x, y) in &actual {
        svg.circle(*x, *y, 4.0, color(0));
    }

    let (px, py) = (center(n - 1), scale.y(prediction.predicted));
    svg.circle(px, py, 6.0, PREDICTION_COLOR);
    svg.text(
        px,
        py - 12.0,
        &format!("Pred: {}", money_whole(prediction.predicted, symbol)),
        12.0,
        "middle",
        PREDICTION_COLOR,
    );
    for (i, label) in labels.iter().enumerate() {
        svg.text(center(i), HEIGHT - MARGIN_BOTTOM + 18.0, label, 11.0, "middle", "#333");
    }
    svg.text(
        WIDTH / 2.0,
        HEIGHT - 16.0,
        "Month number",
        11.0,
        "middle",
        AXIS_COLOR,
    );
    svg.finish()
}
