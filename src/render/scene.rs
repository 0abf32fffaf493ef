use std::fmt::Write as _;

use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::math::Fnv1a64;

/// A fully sampled frame: every attribute is resolved to a concrete value.
///
/// Scenes are plain data. They can be serialized to SVG, fingerprinted and shipped to worker
/// threads for rasterization.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub canvas: Canvas,
    pub background: String,
    pub font_family: String,
    pub text_color: String,
    pub axis: AxisScene,
    pub bars: BarLayer,
    pub labels: LabelLayer,
    pub ticker: TickerScene,
}

/// Top axis: tick marks with gridlines running down the plot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisScene {
    /// Vertical offset of the axis baseline.
    pub top: f64,
    /// Gridline length below the baseline.
    pub grid_len: f64,
    pub ticks: Vec<AxisTick>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisTick {
    pub x: f64,
    /// `None` for the suppressed first label.
    pub label: Option<String>,
    pub stroke: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BarLayer {
    pub opacity: f64,
    pub bars: Vec<BarShape>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarShape {
    pub name: String,
    pub rect: Rect,
    pub fill: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelLayer {
    /// Vertical offset of the text baseline inside a band.
    pub baseline: f64,
    pub labels: Vec<LabelShape>,
}

/// Team name right-aligned at `anchor`, with the numeric readout below it.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelShape {
    pub name: String,
    /// Bar trailing edge and band top.
    pub anchor: Point,
    pub readout: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickerScene {
    pub text: String,
    pub anchor: Point,
    pub font_size: f64,
}

const AXIS_FONT_SIZE: f64 = 10.0;
const AXIS_TICK_PADDING: f64 = 3.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const LABEL_INSET: f64 = 6.0;

impl Scene {
    /// Serialize to a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let Canvas { width, height } = self.canvas;
        let mut s = String::with_capacity(4096);
        let _ = write!(
            s,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="{}">"#,
            xml_escape(&self.font_family)
        );
        let _ = write!(
            s,
            r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
            xml_escape(&self.background)
        );

        self.write_axis(&mut s);
        self.write_bars(&mut s);
        self.write_labels(&mut s);
        self.write_ticker(&mut s);

        s.push_str("</svg>");
        s
    }

    /// Stable 64-bit fingerprint of the serialized scene.
    pub fn fingerprint(&self) -> u64 {
        fingerprint_svg(&self.to_svg())
    }

    fn write_axis(&self, s: &mut String) {
        let color = xml_escape(&self.text_color);
        let _ = write!(
            s,
            r#"<g transform="translate(0,{})" font-size="{AXIS_FONT_SIZE}" text-anchor="middle">"#,
            num(self.axis.top)
        );
        for tick in &self.axis.ticks {
            let _ = write!(
                s,
                r#"<g transform="translate({},0)"><line stroke="{}" y2="{}"/>"#,
                num(tick.x),
                xml_escape(&tick.stroke),
                num(self.axis.grid_len)
            );
            if let Some(label) = &tick.label {
                let _ = write!(
                    s,
                    r#"<text fill="{color}" y="{}">{}</text>"#,
                    num(-AXIS_TICK_PADDING),
                    xml_escape(label)
                );
            }
            s.push_str("</g>");
        }
        s.push_str("</g>");
    }

    fn write_bars(&self, s: &mut String) {
        let _ = write!(s, r#"<g fill-opacity="{}">"#, num(self.bars.opacity));
        for bar in &self.bars.bars {
            let r = bar.rect;
            let _ = write!(
                s,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                num(r.x0),
                num(r.y0),
                num(r.width().max(0.0)),
                num(r.height().max(0.0)),
                xml_escape(&bar.fill)
            );
        }
        s.push_str("</g>");
    }

    fn write_labels(&self, s: &mut String) {
        let _ = write!(
            s,
            r#"<g font-weight="bold" font-size="{LABEL_FONT_SIZE}" text-anchor="end" fill="{}">"#,
            xml_escape(&self.text_color)
        );
        for label in &self.labels.labels {
            let _ = write!(
                s,
                r#"<text transform="translate({},{})" x="{}" y="{}" dy="{}">{}<tspan fill-opacity="0.7" font-weight="normal" x="{}" dy="{}">{}</tspan></text>"#,
                num(label.anchor.x),
                num(label.anchor.y),
                num(-LABEL_INSET),
                num(self.labels.baseline),
                num(-0.25 * LABEL_FONT_SIZE),
                xml_escape(&label.name),
                num(-LABEL_INSET),
                num(1.15 * LABEL_FONT_SIZE),
                xml_escape(&label.readout)
            );
        }
        s.push_str("</g>");
    }

    fn write_ticker(&self, s: &mut String) {
        let t = &self.ticker;
        let _ = write!(
            s,
            r#"<text x="{}" y="{}" dy="{}" font-weight="bold" font-size="{}" text-anchor="end" fill="{}">{}</text>"#,
            num(t.anchor.x),
            num(t.anchor.y),
            num(0.32 * t.font_size),
            num(t.font_size),
            xml_escape(&self.text_color),
            xml_escape(&t.text)
        );
    }
}

pub(crate) fn fingerprint_svg(svg: &str) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(svg.len() as u64);
    h.write_bytes(svg.as_bytes());
    h.finish()
}

/// Compact decimal for SVG attributes (at most 3 fraction digits, no trailing zeros).
fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let mut s = format!("{v:.3}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_owned();
    }
    s
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            // Not representable in XML 1.0, even as a character reference.
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
