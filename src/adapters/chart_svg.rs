//! SVG pie chart of theme weights.

use crate::domain::error::AllocatorError;
use crate::domain::report::AllocationReport;
use crate::domain::weights::ThemeWeights;
use crate::ports::report_port::ReportPort;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fs;
use std::path::Path;

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const RADIUS: f64 = 160.0;

/// Point on the circle at `fraction` of a full turn, clockwise from 12 o'clock.
fn point_at(cx: f64, cy: f64, r: f64, fraction: f64) -> (f64, f64) {
    let angle = fraction * TAU - FRAC_PI_2;
    (cx + r * angle.cos(), cy + r * angle.sin())
}

pub fn format_pie_chart(weights: &ThemeWeights) -> String {
    let cx = WIDTH / 2.0;
    let cy = HEIGHT / 2.0 + 20.0;
    let total: f64 = weights.values().sum();

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\">\n",
        WIDTH, HEIGHT, WIDTH, HEIGHT
    ));
    out.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"30\" text-anchor=\"middle\" font-size=\"18\">Portfolio Allocation by Theme</text>\n",
        cx
    ));

    if weights.is_empty() || total <= 0.0 {
        out.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">No theme weights available.</text>\n",
            cx, cy
        ));
        out.push_str("</svg>\n");
        return out;
    }

    let mut start = 0.0_f64;
    for (i, (theme, weight)) in weights.iter().enumerate() {
        let fraction = weight / total;
        let color = PALETTE[i % PALETTE.len()];
        let label = format!("{} ({:.1}%)", escape_xml(theme), fraction * 100.0);

        if fraction >= 1.0 - 1e-12 {
            out.push_str(&format!(
                "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"><title>{}</title></circle>\n",
                cx, cy, RADIUS, color, label
            ));
        } else if fraction > 0.0 {
            let end = start + fraction;
            let (x1, y1) = point_at(cx, cy, RADIUS, start);
            let (x2, y2) = point_at(cx, cy, RADIUS, end);
            let large_arc = if fraction > 0.5 { 1 } else { 0 };
            out.push_str(&format!(
                "  <path d=\"M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2} Z\" fill=\"{}\" stroke=\"white\"><title>{}</title></path>\n",
                cx, cy, x1, y1, RADIUS, RADIUS, large_arc, x2, y2, color, label
            ));
        }

        let (lx, ly) = point_at(cx, cy, RADIUS + 30.0, start + fraction / 2.0);
        let anchor = if lx < cx { "end" } else { "start" };
        out.push_str(&format!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-size=\"12\">{}</text>\n",
            lx, ly, anchor, label
        ));

        start += fraction;
    }

    out.push_str("</svg>\n");
    out
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub struct SvgChartAdapter;

impl ReportPort for SvgChartAdapter {
    fn write(&self, report: &AllocationReport, output_path: &Path) -> Result<(), AllocatorError> {
        fs::write(output_path, format_pie_chart(&report.theme_weights)).map_err(|e| {
            AllocatorError::Export {
                path: output_path.display().to_string(),
                reason: e.to_string(),
            }
        })
    }
}
