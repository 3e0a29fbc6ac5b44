//! In-memory raster charts.
//!
//! Charts carry no text; the document draws each legend as vector text next
//! to the image.

use std::f64::consts::TAU;

/// Qualitative palette, cycled by series index.
pub const PALETTE: [[u8; 3]; 10] = [
    [0x63, 0x6E, 0xFA],
    [0xEF, 0x55, 0x3B],
    [0x00, 0xCC, 0x96],
    [0xAB, 0x63, 0xFA],
    [0xFF, 0xA1, 0x5A],
    [0x19, 0xD3, 0xF3],
    [0xFF, 0x66, 0x92],
    [0xB6, 0xE8, 0x80],
    [0xFF, 0x97, 0xFF],
    [0xFE, 0xCB, 0x52],
];

const BACKGROUND: [u8; 3] = [0xFF, 0xFF, 0xFF];
const GRID: [u8; 3] = [0xE5, 0xEC, 0xF6];
const AXIS: [u8; 3] = [0x44, 0x44, 0x44];
const EMPTY_RING: [u8; 3] = [0xDD, 0xDD, 0xDD];

pub fn palette_color(idx: usize) -> [u8; 3] {
    PALETTE[idx % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub value: f64,
    pub color: [u8; 3],
}

/// 8-bit RGB raster, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub legend: Vec<LegendEntry>,
}

impl ChartImage {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = width as usize * height as usize;
        let mut rgb = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            rgb.extend_from_slice(&BACKGROUND);
        }
        Self { width, height, rgb, legend: Vec::new() }
    }

    /// Buffer length matches the dimensions and neither is zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("empty dimensions {}x{}", self.width, self.height));
        }
        let expected = self.width as usize * self.height as usize * 3;
        if self.rgb.len() != expected {
            return Err(format!("expected {} bytes, got {}", expected, self.rgb.len()));
        }
        Ok(())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x < self.width && y < self.height {
            let i = (y as usize * self.width as usize + x as usize) * 3;
            self.rgb[i..i + 3].copy_from_slice(&color);
        }
    }

    /// Fill `[x0, x1) × [y0, y1)`, clipped to the image.
    fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: [u8; 3]) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.set_pixel(x, y, color);
            }
        }
    }
}

fn legend_for(items: &[(&str, f64)]) -> Vec<LegendEntry> {
    items
        .iter()
        .enumerate()
        .map(|(i, (label, value))| LegendEntry {
            label: label.to_string(),
            value: *value,
            color: palette_color(i),
        })
        .collect()
}

/// Vertical bars, one per item, on a four-step grid scaled to the largest
/// value. Negative values draw as zero-height bars.
pub fn bar_chart(bars: &[(&str, f64)], width: u32, height: u32) -> ChartImage {
    let mut image = ChartImage::new(width, height);
    image.legend = legend_for(bars);

    let (left, right, top, bottom) = (40u32, 20u32, 20u32, 30u32);
    if width <= left + right || height <= top + bottom {
        return image;
    }
    let plot_w = width - left - right;
    let plot_h = height - top - bottom;
    let baseline = top + plot_h;

    for step in 1..=4 {
        let y = baseline - plot_h * step / 4;
        image.fill_rect(left, y, left + plot_w, y + 1, GRID);
    }

    let max = bars
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { max } else { 1.0 };

    if !bars.is_empty() {
        let slot = plot_w as f64 / bars.len() as f64;
        let bar_w = (slot * 0.6).max(1.0);
        for (i, (_, value)) in bars.iter().enumerate() {
            let v = if value.is_finite() { value.max(0.0) } else { 0.0 };
            let bar_h = ((v / scale) * plot_h as f64).round() as u32;
            let x0 = left + (slot * i as f64 + (slot - bar_w) / 2.0).round() as u32;
            let x1 = x0 + bar_w.round() as u32;
            image.fill_rect(x0, baseline - bar_h.min(plot_h), x1, baseline, palette_color(i));
        }
    }

    // Axes drawn last so bars never cover them
    image.fill_rect(left, baseline, left + plot_w, baseline + 2, AXIS);
    image.fill_rect(left - 2, top, left, baseline + 2, AXIS);

    image
}

/// Donut chart starting at twelve o'clock, slices clockwise in item order.
/// `hole` is the inner radius as a fraction of the outer one.
pub fn pie_chart(slices: &[(&str, f64)], width: u32, height: u32, hole: f64) -> ChartImage {
    let mut image = ChartImage::new(width, height);
    image.legend = legend_for(slices);

    let values: Vec<f64> = slices
        .iter()
        .map(|(_, v)| if v.is_finite() { v.max(0.0) } else { 0.0 })
        .collect();
    let total: f64 = values.iter().sum();

    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let outer = (width.min(height) as f64 / 2.0 - 8.0).max(1.0);
    let inner = outer * hole.clamp(0.0, 0.95);

    // Cumulative slice boundaries as fractions of the full turn
    let mut bounds = Vec::with_capacity(values.len());
    let mut acc = 0.0;
    for v in &values {
        acc += v;
        bounds.push(if total > 0.0 { acc / total } else { 0.0 });
    }

    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let d = dx.hypot(dy);
            if d > outer || d < inner {
                continue;
            }
            if total <= 0.0 {
                image.set_pixel(x, y, EMPTY_RING);
                continue;
            }
            let mut angle = dx.atan2(-dy);
            if angle < 0.0 {
                angle += TAU;
            }
            let frac = angle / TAU;
            let idx = bounds.iter().position(|&b| frac < b).unwrap_or(values.len() - 1);
            image.set_pixel(x, y, palette_color(idx));
        }
    }

    image
}
