//! Minimal PDF 1.4 writer: builtin Helvetica, RGB images, vector rectangles.
//!
//! Callers work in millimetres with the origin at the top-left corner of the
//! page; the writer converts to PDF points (origin bottom-left).

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::chart::ChartImage;
use crate::error::ReportError;

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

const CATALOG_ID: u32 = 1;
const PAGES_ID: u32 = 2;
const FONT_REGULAR_ID: u32 = 3;
const FONT_BOLD_ID: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

// ---------------------------------------------------------------------------
// Text metrics
// ---------------------------------------------------------------------------

/// Helvetica advance widths (1/1000 em) for bytes 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn glyph_width(byte: u8) -> u16 {
    match byte {
        32..=126 => HELVETICA_WIDTHS[(byte - 32) as usize],
        _ => 556,
    }
}

/// WinAnsi bytes for `text`. Characters outside Windows-1252 become `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        if ch.is_control() {
            out.push(b' ');
            continue;
        }
        let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        if had_errors {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

/// Printed width of `text` in mm. Bold is approximated as 5% wider.
pub fn text_width(text: &str, font: Font, size_pt: f64) -> f64 {
    let units: u32 = encode_text(text).iter().map(|&b| glyph_width(b) as u32).sum();
    let factor = match font {
        Font::Regular => 1.0,
        Font::Bold => 1.05,
    };
    units as f64 * size_pt / 1000.0 * factor / PT_PER_MM
}

/// Longest prefix of `text` (with `...` appended when shortened) that fits
/// in `max_width` mm.
pub fn fit_text(text: &str, font: Font, size_pt: f64, max_width: f64) -> String {
    if text_width(text, font, size_pt) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    for keep in (0..chars.len()).rev() {
        let candidate: String = chars[..keep].iter().collect::<String>() + "...";
        if text_width(&candidate, font, size_pt) <= max_width {
            return candidate;
        }
    }
    String::new()
}

fn escape_string(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'(');
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b')');
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// An image registered with the document, drawable on any page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    name: String,
    id: u32,
}

/// Content stream of one page.
#[derive(Debug)]
pub struct Canvas {
    ops: Vec<u8>,
    page_height_pt: f64,
    images: Vec<ImageRef>,
}

fn pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

impl Canvas {
    pub fn new(page_height_mm: f64) -> Self {
        Self {
            ops: Vec::new(),
            page_height_pt: pt(page_height_mm),
            images: Vec::new(),
        }
    }

    fn y(&self, mm: f64) -> f64 {
        self.page_height_pt - pt(mm)
    }

    fn push(&mut self, op: String) {
        self.ops.extend_from_slice(op.as_bytes());
    }

    /// Draw `text` with its baseline at `baseline` mm from the top.
    pub fn text(&mut self, x: f64, baseline: f64, font: Font, size_pt: f64, text: &str) {
        let header = format!(
            "BT /{} {:.1} Tf {:.2} {:.2} Td ",
            font.resource(),
            size_pt,
            pt(x),
            self.y(baseline)
        );
        self.push(header);
        escape_string(&encode_text(text), &mut self.ops);
        self.push(" Tj ET\n".to_string());
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: [u8; 3]) {
        let [r, g, b] = color.map(|c| c as f64 / 255.0);
        let op = format!(
            "q {:.3} {:.3} {:.3} rg {:.2} {:.2} {:.2} {:.2} re f Q\n",
            r,
            g,
            b,
            pt(x),
            self.y(y + h),
            pt(w),
            pt(h)
        );
        self.push(op);
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let op = format!(
            "q 0.57 w {:.2} {:.2} {:.2} {:.2} re S Q\n",
            pt(x),
            self.y(y + h),
            pt(w),
            pt(h)
        );
        self.push(op);
    }

    /// Place `image` in the box with top-left corner `(x, y)`.
    pub fn image(&mut self, image: &ImageRef, x: f64, y: f64, w: f64, h: f64) {
        let op = format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /{} Do Q\n",
            pt(w),
            pt(h),
            pt(x),
            self.y(y + h),
            image.name
        );
        self.push(op);
        if !self.images.contains(image) {
            self.images.push(image.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

pub struct PdfDocument {
    width_mm: f64,
    height_mm: f64,
    /// Object bodies, index = object id - 1. Reserved ids hold an empty body
    /// until filled.
    objects: Vec<Vec<u8>>,
    pages: Vec<u32>,
    image_count: usize,
}

fn compress(data: &[u8]) -> Result<Vec<u8>, ReportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ReportError::Encode(e.to_string()))?;
    encoder.finish().map_err(|e| ReportError::Encode(e.to_string()))
}

fn stream_object(dict: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!("<< {} /Length {} >>\nstream\n", dict, data.len()).into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(b"\nendstream");
    body
}

impl PdfDocument {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        let mut doc = Self {
            width_mm,
            height_mm,
            objects: Vec::new(),
            pages: Vec::new(),
            image_count: 0,
        };
        let catalog = doc.reserve();
        let pages = doc.reserve();
        let regular = doc.add_object(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec(),
        );
        let bold = doc.add_object(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );
        debug_assert_eq!(
            (catalog, pages, regular, bold),
            (CATALOG_ID, PAGES_ID, FONT_REGULAR_ID, FONT_BOLD_ID)
        );
        doc
    }

    fn reserve(&mut self) -> u32 {
        self.objects.push(Vec::new());
        self.objects.len() as u32
    }

    fn add_object(&mut self, body: Vec<u8>) -> u32 {
        self.objects.push(body);
        self.objects.len() as u32
    }

    pub fn new_canvas(&self) -> Canvas {
        Canvas::new(self.height_mm)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Embed an RGB chart as a compressed image XObject.
    pub fn add_image(&mut self, name: &str, image: &ChartImage) -> Result<ImageRef, ReportError> {
        image.validate().map_err(|reason| ReportError::InvalidImage {
            name: name.to_string(),
            reason,
        })?;
        let data = compress(&image.rgb)?;
        let dict = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode",
            image.width, image.height
        );
        let id = self.add_object(stream_object(&dict, &data));
        self.image_count += 1;
        Ok(ImageRef {
            name: format!("Im{}", self.image_count),
            id,
        })
    }

    pub fn add_page(&mut self, canvas: Canvas) -> Result<(), ReportError> {
        let data = compress(&canvas.ops)?;
        let contents = self.add_object(stream_object("/Filter /FlateDecode", &data));

        let mut xobjects = String::new();
        for image in &canvas.images {
            xobjects.push_str(&format!(" /{} {} 0 R", image.name, image.id));
        }
        let page = format!(
            "<< /Type /Page /Parent {PAGES_ID} 0 R /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R >> /XObject <<{xobjects} >> >> /Contents {contents} 0 R >>"
        );
        let id = self.add_object(page.into_bytes());
        self.pages.push(id);
        Ok(())
    }

    /// Serialize with a cross-reference table. A document without pages
    /// gets one blank page.
    pub fn finish(mut self) -> Result<Vec<u8>, ReportError> {
        if self.pages.is_empty() {
            let blank = self.new_canvas();
            self.add_page(blank)?;
        }

        let kids: Vec<String> = self.pages.iter().map(|id| format!("{id} 0 R")).collect();
        self.objects[(PAGES_ID - 1) as usize] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 {:.2} {:.2}] >>",
            kids.join(" "),
            self.pages.len(),
            pt(self.width_mm),
            pt(self.height_mm)
        )
        .into_bytes();
        self.objects[(CATALOG_ID - 1) as usize] =
            format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").into_bytes();

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for (idx, body) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", idx + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", self.objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                self.objects.len() + 1
            )
            .as_bytes(),
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_winansi_encoded() {
        assert_eq!(encode_text("Café"), b"Caf\xe9".to_vec());
        assert_eq!(encode_text("€5"), b"\x805".to_vec());
        assert_eq!(encode_text("日本"), b"??".to_vec());
        assert_eq!(encode_text("a\tb"), b"a b".to_vec());
    }

    #[test]
    fn strings_are_escaped() {
        let mut out = Vec::new();
        escape_string(b"a(b)\\c", &mut out);
        assert_eq!(out, b"(a\\(b\\)\\\\c)".to_vec());
    }

    #[test]
    fn width_and_fit() {
        // "ii" at 10pt: 2 * 222 / 1000 * 10pt
        let w = text_width("ii", Font::Regular, 10.0);
        assert!((w - 4.44 / PT_PER_MM).abs() < 1e-9);
        assert_eq!(fit_text("short", Font::Regular, 9.0, 50.0), "short");
        let fitted = fit_text("A very long metric name indeed", Font::Regular, 9.0, 20.0);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, Font::Regular, 9.0) <= 20.0);
    }

    #[test]
    fn empty_document_has_one_page() {
        let bytes = PdfDocument::new(210.0, 297.0).finish().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Count 1"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn invalid_image_is_rejected() {
        let mut doc = PdfDocument::new(210.0, 297.0);
        let mut image = ChartImage::new(2, 2);
        image.rgb.pop();
        let err = doc.add_image("bar", &image).unwrap_err();
        assert!(matches!(err, ReportError::InvalidImage { .. }));
    }

    #[test]
    fn images_are_listed_in_page_resources() {
        let mut doc = PdfDocument::new(210.0, 297.0);
        let image = doc.add_image("bar", &ChartImage::new(3, 2)).unwrap();
        let mut canvas = doc.new_canvas();
        canvas.image(&image, 10.0, 10.0, 30.0, 20.0);
        canvas.image(&image, 10.0, 40.0, 30.0, 20.0);
        doc.add_page(canvas).unwrap();
        let bytes = doc.finish().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/XObject << /Im1 5 0 R >>"));
        assert!(text.contains("/Width 3 /Height 2"));
    }
}
