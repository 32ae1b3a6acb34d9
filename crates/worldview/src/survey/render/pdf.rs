use chrono::NaiveDate;

use super::super::domain::Axis;
use super::super::report::{ChartPayload, ReportPayload};
use super::super::scoring::{project, PlotCoordinate};
use super::chart::{annotation, gridline, star_points};
use super::{score_lines, DocumentRenderer, Rendered, DISCLAIMER, REPORT_TITLE};

const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 50.0;
const CHART_SIDE: f64 = 300.0;
// Helvetica averages roughly half an em per glyph.
const GLYPH_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    const fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
        }
    }

    const fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Italic => "Helvetica-Oblique",
        }
    }

    const fn all() -> [Self; 3] {
        [Self::Regular, Self::Bold, Self::Italic]
    }
}

/// Two-page PDF: perspective, scores, chart and disclaimer, then the
/// per-category analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReportRenderer;

impl PdfReportRenderer {
    pub fn to_pdf(
        &self,
        report: &ReportPayload,
        chart: Option<&ChartPayload>,
        generated_on: NaiveDate,
    ) -> Vec<u8> {
        let mut layout = Layout::new();

        layout.centered(Font::Bold, 24.0, REPORT_TITLE);
        layout.centered(
            Font::Regular,
            10.0,
            &format!(
                "Survey results generated on {}",
                generated_on.format("%B %d, %Y")
            ),
        );
        layout.gap(10.0);
        layout.labelled(
            14.0,
            "Your modernity worldview perspective is: ",
            &report.perspective_description,
        );
        layout.gap(8.0);
        layout.line(Font::Regular, 12.0, "Your Perspective Scores:");
        for line in score_lines(report) {
            layout.line(Font::Regular, 12.0, &line);
        }

        if let Some(chart) = chart {
            layout.gap(10.0);
            layout.chart(chart);
        }

        layout.gap(10.0);
        layout.paragraph(Font::Italic, 10.0, DISCLAIMER);

        layout.new_page();
        layout.line(Font::Bold, 18.0, "Worldview Category Analysis");
        layout.gap(5.0);
        for (category, narrative) in &report.category_narratives {
            layout.line(Font::Bold, 13.0, category);
            layout.paragraph(Font::Regular, 11.0, narrative);
            layout.gap(5.0);
        }

        write_document(&layout.finish())
    }
}

impl DocumentRenderer for PdfReportRenderer {
    fn render(
        &self,
        report: &ReportPayload,
        chart: Option<&ChartPayload>,
        generated_on: NaiveDate,
    ) -> Rendered {
        Rendered {
            content_type: mime::APPLICATION_PDF,
            file_name: "worldview_analysis.pdf",
            bytes: self.to_pdf(report, chart, generated_on),
        }
    }
}

struct Layout {
    pages: Vec<Vec<u8>>,
    current: Vec<u8>,
    cursor: f64,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn reserve(&mut self, height: f64) {
        if self.cursor - height < MARGIN {
            self.new_page();
        }
    }

    fn gap(&mut self, height: f64) {
        self.cursor -= height;
    }

    fn line(&mut self, font: Font, size: f64, text: &str) {
        self.line_at(font, size, MARGIN, text);
    }

    fn centered(&mut self, font: Font, size: f64, text: &str) {
        let width = estimate_width(text, size);
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        self.line_at(font, size, x, text);
    }

    fn line_at(&mut self, font: Font, size: f64, x: f64, text: &str) {
        let leading = size * 1.4;
        self.reserve(leading);
        self.cursor -= leading;
        self.emit(&format!(
            "BT /{} {size:.1} Tf {x:.2} {:.2} Td ",
            font.resource(),
            self.cursor
        ));
        self.current.extend(pdf_string(text));
        self.emit(" Tj ET\n");
    }

    /// Regular prefix followed by a bold value on the same line.
    fn labelled(&mut self, size: f64, label: &str, value: &str) {
        let leading = size * 1.4;
        self.reserve(leading);
        self.cursor -= leading;
        self.emit(&format!(
            "BT /{} {size:.1} Tf {MARGIN:.2} {:.2} Td ",
            Font::Regular.resource(),
            self.cursor
        ));
        self.current.extend(pdf_string(label));
        self.emit(&format!(" Tj /{} {size:.1} Tf ", Font::Bold.resource()));
        self.current.extend(pdf_string(value));
        self.emit(" Tj ET\n");
    }

    fn paragraph(&mut self, font: Font, size: f64, text: &str) {
        let max_chars = ((PAGE_WIDTH - 2.0 * MARGIN) / (size * GLYPH_WIDTH)) as usize;
        for line in wrap(text, max_chars) {
            self.line(font, size, &line);
        }
    }

    fn chart(&mut self, chart: &ChartPayload) {
        let height = CHART_SIDE * 3f64.sqrt() / 2.0;
        self.reserve(height + 50.0);
        self.cursor -= 20.0;
        let apex_y = self.cursor;
        let base_y = apex_y - height;
        let left = (PAGE_WIDTH - CHART_SIDE) / 2.0;
        let to_page =
            |point: PlotCoordinate| (left + point.x * CHART_SIDE, base_y + point.y * height);

        self.emit("q 0.75 G 0.4 w\n");
        for step in 1..10u8 {
            let share = f64::from(step) * 10.0;
            for axis in Axis::ordered() {
                let (start, end) = gridline(axis, share);
                let (x1, y1) = to_page(start);
                let (x2, y2) = to_page(end);
                self.emit(&format!("{x1:.2} {y1:.2} m {x2:.2} {y2:.2} l S\n"));
            }
        }
        self.emit("Q\n");

        let apex = to_page(PlotCoordinate { x: 0.5, y: 1.0 });
        let left_corner = to_page(PlotCoordinate { x: 0.0, y: 0.0 });
        let right_corner = to_page(PlotCoordinate { x: 1.0, y: 0.0 });
        self.emit(&format!(
            "0 G 1.2 w {:.2} {:.2} m {:.2} {:.2} l {:.2} {:.2} l h S\n",
            apex.0, apex.1, left_corner.0, left_corner.1, right_corner.0, right_corner.1
        ));

        self.text_at(Font::Regular, 10.0, apex.0 - 25.0, apex.1 + 8.0, Axis::PreModern.label());
        self.text_at(Font::Regular, 10.0, left_corner.0 - 20.0, left_corner.1 - 16.0, Axis::Modern.label());
        self.text_at(Font::Regular, 10.0, right_corner.0 - 30.0, right_corner.1 - 16.0, Axis::PostModern.label());

        self.emit("0 0 1 rg\n");
        for point in chart.individual_points.iter().filter_map(|point| project(*point)) {
            let (x, y) = to_page(point);
            self.circle(x, y, 3.5);
        }

        if let Some(aggregate) = project(chart.aggregate_point) {
            let (x, y) = to_page(aggregate);
            self.emit("1 0 0 rg\n");
            let points = star_points(x, y, 8.0, 3.5);
            if let Some((first, rest)) = points.split_first() {
                self.emit(&format!("{:.2} {:.2} m ", first.0, first.1));
                for (px, py) in rest {
                    self.emit(&format!("{px:.2} {py:.2} l "));
                }
                self.emit("h f\n");
            }
        }
        self.emit("0 0 0 rg\n");

        self.cursor = base_y - 20.0;
        self.centered(Font::Regular, 9.0, &annotation(&chart.aggregate_point));
    }

    fn text_at(&mut self, font: Font, size: f64, x: f64, y: f64, text: &str) {
        self.emit(&format!("BT /{} {size:.1} Tf {x:.2} {y:.2} Td ", font.resource()));
        self.current.extend(pdf_string(text));
        self.emit(" Tj ET\n");
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64) {
        // four cubic Bezier arcs
        let k = 0.5523 * r;
        self.emit(&format!(
            "{:.2} {:.2} m {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c f\n",
            cx + r, cy,
            cx + r, cy + k, cx + k, cy + r, cx, cy + r,
            cx - k, cy + r, cx - r, cy + k, cx - r, cy,
            cx - r, cy - k, cx - k, cy - r, cx, cy - r,
            cx + k, cy - r, cx + r, cy - k, cx + r, cy,
        ));
    }

    fn emit(&mut self, ops: &str) {
        self.current.extend_from_slice(ops.as_bytes());
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

fn estimate_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * GLYPH_WIDTH
}

/// Greedy word wrap on character counts.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Literal string in WinAnsiEncoding with PDF escapes; characters outside
/// the encoding become `?`.
fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            '\n' | '\r' => out.push(b' '),
            _ => out.push(win_ansi_byte(ch).unwrap_or(b'?')),
        }
    }
    out.push(b')');
    out
}

/// WinAnsi code for `ch`. Latin-1 maps to itself except 0x80..=0x9F, which
/// WinAnsi assigns to punctuation and a few extra letters.
fn win_ansi_byte(ch: char) -> Option<u8> {
    let byte = match ch {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        '\u{0080}'..='\u{009F}' => return None,
        other => return u8::try_from(u32::from(other)).ok(),
    };
    Some(byte)
}

fn write_document(pages: &[Vec<u8>]) -> Vec<u8> {
    let first_page_object = 3 + Font::all().len();
    let kids: Vec<String> = (0..pages.len())
        .map(|index| format!("{} 0 R", first_page_object + index * 2))
        .collect();

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
    ];
    for font in Font::all() {
        objects.push(
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            )
            .into_bytes(),
        );
    }

    let font_resources: Vec<String> = Font::all()
        .iter()
        .enumerate()
        .map(|(index, font)| format!("/{} {} 0 R", font.resource(), 3 + index))
        .collect();

    for (index, content) in pages.iter().enumerate() {
        let content_object = first_page_object + index * 2 + 1;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] /Resources << /Font << {} >> >> /Contents {content_object} 0 R >>",
                font_resources.join(" ")
            )
            .into_bytes(),
        );

        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}
