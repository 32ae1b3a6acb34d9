use super::super::domain::{Axis, ScoreTriple};
use super::super::report::ChartPayload;
use super::super::scoring::{project, PlotCoordinate};
use super::{ChartRenderer, Rendered};

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 600.0;
const SIDE: f64 = 440.0;
const LEFT: f64 = 80.0;
const BASELINE: f64 = 470.0;

/// Ternary scatter chart: PreModern at the apex, Modern bottom-left,
/// PostModern bottom-right, gridlines every 10%.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgTernaryChart;

impl SvgTernaryChart {
    pub fn to_svg(&self, chart: &ChartPayload) -> String {
        let mut svg = String::new();
        push_line(
            &mut svg,
            &format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
            ),
        );
        push_line(&mut svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

        for step in 1..10u8 {
            let share = f64::from(step) * 10.0;
            for axis in Axis::ordered() {
                let (start, end) = gridline(axis, share);
                let (start, end) = (to_canvas(start), to_canvas(end));
                push_line(
                    &mut svg,
                    &format!(
                        r##"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="#b0b0b0" stroke-width="0.5"/>"##,
                        start.0, start.1, end.0, end.1
                    ),
                );
            }
        }

        let [apex, left, right] = corners();
        push_line(
            &mut svg,
            &format!(
                r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="none" stroke="black" stroke-width="1.5"/>"#,
                apex.0, apex.1, left.0, left.1, right.0, right.1
            ),
        );

        let labels = [
            (apex.0, apex.1 - 14.0, Axis::PreModern),
            (left.0, left.1 + 24.0, Axis::Modern),
            (right.0, right.1 + 24.0, Axis::PostModern),
        ];
        for (x, y, axis) in labels {
            push_line(
                &mut svg,
                &format!(
                    r#"<text x="{x:.2}" y="{y:.2}" font-size="14" text-anchor="middle">{axis}</text>"#
                ),
            );
        }

        for point in chart.individual_points.iter().filter_map(|point| project(*point)) {
            let (x, y) = to_canvas(point);
            push_line(
                &mut svg,
                &format!(
                    r#"<circle class="individual" cx="{x:.2}" cy="{y:.2}" r="5" fill="blue" fill-opacity="0.7"/>"#
                ),
            );
        }

        if let Some(aggregate) = project(chart.aggregate_point) {
            let (x, y) = to_canvas(aggregate);
            let points: Vec<String> = star_points(x, y, 12.0, 5.0)
                .into_iter()
                .map(|(px, py)| format!("{px:.2},{py:.2}"))
                .collect();
            push_line(
                &mut svg,
                &format!(
                    r#"<polygon class="aggregate" points="{}" fill="red"/>"#,
                    points.join(" ")
                ),
            );
        }

        push_line(
            &mut svg,
            &format!(
                r#"<text x="{:.2}" y="{:.2}" font-size="12" text-anchor="middle" fill="red">{}</text>"#,
                WIDTH / 2.0,
                BASELINE + 60.0,
                annotation(&chart.aggregate_point)
            ),
        );
        svg.push_str("</svg>\n");
        svg
    }
}

impl ChartRenderer for SvgTernaryChart {
    fn render(&self, chart: &ChartPayload) -> Rendered {
        Rendered {
            content_type: mime::IMAGE_SVG,
            file_name: "worldview_chart.svg",
            bytes: self.to_svg(chart).into_bytes(),
        }
    }
}

fn push_line(svg: &mut String, element: &str) {
    svg.push_str(element);
    svg.push('\n');
}

pub(crate) fn annotation(point: &ScoreTriple) -> String {
    format!(
        "PreModern: {:.2}, Modern: {:.2}, PostModern: {:.2}",
        point.pre_modern, point.modern, point.post_modern
    )
}

/// Endpoints, in plot space, of the line where `axis` holds `share` percent.
pub(crate) fn gridline(axis: Axis, share: f64) -> (PlotCoordinate, PlotCoordinate) {
    let rest = 100.0 - share;
    let (start, end) = match axis {
        Axis::PreModern => (
            ScoreTriple::new(share, rest, 0.0),
            ScoreTriple::new(share, 0.0, rest),
        ),
        Axis::Modern => (
            ScoreTriple::new(rest, share, 0.0),
            ScoreTriple::new(0.0, share, rest),
        ),
        Axis::PostModern => (
            ScoreTriple::new(rest, 0.0, share),
            ScoreTriple::new(0.0, rest, share),
        ),
    };
    let origin = PlotCoordinate { x: 0.0, y: 0.0 };
    (
        project(start).unwrap_or(origin),
        project(end).unwrap_or(origin),
    )
}

fn corners() -> [(f64, f64); 3] {
    [
        to_canvas(PlotCoordinate { x: 0.5, y: 1.0 }),
        to_canvas(PlotCoordinate { x: 0.0, y: 0.0 }),
        to_canvas(PlotCoordinate { x: 1.0, y: 0.0 }),
    ]
}

/// SVG y grows downwards, so the apex gets the smallest y.
fn to_canvas(point: PlotCoordinate) -> (f64, f64) {
    let height = SIDE * 3f64.sqrt() / 2.0;
    (LEFT + point.x * SIDE, BASELINE - point.y * height)
}

pub(crate) fn star_points(cx: f64, cy: f64, outer: f64, inner: f64) -> Vec<(f64, f64)> {
    (0..10u8)
        .map(|index| {
            let radius = if index % 2 == 0 { outer } else { inner };
            let angle = std::f64::consts::PI / 5.0 * f64::from(index) - std::f64::consts::FRAC_PI_2;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}
