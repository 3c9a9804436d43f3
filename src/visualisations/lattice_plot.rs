use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;

use crate::errors::{LatticeError, LatticeResult};
use crate::models::lattice::LatticeParameters;
use crate::visualisations::graph::{LatticeGraph, HORIZONTAL_SPACING};

/// Above this many steps nodes and labels are drawn smaller.
pub const LARGE_LATTICE_STEPS: usize = 5;

const TITLE_HEIGHT: i32 = 110;
const STEP_LABEL_OFFSET: f64 = 1.0;
const MARGIN: f64 = 1.0;
const FONT: &str = "sans-serif";

/// Export canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self { width: 2000, height: 1200 }
    }
}

impl FigureSize {
    pub fn new(width: u32, height: u32) -> LatticeResult<Self> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    /// The canvas needs some width and room for the lattice below the title.
    pub fn validate(&self) -> LatticeResult<()> {
        if self.width == 0 || self.height <= TITLE_HEIGHT as u32 {
            return Err(LatticeError::InvalidParameter {
                name: "figure_size",
                reason: format!(
                    "{}x{} is too small (height must exceed {TITLE_HEIGHT} pixels)",
                    self.width, self.height
                ),
            });
        }
        Ok(())
    }
}

/// Pixel sizes of node boxes and their labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub side: i32,
    pub font_size: u32,
    pub step_font_size: u32,
}

impl NodeStyle {
    pub fn for_steps(steps: usize) -> Self {
        if steps <= LARGE_LATTICE_STEPS {
            Self { side: 72, font_size: 16, step_font_size: 20 }
        } else {
            Self { side: 60, font_size: 12, step_font_size: 20 }
        }
    }
}

/// A rendered lattice diagram. Export it with [`LatticeFigure::to_svg`],
/// [`LatticeFigure::save`] or draw it onto any plotters area.
#[derive(Debug, Clone)]
pub struct LatticeFigure {
    params: LatticeParameters,
    graph: LatticeGraph,
    style: NodeStyle,
}

/// Builds the diagram for `params`. Fails before drawing anything when the
/// parameters are rejected by the generator.
pub fn render_lattice(params: &LatticeParameters) -> LatticeResult<LatticeFigure> {
    let graph = LatticeGraph::build(params)?;
    tracing::info!(
        steps = params.steps,
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        "rendered price lattice"
    );
    Ok(LatticeFigure {
        params: *params,
        style: NodeStyle::for_steps(params.steps),
        graph,
    })
}

fn render_err<E: std::fmt::Display>(e: E) -> LatticeError {
    LatticeError::Render(e.to_string())
}

fn centered(size: u32, style: FontStyle) -> TextStyle<'static> {
    (FONT, size, style)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

impl LatticeFigure {
    pub fn params(&self) -> &LatticeParameters {
        &self.params
    }

    pub fn graph(&self) -> &LatticeGraph {
        &self.graph
    }

    pub fn style(&self) -> NodeStyle {
        self.style
    }

    pub fn title_lines(&self) -> [String; 2] {
        let p = &self.params;
        [
            "Binomial Price Lattice".to_string(),
            format!(
                "S={}, σ={}, T={}, steps={}",
                p.initial_price, p.volatility, p.time_horizon, p.steps
            ),
        ]
    }

    /// Draws the full diagram: edges, node boxes, price labels, step
    /// annotations and the title. No axes.
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> LatticeResult<()> {
        root.fill(&WHITE).map_err(render_err)?;

        let (title_area, body) = root.split_vertically(TITLE_HEIGHT);
        self.draw_title(&title_area)?;

        // mesh is never configured, so the chart has no axes
        let top = self.graph.max_y() + STEP_LABEL_OFFSET + MARGIN;
        let mut chart = ChartBuilder::on(&body)
            .build_cartesian_2d(
                -MARGIN..(self.graph.max_x() + MARGIN),
                (self.graph.min_y() - MARGIN)..top,
            )
            .map_err(render_err)?;

        chart
            .draw_series(
                self.graph
                    .segments()
                    .map(|(from, to)| PathElement::new(vec![from, to], BLACK.stroke_width(1))),
            )
            .map_err(render_err)?;

        let half = self.style.side / 2;
        let corners = [(-half, -half), (half, half)];
        let label_style = centered(self.style.font_size, FontStyle::Bold);
        chart
            .draw_series(self.graph.nodes().iter().map(|node| {
                EmptyElement::at(node.position())
                    + Rectangle::new(corners, WHITE.filled())
                    + Rectangle::new(corners, BLACK.stroke_width(2))
                    + Text::new(node.label(), (0, 0), label_style.clone())
            }))
            .map_err(render_err)?;

        // step numbers sit in one row above the tallest column
        let step_style = centered(self.style.step_font_size, FontStyle::Bold);
        let label_y = self.graph.max_y() + STEP_LABEL_OFFSET;
        chart
            .draw_series((0..=self.graph.steps()).map(|step| {
                let x = step as f64 * HORIZONTAL_SPACING;
                Text::new(format!("n={step}"), (x, label_y), step_style.clone())
            }))
            .map_err(render_err)?;

        Ok(())
    }

    fn draw_title<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> LatticeResult<()> {
        let (width, height) = area.dim_in_pixel();
        let center = width as i32 / 2;
        let [heading, summary] = self.title_lines();

        area.draw_text(&heading, &centered(30, FontStyle::Normal), (center, height as i32 / 3))
            .map_err(render_err)?;
        area.draw_text(
            &summary,
            &centered(22, FontStyle::Normal),
            (center, 2 * height as i32 / 3),
        )
        .map_err(render_err)?;
        Ok(())
    }

    pub fn to_svg(&self, size: FigureSize) -> LatticeResult<String> {
        size.validate()?;
        let mut svg = String::new();
        {
            let root =
                SVGBackend::with_string(&mut svg, (size.width, size.height)).into_drawing_area();
            self.draw(&root)?;
            root.present().map_err(render_err)?;
        }
        Ok(svg)
    }

    /// Writes the diagram to `path`: SVG for `.svg`, PNG for `.png`.
    pub fn save(&self, path: &Path, size: FigureSize) -> LatticeResult<()> {
        size.validate()?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "svg" => {
                let root = SVGBackend::new(path, (size.width, size.height)).into_drawing_area();
                self.draw(&root)?;
                root.present().map_err(render_err)?;
            }
            "png" => {
                let root = BitMapBackend::new(path, (size.width, size.height)).into_drawing_area();
                self.draw(&root)?;
                root.present().map_err(render_err)?;
            }
            _ => return Err(LatticeError::UnsupportedFormat(path.display().to_string())),
        }

        tracing::info!(path = %path.display(), "lattice diagram saved");
        Ok(())
    }
}
