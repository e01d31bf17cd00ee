//! Bitmaps from the external diagram and overview (fireworks) renderers.
//!
//! The renderers themselves live outside this crate behind the
//! [`DiagramRasterizer`] and [`OverviewRasterizer`] traits. The adapters here
//! decide what to ask for and turn every failure into "no image".

mod prerendered;

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use crate::analysis::{AnalysisResult, PathwayNode};
use crate::context::ReportContext;

pub use prerendered::{PrerenderedDiagrams, PrerenderedOverviews};

pub type RasterImage = RgbaImage;

#[derive(Debug)]
pub enum RasterError {
    /// No diagram or layout data for the requested id.
    NotFound(String),
    /// The analysis overlay could not be applied.
    Overlay(String),
    /// The renderer failed for a visualization-specific reason.
    Visualization(String),
    Io(std::io::Error),
    Decode(String),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::NotFound(id) => write!(f, "no visualization data for {id}"),
            RasterError::Overlay(message) => write!(f, "analysis overlay failed: {message}"),
            RasterError::Visualization(message) => write!(f, "rasterization failed: {message}"),
            RasterError::Io(err) => write!(f, "I/O error: {err}"),
            RasterError::Decode(message) => write!(f, "cannot decode bitmap: {message}"),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RasterError {
    fn from(value: std::io::Error) -> Self {
        RasterError::Io(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiagramArgs {
    /// Stable id of the diagram to draw.
    pub diagram: String,
    /// Pathways to highlight when the diagram belongs to a parent pathway.
    pub selected: Vec<String>,
    /// Identifier resource the analysis overlay is filtered by.
    pub resource: String,
    pub token: String,
    pub quality: f32,
    pub write_title: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverviewArgs {
    pub species: String,
    pub resource: String,
    pub token: String,
    pub quality: f32,
    pub color_profile: String,
    pub write_title: bool,
}

pub trait DiagramRasterizer: Send + Sync {
    fn rasterize(&self, args: &DiagramArgs, result: &AnalysisResult)
    -> Result<RasterImage, RasterError>;
}

pub trait OverviewRasterizer: Send + Sync {
    fn rasterize(
        &self,
        args: &OverviewArgs,
        result: &AnalysisResult,
    ) -> Result<RasterImage, RasterError>;
}

const DIAGRAM_QUALITY: f32 = 5.0;
const OVERVIEW_SPECIES: &str = "Homo_sapiens";
const OVERVIEW_QUALITY: f32 = 2.5;
const OVERVIEW_PROFILE: &str = "Copper Plus";

#[derive(Clone, Default)]
pub struct DiagramAdapter {
    engine: Option<Arc<dyn DiagramRasterizer>>,
}

impl DiagramAdapter {
    pub fn new(engine: Arc<dyn DiagramRasterizer>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    pub(crate) fn args(pathway: &PathwayNode, ctx: &ReportContext<'_>) -> Option<DiagramArgs> {
        let diagram = pathway.diagram.clone()?;
        let selected = if diagram == pathway.st_id {
            Vec::new()
        } else {
            vec![pathway.st_id.clone()]
        };
        Some(DiagramArgs {
            diagram,
            selected,
            resource: ctx.resource.clone(),
            token: ctx.token().to_string(),
            quality: DIAGRAM_QUALITY,
            write_title: false,
        })
    }

    /// The pathway's diagram with the analysis overlay, or `None` when the
    /// pathway has no diagram or the renderer fails.
    pub fn diagram(&self, pathway: &PathwayNode, ctx: &ReportContext<'_>) -> Option<RasterImage> {
        let engine = self.engine.as_ref()?;
        let args = Self::args(pathway, ctx)?;
        match engine.rasterize(&args, ctx.result) {
            Ok(img) if img.width() > 0 && img.height() > 0 => Some(img),
            Ok(_) => {
                log::warn!("Diagram {} rendered as an empty bitmap", args.diagram);
                None
            }
            Err(e) => {
                log::warn!(
                    "Diagram {} for pathway {} unavailable: {e}",
                    args.diagram,
                    pathway.st_id
                );
                None
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct OverviewAdapter {
    engine: Option<Arc<dyn OverviewRasterizer>>,
}

impl OverviewAdapter {
    pub fn new(engine: Arc<dyn OverviewRasterizer>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// The overview is always drawn for the default species at a fixed
    /// quality, whatever species the report is filtered by.
    pub(crate) fn args(ctx: &ReportContext<'_>) -> OverviewArgs {
        OverviewArgs {
            species: OVERVIEW_SPECIES.to_string(),
            resource: ctx.resource.clone(),
            token: ctx.token().to_string(),
            quality: OVERVIEW_QUALITY,
            color_profile: OVERVIEW_PROFILE.to_string(),
            write_title: false,
        }
    }

    pub fn overview(&self, ctx: &ReportContext<'_>) -> Option<RasterImage> {
        let engine = self.engine.as_ref()?;
        let args = Self::args(ctx);
        match engine.rasterize(&args, ctx.result) {
            Ok(img) if img.width() > 0 && img.height() > 0 => Some(img),
            Ok(_) => {
                log::warn!("Overview for token {} rendered as an empty bitmap", ctx.token());
                None
            }
            Err(e) => {
                log::error!("Failed to create overview for token {}: {e}", ctx.token());
                None
            }
        }
    }
}

/// Both adapters, as handed to the report sections.
#[derive(Clone, Default)]
pub struct ImageAdapters {
    pub diagrams: DiagramAdapter,
    pub overviews: OverviewAdapter,
}
