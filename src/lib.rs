//! Paginated PDF reports for pathway over-representation analyses.
//!
//! A [`ReportExporter`] resolves an analysis token through an
//! [`AnalysisStore`], validates the requested resource, species and page
//! window, and runs the report sections into one PDF written to any
//! [`std::io::Write`]. Diagram and overview bitmaps come from external
//! rasterizers; a missing bitmap never fails a report.

pub mod analysis;
pub mod context;
mod error;
pub mod fonts;
pub mod model;
pub mod pagination;
pub mod pdf;
pub mod profile;
pub mod raster;
pub mod sections;
pub mod store;

pub use analysis::{AnalysisResult, SpeciesId};
pub use context::{Fallback, ReportContext, ReportRequest};
pub use error::Error;
pub use fonts::FontLibrary;
pub use profile::{LayoutProfile, ProfileSource};
pub use raster::{DiagramRasterizer, ImageAdapters, OverviewRasterizer, RasterError, RasterImage};
pub use store::{AnalysisStore, JsonAnalysisStore};

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::pdf::{PageFooter, ReportDocument};
use crate::raster::{DiagramAdapter, OverviewAdapter, PrerenderedDiagrams, PrerenderedOverviews};
use crate::sections::SectionPipeline;

/// Directories an exporter reads from.
#[derive(Clone, Debug, Default)]
pub struct ExporterConfig {
    /// Stored analyses, one `<token>.json` per analysis.
    pub analysis_dir: PathBuf,
    pub raster: RasterPaths,
    /// OpenSans faces; the base-14 Helvetica family when unset.
    pub font_dir: Option<PathBuf>,
    pub profile: ProfileSource,
}

/// Pre-rendered bitmaps. A missing directory disables that kind of image.
#[derive(Clone, Debug, Default)]
pub struct RasterPaths {
    pub diagrams: Option<PathBuf>,
    /// Enhanced high-level diagrams, preferred over plain ones.
    pub ehld: Option<PathBuf>,
    pub fireworks: Option<PathBuf>,
}

/// What a successful render produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSummary {
    pub pages: usize,
    pub bytes: usize,
    pub pathways_detailed: usize,
    /// Bitmaps embedded in the document.
    pub images: usize,
    pub missing_images: usize,
    /// Internal links whose target was never laid out.
    pub unresolved_links: usize,
    /// Every default substituted for the request or the configuration.
    pub fallbacks: Vec<Fallback>,
}

/// Renders reports. Holds only immutable, shared state, so one exporter can
/// serve any number of renders, concurrently or not.
#[derive(Clone)]
pub struct ReportExporter {
    store: Arc<dyn AnalysisStore>,
    images: ImageAdapters,
    fonts: Arc<FontLibrary>,
    profile: ProfileSource,
    pipeline: SectionPipeline,
}

impl ReportExporter {
    /// An exporter with the built-in fonts, the default profile and no
    /// rasterizers.
    pub fn new(store: Arc<dyn AnalysisStore>) -> Self {
        Self {
            store,
            images: ImageAdapters::default(),
            fonts: Arc::new(FontLibrary::builtin()),
            profile: ProfileSource::default(),
            pipeline: SectionPipeline::default(),
        }
    }

    /// Fonts are loaded here, so a bad font directory fails construction
    /// rather than the first render.
    pub fn from_config(config: &ExporterConfig) -> Result<Self, Error> {
        let fonts = match &config.font_dir {
            Some(dir) => FontLibrary::from_dir(dir)?,
            None => FontLibrary::builtin(),
        };
        let mut exporter = Self::new(Arc::new(JsonAnalysisStore::new(&config.analysis_dir)))
            .fonts(Arc::new(fonts))
            .profile(config.profile.clone());

        if config.raster.diagrams.is_some() || config.raster.ehld.is_some() {
            let mut diagrams = PrerenderedDiagrams::new(
                config
                    .raster
                    .diagrams
                    .clone()
                    .or_else(|| config.raster.ehld.clone())
                    .unwrap_or_default(),
            );
            if let Some(ehld) = &config.raster.ehld {
                diagrams = diagrams.with_ehld(ehld);
            }
            exporter = exporter.diagrams(Arc::new(diagrams));
        }
        if let Some(dir) = &config.raster.fireworks {
            exporter = exporter.overviews(Arc::new(PrerenderedOverviews::new(dir)));
        }
        Ok(exporter)
    }

    pub fn diagrams(mut self, engine: Arc<dyn DiagramRasterizer>) -> Self {
        self.images.diagrams = DiagramAdapter::new(engine);
        self
    }

    pub fn overviews(mut self, engine: Arc<dyn OverviewRasterizer>) -> Self {
        self.images.overviews = OverviewAdapter::new(engine);
        self
    }

    pub fn fonts(mut self, fonts: Arc<FontLibrary>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn profile(mut self, profile: ProfileSource) -> Self {
        self.profile = profile;
        self
    }

    pub fn pipeline(mut self, pipeline: SectionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Resolve `request.token` through the store and render its report.
    pub fn render_token(
        &self,
        request: &ReportRequest,
        destination: &mut impl Write,
    ) -> Result<RenderSummary, Error> {
        let t0 = Instant::now();
        let result = self.store.load(&request.token)?;
        log::debug!(
            "Loaded analysis {} in {:.1}ms",
            request.token,
            t0.elapsed().as_secs_f64() * 1000.0
        );
        self.render_result(&result, request, destination)
    }

    /// Render the report for an already loaded result. Nothing is written to
    /// `destination` unless every section succeeds.
    pub fn render_result(
        &self,
        result: &AnalysisResult,
        request: &ReportRequest,
        destination: &mut impl Write,
    ) -> Result<RenderSummary, Error> {
        let t0 = Instant::now();

        let (profile, profile_fallback) = self.profile.load();
        let mut fallbacks: Vec<Fallback> = profile_fallback.into_iter().collect();
        let (ctx, context_fallbacks) =
            ReportContext::build(result, request, profile.pathways_to_show)?;
        fallbacks.extend(context_fallbacks);
        let t_context = t0.elapsed();

        let footer = PageFooter {
            label: format!("Pathway analysis report | {}", ctx.token()),
            font_size: profile.font_size.p * 0.8,
        };
        let title = format!("Pathway analysis report {}", ctx.token());
        let mut doc = ReportDocument::open(&self.fonts, profile, title, footer)?;
        self.pipeline.run(&mut doc, &ctx, &self.images)?;
        let t_sections = t0.elapsed();

        let finished = doc.finish()?;
        let t_finish = t0.elapsed();

        destination.write_all(&finished.bytes)?;
        destination.flush()?;
        let t_total = t0.elapsed();

        log::info!(
            "Timing: context={:.1}ms, sections={:.1}ms, finish={:.1}ms, write={:.1}ms, total={:.1}ms ({} pages, {} bytes)",
            t_context.as_secs_f64() * 1000.0,
            (t_sections - t_context).as_secs_f64() * 1000.0,
            (t_finish - t_sections).as_secs_f64() * 1000.0,
            (t_total - t_finish).as_secs_f64() * 1000.0,
            t_total.as_secs_f64() * 1000.0,
            finished.pages,
            finished.bytes.len(),
        );

        Ok(RenderSummary {
            pages: finished.pages,
            bytes: finished.bytes.len(),
            pathways_detailed: ctx.window.count,
            images: finished.images,
            missing_images: finished.missing_images,
            unresolved_links: finished.unresolved_links,
            fallbacks,
        })
    }
}
