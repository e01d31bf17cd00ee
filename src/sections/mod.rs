//! The content sections of a report, in the order they appear.

mod cover;
mod detail;
mod introduction;
mod not_found;
mod overview;
mod summary;
mod toc;
mod top_pathways;

use std::time::Instant;

use crate::context::ReportContext;
use crate::error::Error;
use crate::model::{Paragraph, Run};
use crate::pdf::ReportDocument;
use crate::raster::ImageAdapters;

pub(crate) const INTRODUCTION: &str = "introduction";
pub(crate) const SUMMARY: &str = "summary";
pub(crate) const OVERVIEW: &str = "overview";
pub(crate) const TOP_PATHWAYS: &str = "top-pathways";
pub(crate) const PATHWAY_DETAILS: &str = "pathway-details";
pub(crate) const NOT_FOUND: &str = "not-found";

pub(crate) const ANALYSIS_URL: &str = "https://reactome.org/PathwayBrowser/#/DTAB=AN&ANALYSIS=";
pub(crate) const PATHWAY_URL: &str = "https://reactome.org/content/detail/";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    CoverPage,
    TableOfContents,
    Introduction,
    ParameterSummary,
    Overview,
    TopPathwayTable,
    PathwayDetail,
    IdentifiersNotFound,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::CoverPage,
        Section::TableOfContents,
        Section::Introduction,
        Section::ParameterSummary,
        Section::Overview,
        Section::TopPathwayTable,
        Section::PathwayDetail,
        Section::IdentifiersNotFound,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::CoverPage => "cover page",
            Section::TableOfContents => "table of contents",
            Section::Introduction => "introduction",
            Section::ParameterSummary => "parameter and result summary",
            Section::Overview => "overview",
            Section::TopPathwayTable => "top pathway table",
            Section::PathwayDetail => "pathway detail",
            Section::IdentifiersNotFound => "identifiers not found",
        }
    }

    /// Append this section to `doc`.
    pub fn render(
        self,
        doc: &mut ReportDocument<'_>,
        ctx: &ReportContext<'_>,
        images: &ImageAdapters,
    ) -> Result<(), Error> {
        match self {
            Section::CoverPage => cover::render(doc, ctx),
            Section::TableOfContents => toc::render(doc, ctx),
            Section::Introduction => introduction::render(doc, ctx),
            Section::ParameterSummary => summary::render(doc, ctx),
            Section::Overview => overview::render(doc, ctx, images),
            Section::TopPathwayTable => top_pathways::render(doc, ctx),
            Section::PathwayDetail => detail::render(doc, ctx, images),
            Section::IdentifiersNotFound => not_found::render(doc, ctx),
        }
    }
}

/// Runs sections in order against one document. The first failure stops the
/// run; the document is then incomplete and must be discarded.
#[derive(Clone, Debug)]
pub struct SectionPipeline {
    sections: Vec<Section>,
}

impl Default for SectionPipeline {
    fn default() -> Self {
        Self {
            sections: Section::ALL.to_vec(),
        }
    }
}

impl SectionPipeline {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn run(
        &self,
        doc: &mut ReportDocument<'_>,
        ctx: &ReportContext<'_>,
        images: &ImageAdapters,
    ) -> Result<(), Error> {
        for &section in &self.sections {
            let t0 = Instant::now();
            let first_page = doc.page_number();
            section.render(doc, ctx, images).map_err(|e| match e {
                Error::Section { .. } => e,
                other => Error::Section {
                    section: section.name(),
                    message: other.to_string(),
                },
            })?;
            log::debug!(
                "section {}: pages {}..{} → {:.1}ms",
                section.name(),
                first_page,
                doc.page_number(),
                t0.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(())
    }
}

/// A body-text paragraph in the profile's paragraph size.
pub(crate) fn body(doc: &ReportDocument<'_>, text: impl Into<String>) -> Paragraph {
    Paragraph::new(vec![Run::new(text, doc.profile().font_size.p)])
}

/// Scientific notation for p-values and FDRs, plain for everything else.
pub(crate) fn format_probability(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() < 1e-3 {
        format!("{value:.2e}")
    } else {
        format!("{value:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_switch_to_scientific_below_a_thousandth() {
        assert_eq!(format_probability(0.0), "0");
        assert_eq!(format_probability(0.04321), "0.0432");
        assert_eq!(format_probability(0.000123), "1.23e-4");
    }

    #[test]
    fn default_pipeline_has_the_fixed_order() {
        let pipeline = SectionPipeline::default();
        assert_eq!(pipeline.sections().first(), Some(&Section::CoverPage));
        assert_eq!(pipeline.sections().last(), Some(&Section::IdentifiersNotFound));
        assert_eq!(pipeline.sections().len(), 8);
    }
}
