use std::fmt;

use crate::analysis::{AnalysisResult, PathwayNode, SpeciesId};
use crate::error::Error;
use crate::pagination::PageWindow;

/// What the caller asked for. Everything except the token is advisory and
/// may be corrected while the [`ReportContext`] is built.
#[derive(Clone, Debug)]
pub struct ReportRequest {
    pub token: String,
    pub resource: String,
    pub species: Option<SpeciesId>,
    /// Index of the first pathway to detail.
    pub offset: usize,
    /// Number of pathways to detail; the layout profile decides when unset.
    pub pathways: Option<usize>,
}

impl ReportRequest {
    pub fn new(token: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            resource: resource.into(),
            species: None,
            offset: 0,
            pathways: None,
        }
    }

    pub fn species(mut self, species: SpeciesId) -> Self {
        self.species = Some(species);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn pathways(mut self, count: usize) -> Self {
        self.pathways = Some(count);
        self
    }
}

/// A correction applied to the request. Fallbacks never fail a render; they
/// are logged and handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fallback {
    Resource { requested: String, used: String },
    Species { used: SpeciesId },
    PathwayCount { requested: usize, used: usize },
    Offset { requested: usize },
    Profile { reason: String },
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Resource { requested, used } => {
                write!(f, "resource '{requested}' is not in this analysis, using '{used}'")
            }
            Fallback::Species { used } => write!(f, "no species given, using {used}"),
            Fallback::PathwayCount { requested, used } => {
                write!(f, "{requested} pathways requested, showing {used}")
            }
            Fallback::Offset { requested } => {
                write!(f, "offset {requested} is out of range, starting at 0")
            }
            Fallback::Profile { reason } => write!(f, "using default layout: {reason}"),
        }
    }
}

/// Everything a section needs to know about the analysis being reported.
/// Built once per render and shared read-only by all sections.
pub struct ReportContext<'a> {
    pub result: &'a AnalysisResult,
    /// Always one of `result.resource_summary`.
    pub resource: String,
    pub species: SpeciesId,
    pub species_name: String,
    /// Pathways of `species` hit in `resource`, best p-value first.
    pub pathways: Vec<&'a PathwayNode>,
    pub window: PageWindow,
}

impl<'a> ReportContext<'a> {
    /// Validate `request` against `result`, substituting defaults where the
    /// request cannot be honoured. `default_count` is used when the request
    /// does not say how many pathways to detail.
    pub fn build(
        result: &'a AnalysisResult,
        request: &ReportRequest,
        default_count: usize,
    ) -> Result<(Self, Vec<Fallback>), Error> {
        let mut fallbacks = Vec::new();

        let species = match request.species {
            Some(species) => species,
            None => {
                log::warn!("No species requested, using {}", SpeciesId::DEFAULT);
                fallbacks.push(Fallback::Species {
                    used: SpeciesId::DEFAULT,
                });
                SpeciesId::DEFAULT
            }
        };

        let resource = match result.resource(&request.resource) {
            Some(summary) => summary.resource.clone(),
            None => {
                let used = default_resource(result)?.to_string();
                log::warn!(
                    "Resource '{}' not in analysis {}, using '{used}'",
                    request.resource,
                    result.summary.token
                );
                fallbacks.push(Fallback::Resource {
                    requested: request.resource.clone(),
                    used: used.clone(),
                });
                used
            }
        };

        let species_name = result
            .species_name(species)
            .map(str::to_string)
            .unwrap_or_else(|| format!("species {species}"));

        let pathways = result.filter_by_species(species, &resource);
        let count = request.pathways.unwrap_or(default_count);
        let (window, window_fallbacks) = PageWindow::resolve(request.offset, count, pathways.len());
        fallbacks.extend(window_fallbacks);

        log::debug!(
            "Report context: resource={resource} species={species} pathways={} window={}..{}",
            pathways.len(),
            window.offset,
            window.offset + window.count
        );

        Ok((
            ReportContext {
                result,
                resource,
                species,
                species_name,
                pathways,
                window,
            },
            fallbacks,
        ))
    }

    pub fn token(&self) -> &str {
        &self.result.summary.token
    }

    /// The pathways selected by the page window.
    pub fn window_pathways(&self) -> &[&'a PathwayNode] {
        &self.pathways[self.window.range()]
    }
}

/// The first summary is the aggregate `TOTAL` whenever there is more than
/// one, so a two-entry result has exactly one real resource: the second.
fn default_resource(result: &AnalysisResult) -> Result<&str, Error> {
    let summary = &result.resource_summary;
    match summary.len() {
        0 => Err(Error::InvalidResult(format!(
            "analysis {} has no resource summaries",
            result.summary.token
        ))),
        2 => Ok(&summary[1].resource),
        _ => Ok(&summary[0].resource),
    }
}
