//! Analysis results as produced by the enrichment service.
//!
//! These types are owned by the caller (or loaded through an
//! [`AnalysisStore`](crate::store::AnalysisStore)) and are never mutated
//! while a report is rendered.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the aggregate pseudo-resource that sums every identifier namespace.
pub const TOTAL_RESOURCE: &str = "TOTAL";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u64);

impl SpeciesId {
    /// Homo sapiens.
    pub const DEFAULT: SpeciesId = SpeciesId(48887);
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: AnalysisSummary,
    pub resource_summary: Vec<ResourceSummary>,
    #[serde(default)]
    pub pathways: Vec<PathwayNode>,
    #[serde(default)]
    pub found_entities: Vec<FoundEntity>,
    #[serde(default)]
    pub not_found: Vec<Identifier>,
    #[serde(default)]
    pub expression: Option<ExpressionSummary>,
    #[serde(default)]
    pub species: Vec<SpeciesSummary>,
    pub data_version: u32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub token: String,
    /// OVERREPRESENTATION, EXPRESSION, SPECIES_COMPARISON, ...
    #[serde(rename = "type")]
    pub analysis_type: String,
    #[serde(default)]
    pub sample_name: Option<String>,
    #[serde(default)]
    pub projection: bool,
    #[serde(default)]
    pub interactors: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub resource: String,
    pub pathways: usize,
    #[serde(default)]
    pub filtered: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesSummary {
    pub db_id: SpeciesId,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayNode {
    pub st_id: String,
    pub db_id: u64,
    pub name: String,
    pub species: SpeciesSummary,
    /// Lowest-level pathway (no sub-pathways).
    #[serde(default)]
    pub llp: bool,
    #[serde(default)]
    pub in_disease: bool,
    #[serde(default)]
    pub inferred: bool,
    /// Stable id of the diagram this pathway is drawn in. Equal to `st_id`
    /// for pathways with their own diagram, a parent's id for sub-pathways.
    #[serde(default)]
    pub diagram: Option<String>,
    #[serde(default)]
    pub summation: Option<String>,
    pub entities: Vec<EntityStatistics>,
    #[serde(default)]
    pub reactions: Vec<ReactionStatistics>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStatistics {
    pub resource: String,
    pub found: usize,
    pub total: usize,
    pub ratio: f64,
    pub p_value: f64,
    pub fdr: f64,
    #[serde(default)]
    pub exp: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionStatistics {
    pub resource: String,
    pub found: usize,
    pub total: usize,
    pub ratio: f64,
}

/// A submitted identifier together with what it mapped to.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundEntity {
    pub id: String,
    #[serde(default)]
    pub exp: Vec<f64>,
    pub maps_to: Vec<MapsTo>,
    /// Stable ids of the pathways this identifier hits.
    #[serde(default)]
    pub pathways: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsTo {
    pub resource: String,
    pub ids: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub id: String,
    #[serde(default)]
    pub exp: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionSummary {
    pub column_names: Vec<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl AnalysisResult {
    /// Case-insensitive lookup in the resource summaries.
    pub fn resource(&self, name: &str) -> Option<&ResourceSummary> {
        self.resource_summary
            .iter()
            .find(|r| r.resource.eq_ignore_ascii_case(name))
    }

    pub fn species_name(&self, species: SpeciesId) -> Option<&str> {
        self.species
            .iter()
            .chain(self.pathways.iter().map(|p| &p.species))
            .find(|s| s.db_id == species)
            .map(|s| s.name.as_str())
    }

    /// Pathways of `species` with at least one hit for `resource`, ordered by
    /// entity p-value (ties keep their stored order).
    pub fn filter_by_species(&self, species: SpeciesId, resource: &str) -> Vec<&PathwayNode> {
        let mut hits: Vec<&PathwayNode> = self
            .pathways
            .iter()
            .filter(|p| p.species.db_id == species)
            .filter(|p| p.entities_for(resource).is_some_and(|e| e.found > 0))
            .collect();
        hits.sort_by(|a, b| {
            let pa = a.entities_for(resource).map_or(f64::INFINITY, |e| e.p_value);
            let pb = b.entities_for(resource).map_or(f64::INFINITY, |e| e.p_value);
            pa.total_cmp(&pb)
        });
        hits
    }

    /// Submitted identifiers hitting `pathway`, each with the ids it mapped
    /// to in `resource` (all resources for `TOTAL`).
    pub fn identifiers_in<'a>(
        &'a self,
        pathway: &str,
        resource: &str,
    ) -> Vec<(&'a FoundEntity, Vec<&'a str>)> {
        let all = resource.eq_ignore_ascii_case(TOTAL_RESOURCE);
        self.found_entities
            .iter()
            .filter(|e| e.pathways.iter().any(|p| p == pathway))
            .filter_map(|e| {
                let ids: Vec<&str> = e
                    .maps_to
                    .iter()
                    .filter(|m| all || m.resource.eq_ignore_ascii_case(resource))
                    .flat_map(|m| m.ids.iter().map(String::as_str))
                    .collect();
                (!ids.is_empty()).then_some((e, ids))
            })
            .collect()
    }
}

impl PathwayNode {
    pub fn entities_for(&self, resource: &str) -> Option<&EntityStatistics> {
        self.entities
            .iter()
            .find(|e| e.resource.eq_ignore_ascii_case(resource))
    }

    pub fn reactions_for(&self, resource: &str) -> Option<&ReactionStatistics> {
        self.reactions
            .iter()
            .find(|r| r.resource.eq_ignore_ascii_case(resource))
    }

    /// Named destination of this pathway's detail page.
    pub fn destination(&self) -> String {
        format!("pathway-{}", self.st_id)
    }
}
