#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use pathway_report::analysis::{
    AnalysisSummary, EntityStatistics, FoundEntity, Identifier, MapsTo, PathwayNode,
    ReactionStatistics, ResourceSummary, SpeciesSummary,
};
use pathway_report::raster::{DiagramArgs, OverviewArgs};
use pathway_report::{
    AnalysisResult, AnalysisStore, DiagramRasterizer, Error, OverviewRasterizer, RasterError,
    RasterImage, ReportExporter, SpeciesId,
};

pub const HUMAN: SpeciesId = SpeciesId(48887);
pub const MOUSE: SpeciesId = SpeciesId(10090);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scratch directory: tests/output/<name>/
pub fn output_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(name);
    fs::create_dir_all(&dir).expect("create output dir");
    dir
}

fn species(id: SpeciesId) -> SpeciesSummary {
    let name = if id == MOUSE { "Mus musculus" } else { "Homo sapiens" };
    SpeciesSummary {
        db_id: id,
        name: name.to_string(),
    }
}

fn entities(resource: &str, found: usize, p_value: f64) -> EntityStatistics {
    EntityStatistics {
        resource: resource.to_string(),
        found,
        total: found * 4,
        ratio: found as f64 / 1000.0,
        p_value,
        fdr: (p_value * 3.0).min(1.0),
        exp: Vec::new(),
    }
}

fn pathway(index: usize, species_id: SpeciesId, p_value: f64) -> PathwayNode {
    let prefix = if species_id == MOUSE { "R-MMU" } else { "R-HSA" };
    let st_id = format!("{prefix}-{}", 1000 + index);
    PathwayNode {
        st_id: st_id.clone(),
        db_id: 1000 + index as u64,
        name: format!("Signalling pathway number {index}"),
        species: species(species_id),
        llp: index % 3 == 0,
        in_disease: index % 5 == 0,
        inferred: species_id == MOUSE,
        diagram: (index % 2 == 0).then(|| st_id.clone()),
        summation: Some(format!(
            "Pathway {index} relays signals from the membrane to the nucleus. \
             It involves several kinases and adaptor proteins."
        )),
        entities: vec![
            entities("TOTAL", 3 + index, p_value),
            entities("UNIPROT", 2 + index, p_value),
        ],
        reactions: vec![ReactionStatistics {
            resource: "UNIPROT".to_string(),
            found: 1 + index,
            total: 10 + index,
            ratio: 0.01,
        }],
    }
}

/// An over-representation result with `human` human pathways, two mouse
/// pathways and three resource summaries (TOTAL, UNIPROT, ENSEMBL).
///
/// Pathways are stored in reverse significance order: the last stored
/// human pathway has the smallest p-value.
pub fn sample_result(token: &str, human: usize) -> AnalysisResult {
    let mut pathways: Vec<PathwayNode> = (0..human)
        .map(|i| pathway(i, HUMAN, (human - i) as f64 * 1e-4))
        .collect();
    pathways.push(pathway(900, MOUSE, 1e-9));
    pathways.push(pathway(901, MOUSE, 2e-9));

    let found_entities = pathways
        .iter()
        .map(|p| FoundEntity {
            id: format!("GENE{}", p.db_id),
            exp: Vec::new(),
            maps_to: vec![MapsTo {
                resource: "UNIPROT".to_string(),
                ids: vec![format!("P{:05}", p.db_id)],
            }],
            pathways: vec![p.st_id.clone()],
        })
        .collect();

    AnalysisResult {
        summary: AnalysisSummary {
            token: token.to_string(),
            analysis_type: "OVERREPRESENTATION".to_string(),
            sample_name: Some("test sample".to_string()),
            projection: false,
            interactors: false,
        },
        resource_summary: vec![
            ResourceSummary {
                resource: "TOTAL".to_string(),
                pathways: human + 2,
                filtered: human + 2,
            },
            ResourceSummary {
                resource: "UNIPROT".to_string(),
                pathways: human + 2,
                filtered: human + 2,
            },
            ResourceSummary {
                resource: "ENSEMBL".to_string(),
                pathways: 0,
                filtered: 0,
            },
        ],
        pathways,
        found_entities,
        not_found: (0..10)
            .map(|i| Identifier {
                id: format!("MISSING{i}"),
                exp: Vec::new(),
            })
            .collect(),
        expression: None,
        species: vec![species(HUMAN), species(MOUSE)],
        data_version: 87,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    results: HashMap<String, AnalysisResult>,
}

impl MemoryStore {
    pub fn with(mut self, result: AnalysisResult) -> Self {
        self.results.insert(result.summary.token.clone(), result);
        self
    }
}

impl AnalysisStore for MemoryStore {
    fn load(&self, token: &str) -> Result<AnalysisResult, Error> {
        self.results
            .get(token)
            .cloned()
            .ok_or_else(|| Error::UnknownToken(token.to_string()))
    }
}

/// Every call fails the way a renderer without layout data does.
#[derive(Default)]
pub struct FailingRasterizer {
    pub calls: AtomicUsize,
}

impl DiagramRasterizer for FailingRasterizer {
    fn rasterize(&self, args: &DiagramArgs, _: &AnalysisResult) -> Result<RasterImage, RasterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RasterError::NotFound(args.diagram.clone()))
    }
}

impl OverviewRasterizer for FailingRasterizer {
    fn rasterize(&self, _: &OverviewArgs, _: &AnalysisResult) -> Result<RasterImage, RasterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RasterError::Visualization("no layout".into()))
    }
}

/// A small half-transparent bitmap for every request.
pub struct SolidRasterizer;

fn solid() -> RasterImage {
    RasterImage::from_pixel(120, 80, image::Rgba([47, 158, 194, 128]))
}

impl DiagramRasterizer for SolidRasterizer {
    fn rasterize(&self, _: &DiagramArgs, _: &AnalysisResult) -> Result<RasterImage, RasterError> {
        Ok(solid())
    }
}

impl OverviewRasterizer for SolidRasterizer {
    fn rasterize(&self, _: &OverviewArgs, _: &AnalysisResult) -> Result<RasterImage, RasterError> {
        Ok(solid())
    }
}

/// Keeps every request and answers with an empty bitmap.
#[derive(Default)]
pub struct RecordingRasterizer {
    pub diagrams: Mutex<Vec<DiagramArgs>>,
    pub overviews: Mutex<Vec<OverviewArgs>>,
}

impl DiagramRasterizer for RecordingRasterizer {
    fn rasterize(&self, args: &DiagramArgs, _: &AnalysisResult) -> Result<RasterImage, RasterError> {
        self.diagrams.lock().expect("diagram log").push(args.clone());
        Ok(RasterImage::new(0, 0))
    }
}

impl OverviewRasterizer for RecordingRasterizer {
    fn rasterize(&self, args: &OverviewArgs, _: &AnalysisResult) -> Result<RasterImage, RasterError> {
        self.overviews.lock().expect("overview log").push(args.clone());
        Ok(RasterImage::new(0, 0))
    }
}

pub fn exporter_for(result: AnalysisResult) -> ReportExporter {
    ReportExporter::new(Arc::new(MemoryStore::default().with(result)))
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Page objects in a serialized PDF.
pub fn page_count(pdf: &[u8]) -> usize {
    count(pdf, b"/Type /Page") - count(pdf, b"/Type /Pages")
}

pub fn contains(pdf: &[u8], needle: &str) -> bool {
    count(pdf, needle.as_bytes()) > 0
}
