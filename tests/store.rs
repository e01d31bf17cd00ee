mod common;

use std::fs;

use common::sample_result;
use pathway_report::{AnalysisStore, Error, ExporterConfig, JsonAnalysisStore, ReportExporter, ReportRequest};

#[test]
fn stored_result_loads() {
    let dir = common::output_dir("store");
    let result = sample_result("stored", 3);
    let json = serde_json::to_vec_pretty(&result).expect("serialize");
    fs::write(dir.join("stored.json"), json).expect("write json");

    let loaded = JsonAnalysisStore::new(&dir).load("stored").expect("load");
    assert_eq!(loaded.summary.token, "stored");
    assert_eq!(loaded.pathways.len(), result.pathways.len());
    assert_eq!(loaded.not_found.len(), 10);
    assert_eq!(loaded.resource("uniprot").map(|r| r.pathways), Some(5));
}

#[test]
fn missing_file_is_an_unknown_token() {
    let store = JsonAnalysisStore::new(common::output_dir("store"));
    let err = store.load("never-stored").expect_err("no such token");
    assert!(matches!(err, Error::UnknownToken(_)), "{err}");
}

#[test]
fn malformed_json_is_an_invalid_result() {
    let dir = common::output_dir("store");
    fs::write(dir.join("broken.json"), b"{\"summary\": ").expect("write json");

    let err = JsonAnalysisStore::new(&dir).load("broken").expect_err("bad json");
    assert!(matches!(err, Error::InvalidResult(_)), "{err}");
    assert!(err.is_input_resolution());
}

#[test]
fn tokens_cannot_escape_the_store() {
    let store = JsonAnalysisStore::new(common::output_dir("store"));
    for token in ["../render/complete", "a/b", "", "stored.json"] {
        let err = store.load(token).expect_err("rejected token");
        assert!(matches!(err, Error::UnknownToken(_)), "{token}: {err}");
    }
}

#[test]
fn exporter_from_config_reads_the_store() {
    let dir = common::output_dir("config");
    let result = sample_result("configured", 2);
    fs::write(
        dir.join("configured.json"),
        serde_json::to_vec(&result).expect("serialize"),
    )
    .expect("write json");

    let exporter = ReportExporter::from_config(&ExporterConfig {
        analysis_dir: dir,
        ..Default::default()
    })
    .expect("exporter");

    let mut pdf = Vec::new();
    let summary = exporter
        .render_token(
            &ReportRequest::new("configured", "TOTAL").species(common::HUMAN),
            &mut pdf,
        )
        .expect("render");
    assert_eq!(summary.pathways_detailed, 2);
    assert!(pdf.starts_with(b"%PDF-"));
}
