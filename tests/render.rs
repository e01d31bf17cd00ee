mod common;

use std::fs;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{
    FailingRasterizer, HUMAN, MOUSE, RecordingRasterizer, SolidRasterizer, exporter_for,
    sample_result,
};
use pathway_report::raster::{DiagramArgs, OverviewArgs};
use pathway_report::{Error, Fallback, ProfileSource, ReportRequest, SpeciesId};
use rayon::prelude::*;

fn human(token: &str) -> ReportRequest {
    ReportRequest::new(token, "TOTAL").species(HUMAN)
}

#[test]
fn complete_report_is_written() {
    common::init_logging();
    let exporter = exporter_for(sample_result("complete", 8))
        .diagrams(Arc::new(SolidRasterizer))
        .overviews(Arc::new(SolidRasterizer));

    let mut pdf = Vec::new();
    let summary = exporter
        .render_token(&human("complete").pathways(8), &mut pdf)
        .expect("render");

    fs::write(common::output_dir("render").join("complete.pdf"), &pdf).expect("write pdf");

    assert!(pdf.starts_with(b"%PDF-"));
    assert!(pdf.trim_ascii_end().ends_with(b"%%EOF"));
    assert_eq!(summary.bytes, pdf.len());
    assert_eq!(summary.pages, common::page_count(&pdf));
    assert_eq!(summary.pathways_detailed, 8);
    // Four pathways with a diagram plus the overview.
    assert_eq!(summary.images, 5);
    assert_eq!(summary.missing_images, 0);
    assert_eq!(summary.unresolved_links, 0);
    assert!(summary.fallbacks.is_empty(), "{:?}", summary.fallbacks);

    // Cover, contents, introduction, overview, top pathways, one page per
    // pathway and the not-found list.
    assert!(summary.pages >= 13, "only {} pages", summary.pages);
    assert!(common::contains(&pdf, "/SMask"));
    assert!(common::contains(&pdf, "/Subtype /Link"));
    assert!(common::contains(&pdf, "/Outlines"));
    assert!(common::contains(&pdf, "https://reactome.org/content/detail/R-HSA-1007"));
}

#[test]
fn missing_images_never_fail_the_report() {
    common::init_logging();
    let failing = Arc::new(FailingRasterizer::default());
    let exporter = exporter_for(sample_result("noimages", 8))
        .diagrams(failing.clone())
        .overviews(failing.clone());

    let mut pdf = Vec::new();
    let summary = exporter
        .render_token(&human("noimages").pathways(8), &mut pdf)
        .expect("render");

    // Even-numbered pathways have a diagram; plus the overview.
    assert_eq!(failing.calls.load(Ordering::SeqCst), 5);
    assert_eq!(summary.missing_images, 5);
    assert_eq!(summary.images, 0);
    assert!(!common::contains(&pdf, "/Subtype /Image"));
    assert!(pdf.starts_with(b"%PDF-"));
}

#[test]
fn rasterizers_receive_the_resolved_request() {
    let mut result = sample_result("mouse-args", 4);
    // The second mouse pathway is drawn inside the first one's diagram.
    result.pathways.last_mut().expect("mouse pathway").diagram = Some("R-MMU-1900".into());
    let recorder = Arc::new(RecordingRasterizer::default());
    let exporter = exporter_for(result)
        .diagrams(recorder.clone())
        .overviews(recorder.clone());

    let mut pdf = Vec::new();
    let summary = exporter
        .render_token(
            &ReportRequest::new("mouse-args", "uniprot").species(MOUSE).pathways(2),
            &mut pdf,
        )
        .expect("render");

    let diagrams = recorder.diagrams.lock().expect("diagram log").clone();
    assert_eq!(
        diagrams,
        vec![
            DiagramArgs {
                diagram: "R-MMU-1900".into(),
                selected: vec![],
                resource: "UNIPROT".into(),
                token: "mouse-args".into(),
                quality: 5.0,
                write_title: false,
            },
            DiagramArgs {
                diagram: "R-MMU-1900".into(),
                selected: vec!["R-MMU-1901".into()],
                resource: "UNIPROT".into(),
                token: "mouse-args".into(),
                quality: 5.0,
                write_title: false,
            },
        ]
    );

    // The overview ignores the species filter.
    let overviews = recorder.overviews.lock().expect("overview log").clone();
    assert_eq!(
        overviews,
        vec![OverviewArgs {
            species: "Homo_sapiens".into(),
            resource: "UNIPROT".into(),
            token: "mouse-args".into(),
            quality: 2.5,
            color_profile: "Copper Plus".into(),
            write_title: false,
        }]
    );

    // Empty bitmaps are treated as missing.
    assert_eq!(summary.images, 0);
    assert_eq!(summary.missing_images, 3);
}

#[test]
fn unconfigured_rasterizers_count_as_missing() {
    let exporter = exporter_for(sample_result("bare", 4));
    let mut pdf = Vec::new();
    let summary = exporter
        .render_token(&human("bare").pathways(4), &mut pdf)
        .expect("render");
    assert_eq!(summary.missing_images, 3);
}

#[test]
fn species_without_pathways_still_renders() {
    let exporter = exporter_for(sample_result("empty", 0));
    let mut pdf = Vec::new();
    let summary = exporter
        .render_token(&human("empty"), &mut pdf)
        .expect("render");

    assert_eq!(summary.pathways_detailed, 0);
    assert_eq!(summary.unresolved_links, 0);
    assert!(summary.pages >= 5);
    assert_eq!(
        summary.fallbacks,
        vec![Fallback::PathwayCount {
            requested: 25,
            used: 0
        }]
    );
}

#[test]
fn other_species_only_sees_its_own_pathways() {
    let exporter = exporter_for(sample_result("mouse", 8));
    let mut pdf = Vec::new();
    let summary = exporter
        .render_token(
            &ReportRequest::new("mouse", "UNIPROT").species(MOUSE).pathways(2),
            &mut pdf,
        )
        .expect("render");
    assert_eq!(summary.pathways_detailed, 2);
    assert!(summary.fallbacks.is_empty());
    assert!(common::contains(&pdf, "R-MMU-1900"));
    assert!(!common::contains(&pdf, "R-HSA-1003"));
}

#[test]
fn request_fallbacks_are_reported() {
    let exporter = exporter_for(sample_result("fallbacks", 8));
    let mut pdf = Vec::new();
    let request = ReportRequest::new("fallbacks", "NOPE").offset(10).pathways(5);
    let summary = exporter.render_token(&request, &mut pdf).expect("render");

    assert_eq!(summary.pathways_detailed, 5);
    assert_eq!(
        summary.fallbacks,
        vec![
            Fallback::Species {
                used: SpeciesId::DEFAULT
            },
            Fallback::Resource {
                requested: "NOPE".into(),
                used: "TOTAL".into()
            },
            Fallback::Offset { requested: 10 },
        ]
    );
}

#[test]
fn unknown_profile_falls_back_to_defaults() {
    let exporter = exporter_for(sample_result("profile", 3))
        .profile(ProfileSource::Builtin("roomy".into()));
    let mut pdf = Vec::new();
    let summary = exporter
        .render_token(&human("profile").pathways(3), &mut pdf)
        .expect("render");
    assert!(matches!(
        summary.fallbacks.as_slice(),
        [Fallback::Profile { .. }]
    ));
}

#[test]
fn compact_profile_uses_fewer_pages() {
    let result = sample_result("compact", 30);
    let request = human("compact").pathways(30);

    let mut breathe = Vec::new();
    let roomy = exporter_for(result.clone())
        .render_result(&result, &request, &mut breathe)
        .expect("render");
    let mut compact = Vec::new();
    let tight = exporter_for(result.clone())
        .profile(ProfileSource::Builtin("compact".into()))
        .render_result(&result, &request, &mut compact)
        .expect("render");

    assert!(tight.pages <= roomy.pages, "{} > {}", tight.pages, roomy.pages);
}

#[test]
fn unknown_token_is_an_input_error() {
    let exporter = exporter_for(sample_result("known", 2));
    let mut pdf = Vec::new();
    let err = exporter
        .render_token(&human("unknown"), &mut pdf)
        .expect_err("unknown token");
    assert!(err.is_input_resolution(), "{err}");
    assert!(pdf.is_empty());
}

#[test]
fn failing_section_writes_nothing() {
    let mut result = sample_result("expression", 4);
    result.summary.analysis_type = "EXPRESSION".into();
    let exporter = exporter_for(result);

    let mut pdf = Vec::new();
    let err = exporter
        .render_token(&human("expression"), &mut pdf)
        .expect_err("summary needs expression data");

    assert!(!err.is_input_resolution());
    match err {
        Error::Section { section, .. } => assert_eq!(section, "parameter and result summary"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(pdf.is_empty());
}

#[test]
fn renders_are_deterministic() {
    let exporter = exporter_for(sample_result("repeat", 6))
        .diagrams(Arc::new(SolidRasterizer))
        .overviews(Arc::new(SolidRasterizer));
    let request = human("repeat").pathways(6);

    let mut first = Vec::new();
    let mut second = Vec::new();
    exporter.render_token(&request, &mut first).expect("render");
    exporter.render_token(&request, &mut second).expect("render");
    assert_eq!(first, second);
}

#[test]
fn concurrent_renders_match_sequential_ones() {
    common::init_logging();
    let store = (0..6).fold(common::MemoryStore::default(), |store, i| {
        store.with(sample_result(&format!("token{i}"), 3 + i))
    });
    let exporter = pathway_report::ReportExporter::new(Arc::new(store))
        .diagrams(Arc::new(SolidRasterizer))
        .overviews(Arc::new(SolidRasterizer));
    let tokens: Vec<String> = (0..6).map(|i| format!("token{i}")).collect();

    let render = |token: &String| {
        let mut pdf = Vec::new();
        exporter
            .render_token(&human(token), &mut pdf)
            .expect("render");
        pdf
    };

    let sequential: Vec<Vec<u8>> = tokens.iter().map(&render).collect();
    let parallel: Vec<Vec<u8>> = tokens.par_iter().map(&render).collect();

    for (token, (a, b)) in tokens.iter().zip(sequential.iter().zip(&parallel)) {
        assert_eq!(a, b, "{token} differs between sequential and parallel renders");
    }
}
