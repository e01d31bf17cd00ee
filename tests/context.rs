mod common;

use common::{HUMAN, MOUSE, sample_result};
use pathway_report::{Error, Fallback, ReportContext, ReportRequest, SpeciesId};

#[test]
fn pathways_are_ranked_by_p_value() {
    let result = sample_result("ranked", 6);
    let request = ReportRequest::new("ranked", "TOTAL").species(HUMAN).pathways(3);
    let (ctx, fallbacks) = ReportContext::build(&result, &request, 25).expect("context");

    assert!(fallbacks.is_empty());
    assert_eq!(ctx.pathways.len(), 6);
    let ids: Vec<&str> = ctx.window_pathways().iter().map(|p| p.st_id.as_str()).collect();
    assert_eq!(ids, ["R-HSA-1005", "R-HSA-1004", "R-HSA-1003"]);
    assert_eq!(ctx.species_name, "Homo sapiens");
}

#[test]
fn resource_match_ignores_case() {
    let result = sample_result("case", 2);
    let request = ReportRequest::new("case", "uniprot").species(HUMAN).pathways(2);
    let (ctx, fallbacks) = ReportContext::build(&result, &request, 25).expect("context");
    assert_eq!(ctx.resource, "UNIPROT");
    assert!(fallbacks.is_empty());
}

#[test]
fn unknown_resource_uses_the_aggregate() {
    let result = sample_result("resource", 2);
    let request = ReportRequest::new("resource", "CHEBI").species(HUMAN).pathways(2);
    let (ctx, fallbacks) = ReportContext::build(&result, &request, 25).expect("context");
    assert_eq!(ctx.resource, "TOTAL");
    assert_eq!(
        fallbacks,
        vec![Fallback::Resource {
            requested: "CHEBI".into(),
            used: "TOTAL".into()
        }]
    );
}

#[test]
fn two_resources_default_to_the_real_one() {
    let mut result = sample_result("two", 2);
    result.resource_summary.truncate(2);
    let request = ReportRequest::new("two", "ENSEMBL").species(HUMAN).pathways(2);
    let (ctx, _) = ReportContext::build(&result, &request, 25).expect("context");
    assert_eq!(ctx.resource, "UNIPROT");
}

#[test]
fn no_resource_summaries_is_an_invalid_result() {
    let mut result = sample_result("none", 2);
    result.resource_summary.clear();
    let request = ReportRequest::new("none", "TOTAL").species(HUMAN);
    let err = ReportContext::build(&result, &request, 25)
        .err()
        .expect("no resources");
    assert!(matches!(err, Error::InvalidResult(_)), "{err}");
}

#[test]
fn resource_without_hits_gives_an_empty_window() {
    let result = sample_result("ensembl", 3);
    let request = ReportRequest::new("ensembl", "ENSEMBL").species(HUMAN).pathways(3);
    let (ctx, fallbacks) = ReportContext::build(&result, &request, 25).expect("context");
    assert!(ctx.pathways.is_empty());
    assert!(ctx.window.is_empty());
    assert_eq!(
        fallbacks,
        vec![Fallback::PathwayCount {
            requested: 3,
            used: 0
        }]
    );
}

#[test]
fn missing_species_defaults_to_human() {
    let result = sample_result("species", 2);
    let request = ReportRequest::new("species", "TOTAL").pathways(2);
    let (ctx, fallbacks) = ReportContext::build(&result, &request, 25).expect("context");
    assert_eq!(ctx.species, SpeciesId::DEFAULT);
    assert_eq!(
        fallbacks,
        vec![Fallback::Species {
            used: SpeciesId::DEFAULT
        }]
    );
}

#[test]
fn species_filter_excludes_other_species() {
    let result = sample_result("mouse", 5);
    let request = ReportRequest::new("mouse", "TOTAL").species(MOUSE).pathways(5);
    let (ctx, fallbacks) = ReportContext::build(&result, &request, 25).expect("context");
    assert_eq!(ctx.pathways.len(), 2);
    assert!(ctx.pathways.iter().all(|p| p.species.db_id == MOUSE));
    assert_eq!(ctx.species_name, "Mus musculus");
    assert_eq!(
        fallbacks,
        vec![Fallback::PathwayCount {
            requested: 5,
            used: 2
        }]
    );
}

#[test]
fn profile_count_applies_when_the_request_has_none() {
    let result = sample_result("default", 12);
    let request = ReportRequest::new("default", "TOTAL").species(HUMAN);
    let (ctx, fallbacks) = ReportContext::build(&result, &request, 10).expect("context");
    assert_eq!(ctx.window.count, 10);
    assert!(fallbacks.is_empty());
}

#[test]
fn window_at_the_tail_shrinks() {
    let result = sample_result("tail", 8);
    let request = ReportRequest::new("tail", "TOTAL")
        .species(HUMAN)
        .offset(6)
        .pathways(5);
    let (ctx, fallbacks) = ReportContext::build(&result, &request, 25).expect("context");
    assert_eq!(ctx.window.offset, 6);
    assert_eq!(ctx.window_pathways().len(), 2);
    assert_eq!(
        fallbacks,
        vec![Fallback::PathwayCount {
            requested: 5,
            used: 2
        }]
    );
}
