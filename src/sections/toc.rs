use crate::context::ReportContext;
use crate::error::Error;
use crate::model::{LinkTarget, Paragraph, Run};
use crate::pdf::ReportDocument;
use crate::profile::HeadingLevel;

use super::{INTRODUCTION, NOT_FOUND, OVERVIEW, PATHWAY_DETAILS, SUMMARY, TOP_PATHWAYS};

/// Links to every section and every detailed pathway. The targets are laid
/// out later; links resolve when the document is finished.
pub(super) fn render(doc: &mut ReportDocument<'_>, ctx: &ReportContext<'_>) -> Result<(), Error> {
    let p = doc.profile().font_size.p;
    doc.heading(HeadingLevel::H1, "Table of contents", None);

    let mut entries: Vec<(String, String, f32)> = vec![
        ("1. Introduction".into(), INTRODUCTION.into(), 0.0),
        ("2. Parameters and results summary".into(), SUMMARY.into(), 0.0),
        ("3. Overview".into(), OVERVIEW.into(), 0.0),
        ("4. Top pathways".into(), TOP_PATHWAYS.into(), 0.0),
        ("5. Pathway details".into(), PATHWAY_DETAILS.into(), 0.0),
    ];
    for (i, pathway) in ctx.window_pathways().iter().enumerate() {
        entries.push((
            format!("5.{} {}", i + 1, pathway.name),
            pathway.destination(),
            p * 1.5,
        ));
    }
    entries.push(("6. Identifiers not found".into(), NOT_FOUND.into(), 0.0));

    for (title, destination, indent) in entries {
        doc.paragraph(
            &Paragraph::new(vec![
                Run::new(title, p).link(LinkTarget::Destination(destination)),
            ])
            .indent(indent)
            .space_after(2.0),
        );
    }

    doc.page_break();
    Ok(())
}
