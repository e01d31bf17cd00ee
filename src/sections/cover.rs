use crate::context::ReportContext;
use crate::error::Error;
use crate::model::{Alignment, DARK_GRAY, LinkTarget, Paragraph, REPORT_BLUE, Run};
use crate::pdf::ReportDocument;
use crate::profile::HeadingLevel;

use super::ANALYSIS_URL;

pub(super) const TITLE: &str = "Pathway Analysis Report";

pub(super) fn render(doc: &mut ReportDocument<'_>, ctx: &ReportContext<'_>) -> Result<(), Error> {
    let profile = doc.profile().clone();
    let p = profile.font_size.p;
    let summary = &ctx.result.summary;

    // Title block sits a third of the way down the page.
    let drop_to_third = doc.remaining_height() / 3.0;
    doc.vertical_space(drop_to_third);
    doc.paragraph(
        &Paragraph::new(vec![
            Run::new(TITLE, profile.heading_size(HeadingLevel::Title))
                .bold()
                .color(REPORT_BLUE),
        ])
        .alignment(Alignment::Center),
    );
    doc.paragraph(
        &Paragraph::new(vec![
            Run::new("Results of the pathway over-representation analysis", profile.font_size.h3)
                .light()
                .color(DARK_GRAY),
        ])
        .alignment(Alignment::Center)
        .space_after(profile.font_size.h3 * 2.0),
    );
    doc.rule(REPORT_BLUE);

    let mut lines: Vec<(&str, String)> = vec![
        ("Token", summary.token.clone()),
        ("Analysis type", summary.analysis_type.to_lowercase().replace('_', " ")),
    ];
    if let Some(sample) = &summary.sample_name {
        lines.push(("Sample", sample.clone()));
    }
    lines.push(("Species", ctx.species_name.clone()));
    lines.push(("Resource", ctx.resource.clone()));
    lines.push(("Data release", ctx.result.data_version.to_string()));

    for (label, value) in lines {
        let value_run = if label == "Token" {
            Run::new(value, p).link(LinkTarget::Uri(format!("{ANALYSIS_URL}{}", summary.token)))
        } else {
            Run::new(value, p)
        };
        doc.paragraph(
            &Paragraph::new(vec![Run::new(format!("{label}: "), p).bold(), value_run])
                .alignment(Alignment::Center)
                .space_after(profile.paragraph_spacing / 2.0),
        );
    }

    doc.page_break();
    Ok(())
}
