use crate::analysis::TOTAL_RESOURCE;
use crate::context::ReportContext;
use crate::error::Error;
use crate::model::{LIGHT_GRAY, Run, Table, TableCell, TableRow};
use crate::pdf::ReportDocument;
use crate::profile::HeadingLevel;

use super::{SUMMARY, body};

const EXPRESSION: &str = "EXPRESSION";

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub(super) fn render(doc: &mut ReportDocument<'_>, ctx: &ReportContext<'_>) -> Result<(), Error> {
    let result = ctx.result;
    let summary = &result.summary;
    let is_expression = summary.analysis_type.eq_ignore_ascii_case(EXPRESSION);
    if is_expression && result.expression.is_none() {
        return Err(Error::InvalidResult(format!(
            "expression analysis {} carries no expression summary",
            summary.token
        )));
    }

    doc.heading(HeadingLevel::H1, "2. Parameters and results summary", Some(SUMMARY));
    doc.add_outline("Parameters and results summary", SUMMARY, 0);

    let p = doc.profile().font_size.p;
    let found = result.found_entities.len();
    let not_found = result.not_found.len();
    let resource_pathways = result
        .resource(&ctx.resource)
        .map_or(0, |r| r.pathways);

    let mut rows: Vec<(&str, String)> = vec![
        ("Analysis type", summary.analysis_type.clone()),
        (
            "Sample name",
            summary.sample_name.clone().unwrap_or_else(|| "-".into()),
        ),
        ("Resource", ctx.resource.clone()),
        ("Species", ctx.species_name.clone()),
        ("Projected to human", yes_no(summary.projection).into()),
        ("Interactors included", yes_no(summary.interactors).into()),
        ("Identifiers submitted", (found + not_found).to_string()),
        ("Identifiers found", found.to_string()),
        ("Identifiers not found", not_found.to_string()),
        ("Pathways hit (resource)", resource_pathways.to_string()),
        ("Pathways hit (species)", ctx.pathways.len().to_string()),
        ("Data release", result.data_version.to_string()),
    ];
    if !ctx.resource.eq_ignore_ascii_case(TOTAL_RESOURCE) {
        if let Some(total) = result.resource(TOTAL_RESOURCE) {
            rows.push(("Pathways hit (all resources)", total.pathways.to_string()));
        }
    }

    let mut table = Table::new(vec![1.0, 1.4]);
    for (i, (label, value)) in rows.into_iter().enumerate() {
        let mut row = TableRow::new(vec![
            TableCell::text(Run::new(label, p).bold()),
            TableCell::text(Run::new(value, p)),
        ]);
        if i % 2 == 1 {
            row.shading = Some(LIGHT_GRAY);
        }
        table.rows.push(row);
    }
    doc.table(&table)?;

    if let Some(expression) = result.expression.as_ref().filter(|_| is_expression) {
        doc.heading(HeadingLevel::H3, "Expression data", None);
        let columns = if expression.column_names.is_empty() {
            "none".to_string()
        } else {
            expression.column_names.join(", ")
        };
        let para = body(doc, format!("Columns: {columns}"));
        doc.paragraph(&para);
        if let (Some(min), Some(max)) = (expression.min, expression.max) {
            let para = body(doc, format!("Value range: {min} to {max}"));
            doc.paragraph(&para);
        }
    }

    if ctx.window.count < ctx.pathways.len() {
        let para = body(
            doc,
            format!(
                "This report details pathways {} to {} of the {} hit in {}.",
                ctx.window.offset + 1,
                ctx.window.offset + ctx.window.count,
                ctx.pathways.len(),
                ctx.species_name
            ),
        );
        doc.paragraph(&para);
    }
    Ok(())
}
