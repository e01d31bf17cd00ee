use crate::context::ReportContext;
use crate::error::Error;
use crate::model::{Alignment, LIGHT_GRAY, LinkTarget, Run, Table, TableCell, TableRow};
use crate::pdf::ReportDocument;
use crate::profile::HeadingLevel;

use super::{TOP_PATHWAYS, body, format_probability};

const COLUMNS: [(&str, f32); 7] = [
    ("Pathway name", 4.0),
    ("Entities found", 1.1),
    ("Entities total", 1.1),
    ("Entities ratio", 1.1),
    ("p-value", 1.2),
    ("FDR", 1.2),
    ("Reactions found", 1.3),
];

fn numeric(text: String, size: f32) -> TableCell {
    TableCell::right(Run::new(text, size))
}

pub(super) fn render(doc: &mut ReportDocument<'_>, ctx: &ReportContext<'_>) -> Result<(), Error> {
    doc.page_break();
    doc.heading(HeadingLevel::H1, "4. Top pathways", Some(TOP_PATHWAYS));
    doc.add_outline("Top pathways", TOP_PATHWAYS, 0);

    let pathways = ctx.window_pathways();
    if pathways.is_empty() {
        let para = body(
            doc,
            format!(
                "No pathway of {} was hit by the submitted identifiers in {}.",
                ctx.species_name, ctx.resource
            ),
        );
        doc.paragraph(&para);
        return Ok(());
    }

    let intro = body(
        doc,
        format!(
            "The {} most significant pathways of {} for {}, sorted by p-value. \
             Names link to the pathway's details.",
            pathways.len(),
            ctx.species_name,
            ctx.resource
        ),
    );
    doc.paragraph(&intro);

    // Table text is one step below body text.
    let size = doc.profile().font_size.p * 0.85;
    let mut table = Table::new(COLUMNS.iter().map(|(_, w)| *w).collect());
    table.header = Some(TableRow {
        cells: COLUMNS
            .iter()
            .map(|(title, _)| TableCell {
                runs: vec![Run::new(*title, size).bold()],
                alignment: Alignment::Center,
            })
            .collect(),
        shading: Some(LIGHT_GRAY),
    });

    for pathway in pathways {
        let Some(entities) = pathway.entities_for(&ctx.resource) else {
            return Err(Error::InvalidResult(format!(
                "pathway {} has no statistics for {}",
                pathway.st_id, ctx.resource
            )));
        };
        let reactions = pathway
            .reactions_for(&ctx.resource)
            .map_or_else(|| "-".to_string(), |r| format!("{} / {}", r.found, r.total));
        table.rows.push(TableRow::new(vec![
            TableCell::text(
                Run::new(pathway.name.clone(), size)
                    .link(LinkTarget::Destination(pathway.destination())),
            ),
            numeric(entities.found.to_string(), size),
            numeric(entities.total.to_string(), size),
            numeric(format!("{:.4}", entities.ratio), size),
            numeric(format_probability(entities.p_value), size),
            numeric(format_probability(entities.fdr), size),
            numeric(reactions, size),
        ]));
    }
    doc.table(&table)
}
