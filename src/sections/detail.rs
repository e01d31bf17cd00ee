use crate::analysis::PathwayNode;
use crate::context::ReportContext;
use crate::error::Error;
use crate::model::{Alignment, DARK_GRAY, LIGHT_GRAY, LinkTarget, Paragraph, Run, Table, TableCell, TableRow};
use crate::pdf::ReportDocument;
use crate::profile::HeadingLevel;
use crate::raster::ImageAdapters;

use super::overview::MIN_IMAGE_HEIGHT;
use super::{PATHWAY_DETAILS, PATHWAY_URL, body, format_probability};

pub(super) fn render(
    doc: &mut ReportDocument<'_>,
    ctx: &ReportContext<'_>,
    images: &ImageAdapters,
) -> Result<(), Error> {
    doc.page_break();
    doc.heading(HeadingLevel::H1, "5. Pathway details", Some(PATHWAY_DETAILS));
    doc.add_outline("Pathway details", PATHWAY_DETAILS, 0);

    let pathways = ctx.window_pathways();
    if pathways.is_empty() {
        let para = body(doc, "There are no pathways to describe.");
        doc.paragraph(&para);
        return Ok(());
    }

    for (i, pathway) in pathways.iter().enumerate() {
        if i > 0 {
            doc.page_break();
        }
        render_pathway(doc, ctx, images, i + 1, pathway)?;
    }
    Ok(())
}

fn render_pathway(
    doc: &mut ReportDocument<'_>,
    ctx: &ReportContext<'_>,
    images: &ImageAdapters,
    index: usize,
    pathway: &PathwayNode,
) -> Result<(), Error> {
    let p = doc.profile().font_size.p;
    let destination = pathway.destination();
    doc.heading(
        HeadingLevel::H2,
        &format!("5.{index} {}", pathway.name),
        Some(&destination),
    );
    doc.add_outline(pathway.name.clone(), destination, 1);

    let mut id_line = vec![
        Run::new("Stable id: ", p).bold(),
        Run::new(pathway.st_id.clone(), p)
            .link(LinkTarget::Uri(format!("{PATHWAY_URL}{}", pathway.st_id))),
        Run::new("   Species: ", p).bold(),
        Run::new(pathway.species.name.clone(), p),
    ];
    let mut flags = Vec::new();
    if pathway.in_disease {
        flags.push("disease pathway");
    }
    if pathway.inferred {
        flags.push("inferred from another species");
    }
    if pathway.llp {
        flags.push("lowest level pathway");
    }
    if !flags.is_empty() {
        id_line.push(Run::new(format!("   ({})", flags.join(", ")), p).italic());
    }
    doc.paragraph(&Paragraph::new(id_line));

    if let Some(entities) = pathway.entities_for(&ctx.resource) {
        let mut stats = format!(
            "Entities: {} of {} found (ratio {:.4}), p-value {}, FDR {}.",
            entities.found,
            entities.total,
            entities.ratio,
            format_probability(entities.p_value),
            format_probability(entities.fdr),
        );
        if let Some(reactions) = pathway.reactions_for(&ctx.resource) {
            stats.push_str(&format!(
                " Reactions: {} of {} found (ratio {:.4}).",
                reactions.found, reactions.total, reactions.ratio
            ));
        }
        let para = body(doc, stats);
        doc.paragraph(&para);
    }

    if let Some(summation) = pathway.summation.as_deref().filter(|s| !s.trim().is_empty()) {
        let para = body(doc, summation).alignment(Alignment::Justify);
        doc.paragraph(&para);
    }

    match images.diagrams.diagram(pathway, ctx) {
        Some(img) => {
            let max_height = doc.remaining_height().max(MIN_IMAGE_HEIGHT);
            doc.image(&img, max_height);
        }
        None if pathway.diagram.is_none() => {
            let para = Paragraph::new(vec![
                Run::new("This pathway has no diagram of its own.", p)
                    .italic()
                    .color(DARK_GRAY),
            ]);
            doc.paragraph(&para);
        }
        None => doc.image_unavailable("The diagram for this pathway could not be generated."),
    }

    render_identifiers(doc, ctx, pathway)
}

fn render_identifiers(
    doc: &mut ReportDocument<'_>,
    ctx: &ReportContext<'_>,
    pathway: &PathwayNode,
) -> Result<(), Error> {
    let found = ctx.result.identifiers_in(&pathway.st_id, &ctx.resource);
    if found.is_empty() {
        return Ok(());
    }
    doc.heading(HeadingLevel::H4, "Identifiers found", None);

    let size = doc.profile().font_size.p * 0.85;
    let columns = ctx
        .result
        .expression
        .as_ref()
        .map(|e| e.column_names.as_slice())
        .unwrap_or_default();
    let mut weights = vec![1.2, 2.0];
    weights.extend(columns.iter().map(|_| 0.8));
    let mut table = Table::new(weights);

    let mut header = vec![
        TableCell::text(Run::new("Input", size).bold()),
        TableCell::text(Run::new(format!("Mapped to ({})", ctx.resource), size).bold()),
    ];
    header.extend(
        columns
            .iter()
            .map(|c| TableCell::right(Run::new(c.clone(), size).bold())),
    );
    table.header = Some(TableRow {
        cells: header,
        shading: Some(LIGHT_GRAY),
    });

    for (entity, ids) in found {
        let mut cells = vec![
            TableCell::text(Run::new(entity.id.clone(), size)),
            TableCell::text(Run::new(ids.join(", "), size)),
        ];
        cells.extend((0..columns.len()).map(|c| {
            let value = entity
                .exp
                .get(c)
                .map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
            TableCell::right(Run::new(value, size))
        }));
        table.rows.push(TableRow::new(cells));
    }
    doc.table(&table)
}
