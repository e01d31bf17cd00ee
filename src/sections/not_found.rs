use crate::context::ReportContext;
use crate::error::Error;
use crate::model::{Run, Table, TableCell, TableRow};
use crate::pdf::ReportDocument;
use crate::profile::HeadingLevel;

use super::{NOT_FOUND, body};

const COLUMNS: usize = 4;
const MAX_LISTED: usize = 400;

pub(super) fn render(doc: &mut ReportDocument<'_>, ctx: &ReportContext<'_>) -> Result<(), Error> {
    doc.page_break();
    doc.heading(HeadingLevel::H1, "6. Identifiers not found", Some(NOT_FOUND));
    doc.add_outline("Identifiers not found", NOT_FOUND, 0);

    let not_found = &ctx.result.not_found;
    if not_found.is_empty() {
        let para = body(doc, "Every submitted identifier was found.");
        doc.paragraph(&para);
        return Ok(());
    }

    let para = body(
        doc,
        format!(
            "{} of the submitted identifiers could not be mapped to any entity.",
            not_found.len()
        ),
    );
    doc.paragraph(&para);

    let size = doc.profile().font_size.p * 0.85;
    let listed = &not_found[..not_found.len().min(MAX_LISTED)];
    let mut table = Table::new(vec![1.0; COLUMNS]);
    table.borders = false;
    for chunk in listed.chunks(COLUMNS) {
        let mut cells: Vec<TableCell> = chunk
            .iter()
            .map(|ident| TableCell::text(Run::new(ident.id.clone(), size)))
            .collect();
        cells.resize_with(COLUMNS, || TableCell::text(Run::new("", size)));
        table.rows.push(TableRow::new(cells));
    }
    doc.table(&table)?;

    let remaining = not_found.len() - listed.len();
    if remaining > 0 {
        let para = body(doc, format!("... and {remaining} more"));
        doc.paragraph(&para);
    }
    Ok(())
}
