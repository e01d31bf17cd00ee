use crate::context::ReportContext;
use crate::error::Error;
use crate::model::{Alignment, LinkTarget, Paragraph, Run};
use crate::pdf::ReportDocument;
use crate::profile::HeadingLevel;

use super::{INTRODUCTION, body};

const PARAGRAPHS: [&str; 3] = [
    "This report summarizes the over-representation analysis of the submitted \
     identifiers against the pathway knowledgebase. Each identifier is mapped to \
     the physical entities it represents, and every pathway is tested for an \
     enrichment of those entities compared with what chance alone would produce.",
    "The probability score (p-value) comes from a hypergeometric test and is \
     corrected for the false discovery rate with the Benjamini-Hochberg method. \
     Pathways are listed by increasing p-value; the entity and reaction counts \
     show how much of each pathway the sample covers.",
    "The overview shows the whole pathway hierarchy with the analysis overlaid. \
     The most significant pathways are then described one by one, followed by \
     the identifiers that could not be mapped.",
];

pub(super) fn render(doc: &mut ReportDocument<'_>, ctx: &ReportContext<'_>) -> Result<(), Error> {
    doc.heading(HeadingLevel::H1, "1. Introduction", Some(INTRODUCTION));
    doc.add_outline("Introduction", INTRODUCTION, 0);

    for text in PARAGRAPHS {
        let para = body(doc, text).alignment(Alignment::Justify);
        doc.paragraph(&para);
    }

    let p = doc.profile().font_size.p;
    doc.paragraph(&Paragraph::new(vec![
        Run::new("The interactive version of this analysis is available ", p),
        Run::new("online", p).link(LinkTarget::Uri(format!(
            "{}{}",
            super::ANALYSIS_URL,
            ctx.token()
        ))),
        Run::new(" for as long as the analysis token is kept.", p),
    ]));
    Ok(())
}
