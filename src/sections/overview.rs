use crate::context::ReportContext;
use crate::error::Error;
use crate::model::Alignment;
use crate::pdf::ReportDocument;
use crate::profile::HeadingLevel;
use crate::raster::ImageAdapters;

use super::{OVERVIEW, body};

pub(super) const MIN_IMAGE_HEIGHT: f32 = 240.0;

pub(super) fn render(
    doc: &mut ReportDocument<'_>,
    ctx: &ReportContext<'_>,
    images: &ImageAdapters,
) -> Result<(), Error> {
    doc.page_break();
    doc.heading(HeadingLevel::H1, "3. Overview", Some(OVERVIEW));
    doc.add_outline("Overview", OVERVIEW, 0);

    let para = body(
        doc,
        "The genome-wide overview arranges pathways hierarchically, with the \
         top-level pathways at the centre. Pathways significantly enriched in \
         the sample are highlighted; the colour intensity follows the p-value.",
    )
    .alignment(Alignment::Justify);
    doc.paragraph(&para);

    match images.overviews.overview(ctx) {
        Some(img) => {
            // Too little room left breaks to a new page instead of shrinking.
            let max_height = doc.remaining_height().max(MIN_IMAGE_HEIGHT);
            doc.image(&img, max_height);
        }
        None => doc.image_unavailable("The pathway overview could not be generated for this analysis."),
    }
    Ok(())
}
