use std::path::{Path, PathBuf};

use super::{
    DiagramArgs, DiagramRasterizer, OverviewArgs, OverviewRasterizer, RasterError, RasterImage,
};
use crate::analysis::AnalysisResult;
use crate::store::is_valid_token;

/// Diagrams rendered ahead of time into `<dir>/<diagram id>.png`.
///
/// A file named `<dir>/<token>/<diagram id>.<resource>.png` takes precedence,
/// so overlays exported per analysis can sit next to the plain diagrams.
/// Enhanced high-level diagrams, when configured, win over both.
pub struct PrerenderedDiagrams {
    dir: PathBuf,
    ehld: Option<PathBuf>,
}

impl PrerenderedDiagrams {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ehld: None,
        }
    }

    pub fn with_ehld(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ehld = Some(dir.into());
        self
    }

    /// Files to try, in order. Ids that could name a path outside the
    /// configured directories yield no candidate.
    fn candidates(&self, args: &DiagramArgs) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if !is_valid_token(&args.diagram) {
            log::warn!("Refusing diagram id {:?} as a file name", args.diagram);
            return paths;
        }
        if let Some(ehld) = &self.ehld {
            paths.push(ehld.join(format!("{}.png", args.diagram)));
        }
        if is_valid_token(&args.token) && is_valid_token(&args.resource) {
            paths.push(
                self.dir
                    .join(&args.token)
                    .join(format!("{}.{}.png", args.diagram, args.resource.to_ascii_lowercase())),
            );
        }
        paths.push(self.dir.join(format!("{}.png", args.diagram)));
        paths
    }
}

impl DiagramRasterizer for PrerenderedDiagrams {
    fn rasterize(&self, args: &DiagramArgs, _result: &AnalysisResult) -> Result<RasterImage, RasterError> {
        let path = self
            .candidates(args)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| RasterError::NotFound(args.diagram.clone()))?;
        read_png(&path)
    }
}

/// Overview images rendered ahead of time into `<dir>/<species>.png`.
pub struct PrerenderedOverviews {
    dir: PathBuf,
}

impl PrerenderedOverviews {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OverviewRasterizer for PrerenderedOverviews {
    fn rasterize(&self, args: &OverviewArgs, _result: &AnalysisResult) -> Result<RasterImage, RasterError> {
        let path = self.dir.join(format!("{}.png", args.species));
        if !path.is_file() {
            return Err(RasterError::NotFound(args.species.clone()));
        }
        read_png(&path)
    }
}

fn read_png(path: &Path) -> Result<RasterImage, RasterError> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    let decoded = reader
        .decode()
        .map_err(|e| RasterError::Decode(format!("{}: {e}", path.display())))?;
    Ok(decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> DiagramArgs {
        DiagramArgs {
            diagram: "R-HSA-1".into(),
            selected: vec![],
            resource: "UNIPROT".into(),
            token: "TOK".into(),
            quality: 5.0,
            write_title: false,
        }
    }

    #[test]
    fn enhanced_diagrams_are_tried_first() {
        let diagrams = PrerenderedDiagrams::new("/d").with_ehld("/e");
        let paths = diagrams.candidates(&args());
        assert_eq!(paths[0], PathBuf::from("/e/R-HSA-1.png"));
        assert_eq!(paths[1], PathBuf::from("/d/TOK/R-HSA-1.uniprot.png"));
        assert_eq!(paths[2], PathBuf::from("/d/R-HSA-1.png"));
    }

    #[test]
    fn tokens_with_path_characters_skip_the_overlay_directory() {
        let diagrams = PrerenderedDiagrams::new("/d");
        let mut escaping = args();
        escaping.token = "../../x".into();
        assert_eq!(diagrams.candidates(&escaping), vec![PathBuf::from("/d/R-HSA-1.png")]);

        escaping.diagram = "../secret".into();
        assert!(diagrams.candidates(&escaping).is_empty());
        assert!(matches!(
            diagrams.rasterize(&escaping, &AnalysisResult::default()),
            Err(RasterError::NotFound(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let diagrams = PrerenderedDiagrams::new("/nonexistent-diagram-dir");
        let result = AnalysisResult::default();
        assert!(matches!(
            diagrams.rasterize(&args(), &result),
            Err(RasterError::NotFound(id)) if id == "R-HSA-1"
        ));
    }
}
