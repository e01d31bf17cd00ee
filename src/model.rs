//! Building blocks the report sections hand to the PDF writer.

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    Light,
}

impl FontStyle {
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Regular,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::Light,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            FontStyle::Regular => 0,
            FontStyle::Bold => 1,
            FontStyle::Italic => 2,
            FontStyle::Light => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LinkTarget {
    Uri(String),
    /// A named destination registered somewhere in the same document.
    Destination(String),
}

pub const REPORT_BLUE: [u8; 3] = [47, 158, 194];
pub const LIGHT_GRAY: [u8; 3] = [230, 230, 230];
pub const DARK_GRAY: [u8; 3] = [90, 90, 90];

#[derive(Clone, Debug)]
pub struct Run {
    pub text: String,
    pub font_size: f32,
    pub style: FontStyle,
    pub color: Option<[u8; 3]>, // None = black
    pub link: Option<LinkTarget>,
}

impl Run {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            style: FontStyle::Regular,
            color: None,
            link: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.style = FontStyle::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.style = FontStyle::Italic;
        self
    }

    pub fn light(mut self) -> Self {
        self.style = FontStyle::Light;
        self
    }

    pub fn color(mut self, color: [u8; 3]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn link(mut self, target: LinkTarget) -> Self {
        if self.color.is_none() {
            self.color = Some(REPORT_BLUE);
        }
        self.link = Some(target);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
    pub space_before: f32,
    /// None = the profile's paragraph spacing.
    pub space_after: Option<f32>,
    pub indent_left: f32,
    /// Named destination placed at the top of the paragraph.
    pub destination: Option<String>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn space_before(mut self, pt: f32) -> Self {
        self.space_before = pt;
        self
    }

    pub fn space_after(mut self, pt: f32) -> Self {
        self.space_after = Some(pt);
        self
    }

    pub fn indent(mut self, pt: f32) -> Self {
        self.indent_left = pt;
        self
    }

    pub fn destination(mut self, name: impl Into<String>) -> Self {
        self.destination = Some(name.into());
        self
    }
}

pub struct Table {
    /// Relative column widths; scaled to the content width.
    pub col_weights: Vec<f32>,
    /// Repeated at the top of every page the table spans.
    pub header: Option<TableRow>,
    pub rows: Vec<TableRow>,
    pub cell_padding: f32,
    pub borders: bool,
}

impl Table {
    pub fn new(col_weights: Vec<f32>) -> Self {
        Self {
            col_weights,
            header: None,
            rows: Vec::new(),
            cell_padding: 3.0,
            borders: true,
        }
    }
}

#[derive(Clone)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub shading: Option<[u8; 3]>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            shading: None,
        }
    }
}

#[derive(Clone)]
pub struct TableCell {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
}

impl TableCell {
    pub fn text(run: Run) -> Self {
        Self {
            runs: vec![run],
            alignment: Alignment::Left,
        }
    }

    pub fn right(run: Run) -> Self {
        Self {
            runs: vec![run],
            alignment: Alignment::Right,
        }
    }
}
