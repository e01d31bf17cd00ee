//! Layout profiles: margins, type scale and how many pathways a report
//! details by default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::context::Fallback;

const BREATHE: &str = include_str!("../profiles/breathe.json");
const COMPACT: &str = include_str!("../profiles/compact.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
}

impl PageSize {
    /// (width, height) in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 40.0,
            bottom: 50.0,
            left: 40.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FontSizes {
    pub title: f32,
    pub h1: f32,
    pub h2: f32,
    pub h3: f32,
    pub h4: f32,
    pub p: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 24.0,
            h1: 20.0,
            h2: 16.0,
            h3: 14.0,
            h4: 12.0,
            p: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingLevel {
    Title,
    H1,
    H2,
    H3,
    H4,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutProfile {
    pub page_size: PageSize,
    pub margin: Margins,
    pub font_size: FontSizes,
    pub pathways_to_show: usize,
    /// Space after each paragraph, in points.
    pub paragraph_spacing: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
}

impl Default for LayoutProfile {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: Margins::default(),
            font_size: FontSizes::default(),
            pathways_to_show: 25,
            paragraph_spacing: 6.0,
            line_spacing: 1.25,
        }
    }
}

impl LayoutProfile {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let profile: LayoutProfile = serde_json::from_str(json).map_err(|e| e.to_string())?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject profiles that leave no room to draw in.
    pub fn validate(&self) -> Result<(), String> {
        let m = &self.margin;
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err("margins must be finite and non-negative".into());
        }
        let (w, h) = self.page_size.dimensions();
        if w - m.left - m.right < 72.0 || h - m.top - m.bottom < 144.0 {
            return Err("margins leave too little content area".into());
        }
        let f = &self.font_size;
        if [f.title, f.h1, f.h2, f.h3, f.h4, f.p]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0 || *v > 72.0)
        {
            return Err("font sizes must be between 0 and 72pt".into());
        }
        if !(1.0..=3.0).contains(&self.line_spacing) {
            return Err(format!("line spacing {} outside 1.0..=3.0", self.line_spacing));
        }
        if !self.paragraph_spacing.is_finite() || self.paragraph_spacing < 0.0 {
            return Err("paragraph spacing must be non-negative".into());
        }
        Ok(())
    }

    pub fn heading_size(&self, level: HeadingLevel) -> f32 {
        match level {
            HeadingLevel::Title => self.font_size.title,
            HeadingLevel::H1 => self.font_size.h1,
            HeadingLevel::H2 => self.font_size.h2,
            HeadingLevel::H3 => self.font_size.h3,
            HeadingLevel::H4 => self.font_size.h4,
        }
    }
}

/// Where a render's profile comes from. Loaded afresh for every render so
/// that no render sees another one's adjustments.
#[derive(Clone, Debug)]
pub enum ProfileSource {
    Builtin(String),
    File(PathBuf),
}

impl Default for ProfileSource {
    fn default() -> Self {
        ProfileSource::Builtin("breathe".into())
    }
}

impl ProfileSource {
    /// Load the profile, substituting the hardcoded defaults on any failure.
    pub fn load(&self) -> (LayoutProfile, Option<Fallback>) {
        let loaded = match self {
            ProfileSource::Builtin(name) => match name.to_ascii_lowercase().as_str() {
                "breathe" => LayoutProfile::from_json(BREATHE),
                "compact" => LayoutProfile::from_json(COMPACT),
                other => Err(format!("no built-in profile named '{other}'")),
            },
            ProfileSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|json| LayoutProfile::from_json(&json))
                .map_err(|e| format!("{}: {e}", path.display())),
        };

        match loaded {
            Ok(profile) => (profile, None),
            Err(reason) => {
                log::warn!("Failed to load layout profile ({reason}), using defaults");
                (LayoutProfile::default(), Some(Fallback::Profile { reason }))
            }
        }
    }
}
