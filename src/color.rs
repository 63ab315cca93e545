use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.70, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of one chart dimension to distinct colours.
///
/// Built from the full dataset's option index rather than the filtered view,
/// so a category keeps its colour while filters change.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    /// Build a colour map for the given sorted category labels.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = categories.into_iter().collect();
        let palette = generate_palette(labels.len());
        CategoryColors {
            mapping: labels
                .into_iter()
                .zip(palette)
                .map(|(label, color)| (label.to_string(), color))
                .collect(),
        }
    }

    /// Look up the colour for a category label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_produces_distinct_colors() {
        let colors = generate_palette(8);
        assert_eq!(colors.len(), 8);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn category_colors_are_stable_lookups() {
        let colors = CategoryColors::new(["Morning", "Evening", "Night"]);
        assert_eq!(colors.color_for("Morning"), colors.color_for("Morning"));
        assert_ne!(colors.color_for("Morning"), colors.color_for("Night"));
        assert_eq!(colors.color_for("unknown"), Color32::GRAY);
    }
}
