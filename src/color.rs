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
            let hsl = Hsl::new(hue, 0.65, 0.5);
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
// Color mapping: node name → Color32
// ---------------------------------------------------------------------------

/// Maps diagram node names to distinct colours, assigned in node order so
/// repeated runs on the same graph colour identically.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map for the given node list.
    pub fn new(nodes: &[String]) -> Self {
        let palette = generate_palette(nodes.len());
        let mapping: BTreeMap<String, Color32> = nodes
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a node.
    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping.get(name).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_hues() {
        let colors = generate_palette(8);
        assert_eq!(colors.len(), 8);
        let distinct: std::collections::HashSet<_> =
            colors.iter().map(|c| (c.r(), c.g(), c.b())).collect();
        assert_eq!(distinct.len(), 8);
    }

    #[test]
    fn unknown_nodes_fall_back_to_gray() {
        let map = ColorMap::new(&["A".to_string()]);
        assert_eq!(map.color_for("missing"), Color32::GRAY);
        assert_ne!(map.color_for("A"), Color32::GRAY);
    }
}
