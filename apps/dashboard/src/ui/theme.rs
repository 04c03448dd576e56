//! Dashboard palette and its mapping onto egui visuals.

use std::fmt;

use client_core::turnos::StatusColor;
use eframe::egui;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    #[default]
    Dark,
    Light,
}

/// `#RRGGBB` color as written in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn color32(self) -> egui::Color32 {
        let [r, g, b] = self.0;
        egui::Color32::from_rgb(r, g, b)
    }

    /// Same hue at `alpha` opacity, for hover and selection tints.
    pub fn tint(self, alpha: f32) -> egui::Color32 {
        let [r, g, b] = self.0;
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let digits = raw.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{raw}', expected #RRGGBB"));
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPalette {
    pub warning: HexColor,
    pub info: HexColor,
    pub success: HexColor,
    pub error: HexColor,
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self {
            warning: HexColor::rgb(0xFF, 0xC1, 0x07),
            info: HexColor::rgb(0x21, 0x96, 0xF3),
            success: HexColor::rgb(0x4C, 0xAF, 0x50),
            error: HexColor::rgb(0xF4, 0x43, 0x36),
        }
    }
}

/// Per-component colors layered over the base palette.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentOverrides {
    pub top_bar: HexColor,
    pub sidebar: HexColor,
    pub table_header: HexColor,
    pub nav_hover_alpha: f32,
    pub nav_selected_alpha: f32,
    pub corner_radius: u8,
}

impl Default for ComponentOverrides {
    fn default() -> Self {
        Self {
            top_bar: HexColor::rgb(0x1E, 0x1E, 0x1E),
            sidebar: HexColor::rgb(0x1E, 0x1E, 0x1E),
            table_header: HexColor::rgb(0x28, 0x28, 0x28),
            nav_hover_alpha: 0.08,
            nav_selected_alpha: 0.15,
            corner_radius: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub mode: PaletteMode,
    pub primary: HexColor,
    pub secondary: HexColor,
    pub background: HexColor,
    pub paper: HexColor,
    pub text_primary: HexColor,
    pub text_secondary: HexColor,
    pub status: StatusPalette,
    pub overrides: ComponentOverrides,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: PaletteMode::Dark,
            primary: HexColor::rgb(0x03, 0xA9, 0xF4),
            secondary: HexColor::rgb(0x9C, 0xCC, 0x65),
            background: HexColor::rgb(0x12, 0x12, 0x12),
            paper: HexColor::rgb(0x1E, 0x1E, 0x1E),
            text_primary: HexColor::rgb(0xFF, 0xFF, 0xFF),
            text_secondary: HexColor::rgb(0xB0, 0xB0, 0xB0),
            status: StatusPalette::default(),
            overrides: ComponentOverrides::default(),
        }
    }
}

impl ThemeConfig {
    pub fn status_color(&self, color: StatusColor) -> egui::Color32 {
        match color {
            StatusColor::Warning => self.status.warning,
            StatusColor::Info => self.status.info,
            StatusColor::Success => self.status.success,
            StatusColor::Error => self.status.error,
        }
        .color32()
    }

    pub fn nav_hover_fill(&self) -> egui::Color32 {
        self.primary.tint(self.overrides.nav_hover_alpha)
    }

    pub fn nav_selected_fill(&self) -> egui::Color32 {
        self.primary.tint(self.overrides.nav_selected_alpha)
    }

    /// Cards and dialogs.
    pub fn surface(&self) -> egui::Color32 {
        match self.mode {
            PaletteMode::Dark => self.paper.color32(),
            PaletteMode::Light => egui::Visuals::light().faint_bg_color,
        }
    }

    /// Top bar and sidebar fill; light mode keeps egui's panel color.
    pub fn chrome(&self, color: HexColor) -> egui::Color32 {
        match self.mode {
            PaletteMode::Dark => color.color32(),
            PaletteMode::Light => egui::Visuals::light().panel_fill,
        }
    }

    pub fn strong_text(&self) -> egui::Color32 {
        match self.mode {
            PaletteMode::Dark => self.text_primary.color32(),
            PaletteMode::Light => egui::Visuals::light().strong_text_color(),
        }
    }

    pub fn muted_text(&self) -> egui::Color32 {
        match self.mode {
            PaletteMode::Dark => self.text_secondary.color32(),
            PaletteMode::Light => egui::Visuals::light().weak_text_color(),
        }
    }

    pub fn visuals(&self) -> egui::Visuals {
        // Light mode keeps egui's own surfaces and only takes the accents.
        let mut v = match self.mode {
            PaletteMode::Dark => {
                let mut v = egui::Visuals::dark();
                v.override_text_color = Some(self.text_primary.color32());
                v.window_fill = self.paper.color32();
                v.panel_fill = self.background.color32();
                v.extreme_bg_color = self.background.color32();
                v.faint_bg_color = self.overrides.table_header.color32();
                v.widgets.noninteractive.fg_stroke.color = self.text_secondary.color32();
                v
            }
            PaletteMode::Light => egui::Visuals::light(),
        };

        let radius = egui::CornerRadius::same(self.overrides.corner_radius);
        v.window_corner_radius = egui::CornerRadius::same(self.overrides.corner_radius.saturating_add(2));
        v.menu_corner_radius = radius;
        v.widgets.inactive.corner_radius = radius;
        v.widgets.hovered.corner_radius = radius;
        v.widgets.active.corner_radius = radius;

        v.hyperlink_color = self.primary.color32();
        v.selection.bg_fill = self.primary.tint(0.45);
        v.selection.stroke = egui::Stroke::new(1.0, self.primary.color32());
        v.widgets.hovered.weak_bg_fill = self.nav_hover_fill();
        v.widgets.active.bg_fill = self.primary.color32();
        v.widgets.hovered.bg_fill = self.primary.color32().gamma_multiply(0.85);
        v.error_fg_color = self.status.error.color32();
        v.warn_fg_color = self.status.warning.color32();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(HexColor::try_from("#03A9F4".to_string()), Ok(HexColor::rgb(3, 169, 244)));
        assert_eq!(HexColor::try_from("9ccc65".to_string()), Ok(HexColor::rgb(156, 204, 101)));
        assert!(HexColor::try_from("#12345".to_string()).is_err());
        assert!(HexColor::try_from("#GG0000".to_string()).is_err());
        assert_eq!(HexColor::rgb(3, 169, 244).to_string(), "#03A9F4");
    }

    #[test]
    fn partial_theme_tables_keep_the_other_defaults() {
        let theme: ThemeConfig = toml::from_str(
            r##"
            primary = "#FF5722"

            [status]
            error = "#B00020"
            "##,
        )
        .expect("theme");

        assert_eq!(theme.primary, HexColor::rgb(0xFF, 0x57, 0x22));
        assert_eq!(theme.status.error, HexColor::rgb(0xB0, 0x00, 0x20));
        assert_eq!(theme.status.success, StatusPalette::default().success);
        assert_eq!(theme.background, ThemeConfig::default().background);
        assert_eq!(theme.mode, PaletteMode::Dark);
    }

    #[test]
    fn bad_color_in_settings_is_rejected() {
        let parsed = toml::from_str::<ThemeConfig>(r#"secondary = "green""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn status_colors_follow_the_palette() {
        let theme = ThemeConfig::default();
        assert_eq!(
            theme.status_color(StatusColor::Success),
            egui::Color32::from_rgb(0x4C, 0xAF, 0x50)
        );
        assert_eq!(
            theme.status_color(StatusColor::Warning),
            egui::Color32::from_rgb(0xFF, 0xC1, 0x07)
        );
    }

    #[test]
    fn dark_visuals_use_configured_surfaces() {
        let theme = ThemeConfig::default();
        let visuals = theme.visuals();
        assert!(visuals.dark_mode);
        assert_eq!(visuals.panel_fill, egui::Color32::from_rgb(0x12, 0x12, 0x12));
        assert_eq!(visuals.window_fill, egui::Color32::from_rgb(0x1E, 0x1E, 0x1E));
        assert_eq!(visuals.hyperlink_color, theme.primary.color32());

        let light = ThemeConfig {
            mode: PaletteMode::Light,
            ..ThemeConfig::default()
        };
        assert!(!light.visuals().dark_mode);
        assert_ne!(light.strong_text(), theme.strong_text());
        assert_eq!(light.chrome(light.overrides.sidebar), egui::Visuals::light().panel_fill);
    }
}
