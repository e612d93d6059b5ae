use std::path::PathBuf;

const MM: f32 = 72.0 / 25.4;

/// Page size and margins in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Default for PageGeometry {
    /// A4 with 20mm margins.
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin_left: 20.0 * MM,
            margin_right: 20.0 * MM,
            margin_top: 20.0 * MM,
            margin_bottom: 20.0 * MM,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin_bottom
    }
}

/// Company block printed in the header and footer of every document.
#[derive(Clone, Debug, PartialEq)]
pub struct Letterhead {
    pub company: String,
    pub lines: Vec<String>,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            company: "NEM Insurance Plc".to_string(),
            lines: vec![
                "199, IKORODU ROAD, OBANIKORO, LAGOS".to_string(),
                "PO Box 654 Marina \u{2022} Tel: 01-448956-09; 01 4489570".to_string(),
                "+2348023509846 \u{2022} +2348035629237".to_string(),
                "Email: nem@nem-insurance.com \u{2022} claims@nem-insurance.com".to_string(),
            ],
        }
    }
}

/// Font selection. Explicit files win over a family lookup; with neither,
/// the built-in Helvetica pair is used.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontConfig {
    pub family: Option<String>,
    pub regular_path: Option<PathBuf>,
    pub bold_path: Option<PathBuf>,
    /// Searched before the platform font directories.
    pub extra_dirs: Vec<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderConfig {
    pub page: PageGeometry,
    pub letterhead: Letterhead,
    pub logo_path: Option<PathBuf>,
    pub font: FontConfig,
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

impl RenderConfig {
    /// Defaults overridden by `FORMDOC_LOGO`, `FORMDOC_FONT_FAMILY`,
    /// `FORMDOC_FONT_REGULAR`, `FORMDOC_FONT_BOLD` and `FORMDOC_FONTS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.logo_path = env_path("FORMDOC_LOGO");
        config.font.family = std::env::var("FORMDOC_FONT_FAMILY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        config.font.regular_path = env_path("FORMDOC_FONT_REGULAR");
        config.font.bold_path = env_path("FORMDOC_FONT_BOLD");
        if let Ok(val) = std::env::var("FORMDOC_FONTS") {
            let sep = if cfg!(windows) { ';' } else { ':' };
            config.font.extra_dirs = val
                .split(sep)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        config
    }
}
