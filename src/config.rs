use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub ui: UiConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub mirror_mode: bool,
    pub show_landmarks: bool,
    pub show_circle: bool,
    pub show_regions: bool,
    pub show_fps: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub menu_scale: usize,
    pub font_size_pt: u32,
    pub font_family: String,
    pub circle_color_hex: String,
    pub point_color_hex: String,
    pub label_color_hex: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            mirror_mode: true,
            show_landmarks: true,
            show_circle: true,
            show_regions: false,
            show_fps: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            menu_scale: 2,
            font_size_pt: 12,
            font_family: "Monospace".to_string(),
            circle_color_hex: "#00FF00".to_string(),
            point_color_hex: "#FF0000".to_string(),
            label_color_hex: "#00FF00".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            ui: UiConfig::default(),
        }
    }
}

impl AppConfig {
    const PATH: &'static str = "config.json";

    pub fn load() -> Result<Self> {
        let config = if Path::new(Self::PATH).exists() {
            let content = fs::read_to_string(Self::PATH)?;
            // Missing fields fall back to defaults via #[serde(default)].
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    println!("Loaded configuration from {}", Self::PATH);
                    c
                }
                Err(e) => {
                    println!("Error parsing config: {}. Loading defaults.", e);
                    Self::default()
                }
            }
        } else {
            println!("Configuration file not found. Creating default at {}", Self::PATH);
            Self::default()
        };

        // Save back so newly added fields appear in the file.
        config.save()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::PATH, content)?;
        Ok(())
    }
}
