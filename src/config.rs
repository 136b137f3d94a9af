use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Screen, tile and tileset settings for a [`Viewport`](crate::Viewport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Screen width in pixels.
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    /// Screen height in pixels.
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
    /// Tile width in pixels.
    #[serde(default = "default_tile")]
    pub tile_width: u32,
    /// Tile height in pixels.
    #[serde(default = "default_tile")]
    pub tile_height: u32,
    /// Name of the tileset image; tile `n` sits at `(n * tile_width, 0)`.
    #[serde(default = "default_tileset")]
    pub tileset: String,
    /// When set, visible dirty regions are filled with this colour before
    /// the first layer is drawn.
    #[serde(default)]
    pub clear_color: Option<[u8; 3]>,
}

fn default_screen_width() -> u32 {
    640
}
fn default_screen_height() -> u32 {
    480
}
fn default_tile() -> u32 {
    32
}
fn default_tileset() -> String {
    "tiles.png".to_owned()
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            tile_width: default_tile(),
            tile_height: default_tile(),
            tileset: default_tileset(),
            clear_color: None,
        }
    }
}

impl ViewConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(txt: &str) -> anyhow::Result<Self> {
        let cfg: ViewConfig = serde_json::from_str(txt).context("Parsing view config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads a `.json` config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let p = path.as_ref();
        if p.extension().and_then(|e| e.to_str()) != Some("json") {
            anyhow::bail!("Config file must be a JSON file: {}", p.display());
        }
        let txt = std::fs::read_to_string(p)
            .with_context(|| format!("Reading config file {}", p.display()))?;
        Self::from_json_str(&txt).with_context(|| format!("Loading config file {}", p.display()))
    }

    /// Rejects zero screen or tile dimensions.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.screen_width == 0 || self.screen_height == 0 {
            anyhow::bail!(
                "screen size must be non-zero (got {}x{})",
                self.screen_width,
                self.screen_height
            );
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            anyhow::bail!(
                "tile size must be non-zero (got {}x{})",
                self.tile_width,
                self.tile_height
            );
        }
        Ok(())
    }
}
