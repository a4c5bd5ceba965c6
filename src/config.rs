use crate::gfx::math::Color;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_background")]
    pub background: String,

    #[serde(default = "default_tick_color")]
    pub tick_color: String,

    #[serde(default = "default_size")]
    pub size: Size,

    #[serde(default = "default_output")]
    pub output: Output,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub dir: PathBuf,
    // 0 disables frame output
    pub frame_stride: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps_cap: default_fps_cap(),
            seed: None,
            background: default_background(),
            tick_color: default_tick_color(),
            size: default_size(),
            output: default_output(),
        }
    }
}

fn default_size() -> Size {
    Size {
        width: 400,
        height: 400,
    }
}

fn default_fps_cap() -> u32 {
    60
}

fn default_background() -> String {
    "#1a1a1a".to_string()
}

fn default_tick_color() -> String {
    "#ffffff".to_string()
}

fn default_output() -> Output {
    Output {
        dir: PathBuf::from("frames"),
        frame_stride: 10,
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_path = config_dir.join("liquid-button").join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_dir = config_dir.join("liquid-button");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.fps_cap == 0 {
            anyhow::bail!("fps_cap must be at least 1");
        }
        if self.size.width == 0 || self.size.height == 0 {
            anyhow::bail!("size must be non-zero, got {}x{}", self.size.width, self.size.height);
        }
        self.background_color()?;
        self.tick_color()?;
        Ok(())
    }

    pub fn background_color(&self) -> Result<Color> {
        Color::from_hex(&self.background)
    }

    pub fn tick_color(&self) -> Result<Color> {
        Color::from_hex(&self.tick_color)
    }

    pub fn frame_interval(&self) -> f32 {
        1.0 / self.fps_cap.max(1) as f32
    }
}
