use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::upload::DEFAULT_API_BASE;

const MIN_FRAME_RATE: u32 = 1;
const MAX_FRAME_RATE: u32 = 60;
const MIN_UPLOAD_TIMEOUT_SECS: u64 = 10;
const MAX_UPLOAD_TIMEOUT_SECS: u64 = 3600;
const MIN_FRAME_INTERVAL_MS: u64 = 8;
const MAX_FRAME_INTERVAL_MS: u64 = 1000;
const MAX_CREDENTIAL_LEN: usize = 128;
const MAX_API_BASE_LEN: usize = 512;
const MAX_DEVICE_LEN: usize = 256;

pub const CLOUD_NAME_VAR: &str = "CLOUD_NAME";
pub const UPLOAD_PRESET_VAR: &str = "UPLOAD_PRESET";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub ffmpeg_path: String,
    pub input_format: String,
    pub device: String,
    pub frame_rate: u32,
    pub output_directory: PathBuf,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let (input_format, device) = default_capture_device();
        let videos_dir = directories::UserDirs::new()
            .and_then(|d| d.video_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| {
                directories::BaseDirs::new()
                    .map(|b| b.home_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."))
            });

        Self {
            ffmpeg_path: String::from("ffmpeg"),
            input_format: input_format.to_string(),
            device: device.to_string(),
            frame_rate: 30,
            output_directory: videos_dir.join("clipcast"),
        }
    }
}

fn default_capture_device() -> (&'static str, &'static str) {
    if cfg!(target_os = "macos") {
        ("avfoundation", "0")
    } else if cfg!(windows) {
        ("dshow", "video=Integrated Camera")
    } else {
        ("v4l2", "/dev/video0")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub api_base: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub timeout_secs: u64,
    pub copy_url_on_select: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name: String::new(),
            upload_preset: String::new(),
            timeout_secs: 300,
            copy_url_on_select: true,
        }
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.upload_preset.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    pub theme: Theme,
    pub show_notifications: bool,
    pub frame_interval_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            show_notifications: true,
            frame_interval_ms: 16,
        }
    }
}

impl UiConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

fn is_credential(value: &str) -> bool {
    value.len() <= MAX_CREDENTIAL_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.camera.frame_rate < MIN_FRAME_RATE || self.camera.frame_rate > MAX_FRAME_RATE {
            return Err(anyhow!(
                "frame_rate must be between {} and {}",
                MIN_FRAME_RATE,
                MAX_FRAME_RATE
            ));
        }
        if self.camera.ffmpeg_path.is_empty() {
            return Err(anyhow!("ffmpeg_path cannot be empty"));
        }
        if self.camera.device.is_empty() || self.camera.device.len() > MAX_DEVICE_LEN {
            return Err(anyhow!("camera device must be 1 to {} characters", MAX_DEVICE_LEN));
        }
        if self.camera.device.chars().any(|c| c.is_control()) {
            return Err(anyhow!("camera device contains control characters"));
        }
        if !self
            .camera
            .input_format
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(anyhow!("input_format contains invalid characters"));
        }
        if self.upload.timeout_secs < MIN_UPLOAD_TIMEOUT_SECS
            || self.upload.timeout_secs > MAX_UPLOAD_TIMEOUT_SECS
        {
            return Err(anyhow!(
                "timeout_secs must be between {} and {}",
                MIN_UPLOAD_TIMEOUT_SECS,
                MAX_UPLOAD_TIMEOUT_SECS
            ));
        }
        if self.upload.api_base.len() > MAX_API_BASE_LEN {
            return Err(anyhow!("api_base too long"));
        }
        if !self.upload.api_base.starts_with("https://") {
            return Err(anyhow!("api_base must use HTTPS"));
        }
        if !is_credential(&self.upload.cloud_name) {
            return Err(anyhow!("cloud_name contains invalid characters"));
        }
        if !is_credential(&self.upload.upload_preset) {
            return Err(anyhow!("upload_preset contains invalid characters"));
        }
        if self.ui.frame_interval_ms < MIN_FRAME_INTERVAL_MS
            || self.ui.frame_interval_ms > MAX_FRAME_INTERVAL_MS
        {
            return Err(anyhow!(
                "frame_interval_ms must be between {} and {}",
                MIN_FRAME_INTERVAL_MS,
                MAX_FRAME_INTERVAL_MS
            ));
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        self.camera.frame_rate = self.camera.frame_rate.clamp(MIN_FRAME_RATE, MAX_FRAME_RATE);
        self.upload.timeout_secs = self
            .upload
            .timeout_secs
            .clamp(MIN_UPLOAD_TIMEOUT_SECS, MAX_UPLOAD_TIMEOUT_SECS);
        self.ui.frame_interval_ms = self
            .ui
            .frame_interval_ms
            .clamp(MIN_FRAME_INTERVAL_MS, MAX_FRAME_INTERVAL_MS);

        if self.camera.ffmpeg_path.is_empty() {
            self.camera.ffmpeg_path = String::from("ffmpeg");
        }

        if self.upload.api_base.len() > MAX_API_BASE_LEN
            || !self.upload.api_base.starts_with("https://")
        {
            self.upload.api_base = DEFAULT_API_BASE.to_string();
        }

        if !is_credential(&self.upload.cloud_name) {
            self.upload.cloud_name = String::new();
        }
        if !is_credential(&self.upload.upload_preset) {
            self.upload.upload_preset = String::new();
        }
    }

    /// Credentials may come from the environment instead of the config file.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cloud_name) = lookup(CLOUD_NAME_VAR).filter(|v| !v.is_empty()) {
            self.upload.cloud_name = cloud_name;
        }
        if let Some(preset) = lookup(UPLOAD_PRESET_VAR).filter(|v| !v.is_empty()) {
            self.upload.upload_preset = preset;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            upload: UploadConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "clipcast", "clipcast").map(|p| p.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)?;
                Self::from_toml(&content)?
            }
            _ => Config::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.sanitize();
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a broken file falls back to the defaults.
    /// Environment credentials apply either way.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::defaults_with(|key| std::env::var(key).ok())
        })
    }

    fn defaults_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.apply_overrides(lookup);
        config.sanitize();
        config
    }

    fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.sanitize();
        config.validate()?;
        Ok(config)
    }

    pub fn ensure_output_dir(&self) -> Result<()> {
        let dir = &self.camera.output_directory;
        if dir.as_os_str().is_empty() {
            return Err(anyhow!("Output directory path is empty"));
        }
        if dir.to_string_lossy().contains("..") {
            return Err(anyhow!("Output directory contains path traversal"));
        }
        fs::create_dir_all(dir)?;
        Ok(())
    }
}
