pub mod media;

pub use media::UploadedMedia;

use anyhow::{anyhow, Result};
use std::path::Path;
use std::time::Duration;

const MAX_URL_LEN: usize = 2048;
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;
const MAX_REDIRECTS: usize = 5;
const MAX_CREDENTIAL_LEN: usize = 128;

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Sends a finished recording to a media host.
pub trait Uploader: Send + Sync {
    fn upload(&self, path: &Path) -> Result<UploadedMedia>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryTarget {
    pub api_base: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

impl CloudinaryTarget {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
        }
    }

    pub fn endpoint(&self) -> Result<url::Url> {
        validate_credential("cloud name", &self.cloud_name)?;
        let raw = format!(
            "{}/{}/video/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        );
        let parsed = url::Url::parse(&raw).map_err(|_| anyhow!("Invalid upload URL"))?;
        if parsed.scheme() != "https" {
            return Err(anyhow!("Only HTTPS upload endpoints are allowed"));
        }
        if parsed.host_str().is_none() {
            return Err(anyhow!("Upload URL has no host"));
        }
        Ok(parsed)
    }
}

fn validate_credential(label: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(anyhow!("Upload {} is not configured", label));
    }
    if value.len() > MAX_CREDENTIAL_LEN {
        return Err(anyhow!("Upload {} too long", label));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(anyhow!("Upload {} contains invalid characters", label));
    }
    Ok(())
}

/// Posts recordings to Cloudinary's unsigned upload API.
///
/// Each upload builds and drops its own blocking client on the calling
/// thread. Callers must not invoke `upload` from inside an async task.
pub struct CloudinaryUploader {
    target: CloudinaryTarget,
    timeout: Duration,
}

impl CloudinaryUploader {
    pub fn new(target: CloudinaryTarget, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    fn client(&self) -> Result<reqwest::blocking::Client> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("clipcast/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(client)
    }

    fn upload_file(&self, path: &Path) -> Result<UploadedMedia> {
        let endpoint = self.target.endpoint()?;
        validate_credential("preset", &self.target.upload_preset)?;

        let size = std::fs::metadata(path)
            .map_err(|e| anyhow!("Cannot read recording {}: {}", path.display(), e))?
            .len();
        if size == 0 {
            return Err(anyhow!("Recording is empty"));
        }

        let file_name = format!("video_{}.mp4", chrono::Utc::now().timestamp_millis());
        let part = reqwest::blocking::multipart::Part::file(path)?
            .file_name(file_name)
            .mime_str("video/mp4")?;
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.target.upload_preset.clone());

        tracing::info!(bytes = size, endpoint = %endpoint, "Uploading recording");
        let response = self.client()?.post(endpoint).multipart(form).send()?;

        let status = response.status();
        if response
            .content_length()
            .is_some_and(|len| len > MAX_RESPONSE_SIZE as u64)
        {
            return Err(anyhow!("Response too large"));
        }

        let text = response.text()?;
        if text.len() > MAX_RESPONSE_SIZE {
            return Err(anyhow!("Response too large"));
        }

        if !status.is_success() {
            let reason = extract_error_message(&text).unwrap_or_else(|| status.to_string());
            return Err(anyhow!("Upload failed ({}): {}", status.as_u16(), reason));
        }

        parse_response(&text)
    }
}

impl Uploader for CloudinaryUploader {
    fn upload(&self, path: &Path) -> Result<UploadedMedia> {
        self.upload_file(path)
    }
}

fn extract_error_message(text: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(text).ok()?;
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|m| m.chars().take(256).collect())
}

fn parse_response(text: &str) -> Result<UploadedMedia> {
    let media: UploadedMedia =
        serde_json::from_str(text).map_err(|e| anyhow!("Unexpected upload response: {}", e))?;

    validate_returned_url(&media.url)?;
    if !media.secure_url.is_empty() {
        validate_returned_url(&media.secure_url)?;
    }
    Ok(media)
}

fn validate_returned_url(url: &str) -> Result<()> {
    if url.len() > MAX_URL_LEN {
        return Err(anyhow!("URL too long"));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(anyhow!("Invalid URL scheme in response"));
    }

    if url.contains('\0') || url.contains('\n') || url.contains('\r') {
        return Err(anyhow!("URL contains invalid characters"));
    }

    match url::Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some() => Ok(()),
        Ok(_) => Err(anyhow!("URL has no host")),
        Err(_) => Err(anyhow!("Invalid URL format in response")),
    }
}

pub fn copy_url_to_clipboard(url: &str) -> Result<()> {
    use arboard::Clipboard;

    if url.len() > MAX_URL_LEN {
        return Err(anyhow!("URL too long"));
    }

    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(url.to_string())?;
    Ok(())
}
