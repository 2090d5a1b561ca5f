use serde::{Deserialize, Serialize};

/// A video accepted by the media host. Only `url` is required; the host adds
/// fields over time, so everything else falls back to a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    #[serde(default)]
    pub secure_url: String,
    #[serde(default)]
    pub playback_url: Option<String>,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub public_id: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub bit_rate: u64,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub frame_rate: f64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub original_filename: String,
    #[serde(default)]
    pub video: Option<VideoStream>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub pix_format: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub bit_rate: Option<String>,
}

impl UploadedMedia {
    /// The address to hand to the user, preferring HTTPS.
    pub fn link(&self) -> &str {
        if self.secure_url.is_empty() {
            &self.url
        } else {
            &self.secure_url
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some((self.width, self.height))
        }
    }
}

#[cfg(test)]
pub(crate) fn sample(url: &str) -> UploadedMedia {
    UploadedMedia {
        url: url.to_string(),
        secure_url: url.replacen("http://", "https://", 1),
        playback_url: None,
        asset_id: String::from("asset"),
        public_id: String::from("video_1"),
        format: String::from("mp4"),
        resource_type: String::from("video"),
        duration: 2.5,
        width: 1280,
        height: 720,
        bit_rate: 1_000_000,
        bytes: 312_500,
        frame_rate: 30.0,
        created_at: String::from("2026-01-01T00:00:00Z"),
        original_filename: String::from("video_1"),
        video: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_response() {
        let json = r#"{
            "asset_id": "3515c6000a548515f1134043f9785c2f",
            "public_id": "gotjephlnz2jgiu20zni",
            "version": 1719307544,
            "width": 1920,
            "height": 1080,
            "format": "mp4",
            "resource_type": "video",
            "created_at": "2024-06-25T09:25:44Z",
            "tags": [],
            "pages": 0,
            "bytes": 4402422,
            "type": "upload",
            "url": "http://res.cloudinary.com/demo/video/upload/v1719307544/gotjephlnz2jgiu20zni.mp4",
            "secure_url": "https://res.cloudinary.com/demo/video/upload/v1719307544/gotjephlnz2jgiu20zni.mp4",
            "playback_url": "https://res.cloudinary.com/demo/video/upload/sp_auto/v1719307544/gotjephlnz2jgiu20zni.m3u8",
            "audio": {},
            "video": {
                "pix_format": "yuv420p",
                "codec": "h264",
                "level": 40,
                "profile": "High",
                "bit_rate": "3441659",
                "time_base": "1/15360"
            },
            "frame_rate": 30.0,
            "bit_rate": 3449346,
            "duration": 10.2,
            "rotation": 0,
            "original_filename": "video_1719307540000",
            "nb_frames": 306
        }"#;

        let media: UploadedMedia = serde_json::from_str(json).unwrap();
        assert_eq!(media.dimensions(), Some((1920, 1080)));
        assert_eq!(media.format, "mp4");
        assert_eq!(media.bit_rate, 3_449_346);
        assert!(media.link().starts_with("https://"));
        assert_eq!(media.video.unwrap().codec, "h264");
    }

    #[test]
    fn test_minimal_response_falls_back_to_url() {
        let media: UploadedMedia =
            serde_json::from_str(r#"{"url": "http://example.com/v.mp4"}"#).unwrap();
        assert_eq!(media.link(), "http://example.com/v.mp4");
        assert_eq!(media.dimensions(), None);
    }

    #[test]
    fn test_response_without_url_is_rejected() {
        let result = serde_json::from_str::<UploadedMedia>(r#"{"secure_url": "https://x"}"#);
        assert!(result.is_err());
    }
}
