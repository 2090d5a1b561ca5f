use crate::upload::UploadedMedia;

/// Videos uploaded during this screen's lifetime, in upload order.
///
/// Entries are never deduplicated: recording and uploading the same content
/// twice yields two entries, so views index them by position, not by URL.
#[derive(Debug, Default)]
pub struct UploadedVideos {
    videos: Vec<UploadedMedia>,
}

impl UploadedVideos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_video(&mut self, video: UploadedMedia) {
        tracing::info!(
            url = %video.link(),
            duration = video.duration,
            dimensions = ?video.dimensions(),
            "Uploaded video added to history"
        );
        self.videos.push(video);
    }

    pub fn videos(&self) -> &[UploadedMedia] {
        &self.videos
    }

    pub fn get(&self, index: usize) -> Option<&UploadedMedia> {
        self.videos.get(index)
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn clear(&mut self) {
        if !self.videos.is_empty() {
            tracing::debug!(count = self.videos.len(), "Clearing uploaded video history");
        }
        self.videos.clear();
    }
}
