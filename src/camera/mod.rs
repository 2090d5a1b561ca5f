//! Camera access.
//!
//! The screen talks to the camera only through [`Camera`]. Recording is split
//! into one segment per pause; [`RecordingOutput::finalize`] joins them into
//! the file that gets uploaded.
//!
//! Nothing on [`Camera`] blocks. Work that has to wait on a process is handed
//! back as a [`Blocking`] job for the caller to run on a worker thread.

mod ffmpeg;
mod permissions;

pub use ffmpeg::{CaptureSettings, FfmpegCamera};
pub use permissions::open_privacy_settings;

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

const SESSION_DIR_PREFIX: &str = "recording_";

/// A job that may block on a subprocess.
pub type Blocking<T> = Box<dyn FnOnce() -> T + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    NotDetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Mp4,
    Mov,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Mp4 => "mp4",
            FileType::Mov => "mov",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingOptions {
    pub file_type: FileType,
}

pub trait Camera {
    /// Status known without asking the user or touching the device.
    fn permission_status(&self) -> PermissionStatus;
    /// Asks for access. May show a system prompt and wait for the answer.
    fn request_permission(&self) -> Blocking<PermissionStatus>;
    /// Checks that the capture backend can run at all.
    fn check_available(&self) -> Blocking<Result<()>>;

    /// Turns the camera on for the camera view, once it is known to work.
    fn activate(&mut self);
    fn deactivate(&mut self);
    fn is_active(&self) -> bool;

    fn start_recording(&mut self, options: &RecordingOptions) -> Result<()>;
    /// Ends the current segment. The process is only asked to exit here;
    /// waiting for it is left to [`RecordingOutput::finalize`].
    fn pause_recording(&mut self) -> Result<()>;
    fn resume_recording(&mut self) -> Result<()>;
    /// Ends the recording and hands back the segments written so far.
    fn stop_recording(&mut self) -> Result<RecordingOutput>;
    /// Ends the recording and discards everything it wrote.
    fn cancel_recording(&mut self);

    /// Reports a recording that died on its own since the last poll.
    fn poll_error(&mut self) -> Option<String>;
}

/// Segments of one finished recording, in recording order, along with the
/// encoder processes still writing them.
#[derive(Debug)]
pub struct RecordingOutput {
    pub ffmpeg_path: String,
    pub directory: PathBuf,
    pub segments: Vec<PathBuf>,
    pub file_type: FileType,
    pub closing: Vec<Child>,
}

impl RecordingOutput {
    /// Produces the single file for this recording. Blocking.
    ///
    /// On failure the recording directory is removed.
    pub fn finalize(mut self) -> Result<PathBuf> {
        let result = self.join_segments();
        if result.is_err() {
            if let Err(e) = fs::remove_dir_all(&self.directory) {
                tracing::warn!("Failed to remove failed recording: {}", e);
            }
        }
        result
    }

    fn join_segments(&mut self) -> Result<PathBuf> {
        for mut child in self.closing.drain(..) {
            ffmpeg::wait_for_exit(&mut child)?;
        }

        let segments: Vec<&PathBuf> = self
            .segments
            .iter()
            .filter(|p| fs::metadata(p).map(|m| m.len() > 0).unwrap_or(false))
            .collect();

        let target = self.directory.join(format!(
            "video_{}.{}",
            chrono::Local::now().format("%Y%m%d_%H%M%S%3f"),
            self.file_type.extension()
        ));

        match segments.as_slice() {
            [] => Err(anyhow!("No video was recorded")),
            [only] => {
                fs::rename(only, &target)?;
                Ok(target)
            }
            many => {
                let list_path = self.directory.join("segments.txt");
                fs::write(&list_path, concat_list(many))?;
                concat_segments(&self.ffmpeg_path, &list_path, &target)?;
                let _ = fs::remove_file(&list_path);
                for segment in many {
                    let _ = fs::remove_file(segment);
                }
                Ok(target)
            }
        }
    }
}

/// Deletes the recording directory holding a finalized file. Refuses paths
/// that are not inside a recording directory.
pub fn remove_recording(file: &Path) -> Result<()> {
    let directory = file
        .parent()
        .filter(|dir| {
            dir.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(SESSION_DIR_PREFIX))
        })
        .ok_or_else(|| anyhow!("Not a recording: {}", file.display()))?;

    fs::remove_dir_all(directory)?;
    tracing::debug!(directory = %directory.display(), "Recording removed");
    Ok(())
}

fn concat_list(segments: &[&PathBuf]) -> String {
    segments
        .iter()
        .map(|p| format!("file '{}'\n", p.to_string_lossy().replace('\'', "'\\''")))
        .collect()
}

fn concat_segments(ffmpeg_path: &str, list_path: &Path, target: &Path) -> Result<()> {
    tracing::info!(target = %target.display(), "Joining recording segments");
    let output = Command::new(ffmpeg_path)
        .args(["-hide_banner", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
        .arg(list_path)
        .args(["-c", "copy", "-y"])
        .arg(target)
        .output()
        .map_err(|e| anyhow!("Failed to run ffmpeg: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("ffmpeg could not join segments: {}", stderr.trim()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(dir: &Path, segments: Vec<PathBuf>) -> RecordingOutput {
        RecordingOutput {
            ffmpeg_path: String::from("ffmpeg"),
            directory: dir.to_path_buf(),
            segments,
            file_type: FileType::Mp4,
            closing: Vec::new(),
        }
    }

    #[test]
    fn test_single_segment_is_renamed() {
        let dir = tempfile::tempdir().unwrap();
        let segment = dir.path().join("segment_000.mp4");
        fs::write(&segment, b"frames").unwrap();

        let path = output(dir.path(), vec![segment.clone()]).finalize().unwrap();
        assert!(!segment.exists());
        assert_eq!(fs::read(&path).unwrap(), b"frames");
        assert_eq!(path.extension().unwrap(), "mp4");
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("segment_000.mp4");
        let full = dir.path().join("segment_001.mp4");
        fs::write(&empty, b"").unwrap();
        fs::write(&full, b"frames").unwrap();

        let path = output(dir.path(), vec![empty, full]).finalize().unwrap();
        assert_eq!(fs::read(path).unwrap(), b"frames");
    }

    #[test]
    fn test_nothing_recorded_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("segment_000.mp4");
        assert!(output(dir.path(), vec![missing]).finalize().is_err());
        assert!(output(dir.path(), Vec::new()).finalize().is_err());
    }

    #[test]
    fn test_failed_finalize_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let session = root.path().join("recording_abc");
        fs::create_dir(&session).unwrap();
        fs::write(session.join("segment_000.mp4"), b"").unwrap();

        let segments = vec![session.join("segment_000.mp4")];
        assert!(output(&session, segments).finalize().is_err());
        assert!(!session.exists());
    }

    #[test]
    fn test_remove_recording_deletes_session_directory() {
        let root = tempfile::tempdir().unwrap();
        let session = root.path().join("recording_abc");
        fs::create_dir(&session).unwrap();
        let video = session.join("video_1.mp4");
        fs::write(&video, b"frames").unwrap();

        remove_recording(&video).unwrap();
        assert!(!session.exists());
        assert!(root.path().exists());
    }

    #[test]
    fn test_remove_recording_refuses_other_directories() {
        let root = tempfile::tempdir().unwrap();
        let video = root.path().join("video_1.mp4");
        fs::write(&video, b"frames").unwrap();

        assert!(remove_recording(&video).is_err());
        assert!(video.exists());
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let a = PathBuf::from("/tmp/it's/segment_000.mp4");
        let b = PathBuf::from("/tmp/plain/segment_001.mp4");
        assert_eq!(
            concat_list(&[&a, &b]),
            "file '/tmp/it'\\''s/segment_000.mp4'\nfile '/tmp/plain/segment_001.mp4'\n"
        );
    }
}
