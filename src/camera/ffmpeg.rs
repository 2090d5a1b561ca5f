use anyhow::{anyhow, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::permissions;
use super::{Blocking, Camera, FileType, PermissionStatus, RecordingOptions, RecordingOutput};
use crate::config::CameraConfig;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const MAX_STDERR_LEN: usize = 512;

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub ffmpeg_path: String,
    pub input_format: String,
    pub device: String,
    pub frame_rate: u32,
    pub output_directory: PathBuf,
}

impl From<&CameraConfig> for CaptureSettings {
    fn from(config: &CameraConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            input_format: config.input_format.clone(),
            device: config.device.clone(),
            frame_rate: config.frame_rate,
            output_directory: config.output_directory.clone(),
        }
    }
}

impl CaptureSettings {
    fn capture_args(&self, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-f"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(self.input_format.clone());
        args.push(String::from("-framerate"));
        args.push(self.frame_rate.to_string());
        args.push(String::from("-i"));
        args.push(self.device.clone());
        args.extend(
            [
                "-c:v", "libx264", "-preset", "veryfast", "-pix_fmt", "yuv420p", "-movflags",
                "+faststart", "-y",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(output.to_string_lossy().to_string());
        args
    }

    fn uses_device_node(&self) -> bool {
        self.input_format == "v4l2"
    }
}

/// One recording in progress: a directory of segments, the ffmpeg process
/// writing the current one (none while paused), and earlier processes that
/// were asked to exit but may still be flushing.
struct CaptureSession {
    directory: PathBuf,
    segments: Vec<PathBuf>,
    process: Option<Child>,
    closing: Vec<Child>,
    file_type: FileType,
}

impl CaptureSession {
    fn next_segment_path(&self) -> PathBuf {
        self.directory.join(format!(
            "segment_{:03}.{}",
            self.segments.len(),
            self.file_type.extension()
        ))
    }

    /// Asks the running encoder to finish its segment without waiting.
    fn close_segment(&mut self) {
        if let Some(mut child) = self.process.take() {
            request_stop(&mut child);
            self.closing.push(child);
        }
    }

    /// Drops processes that already exited.
    fn reap_closed(&mut self) {
        self.closing.retain_mut(|child| match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) if status.success() => false,
            Ok(Some(status)) => {
                tracing::warn!("Segment encoder exited with {}", status);
                false
            }
            Err(e) => {
                tracing::warn!("Failed to check segment encoder: {}", e);
                true
            }
        });
    }
}

/// Records from a local camera by driving an `ffmpeg` process.
pub struct FfmpegCamera {
    settings: CaptureSettings,
    active: bool,
    session: Option<CaptureSession>,
}

impl FfmpegCamera {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            active: false,
            session: None,
        }
    }

    fn spawn_segment(&self, output: &Path) -> Result<Child> {
        tracing::debug!(segment = %output.display(), "Starting capture segment");
        Command::new(&self.settings.ffmpeg_path)
            .args(self.settings.capture_args(output))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| anyhow!("Failed to start ffmpeg: {}", e))
    }

    fn start_segment(&mut self) -> Result<()> {
        let path = match self.session.as_ref() {
            Some(session) => session.next_segment_path(),
            None => return Err(anyhow!("No recording in progress")),
        };
        let child = self.spawn_segment(&path)?;
        if let Some(session) = self.session.as_mut() {
            session.segments.push(path);
            session.process = Some(child);
        }
        Ok(())
    }
}

/// Asks ffmpeg to finish the file it is writing.
fn request_stop(child: &mut Child) {
    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(b"q");
        let _ = stdin.flush();
    }
}

/// Waits up to `timeout` for the process to exit. Kills it and returns
/// `None` when it does not.
pub(super) fn wait_timeout(
    child: &mut Child,
    timeout: Duration,
) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Waits for an encoder that was asked to stop. Blocking.
pub(super) fn wait_for_exit(child: &mut Child) -> Result<()> {
    match wait_timeout(child, STOP_TIMEOUT)? {
        Some(status) if status.success() => Ok(()),
        Some(status) => Err(anyhow!("ffmpeg exited with {}: {}", status, read_stderr(child))),
        None => {
            tracing::warn!("ffmpeg did not stop in time, killed it");
            Ok(())
        }
    }
}

fn read_stderr(child: &mut Child) -> String {
    let mut text = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        let _ = stderr.read_to_string(&mut text);
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        String::from("no output")
    } else {
        trimmed.chars().take(MAX_STDERR_LEN).collect()
    }
}

fn kill(mut child: Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl Camera for FfmpegCamera {
    fn permission_status(&self) -> PermissionStatus {
        if self.settings.uses_device_node() {
            return permissions::check_device_node(&self.settings.device);
        }
        PermissionStatus::NotDetermined
    }

    fn request_permission(&self) -> Blocking<PermissionStatus> {
        let settings = self.settings.clone();
        Box::new(move || {
            let status = if settings.uses_device_node() {
                permissions::check_device_node(&settings.device)
            } else {
                permissions::probe_capture(
                    &settings.ffmpeg_path,
                    &settings.input_format,
                    &settings.device,
                )
            };
            tracing::info!(?status, device = %settings.device, "Camera permission resolved");
            status
        })
    }

    fn check_available(&self) -> Blocking<Result<()>> {
        let ffmpeg_path = self.settings.ffmpeg_path.clone();
        Box::new(move || {
            let status = Command::new(&ffmpeg_path)
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map_err(|e| anyhow!("ffmpeg not available: {}", e))?;
            if !status.success() {
                return Err(anyhow!("ffmpeg not available"));
            }
            Ok(())
        })
    }

    fn activate(&mut self) {
        self.active = true;
        tracing::debug!("Camera activated");
    }

    fn deactivate(&mut self) {
        if self.session.is_some() {
            self.cancel_recording();
        }
        self.active = false;
        tracing::debug!("Camera deactivated");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn start_recording(&mut self, options: &RecordingOptions) -> Result<()> {
        if !self.active {
            return Err(anyhow!("Camera is not active"));
        }
        if self.session.is_some() {
            return Err(anyhow!("Already recording"));
        }

        let directory = self.settings.output_directory.join(format!(
            "{}{}",
            super::SESSION_DIR_PREFIX,
            uuid::Uuid::new_v4().simple()
        ));
        fs::create_dir_all(&directory)?;

        self.session = Some(CaptureSession {
            directory,
            segments: Vec::new(),
            process: None,
            closing: Vec::new(),
            file_type: options.file_type,
        });
        if let Err(e) = self.start_segment() {
            self.cancel_recording();
            return Err(e);
        }
        tracing::info!("Camera recording started");
        Ok(())
    }

    fn pause_recording(&mut self) -> Result<()> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| anyhow!("No recording in progress"))?;
        session.close_segment();
        Ok(())
    }

    fn resume_recording(&mut self) -> Result<()> {
        let paused = match self.session.as_mut() {
            Some(session) => {
                session.reap_closed();
                session.process.is_none()
            }
            None => return Err(anyhow!("No recording in progress")),
        };
        if paused {
            self.start_segment()
        } else {
            Ok(())
        }
    }

    fn stop_recording(&mut self) -> Result<RecordingOutput> {
        let mut session = self
            .session
            .take()
            .ok_or_else(|| anyhow!("No recording in progress"))?;
        session.close_segment();

        tracing::info!(segments = session.segments.len(), "Camera recording stopped");
        Ok(RecordingOutput {
            ffmpeg_path: self.settings.ffmpeg_path.clone(),
            directory: session.directory,
            segments: session.segments,
            file_type: session.file_type,
            closing: session.closing,
        })
    }

    fn cancel_recording(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(child) = session.process.take() {
            kill(child);
        }
        session.closing.drain(..).for_each(kill);
        if let Err(e) = fs::remove_dir_all(&session.directory) {
            tracing::warn!("Failed to remove abandoned recording: {}", e);
        }
        tracing::info!("Camera recording discarded");
    }

    fn poll_error(&mut self) -> Option<String> {
        let session = self.session.as_mut()?;
        let child = session.process.as_mut()?;
        match child.try_wait() {
            Ok(None) => None,
            Ok(Some(status)) => {
                let message = format!("ffmpeg exited with {}: {}", status, read_stderr(child));
                session.process = None;
                Some(message)
            }
            Err(e) => Some(e.to_string()),
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.cancel_recording();
    }
}
