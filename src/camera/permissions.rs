use std::io;
use std::process::{Command, Stdio};
use std::time::Duration;

use super::ffmpeg::wait_timeout;
use super::PermissionStatus;

/// Long enough for the user to answer a system permission prompt.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Maps the result of opening a capture device node to a permission status.
pub(super) fn status_from_open(result: io::Result<()>) -> PermissionStatus {
    match result {
        Ok(()) => PermissionStatus::Granted,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => PermissionStatus::Denied,
        Err(_) => PermissionStatus::NotDetermined,
    }
}

/// Checks a device node without prompting. Only meaningful where the camera
/// is a file, i.e. v4l2 on Linux.
pub(super) fn check_device_node(device: &str) -> PermissionStatus {
    status_from_open(std::fs::File::open(device).map(|_| ()))
}

/// Grabs a single frame. On macOS the first attempt triggers the system
/// camera prompt, and the result reflects the user's answer. A device that
/// delivers nothing within [`PROBE_TIMEOUT`] is treated as undetermined.
pub(super) fn probe_capture(
    ffmpeg_path: &str,
    input_format: &str,
    device: &str,
) -> PermissionStatus {
    probe_capture_within(ffmpeg_path, input_format, device, PROBE_TIMEOUT)
}

fn probe_capture_within(
    ffmpeg_path: &str,
    input_format: &str,
    device: &str,
    timeout: Duration,
) -> PermissionStatus {
    let spawned = Command::new(ffmpeg_path)
        .args(["-hide_banner", "-loglevel", "error", "-f", input_format, "-i", device])
        .args(["-frames:v", "1", "-f", "null", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!("Failed to run ffmpeg for camera probe: {}", e);
            return PermissionStatus::NotDetermined;
        }
    };

    match wait_timeout(&mut child, timeout) {
        Ok(Some(s)) if s.success() => PermissionStatus::Granted,
        Ok(Some(_)) => PermissionStatus::Denied,
        Ok(None) => {
            tracing::warn!(device, "Camera probe timed out");
            PermissionStatus::NotDetermined
        }
        Err(e) => {
            tracing::warn!("Camera probe failed: {}", e);
            PermissionStatus::NotDetermined
        }
    }
}

/// Opens the OS camera privacy settings. Returns false where there is none.
pub fn open_privacy_settings() -> bool {
    #[cfg(target_os = "macos")]
    {
        let url = "x-apple.systempreferences:com.apple.preference.security?Privacy_Camera";
        let opened = Command::new("open")
            .arg(url)
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !opened {
            tracing::warn!("Failed to open Camera privacy preferences");
        }
        opened
    }

    #[cfg(windows)]
    {
        let opened = Command::new("cmd")
            .args(["/C", "start", "ms-settings:privacy-webcam"])
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !opened {
            tracing::warn!("Failed to open camera privacy settings");
        }
        opened
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_open() {
        assert_eq!(status_from_open(Ok(())), PermissionStatus::Granted);
        assert_eq!(
            status_from_open(Err(io::Error::from(io::ErrorKind::PermissionDenied))),
            PermissionStatus::Denied
        );
        assert_eq!(
            status_from_open(Err(io::Error::from(io::ErrorKind::NotFound))),
            PermissionStatus::NotDetermined
        );
    }

    #[test]
    fn test_missing_device_node_is_undetermined() {
        assert_eq!(
            check_device_node("/nonexistent/clipcast/video9"),
            PermissionStatus::NotDetermined
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_probe_is_undetermined() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let started = std::time::Instant::now();
        let status = probe_capture_within(
            &script.to_string_lossy(),
            "avfoundation",
            "0",
            Duration::from_millis(300),
        );
        assert_eq!(status, PermissionStatus::NotDetermined);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_probe_without_ffmpeg_is_undetermined() {
        assert_eq!(
            probe_capture("/nonexistent/clipcast/ffmpeg", "v4l2", "/dev/video0"),
            PermissionStatus::NotDetermined
        );
    }
}
