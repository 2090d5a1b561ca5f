pub mod components;
pub mod style;
pub mod views;

use iced::{Element, Subscription, Task, Theme};
use std::path::PathBuf;
use std::sync::Arc;

use crate::camera::{
    open_privacy_settings, remove_recording, Camera, CaptureSettings, FfmpegCamera,
    PermissionStatus, RecordingOptions,
};
use crate::config::{Config, CLOUD_NAME_VAR, UPLOAD_PRESET_VAR};
use crate::error::AppError;
use crate::notify::Notifier;
use crate::store::UploadedVideos;
use crate::timer::{RecordingTimer, TickHandle, TimerState};
use crate::upload::{
    copy_url_to_clipboard, CloudinaryTarget, CloudinaryUploader, UploadedMedia, Uploader,
};

use self::style::MonochromeTheme;

#[derive(Debug, Clone)]
pub enum Message {
    OpenCamera,
    PermissionResolved(PermissionStatus),
    CameraChecked(Result<(), AppError>),
    CloseCamera,
    StartRecording,
    StopRecording,
    PauseRecording,
    ResumeRecording,
    Tick(TickHandle),
    RecordingFinished(Result<PathBuf, AppError>),
    UploadComplete(Result<UploadedMedia, AppError>),
    SelectVideo(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Camera,
    Uploading,
}

pub struct App {
    config: Config,
    theme: MonochromeTheme,
    screen: Screen,
    camera: Box<dyn Camera>,
    uploader: Arc<dyn Uploader>,
    timer: RecordingTimer,
    videos: UploadedVideos,
    notifier: Notifier,
    permission: PermissionStatus,
    opening: bool,
    /// Finalized file currently being uploaded.
    uploading: Option<PathBuf>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let config = Config::load_or_default();
        if let Err(e) = config.ensure_output_dir() {
            tracing::warn!("Failed to create output directory: {}", e);
        }
        if !config.upload.is_configured() {
            tracing::warn!("Upload credentials are not set, uploads will fail");
        }

        let camera = FfmpegCamera::new(CaptureSettings::from(&config.camera));
        let target = CloudinaryTarget {
            api_base: config.upload.api_base.clone(),
            ..CloudinaryTarget::new(&config.upload.cloud_name, &config.upload.upload_preset)
        };
        let uploader = CloudinaryUploader::new(target, config.upload.timeout());

        let app = Self::with_parts(config, Box::new(camera), Arc::new(uploader));
        (app, Task::none())
    }

    pub fn with_parts(
        config: Config,
        camera: Box<dyn Camera>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        let theme = match config.ui.theme {
            crate::config::Theme::Dark => MonochromeTheme::dark(),
            crate::config::Theme::Light => MonochromeTheme::light(),
        };
        let notifier = Notifier::new(config.ui.show_notifications);
        let permission = camera.permission_status();

        Self {
            config,
            theme,
            screen: Screen::Home,
            camera,
            uploader,
            timer: RecordingTimer::new(),
            videos: UploadedVideos::new(),
            notifier,
            permission,
            opening: false,
            uploading: None,
        }
    }

    pub fn title(&self) -> String {
        match self.screen {
            Screen::Home => String::from("clipcast"),
            Screen::Camera if self.timer.state().is_recording() => {
                String::from("clipcast - Recording")
            }
            Screen::Camera => String::from("clipcast - Camera"),
            Screen::Uploading => String::from("clipcast - Uploading"),
        }
    }

    pub fn theme(&self) -> Theme {
        if self.theme.is_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_loading(&self) -> bool {
        self.screen == Screen::Uploading
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenCamera => {
                if self.screen != Screen::Home || self.opening {
                    return Task::none();
                }
                self.opening = true;
                if self.permission == PermissionStatus::Granted {
                    return Task::done(Message::PermissionResolved(PermissionStatus::Granted));
                }
                let request = self.camera.request_permission();
                return Task::perform(
                    async move {
                        tokio::task::spawn_blocking(request)
                            .await
                            .unwrap_or(PermissionStatus::NotDetermined)
                    },
                    Message::PermissionResolved,
                );
            }
            Message::PermissionResolved(status) => {
                self.permission = status;
                match status {
                    PermissionStatus::Granted => {
                        let check = self.camera.check_available();
                        return Task::perform(
                            async move {
                                match tokio::task::spawn_blocking(check).await {
                                    Ok(result) => result.map_err(AppError::camera),
                                    Err(e) => Err(AppError::camera(e)),
                                }
                            },
                            Message::CameraChecked,
                        );
                    }
                    PermissionStatus::Denied => {
                        self.opening = false;
                        self.notifier.error(&AppError::PermissionDenied);
                        if !open_privacy_settings() {
                            tracing::debug!("No camera privacy settings on this platform");
                        }
                    }
                    PermissionStatus::NotDetermined => {
                        self.opening = false;
                        self.notifier.error(&AppError::camera("No camera found"));
                    }
                }
            }
            Message::CameraChecked(result) => {
                self.opening = false;
                match result {
                    Ok(()) => {
                        self.camera.activate();
                        self.screen = Screen::Camera;
                    }
                    Err(e) => {
                        tracing::error!("Failed to activate camera: {}", e);
                        self.notifier.error(&e);
                    }
                }
            }
            Message::CloseCamera => {
                if self.timer.state().is_recording() {
                    tracing::info!("Camera closed while recording, discarding");
                    self.camera.cancel_recording();
                    self.timer.stop();
                }
                self.camera.deactivate();
                self.screen = Screen::Home;
            }
            Message::StartRecording => {
                if self.screen != Screen::Camera
                    || !self.camera.is_active()
                    || self.timer.state().is_recording()
                {
                    return Task::none();
                }
                match self.camera.start_recording(&RecordingOptions::default()) {
                    Ok(()) => self.timer.start(),
                    Err(e) => self.fail_recording(e),
                }
            }
            Message::PauseRecording => {
                if self.timer.state() != TimerState::Recording {
                    return Task::none();
                }
                match self.camera.pause_recording() {
                    Ok(()) => self.timer.pause(),
                    Err(e) => self.fail_recording(e),
                }
            }
            Message::ResumeRecording => {
                if self.timer.state() != TimerState::Paused {
                    return Task::none();
                }
                match self.camera.resume_recording() {
                    Ok(()) => self.timer.resume(),
                    Err(e) => self.fail_recording(e),
                }
            }
            Message::StopRecording => {
                if !self.timer.state().is_recording() {
                    return Task::none();
                }
                let output = match self.camera.stop_recording() {
                    Ok(output) => output,
                    Err(e) => {
                        self.fail_recording(e);
                        return Task::none();
                    }
                };
                tracing::info!(elapsed_ms = self.timer.elapsed(), "Recording stopped");
                self.timer.finish();
                self.camera.deactivate();
                self.screen = Screen::Uploading;

                return Task::perform(
                    async move {
                        match tokio::task::spawn_blocking(move || output.finalize()).await {
                            Ok(result) => result.map_err(AppError::camera),
                            Err(e) => Err(AppError::camera(e)),
                        }
                    },
                    Message::RecordingFinished,
                );
            }
            Message::Tick(handle) => {
                if let Some(err) = self.camera.poll_error() {
                    self.fail_recording(err);
                    return Task::none();
                }
                if let Some(published) = self.timer.on_tick(handle) {
                    tracing::trace!(published, "Recording time published");
                }
            }
            Message::RecordingFinished(result) => match result {
                Ok(path) if !self.config.upload.is_configured() => {
                    tracing::warn!(path = %path.display(), "Upload not configured, recording kept");
                    self.notifier.error(&AppError::Config(format!(
                        "Set {} and {} to upload recordings",
                        CLOUD_NAME_VAR, UPLOAD_PRESET_VAR
                    )));
                    self.screen = Screen::Home;
                }
                Ok(path) => {
                    tracing::info!(path = %path.display(), "Recording finished, uploading");
                    self.uploading = Some(path.clone());
                    let uploader = Arc::clone(&self.uploader);

                    return Task::perform(
                        async move {
                            let upload = move || uploader.upload(&path);
                            match tokio::task::spawn_blocking(upload).await {
                                Ok(result) => result.map_err(AppError::upload),
                                Err(e) => Err(AppError::upload(e)),
                            }
                        },
                        Message::UploadComplete,
                    );
                }
                Err(e) => {
                    tracing::error!("Recording could not be finalized: {}", e);
                    self.notifier.error(&e);
                    self.screen = Screen::Home;
                }
            },
            Message::UploadComplete(result) => {
                self.screen = Screen::Home;
                let path = self.uploading.take();

                match result {
                    Ok(media) => {
                        self.videos.add_video(media);
                        self.notifier.success("Success!", "Video uploaded successfully");
                        if let Some(path) = path {
                            if let Err(e) = remove_recording(&path) {
                                tracing::warn!("Failed to remove uploaded recording: {}", e);
                            }
                        }
                    }
                    Err(e) => {
                        if let Some(path) = path {
                            tracing::warn!(path = %path.display(), "Upload failed, recording kept");
                        }
                        tracing::error!("{}", e);
                        self.notifier.error(&e);
                    }
                }
            }
            Message::SelectVideo(index) => {
                if !self.config.upload.copy_url_on_select {
                    return Task::none();
                }
                if let Some(video) = self.videos.get(index) {
                    match copy_url_to_clipboard(video.link()) {
                        Ok(()) => self.notifier.success("Copied", video.link()),
                        Err(e) => tracing::warn!("Failed to copy URL: {}", e),
                    }
                }
            }
        }

        Task::none()
    }

    /// Abandons the recording after a camera failure so the camera and the
    /// timer end up in the same state.
    fn fail_recording(&mut self, err: impl std::fmt::Display) {
        let err = AppError::camera(err);
        tracing::error!("{}", err);
        self.camera.cancel_recording();
        self.timer.stop();
        self.notifier.error(&err);
    }

    pub fn view(&self) -> Element<'_, Message> {
        match self.screen {
            Screen::Home => views::HomeView::view(&self.theme, &self.videos),
            Screen::Camera => views::CameraView::view(
                &self.theme,
                self.timer.state(),
                self.timer.recorded_time(),
            ),
            Screen::Uploading => views::UploadingView::view(&self.theme),
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        match self.timer.active_tick() {
            Some(handle) => iced::time::every(self.config.ui.frame_interval())
                .with(handle)
                .map(|(handle, _)| Message::Tick(handle)),
            None => Subscription::none(),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.timer.stop();
        self.camera.deactivate();
        self.videos.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Blocking, RecordingOutput};
    use crate::upload::media;
    use anyhow::{anyhow, Result};
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<&'static str>>>;

    struct FakeCamera {
        log: CallLog,
        permission: PermissionStatus,
        active: bool,
        unavailable: bool,
        fail_start: bool,
        died: Option<String>,
    }

    impl FakeCamera {
        fn new(log: CallLog, permission: PermissionStatus) -> Self {
            Self {
                log,
                permission,
                active: false,
                unavailable: false,
                fail_start: false,
                died: None,
            }
        }

        fn push(&self, call: &'static str) {
            self.log.borrow_mut().push(call);
        }
    }

    impl Camera for FakeCamera {
        fn permission_status(&self) -> PermissionStatus {
            self.permission
        }

        fn request_permission(&self) -> Blocking<PermissionStatus> {
            self.push("request_permission");
            let status = self.permission;
            Box::new(move || status)
        }

        fn check_available(&self) -> Blocking<Result<()>> {
            self.push("check");
            let unavailable = self.unavailable;
            Box::new(move || {
                if unavailable {
                    Err(anyhow!("ffmpeg not available"))
                } else {
                    Ok(())
                }
            })
        }

        fn activate(&mut self) {
            self.push("activate");
            self.active = true;
        }

        fn deactivate(&mut self) {
            self.push("deactivate");
            self.active = false;
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn start_recording(&mut self, _options: &RecordingOptions) -> Result<()> {
            self.push("start");
            if self.fail_start {
                return Err(anyhow!("device busy"));
            }
            Ok(())
        }

        fn pause_recording(&mut self) -> Result<()> {
            self.push("pause");
            Ok(())
        }

        fn resume_recording(&mut self) -> Result<()> {
            self.push("resume");
            Ok(())
        }

        fn stop_recording(&mut self) -> Result<RecordingOutput> {
            self.push("stop");
            Ok(RecordingOutput {
                ffmpeg_path: String::from("ffmpeg"),
                directory: PathBuf::from("/tmp"),
                segments: Vec::new(),
                file_type: Default::default(),
                closing: Vec::new(),
            })
        }

        fn cancel_recording(&mut self) {
            self.push("cancel");
        }

        fn poll_error(&mut self) -> Option<String> {
            self.died.take()
        }
    }

    struct FakeUploader;

    impl Uploader for FakeUploader {
        fn upload(&self, _path: &Path) -> Result<UploadedMedia> {
            Ok(media::sample("https://res.cloudinary.com/demo/video/upload/v1/a.mp4"))
        }
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.ui.show_notifications = false;
        config.upload.cloud_name = String::from("demo");
        config.upload.upload_preset = String::from("unsigned");
        config
    }

    fn app_with(camera: FakeCamera) -> App {
        App::with_parts(quiet_config(), Box::new(camera), Arc::new(FakeUploader))
    }

    fn open(app: &mut App) {
        let _ = app.update(Message::PermissionResolved(PermissionStatus::Granted));
        let _ = app.update(Message::CameraChecked(Ok(())));
    }

    fn granted_app(log: &CallLog) -> App {
        let mut app = app_with(FakeCamera::new(log.clone(), PermissionStatus::Granted));
        open(&mut app);
        app
    }

    #[test]
    fn test_permission_granted_opens_camera() {
        let log = CallLog::default();
        let app = granted_app(&log);
        assert_eq!(app.screen, Screen::Camera);
        assert_eq!(*log.borrow(), vec!["check", "activate"]);
    }

    #[test]
    fn test_unavailable_camera_stays_home() {
        let log = CallLog::default();
        let mut app = app_with(FakeCamera::new(log.clone(), PermissionStatus::Granted));
        let _ = app.update(Message::PermissionResolved(PermissionStatus::Granted));
        let _ = app.update(Message::CameraChecked(Err(AppError::camera("ffmpeg missing"))));

        assert_eq!(app.screen, Screen::Home);
        assert!(!app.opening);
        assert_eq!(*log.borrow(), vec!["check"]);
    }

    #[test]
    fn test_open_camera_defers_permission_request() {
        let log = CallLog::default();
        let mut app = app_with(FakeCamera::new(log.clone(), PermissionStatus::NotDetermined));
        let _ = app.update(Message::OpenCamera);
        let _ = app.update(Message::OpenCamera);

        assert!(app.opening);
        assert_eq!(app.screen, Screen::Home);
        assert_eq!(*log.borrow(), vec!["request_permission"]);
    }

    #[test]
    fn test_permission_denied_stays_home() {
        let log = CallLog::default();
        let mut app = app_with(FakeCamera::new(log.clone(), PermissionStatus::Denied));
        let _ = app.update(Message::OpenCamera);
        assert_eq!(*log.borrow(), vec!["request_permission"]);

        let _ = app.update(Message::PermissionResolved(PermissionStatus::Denied));
        assert_eq!(app.screen, Screen::Home);
        assert!(!app.opening);
        assert!(!log.borrow().contains(&"activate"));
    }

    #[test]
    fn test_controls_pair_camera_and_timer() {
        let log = CallLog::default();
        let mut app = granted_app(&log);

        let _ = app.update(Message::StartRecording);
        assert_eq!(app.timer.state(), TimerState::Recording);
        let _ = app.update(Message::PauseRecording);
        assert_eq!(app.timer.state(), TimerState::Paused);
        assert!(app.timer.active_tick().is_none());
        let _ = app.update(Message::ResumeRecording);
        assert_eq!(app.timer.state(), TimerState::Recording);
        assert!(app.timer.active_tick().is_some());

        assert_eq!(*log.borrow(), vec!["check", "activate", "start", "pause", "resume"]);
    }

    #[test]
    fn test_pause_while_idle_is_ignored() {
        let log = CallLog::default();
        let mut app = granted_app(&log);
        let _ = app.update(Message::PauseRecording);
        let _ = app.update(Message::ResumeRecording);
        let _ = app.update(Message::StopRecording);
        assert_eq!(app.timer.state(), TimerState::Idle);
        assert_eq!(*log.borrow(), vec!["check", "activate"]);
    }

    #[test]
    fn test_failed_start_leaves_timer_idle() {
        let log = CallLog::default();
        let mut camera = FakeCamera::new(log.clone(), PermissionStatus::Granted);
        camera.fail_start = true;
        let mut app = app_with(camera);
        open(&mut app);

        let _ = app.update(Message::StartRecording);
        assert_eq!(app.timer.state(), TimerState::Idle);
        assert!(app.timer.active_tick().is_none());
        assert_eq!(*log.borrow(), vec!["check", "activate", "start", "cancel"]);
    }

    #[test]
    fn test_stop_finishes_timer() {
        let log = CallLog::default();
        let mut app = granted_app(&log);
        let _ = app.update(Message::StartRecording);
        let _ = app.update(Message::StopRecording);

        assert_eq!(app.timer.state(), TimerState::Finished);
        assert_eq!(app.timer.recorded_time(), 0);
        assert!(app.timer.active_tick().is_none());
        assert!(app.is_loading());
        assert_eq!(log.borrow().last(), Some(&"deactivate"));
    }

    #[test]
    fn test_finalize_result_leaves_new_session_alone() {
        let log = CallLog::default();
        let mut app = granted_app(&log);
        let _ = app.update(Message::StartRecording);
        let _ = app.update(Message::StopRecording);
        let _ = app.update(Message::StartRecording);
        assert_eq!(app.timer.state(), TimerState::Finished);

        let _ = app.update(Message::RecordingFinished(Ok(PathBuf::from("/tmp/video.mp4"))));
        assert!(app.is_loading());
        assert_eq!(
            *log.borrow(),
            vec!["check", "activate", "start", "stop", "deactivate"]
        );

        let _ = app.update(Message::UploadComplete(Err(AppError::upload("timed out"))));
        open(&mut app);
        let _ = app.update(Message::StartRecording);
        assert_eq!(app.timer.state(), TimerState::Recording);
        assert_eq!(log.borrow().last(), Some(&"start"));
    }

    #[test]
    fn test_camera_error_on_tick_resets_recording() {
        let log = CallLog::default();
        let mut camera = FakeCamera::new(log.clone(), PermissionStatus::Granted);
        camera.died = Some(String::from("device unplugged"));
        let mut app = app_with(camera);
        open(&mut app);
        let _ = app.update(Message::StartRecording);

        let handle = app.timer.active_tick().unwrap();
        let _ = app.update(Message::Tick(handle));
        assert_eq!(app.timer.state(), TimerState::Idle);
        assert!(app.timer.active_tick().is_none());
        assert_eq!(log.borrow().last(), Some(&"cancel"));
    }

    #[test]
    fn test_finished_recording_starts_upload() {
        let log = CallLog::default();
        let mut app = granted_app(&log);
        app.screen = Screen::Uploading;
        let _ = app.update(Message::RecordingFinished(Ok(PathBuf::from("/tmp/video.mp4"))));
        assert!(app.is_loading());
        assert_eq!(app.uploading, Some(PathBuf::from("/tmp/video.mp4")));
    }

    #[test]
    fn test_successful_upload_removes_local_recording() {
        let root = tempfile::tempdir().unwrap();
        let session = root.path().join("recording_abc");
        std::fs::create_dir(&session).unwrap();
        let video = session.join("video_1.mp4");
        std::fs::write(&video, b"frames").unwrap();

        let log = CallLog::default();
        let mut app = granted_app(&log);
        app.screen = Screen::Uploading;
        app.uploading = Some(video.clone());
        let media = media::sample("https://res.cloudinary.com/demo/video/upload/v1/a.mp4");
        let _ = app.update(Message::UploadComplete(Ok(media)));

        assert!(!session.exists());
        assert!(app.uploading.is_none());
    }

    #[test]
    fn test_failed_upload_keeps_local_recording() {
        let root = tempfile::tempdir().unwrap();
        let session = root.path().join("recording_abc");
        std::fs::create_dir(&session).unwrap();
        let video = session.join("video_1.mp4");
        std::fs::write(&video, b"frames").unwrap();

        let log = CallLog::default();
        let mut app = granted_app(&log);
        app.screen = Screen::Uploading;
        app.uploading = Some(video.clone());
        let _ = app.update(Message::UploadComplete(Err(AppError::upload("timed out"))));

        assert!(video.exists());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_unconfigured_upload_returns_home() {
        let log = CallLog::default();
        let mut config = quiet_config();
        config.upload.cloud_name.clear();
        let camera = FakeCamera::new(log.clone(), PermissionStatus::Granted);
        let mut app = App::with_parts(config, Box::new(camera), Arc::new(FakeUploader));

        let _ = app.update(Message::RecordingFinished(Ok(PathBuf::from("/tmp/video.mp4"))));
        assert_eq!(app.screen, Screen::Home);
        assert!(app.videos.is_empty());
    }

    #[test]
    fn test_failed_finalize_returns_home() {
        let log = CallLog::default();
        let mut app = granted_app(&log);
        let _ = app.update(Message::RecordingFinished(Err(AppError::camera("no frames"))));
        assert!(!app.is_loading());
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn test_upload_failure_clears_loading() {
        let log = CallLog::default();
        let mut app = granted_app(&log);
        app.screen = Screen::Uploading;

        let _ = app.update(Message::UploadComplete(Err(AppError::upload("timed out"))));
        assert!(!app.is_loading());
        assert!(app.videos.is_empty());
    }

    #[test]
    fn test_upload_success_appends_in_order() {
        let log = CallLog::default();
        let mut app = granted_app(&log);
        let first = media::sample("https://res.cloudinary.com/demo/video/upload/v1/a.mp4");
        let second = media::sample("https://res.cloudinary.com/demo/video/upload/v1/b.mp4");

        app.screen = Screen::Uploading;
        let _ = app.update(Message::UploadComplete(Ok(first.clone())));
        app.screen = Screen::Uploading;
        let _ = app.update(Message::UploadComplete(Ok(second.clone())));

        assert!(!app.is_loading());
        assert_eq!(app.videos.videos(), &[first, second]);
    }

    #[test]
    fn test_close_while_recording_discards() {
        let log = CallLog::default();
        let mut app = granted_app(&log);
        let _ = app.update(Message::StartRecording);
        let _ = app.update(Message::PauseRecording);
        let _ = app.update(Message::CloseCamera);

        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.timer.state(), TimerState::Idle);
        assert_eq!(
            *log.borrow(),
            vec!["check", "activate", "start", "pause", "cancel", "deactivate"]
        );
    }
}
