mod pause_control;
mod record_control;
mod recording_timer;
mod uploaded_videos;

pub use pause_control::PauseControl;
pub use record_control::RecordControl;
pub use recording_timer::TimerLabel;
pub use uploaded_videos::UploadedVideoList;
