mod camera_view;
mod home_view;
mod uploading_view;

pub use camera_view::CameraView;
pub use home_view::HomeView;
pub use uploading_view::UploadingView;
