mod camera;
mod config;
mod error;
mod notify;
mod store;
mod timer;
mod ui;
mod upload;

use iced::{window, Size};
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    iced::application(ui::App::title, ui::App::update, ui::App::view)
        .subscription(ui::App::subscription)
        .theme(ui::App::theme)
        .window(window::Settings {
            size: Size::new(480.0, 560.0),
            min_size: Some(Size::new(360.0, 420.0)),
            resizable: true,
            decorations: true,
            ..Default::default()
        })
        .run_with(ui::App::new)
}
