use iced::widget::{button, column, container, horizontal_space, row, text};
use iced::{Alignment, Element, Length};

use crate::store::UploadedVideos;
use crate::ui::components::UploadedVideoList;
use crate::ui::style::{
    container_style, primary_button_style, surface_container_style, MonochromeTheme,
};
use crate::ui::Message;

pub struct HomeView;

impl HomeView {
    pub fn view<'a>(theme: &MonochromeTheme, videos: &'a UploadedVideos) -> Element<'a, Message> {
        let container_bg = container_style(theme);
        let surface_bg = surface_container_style(theme);
        let open_style = primary_button_style(theme);

        let title = text("clipcast").size(24);
        let open_btn = button(text("Open Camera").size(14))
            .padding([10, 20])
            .style(move |_t, _s| open_style)
            .on_press(Message::OpenCamera);

        let header = row![title, horizontal_space(), open_btn].align_y(Alignment::Center);

        let history_header = row![
            text("Uploaded videos").size(16),
            horizontal_space(),
            text(videos.len().to_string()).size(13),
        ]
        .align_y(Alignment::Center);

        let history = container(
            column![history_header, UploadedVideoList::view(theme, videos)].spacing(12),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(16)
        .style(move |_| surface_bg);

        container(column![header, history].spacing(20))
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .style(move |_| container_bg)
            .into()
    }
}
