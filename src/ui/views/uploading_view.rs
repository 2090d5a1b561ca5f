use iced::widget::{column, container, text};
use iced::{Alignment, Element, Length};

use crate::ui::style::{container_style, MonochromeTheme};
use crate::ui::Message;

pub struct UploadingView;

impl UploadingView {
    pub fn view(theme: &MonochromeTheme) -> Element<'static, Message> {
        let container_bg = container_style(theme);

        let content = column![
            text("Saving and uploading video...").size(20),
            text("This can take a while for long recordings").size(13),
        ]
        .spacing(8)
        .align_x(Alignment::Center);

        container(content)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(move |_| container_bg)
            .into()
    }
}
