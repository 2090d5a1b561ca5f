use iced::widget::{button, column, row, scrollable, text};
use iced::{Element, Length};

use crate::store::UploadedVideos;
use crate::ui::style::{list_item_style, MonochromeTheme};
use crate::ui::Message;

/// Upload history, numbered from 1. Rows are addressed by position since
/// the same URL can appear more than once.
pub struct UploadedVideoList;

impl UploadedVideoList {
    pub fn view<'a>(theme: &MonochromeTheme, videos: &'a UploadedVideos) -> Element<'a, Message> {
        if videos.is_empty() {
            return text("No uploaded videos yet").size(13).into();
        }

        let normal = list_item_style(theme, false);
        let hovered = list_item_style(theme, true);

        let items = videos
            .videos()
            .iter()
            .enumerate()
            .fold(column![].spacing(4), |col, (index, video)| {
                let label = row![
                    text(format!("{}.", index + 1)).size(13),
                    text(video.link()).size(13),
                ]
                .spacing(8);

                col.push(
                    button(label)
                        .width(Length::Fill)
                        .padding([6, 10])
                        .style(move |_t, status| {
                            if matches!(status, button::Status::Hovered | button::Status::Pressed) {
                                hovered
                            } else {
                                normal
                            }
                        })
                        .on_press(Message::SelectVideo(index)),
                )
            });

        scrollable(items).height(Length::Fill).into()
    }
}
