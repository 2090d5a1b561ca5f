use iced::widget::{button, container, text};
use iced::{Element, Length};

use crate::ui::style::{control_button_style, MonochromeTheme, CONTROL_SIZE};
use crate::ui::Message;

/// Record/stop toggle. Shows a dot while idle and a square while recording.
pub struct RecordControl;

impl RecordControl {
    pub fn view(theme: &MonochromeTheme, is_recording: bool) -> Element<'static, Message> {
        let (glyph, size, message) = if is_recording {
            ("\u{25A0}", 22, Message::StopRecording)
        } else {
            ("\u{25CF}", 44, Message::StartRecording)
        };
        let style = control_button_style(theme, false);

        button(
            container(text(glyph).size(size))
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(CONTROL_SIZE)
        .height(CONTROL_SIZE)
        .style(move |_t, _s| style)
        .on_press(message)
        .into()
    }
}
