use iced::widget::{button, container, text};
use iced::{Element, Length};

use crate::ui::style::{control_button_style, MonochromeTheme, CONTROL_SIZE};
use crate::ui::Message;

pub struct PauseControl;

impl PauseControl {
    pub fn view(theme: &MonochromeTheme, is_paused: bool) -> Element<'static, Message> {
        let (glyph, message) = if is_paused {
            ("\u{25B6}", Message::ResumeRecording)
        } else {
            ("\u{275A}\u{275A}", Message::PauseRecording)
        };
        let style = control_button_style(theme, true);

        button(
            container(text(glyph).size(24).color(theme.text()))
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
