use iced::widget::{container, row, text, Space};
use iced::{Alignment, Element, Length};

use crate::timer::format_time;
use crate::ui::style::record_dot_style;
use crate::ui::Message;

pub struct TimerLabel;

impl TimerLabel {
    pub fn view(recorded_time_ms: u64) -> Element<'static, Message> {
        let dot = container(Space::new(Length::Fixed(8.0), Length::Fixed(8.0)))
            .style(|_| record_dot_style());

        row![dot, text(format_time(recorded_time_ms)).size(16)]
            .spacing(8)
            .align_y(Alignment::Center)
            .into()
    }
}
