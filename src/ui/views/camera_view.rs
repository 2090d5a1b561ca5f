use iced::widget::{button, column, container, horizontal_space, row, text, vertical_space};
use iced::{Alignment, Element, Length};

use crate::timer::TimerState;
use crate::ui::components::{PauseControl, RecordControl, TimerLabel};
use crate::ui::style::{container_style, list_item_style, MonochromeTheme};
use crate::ui::Message;

pub struct CameraView;

impl CameraView {
    pub fn view(
        theme: &MonochromeTheme,
        state: TimerState,
        recorded_time_ms: u64,
    ) -> Element<'static, Message> {
        let container_bg = container_style(theme);
        let close_style = list_item_style(theme, false);

        let close_btn = button(text("Close").size(12))
            .padding([6, 12])
            .style(move |_t, _s| close_style)
            .on_press(Message::CloseCamera);

        let status: Element<'static, Message> = if state.is_recording() {
            TimerLabel::view(recorded_time_ms)
        } else {
            text(state.display_name()).size(14).into()
        };

        let top = row![status, horizontal_space(), close_btn].align_y(Alignment::Center);

        let mut controls = row![RecordControl::view(theme, state.is_recording())]
            .spacing(24)
            .align_y(Alignment::Center);
        if state.is_recording() {
            controls = controls.push(PauseControl::view(theme, state.is_paused()));
        }

        let bottom = container(controls).center_x(Length::Fill);

        container(column![top, vertical_space(), bottom])
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .style(move |_| container_bg)
            .into()
    }
}
