//! Status badge component

use shiftdeck_common::view::Tone;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatusBadgeProps {
    pub text: String,
    pub tone: Tone,
}

#[function_component(StatusBadge)]
pub fn status_badge(props: &StatusBadgeProps) -> Html {
    html! {
        <span class={props.tone.class()}>{&props.text}</span>
    }
}
