//! Toast notifications

use shiftdeck_common::view::Toast;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ToastListProps {
    /// Visible toasts with their ids, oldest first
    pub toasts: Vec<(u32, Toast)>,
    pub on_dismiss: Callback<u32>,
}

#[function_component(ToastList)]
pub fn toast_list(props: &ToastListProps) -> Html {
    let toasts = props.toasts.iter().map(|(id, toast)| {
        let id = *id;
        let dismiss = props.on_dismiss.reform(move |_: MouseEvent| id);

        html! {
            <div key={id} class={toast.kind.class()}>
                <i class={toast.kind.icon()}></i>
                <div class="toast-message">
                    {for toast.lines.iter().map(|line| html! { <div>{line}</div> })}
                </div>
                <button class="toast-close" title="Close" onclick={dismiss}>
                    <i class="fas fa-times"></i>
                </button>
            </div>
        }
    });

    html! {
        <div class="toast-container">
            {for toasts}
        </div>
    }
}
