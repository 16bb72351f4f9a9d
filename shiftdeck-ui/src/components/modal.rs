//! Modal dialog rendering a form descriptor

use shiftdeck_common::forms::{FormField, FormValues, InputKind, ModalKind};
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ModalProps {
    pub kind: ModalKind,
    pub fields: Vec<FormField>,
    pub values: FormValues,
    #[prop_or_default]
    pub error: Option<String>,
    #[prop_or(false)]
    pub busy: bool,
    pub on_change: Callback<(&'static str, String)>,
    pub on_submit: Callback<()>,
    pub on_close: Callback<()>,
}

fn input(field: &FormField, value: &str, on_change: &Callback<(&'static str, String)>) -> Html {
    let id = field.id;

    match &field.input {
        InputKind::Text { placeholder } => {
            let oninput = on_change.reform(move |e: InputEvent| {
                (id, e.target_unchecked_into::<HtmlInputElement>().value())
            });
            html! {
                <input type="text" {id} placeholder={*placeholder} value={value.to_string()}
                    required={field.required} {oninput} />
            }
        }
        InputKind::Email | InputKind::Password => {
            let kind = if matches!(field.input, InputKind::Email) { "email" } else { "password" };
            let oninput = on_change.reform(move |e: InputEvent| {
                (id, e.target_unchecked_into::<HtmlInputElement>().value())
            });
            html! {
                <input type={kind} {id} value={value.to_string()} required={field.required} {oninput} />
            }
        }
        InputKind::TextArea { placeholder, rows } => {
            let oninput = on_change.reform(move |e: InputEvent| {
                (id, e.target_unchecked_into::<HtmlTextAreaElement>().value())
            });
            html! {
                <textarea {id} placeholder={*placeholder} rows={rows.to_string()}
                    value={value.to_string()} {oninput} />
            }
        }
        InputKind::Select { options } => {
            let onchange = on_change.reform(move |e: Event| {
                (id, e.target_unchecked_into::<HtmlSelectElement>().value())
            });
            html! {
                <select {id} required={field.required} {onchange}>
                    <option value="" selected={value.is_empty()}>{"Select..."}</option>
                    {for options.iter().map(|option| html! {
                        <option value={option.value.clone()} selected={option.value == value}>
                            {&option.label}
                        </option>
                    })}
                </select>
            }
        }
    }
}

#[function_component(Modal)]
pub fn modal(props: &ModalProps) -> Html {
    let close_overlay = props.on_close.reform(|_: MouseEvent| ());
    let close_button = props.on_close.reform(|_: MouseEvent| ());
    let cancel = props.on_close.reform(|_: MouseEvent| ());
    let submit_click = props.on_submit.reform(|_: MouseEvent| ());
    let submit_form = props.on_submit.reform(|e: SubmitEvent| e.prevent_default());
    let keep_open = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <div class="modal-overlay active" onclick={close_overlay}>
            <div class="modal" onclick={keep_open}>
                <div class="modal-header">
                    <h2>{props.kind.title()}</h2>
                    <button class="modal-close" title="Close" onclick={close_button}>
                        <i class="fas fa-times"></i>
                    </button>
                </div>
                <div class="modal-body">
                    <form onsubmit={submit_form}>
                        {for props.fields.iter().map(|field| html! {
                            <div class="form-group" key={field.id}>
                                <label for={field.id}>{field.label}</label>
                                {input(field, props.values.raw(field.id), &props.on_change)}
                            </div>
                        })}
                    </form>
                    {if let Some(ref error) = props.error {
                        html! { <div class="form-error">{error}</div> }
                    } else {
                        html! {}
                    }}
                </div>
                <div class="modal-footer">
                    <button class="btn btn-secondary" onclick={cancel}>{"Cancel"}</button>
                    <button class="btn btn-primary" disabled={props.busy} onclick={submit_click}>
                        {if props.busy { "Working..." } else { props.kind.submit_label() }}
                    </button>
                </div>
            </div>
        </div>
    }
}
