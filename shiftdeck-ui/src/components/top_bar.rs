//! Top bar with menu toggle, breadcrumb and user menu

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct TopBarProps {
    pub title: &'static str,
    pub namespace: String,
    pub authenticated: bool,
    pub sandbox: bool,
    pub menu_open: bool,
    pub on_toggle_sidebar: Callback<()>,
    pub on_toggle_menu: Callback<()>,
    pub on_connect: Callback<()>,
    pub on_sign_out: Callback<()>,
}

#[function_component(TopBar)]
pub fn top_bar(props: &TopBarProps) -> Html {
    let toggle_sidebar = props.on_toggle_sidebar.reform(|_: MouseEvent| ());
    let toggle_menu = props.on_toggle_menu.reform(|_: MouseEvent| ());
    let connect = props.on_connect.reform(|_: MouseEvent| ());
    let sign_out = props.on_sign_out.reform(|_: MouseEvent| ());

    let session = if props.authenticated {
        format!("Namespace: {}", props.namespace)
    } else {
        "Not connected".to_string()
    };

    html! {
        <header class="top-bar">
            <button class="menu-toggle" title="Menu" onclick={toggle_sidebar}>
                <i class="fas fa-bars"></i>
            </button>
            <div class="breadcrumb">
                <span>{"Console"}</span>
                <i class="fas fa-chevron-right"></i>
                <span class="current-section">{props.title}</span>
            </div>
            {if props.sandbox {
                html! { <span class="type-badge sandbox-badge">{"Sandbox"}</span> }
            } else {
                html! {}
            }}
            <div class={classes!("user-menu", props.menu_open.then_some("open"))}>
                <button class="user-button" onclick={toggle_menu}>
                    <i class="fas fa-user-circle"></i>
                    <span>{session}</span>
                    <i class="fas fa-chevron-down"></i>
                </button>
                {if props.menu_open {
                    html! {
                        <div class="user-dropdown">
                            <button class="dropdown-item" onclick={connect}>
                                <i class="fas fa-plug"></i>{"Connect"}
                            </button>
                            {if props.authenticated {
                                html! {
                                    <button class="dropdown-item" onclick={sign_out}>
                                        <i class="fas fa-sign-out-alt"></i>{"Sign out"}
                                    </button>
                                }
                            } else {
                                html! {}
                            }}
                        </div>
                    }
                } else {
                    html! {}
                }}
            </div>
        </header>
    }
}
