//! Section navigation

use shiftdeck_common::view::Section;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SidebarProps {
    pub active: Section,
    pub open: bool,
    pub on_navigate: Callback<Section>,
}

#[function_component(Sidebar)]
pub fn sidebar(props: &SidebarProps) -> Html {
    let items = Section::ALL.iter().map(|&section| {
        let on_navigate = props.on_navigate.clone();
        let onclick = Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_navigate.emit(section);
        });

        html! {
            <li key={section.id()} class={classes!("nav-item", (section == props.active).then_some("active"))}>
                <a href={format!("#{}", section.id())} {onclick}>
                    <i class={section.icon()}></i>
                    <span>{section.title()}</span>
                </a>
            </li>
        }
    });

    html! {
        <aside class={classes!("sidebar", props.open.then_some("mobile-open"))}>
            <div class="sidebar-header">
                <i class="fas fa-layer-group"></i>
                <span class="brand">{"Shiftdeck"}</span>
            </div>
            <nav>
                <ul class="nav-list">
                    {for items}
                </ul>
            </nav>
        </aside>
    }
}
