//! Dashboard counter card

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatCardProps {
    pub title: &'static str,
    pub icon: &'static str,
    pub value: usize,
    #[prop_or_default]
    pub onclick: Option<Callback<()>>,
}

#[function_component(StatCard)]
pub fn stat_card(props: &StatCardProps) -> Html {
    let onclick = props.onclick.clone();
    let handle_click = move |_| {
        if let Some(ref callback) = onclick {
            callback.emit(());
        }
    };

    let class = if props.onclick.is_some() {
        "stat-card clickable"
    } else {
        "stat-card"
    };

    html! {
        <div class={class} onclick={handle_click}>
            <div class="stat-icon"><i class={props.icon}></i></div>
            <div class="stat-info">
                <h3>{props.value}</h3>
                <p>{props.title}</p>
            </div>
        </div>
    }
}
