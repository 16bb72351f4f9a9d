//! Dashboard section

use shiftdeck_common::model::ResourceKind;
use shiftdeck_common::store::DashboardStats;
use shiftdeck_common::view::Section;
use yew::prelude::*;

use crate::components::StatCard;

#[derive(Properties, PartialEq)]
pub struct DashboardProps {
    pub stats: DashboardStats,
    /// `None` until the first health check completes
    pub healthy: Option<bool>,
    pub on_navigate: Callback<Section>,
}

#[function_component(Dashboard)]
pub fn dashboard(props: &DashboardProps) -> Html {
    let stats = props.stats;
    let counters = [
        (ResourceKind::Namespaces, stats.namespaces),
        (ResourceKind::Users, stats.users),
        (ResourceKind::Roles, stats.roles),
        (ResourceKind::NetworkPolicies, stats.network_policies),
        (ResourceKind::EgressIps, stats.egress_ips),
    ];

    let (health_class, health_text) = match props.healthy {
        Some(true) => ("status-badge active", "Healthy"),
        Some(false) => ("status-badge warning", "Unreachable"),
        None => ("type-badge", "Checking..."),
    };

    html! {
        <section class="section active" id="dashboard">
            <div class="section-header">
                <h1>{"Cluster Overview"}</h1>
                <span class={health_class}>{health_text}</span>
            </div>
            <div class="stats-grid">
                {for counters.iter().map(|&(kind, count)| {
                    let section = Section::from(kind);
                    let on_navigate = props.on_navigate.clone();
                    html! {
                        <StatCard
                            key={section.id()}
                            title={kind.plural()}
                            icon={section.icon()}
                            value={count}
                            onclick={Callback::from(move |_: ()| on_navigate.emit(section))}
                        />
                    }
                })}
            </div>
        </section>
    }
}
