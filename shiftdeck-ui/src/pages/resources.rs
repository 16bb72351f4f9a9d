//! Resource section: header with create action plus the entity table

use shiftdeck_common::forms::ModalKind;
use shiftdeck_common::model::ResourceKind;
use shiftdeck_common::view::{Section, Table};
use shiftdeck_common::EntityKey;
use yew::prelude::*;

use crate::components::DataTable;

#[derive(Properties, PartialEq)]
pub struct ResourcePageProps {
    pub kind: ResourceKind,
    pub table: Table,
    #[prop_or(false)]
    pub loading: bool,
    pub on_create: Callback<ModalKind>,
    pub on_refresh: Callback<ResourceKind>,
    pub on_view: Callback<EntityKey>,
    pub on_delete: Callback<EntityKey>,
}

#[function_component(ResourcePage)]
pub fn resource_page(props: &ResourcePageProps) -> Html {
    let kind = props.kind;
    let section = Section::from(kind);
    let create = props.on_create.reform(move |_: MouseEvent| ModalKind::from(kind));
    let refresh = props.on_refresh.reform(move |_: MouseEvent| kind);

    html! {
        <section class="section active" id={section.id()}>
            <div class="section-header">
                <h1>{kind.plural()}</h1>
                <div class="section-actions">
                    <button class="btn btn-secondary" title="Refresh" disabled={props.loading} onclick={refresh}>
                        <i class={classes!("fas", "fa-sync-alt", props.loading.then_some("fa-spin"))}></i>
                    </button>
                    <button class="btn btn-primary" onclick={create}>
                        <i class="fas fa-plus"></i>
                        {format!("New {}", kind.singular())}
                    </button>
                </div>
            </div>
            <DataTable
                table={props.table.clone()}
                on_view={props.on_view.clone()}
                on_delete={props.on_delete.clone()}
            />
        </section>
    }
}
