//! Entity table with view and delete actions

use shiftdeck_common::view::{Cell, Table};
use shiftdeck_common::EntityKey;
use yew::prelude::*;

use super::StatusBadge;

#[derive(Properties, PartialEq)]
pub struct DataTableProps {
    pub table: Table,
    pub on_view: Callback<EntityKey>,
    pub on_delete: Callback<EntityKey>,
}

fn cell(index: usize, icon: &'static str, cell: &Cell) -> Html {
    let content = match cell {
        Cell::Text(text) => html! { {text} },
        Cell::Badge { text, tone } => html! { <StatusBadge text={text.clone()} tone={*tone} /> },
    };

    if index == 0 {
        html! { <td><i class={icon}></i>{content}</td> }
    } else {
        html! { <td>{content}</td> }
    }
}

#[function_component(DataTable)]
pub fn data_table(props: &DataTableProps) -> Html {
    let rows = props.table.rows.iter().map(|row| {
        let view = {
            let key = row.key.clone();
            props.on_view.reform(move |_: MouseEvent| key.clone())
        };
        let delete = {
            let key = row.key.clone();
            props.on_delete.reform(move |_: MouseEvent| key.clone())
        };

        html! {
            <tr key={format!("{:?}", row.key)}>
                {for row.cells.iter().enumerate().map(|(i, c)| cell(i, row.icon, c))}
                <td>
                    <button class="action-table-btn" title="View" onclick={view}>
                        <i class="fas fa-eye"></i>
                    </button>
                    <button class="action-table-btn" title="Delete" onclick={delete}>
                        <i class="fas fa-trash"></i>
                    </button>
                </td>
            </tr>
        }
    });

    html! {
        <div class="table-container">
            <table class="data-table">
                <thead>
                    <tr>
                        {for props.table.headers.iter().map(|header| html! { <th>{*header}</th> })}
                        <th>{"Actions"}</th>
                    </tr>
                </thead>
                <tbody>
                    {if props.table.rows.is_empty() {
                        html! {
                            <tr>
                                <td class="empty-row" colspan={(props.table.headers.len() + 1).to_string()}>
                                    {"No items"}
                                </td>
                            </tr>
                        }
                    } else {
                        html! { {for rows} }
                    }}
                </tbody>
            </table>
        </div>
    }
}
