//! Root console component
//!
//! Owns the API client handle and the entity mirror. Every create or delete
//! goes through the client first; the mirror changes only on success.

use std::collections::BTreeMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use shiftdeck_common::forms::{FormAction, FormValues, ModalKind};
use shiftdeck_common::model::ResourceKind;
use shiftdeck_common::store::{CreateRequest, LoadRevisions, Loaded};
use shiftdeck_common::view::{self, Section, Toast};
use shiftdeck_common::{ConsoleConfig, ConsoleStore, EntityKey};
use tracing::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::KeyboardEvent;
use yew::prelude::*;

use crate::api::{self, Api};
use crate::components::{Modal, Sidebar, ToastList, TopBar};
use crate::pages::{Dashboard, ResourcePage};

#[derive(Properties, PartialEq)]
pub struct ConsoleProps {
    pub config: ConsoleConfig,
}

struct ModalState {
    kind: ModalKind,
    values: FormValues,
    error: Option<String>,
    busy: bool,
}

pub enum Msg {
    Navigate(Section),
    Refresh(ResourceKind),
    Loaded {
        loaded: Vec<(u32, Loaded)>,
        failed: Vec<ResourceKind>,
    },
    HealthChecked(bool),
    ToggleSidebar,
    ToggleUserMenu,
    OpenModal(ModalKind),
    CloseModal,
    FieldChanged(&'static str, String),
    Submit,
    Created(CreateRequest, bool),
    Delete(EntityKey),
    Deleted(EntityKey, bool),
    View(EntityKey),
    Notify(Toast),
    DismissToast(u32),
    SignOut,
}

pub struct Console {
    api: Api,
    store: ConsoleStore,
    section: Section,
    pending_loads: usize,
    revisions: LoadRevisions,
    healthy: Option<bool>,
    sidebar_open: bool,
    user_menu_open: bool,
    modal: Option<ModalState>,
    toasts: Vec<(u32, Toast)>,
    next_toast: u32,
    timeouts: BTreeMap<u32, Timeout>,
    keydown: Option<Closure<dyn FnMut(KeyboardEvent)>>,
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Show a create failure in the open modal, or as a toast once it is closed
fn report_create_failure(modal: Option<&mut ModalState>, error: String) -> Option<Toast> {
    match modal {
        Some(modal) => {
            modal.busy = false;
            modal.error = Some(error);
            None
        }
        None => Some(Toast::error(error)),
    }
}

fn listen_for_escape(ctx: &Context<Console>) -> Option<Closure<dyn FnMut(KeyboardEvent)>> {
    let link = ctx.link().clone();
    let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
        if e.key() == "Escape" {
            link.send_message(Msg::CloseModal);
        }
    });

    web_sys::window()?
        .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
        .ok()?;
    Some(closure)
}

impl Console {
    /// Fetch `kinds` in one task and report them together
    fn load(&mut self, ctx: &Context<Self>, kinds: Vec<ResourceKind>) {
        if !self.api.is_authenticated() {
            self.push_toast(
                ctx,
                Toast::warning("Not connected. Use Connect in the user menu to set a token."),
            );
            return;
        }

        self.pending_loads += 1;
        let requested: Vec<(ResourceKind, u32)> = kinds
            .into_iter()
            .map(|kind| (kind, self.revisions.bump(kind)))
            .collect();
        let api = Rc::clone(&self.api);
        let link = ctx.link().clone();

        spawn_local(async move {
            let mut loaded = Vec::new();
            let mut failed = Vec::new();
            for (kind, revision) in requested {
                match api.load(kind).await {
                    Some(items) => loaded.push((revision, items)),
                    None => failed.push(kind),
                }
            }
            link.send_message(Msg::Loaded { loaded, failed });
        });
    }

    fn check_health(&self, ctx: &Context<Self>) {
        let api = Rc::clone(&self.api);
        let link = ctx.link().clone();
        spawn_local(async move {
            let healthy = api.health_check().await;
            link.send_message(Msg::HealthChecked(healthy));
        });
    }

    fn reload_section(&mut self, ctx: &Context<Self>) {
        match self.section.resource() {
            Some(kind) => self.load(ctx, vec![kind]),
            None => {
                self.load(ctx, ResourceKind::ALL.to_vec());
                self.check_health(ctx);
            }
        }
    }

    fn push_toast(&mut self, ctx: &Context<Self>, toast: Toast) {
        let id = self.next_toast;
        self.next_toast += 1;

        let link = ctx.link().clone();
        let timeout = Timeout::new(ctx.props().config.toast_timeout_ms, move || {
            link.send_message(Msg::DismissToast(id));
        });

        self.toasts.push((id, toast));
        self.timeouts.insert(id, timeout);
    }

    fn submit(&mut self, ctx: &Context<Self>) -> bool {
        let Some(modal) = self.modal.as_mut() else {
            return false;
        };
        if modal.busy {
            return false;
        }

        match modal.kind.submit(&self.store, &modal.values) {
            Err(e) => {
                modal.error = Some(e.to_string());
                true
            }
            Ok(FormAction::Create(request)) => {
                modal.busy = true;
                modal.error = None;

                let api = Rc::clone(&self.api);
                let link = ctx.link().clone();
                spawn_local(async move {
                    let ok = api.create_entity(&request).await;
                    link.send_message(Msg::Created(request, ok));
                });
                true
            }
            Ok(FormAction::Connect { token, namespace }) => {
                self.modal = None;
                self.api.set_token(token);
                if !namespace.is_empty() {
                    self.api.set_namespace(namespace);
                }
                info!(namespace = %self.api.namespace(), "Connected");
                self.push_toast(ctx, Toast::success("Connected"));
                self.reload_section(ctx);
                true
            }
        }
    }
}

impl Component for Console {
    type Message = Msg;
    type Properties = ConsoleProps;

    fn create(ctx: &Context<Self>) -> Self {
        let config = &ctx.props().config;
        let api = api::connect(config, ctx.link().callback(Msg::Notify));

        ctx.link().send_message(Msg::Navigate(Section::Dashboard));

        Self {
            api,
            store: ConsoleStore::default(),
            section: Section::Dashboard,
            pending_loads: 0,
            revisions: LoadRevisions::default(),
            healthy: None,
            sidebar_open: false,
            user_menu_open: false,
            modal: None,
            toasts: Vec::new(),
            next_toast: 0,
            timeouts: BTreeMap::new(),
            keydown: listen_for_escape(ctx),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Navigate(section) => {
                debug!(section = section.id(), "Navigate");
                self.section = section;
                self.sidebar_open = false;
                self.user_menu_open = false;
                self.reload_section(ctx);
                true
            }

            Msg::Refresh(kind) => {
                self.load(ctx, vec![kind]);
                true
            }

            Msg::Loaded { loaded, failed } => {
                self.pending_loads = self.pending_loads.saturating_sub(1);
                for (revision, items) in loaded {
                    let kind = items.kind();
                    if self.revisions.is_current(kind, revision) {
                        self.store.replace(items);
                    } else {
                        debug!(%kind, revision, "Dropping stale load");
                    }
                }
                if !failed.is_empty() {
                    let names: Vec<&str> = failed.iter().map(|kind| kind.plural()).collect();
                    self.push_toast(
                        ctx,
                        Toast::error(format!("Could not load {}", names.join(", "))),
                    );
                }
                true
            }

            Msg::HealthChecked(healthy) => {
                self.healthy = Some(healthy);
                true
            }

            Msg::ToggleSidebar => {
                self.sidebar_open = !self.sidebar_open;
                true
            }

            Msg::ToggleUserMenu => {
                self.user_menu_open = !self.user_menu_open;
                true
            }

            Msg::OpenModal(kind) => {
                self.user_menu_open = false;
                if let Some(source) = kind.option_source() {
                    if self.store.len(source) == 0 {
                        self.load(ctx, vec![source]);
                    }
                }
                self.modal = Some(ModalState {
                    kind,
                    values: kind.initial_values(&self.store, &self.api.namespace()),
                    error: None,
                    busy: false,
                });
                true
            }

            Msg::CloseModal => self.modal.take().is_some(),

            Msg::FieldChanged(id, value) => match self.modal.as_mut() {
                Some(modal) => {
                    modal.values.set(id, value);
                    true
                }
                None => false,
            },

            Msg::Submit => self.submit(ctx),

            Msg::Created(request, ok) => {
                let key = request.key();
                if ok {
                    self.revisions.bump(key.kind());
                    self.store.apply(&request);
                    self.modal = None;
                    self.push_toast(
                        ctx,
                        Toast::success(format!(
                            "{} \"{}\" created",
                            key.kind().singular(),
                            key.label()
                        )),
                    );
                } else {
                    let error = format!(
                        "Could not create {} \"{}\"",
                        key.kind().singular(),
                        key.label()
                    );
                    if let Some(toast) = report_create_failure(self.modal.as_mut(), error) {
                        self.push_toast(ctx, toast);
                    }
                }
                true
            }

            Msg::Delete(key) => {
                let Some(entity) = self.store.find(&key) else {
                    return false;
                };

                let prompt = format!(
                    "Delete {} \"{}\"?",
                    key.kind().singular(),
                    key.label()
                );
                if !confirm(&prompt) {
                    return false;
                }

                let api = Rc::clone(&self.api);
                let link = ctx.link().clone();
                spawn_local(async move {
                    let ok = api.delete_entity(&entity).await;
                    link.send_message(Msg::Deleted(key, ok));
                });
                false
            }

            Msg::Deleted(key, ok) => {
                let text = format!("{} \"{}\"", key.kind().singular(), key.label());
                if ok {
                    self.revisions.bump(key.kind());
                    self.store.remove(&key);
                    self.push_toast(ctx, Toast::success(format!("{} deleted", text)));
                } else {
                    self.push_toast(ctx, Toast::error(format!("Could not delete {}", text)));
                }
                true
            }

            Msg::View(key) => match self.store.describe(&key) {
                Some(lines) => {
                    self.push_toast(ctx, Toast::info_lines(lines));
                    true
                }
                None => false,
            },

            Msg::Notify(toast) => {
                self.push_toast(ctx, toast);
                true
            }

            Msg::DismissToast(id) => {
                self.timeouts.remove(&id);
                let before = self.toasts.len();
                self.toasts.retain(|(toast_id, _)| *toast_id != id);
                self.toasts.len() != before
            }

            Msg::SignOut => {
                self.user_menu_open = false;
                if !confirm("Sign out of the cluster?") {
                    return true;
                }

                self.api.clear_token();
                self.revisions.bump_all();
                self.store = ConsoleStore::default();
                self.healthy = None;
                self.push_toast(ctx, Toast::new(view::ToastKind::Info, "Signed out"));
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let on_navigate = link.callback(Msg::Navigate);

        let content = match self.section.resource() {
            Some(kind) => html! {
                <ResourcePage
                    {kind}
                    table={view::table(&self.store, kind)}
                    loading={self.pending_loads > 0}
                    on_create={link.callback(Msg::OpenModal)}
                    on_refresh={link.callback(Msg::Refresh)}
                    on_view={link.callback(Msg::View)}
                    on_delete={link.callback(Msg::Delete)}
                />
            },
            None => html! {
                <Dashboard
                    stats={self.store.stats()}
                    healthy={self.healthy}
                    on_navigate={on_navigate.clone()}
                />
            },
        };

        let modal = match &self.modal {
            Some(state) => html! {
                <Modal
                    kind={state.kind}
                    fields={state.kind.fields(&self.store)}
                    values={state.values.clone()}
                    error={state.error.clone()}
                    busy={state.busy}
                    on_change={link.callback(|(id, value)| Msg::FieldChanged(id, value))}
                    on_submit={link.callback(|_| Msg::Submit)}
                    on_close={link.callback(|_| Msg::CloseModal)}
                />
            },
            None => html! {},
        };

        html! {
            <div class="console">
                <Sidebar active={self.section} open={self.sidebar_open} {on_navigate} />
                <div class={classes!("main-content", self.sidebar_open.then_some("expanded"))}>
                    <TopBar
                        title={self.section.title()}
                        namespace={self.api.namespace()}
                        authenticated={self.api.is_authenticated()}
                        sandbox={ctx.props().config.is_sandbox()}
                        menu_open={self.user_menu_open}
                        on_toggle_sidebar={link.callback(|_| Msg::ToggleSidebar)}
                        on_toggle_menu={link.callback(|_| Msg::ToggleUserMenu)}
                        on_connect={link.callback(|_| Msg::OpenModal(ModalKind::Connect))}
                        on_sign_out={link.callback(|_| Msg::SignOut)}
                    />
                    <main class="content">
                        {content}
                    </main>
                </div>
                {modal}
                <ToastList
                    toasts={self.toasts.clone()}
                    on_dismiss={link.callback(Msg::DismissToast)}
                />
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let (Some(window), Some(closure)) = (web_sys::window(), self.keydown.take()) {
            let _ = window
                .remove_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        }
    }
}
