//! Root component: session state and the role-gated router.
//!
//! The address bar is the source of truth for the current page. Every
//! navigation goes through `common::routes::resolve`, so a page outside the
//! signed-in role falls back to the role's landing page. The coding
//! workspace carries its document as `?document=<id>`.

use crate::auth;
use crate::components::password_dialog::PasswordDialog;
use crate::components::top_sheet::{close_top_sheet, open_top_sheet, TopSheet};
use crate::pages::activity::ActivityPage;
use crate::pages::audit::AuditPage;
use crate::pages::coding::CodingWorkspace;
use crate::pages::coding_queue::CodingQueue;
use crate::pages::documents::DocumentsPage;
use crate::pages::login::LoginPage;
use crate::pages::queries::QueriesPage;
use crate::pages::upload::UploadPage;
use crate::pages::users::UsersPage;
use common::auth::Session;
use common::routes::{self, Page};
use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{BeforeUnloadEvent, Event};
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    SignedIn(Session),
    Revalidated(Option<Session>),
    SignOut,
    Navigate(Page, Option<String>),
    LocationChanged,
    OpenPassword,
    ClosePassword,
}

pub struct App {
    session: Option<Session>,
    page: Page,
    document_id: Option<String>,
    password_ref: NodeRef,
    _popstate: Option<Closure<dyn Fn(Event)>>,
    _beforeunload: Option<Closure<dyn Fn(BeforeUnloadEvent)>>,
}

/// Splits the address bar into the requested page and the `document` query
/// parameter.
pub fn parse_location(path: &str, search: &str) -> (Option<Page>, Option<String>) {
    let document_id = search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "document")
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty());
    (Page::from_path(path), document_id)
}

pub fn page_url(page: Page, document_id: Option<&str>) -> String {
    match document_id {
        Some(id) if page == Page::CodingWorkspace => format!("{}?document={}", page.path(), id),
        _ => page.path().to_string(),
    }
}

fn current_location() -> (Option<Page>, Option<String>) {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return (None, None);
    };
    parse_location(
        &location.pathname().unwrap_or_default(),
        &location.search().unwrap_or_default(),
    )
}

fn push_url(url: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(url));
    }
}

fn replace_url(url: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(url));
    }
}

/// Pages with unsaved edits set `window.app_dirty`; leaving then asks first.
fn app_is_dirty() -> bool {
    web_sys::window()
        .and_then(|w| Reflect::get(&w, &JsValue::from_str("app_dirty")).ok())
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

impl App {
    fn apply_location(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let (requested, document_id) = current_location();
        self.page = routes::resolve(session.role(), requested);
        self.document_id = document_id;
        if requested != Some(self.page) {
            replace_url(&page_url(self.page, self.document_id.as_deref()));
        }
    }

    fn listen(&mut self, ctx: &Context<Self>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let link = ctx.link().clone();
        let popstate = Closure::<dyn Fn(Event)>::new(move |_| link.send_message(Msg::LocationChanged));
        let _ = window.add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref());
        self._popstate = Some(popstate);

        let beforeunload = Closure::<dyn Fn(BeforeUnloadEvent)>::new(|event: BeforeUnloadEvent| {
            if app_is_dirty() {
                event.prevent_default();
                event.set_return_value("");
            }
        });
        let _ = window.add_event_listener_with_callback("beforeunload", beforeunload.as_ref().unchecked_ref());
        self._beforeunload = Some(beforeunload);
    }

    fn view_page(&self, ctx: &Context<Self>, session: &Session) -> Html {
        let link = ctx.link();
        let session = session.clone();
        match self.page {
            Page::Upload => html! { <UploadPage {session} /> },
            Page::MyDocuments => html! { <DocumentsPage {session} admin={false} /> },
            Page::ProviderQueries => html! { <QueriesPage {session} /> },
            Page::CodingQueue => {
                let on_open = link.callback(|id: String| Msg::Navigate(Page::CodingWorkspace, Some(id)));
                html! { <CodingQueue {session} {on_open} /> }
            }
            Page::CodingWorkspace => match &self.document_id {
                Some(id) => {
                    let on_done = link.callback(|_| Msg::Navigate(Page::CodingQueue, None));
                    html! { <CodingWorkspace key={id.clone()} {session} document_id={id.clone()} {on_done} /> }
                }
                None => html! {
                    <div class="empty">{ "Open a document from the coding queue." }</div>
                },
            },
            Page::AuditQueue => html! { <AuditPage {session} /> },
            Page::AdminUsers => html! { <UsersPage {session} /> },
            Page::AdminDocuments => html! { <DocumentsPage {session} admin={true} /> },
            Page::AdminActivity => html! { <ActivityPage {session} /> },
        }
    }

    fn view_nav(&self, ctx: &Context<Self>, session: &Session) -> Html {
        let link = ctx.link();
        html! {
            <nav class="app-nav">
                <span class="brand">{ "MedCode" }</span>
                { for routes::permitted_pages(session.role()).iter().map(|page| {
                    let page = *page;
                    let class = if page == self.page { "nav-link active" } else { "nav-link" };
                    html! {
                        <a class={class} onclick={link.callback(move |_| Msg::Navigate(page, None))}>{ page.title() }</a>
                    }
                }) }
                <span class="spacer" />
                if session.is_mock() {
                    <span class="badge badge-demo">{ "Demo mode" }</span>
                }
                <span class="who">{ format!("{} ({})", session.profile.name, session.role().label()) }</span>
                <button onclick={link.callback(|_| Msg::OpenPassword)}>{ "Password" }</button>
                <button onclick={link.callback(|_| Msg::SignOut)}>{ "Sign out" }</button>
            </nav>
        }
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let session = auth::load();
        if let Some(stored) = session.clone() {
            let link = ctx.link().clone();
            spawn_local(async move {
                link.send_message(Msg::Revalidated(auth::revalidate(stored).await));
            });
        }
        let mut app = Self {
            session,
            page: Page::Upload,
            document_id: None,
            password_ref: NodeRef::default(),
            _popstate: None,
            _beforeunload: None,
        };
        app.apply_location();
        app.listen(ctx);
        app
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SignedIn(session) => {
                self.session = Some(session);
                self.apply_location();
            }
            Msg::Revalidated(session) => {
                let changed = self.session != session;
                self.session = session;
                if !changed {
                    return false;
                }
                self.apply_location();
            }
            Msg::SignOut => {
                if let Some(session) = self.session.take() {
                    spawn_local(async move { auth::sign_out(&session).await });
                }
                push_url("/");
            }
            Msg::Navigate(page, document_id) => {
                let Some(session) = &self.session else {
                    return false;
                };
                self.page = routes::resolve(session.role(), Some(page));
                self.document_id = match (self.page, document_id) {
                    (Page::CodingWorkspace, None) => self.document_id.take(),
                    (_, id) => id,
                };
                push_url(&page_url(self.page, self.document_id.as_deref()));
            }
            Msg::LocationChanged => self.apply_location(),
            Msg::OpenPassword => open_top_sheet(&self.password_ref),
            Msg::ClosePassword => close_top_sheet(&self.password_ref),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(session) = &self.session else {
            return html! { <LoginPage on_signed_in={ctx.link().callback(Msg::SignedIn)} /> };
        };
        let on_close = ctx.link().callback(|_| Msg::ClosePassword);
        html! {
            <div class="app">
                { self.view_nav(ctx, session) }
                <main class="page">{ self.view_page(ctx, session) }</main>
                <TopSheet node_ref={self.password_ref.clone()}>
                    <PasswordDialog
                        session={session.clone()}
                        user_id={session.profile.id.clone()}
                        user_label={"yourself"}
                        {on_close}
                    />
                </TopSheet>
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_carries_page_and_document() {
        assert_eq!(
            parse_location("/coding/workspace", "?document=abc&x=1"),
            (Some(Page::CodingWorkspace), Some("abc".to_string()))
        );
        assert_eq!(parse_location("/nowhere", ""), (None, None));
        assert_eq!(parse_location("/audit/", "?document="), (Some(Page::AuditQueue), None));
    }

    #[test]
    fn only_the_workspace_keeps_its_document_in_the_url() {
        assert_eq!(page_url(Page::CodingWorkspace, Some("abc")), "/coding/workspace?document=abc");
        assert_eq!(page_url(Page::AuditQueue, Some("abc")), "/audit");
        assert_eq!(page_url(Page::CodingWorkspace, None), "/coding/workspace");
    }
}
