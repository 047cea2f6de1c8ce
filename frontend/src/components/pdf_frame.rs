//! Embedded viewer for a protected PDF.
//!
//! The file endpoints need a bearer token, which an `<iframe src>` cannot
//! send, so the bytes are fetched through `api::object_url` and shown from
//! a blob URL. Changing `page` only rewrites the fragment.

use crate::api::{self, ApiError};
use common::auth::Session;
use gloo_file::ObjectUrl;
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    Load,
    Loaded(Result<ObjectUrl, ApiError>),
}

#[derive(Properties, PartialEq)]
pub struct PdfFrameProps {
    pub session: Session,
    /// API path of the PDF, e.g. `/api/documents/{id}/file`.
    pub src: AttrValue,
    #[prop_or(1)]
    pub page: u32,
}

pub struct PdfFrame {
    url: Option<ObjectUrl>,
    error: Option<String>,
    loading: bool,
}

impl Component for PdfFrame {
    type Message = Msg;
    type Properties = PdfFrameProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            url: None,
            error: None,
            loading: true,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if old_props.src != ctx.props().src {
            ctx.link().send_message(Msg::Load);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.loading = true;
                self.error = None;
                let session = ctx.props().session.clone();
                let src = ctx.props().src.to_string();
                let link = ctx.link().clone();
                spawn_local(async move {
                    link.send_message(Msg::Loaded(api::object_url(&session, &src, "application/pdf").await));
                });
            }
            Msg::Loaded(Ok(url)) => {
                self.loading = false;
                self.url = Some(url);
            }
            Msg::Loaded(Err(e)) => {
                self.loading = false;
                self.url = None;
                self.error = Some(e.to_string());
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if self.loading {
            return html! { <div class="pdf-frame pdf-placeholder">{ "Loading document..." }</div> };
        }
        match (&self.url, &self.error) {
            (Some(url), _) => {
                let href = url.to_string();
                let src = format!("{}#page={}", href, ctx.props().page);
                html! {
                    <div class="pdf-frame">
                        <iframe key={src.clone()} src={src} title="Document" />
                        <a class="pdf-open" href={href} target="_blank">{ "Open in new tab" }</a>
                    </div>
                }
            }
            (None, Some(error)) => html! { <div class="pdf-frame pdf-placeholder">{ error.clone() }</div> },
            (None, None) => html! { <div class="pdf-frame pdf-placeholder" /> },
        }
    }
}
