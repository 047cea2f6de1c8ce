//! Provider inbox of questions raised by coders and auditors.

use crate::api;
use crate::components::status::short_time;
use crate::components::toast::{show_error, show_toast};
use common::auth::Session;
use common::model::document::Document;
use common::model::query::{DocumentQuery, QueryStatus};
use common::requests::AnswerQueryRequest;
use std::collections::HashMap;
use web_sys::HtmlTextAreaElement;
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    Load,
    Loaded(Vec<DocumentQuery>, Vec<Document>),
    ShowAnswered(bool),
    Draft(String, String),
    Answer(String),
    Answered(DocumentQuery),
}

#[derive(Properties, PartialEq)]
pub struct QueriesProps {
    pub session: Session,
}

pub struct QueriesPage {
    queries: Vec<DocumentQuery>,
    filenames: HashMap<String, String>,
    drafts: HashMap<String, String>,
    show_answered: bool,
}

impl Component for QueriesPage {
    type Message = Msg;
    type Properties = QueriesProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            queries: Vec::new(),
            filenames: HashMap::new(),
            drafts: HashMap::new(),
            show_answered: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let session = ctx.props().session.clone();
        let link = ctx.link().clone();
        match msg {
            Msg::Load => {
                let url = if self.show_answered {
                    "/api/queries".to_string()
                } else {
                    format!("/api/queries?status={}", QueryStatus::Open.as_str())
                };
                spawn_local(async move {
                    let queries = api::get::<Vec<DocumentQuery>>(&session, &url).await;
                    let documents = api::get::<Vec<Document>>(&session, "/api/documents").await;
                    match (queries, documents) {
                        (Ok(queries), Ok(documents)) => link.send_message(Msg::Loaded(queries, documents)),
                        (Err(e), _) | (_, Err(e)) => show_error(e),
                    }
                });
                return false;
            }
            Msg::Loaded(queries, documents) => {
                self.queries = queries;
                self.filenames = documents.into_iter().map(|d| (d.id, d.filename)).collect();
            }
            Msg::ShowAnswered(show) => {
                self.show_answered = show;
                link.send_message(Msg::Load);
            }
            Msg::Draft(id, text) => {
                self.drafts.insert(id, text);
                return false;
            }
            Msg::Answer(id) => {
                let answer = self.drafts.get(&id).cloned().unwrap_or_default();
                if answer.trim().is_empty() {
                    show_error("Write an answer first");
                    return false;
                }
                spawn_local(async move {
                    let url = format!("/api/queries/{}/answer", id);
                    match api::put::<_, DocumentQuery>(&session, &url, &AnswerQueryRequest { answer }).await {
                        Ok(query) => link.send_message(Msg::Answered(query)),
                        Err(e) => show_error(e),
                    }
                });
                return false;
            }
            Msg::Answered(query) => {
                show_toast("Answer sent");
                self.drafts.remove(&query.id);
                if self.show_answered {
                    if let Some(slot) = self.queries.iter_mut().find(|q| q.id == query.id) {
                        *slot = query;
                    }
                } else {
                    self.queries.retain(|q| q.id != query.id);
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let show_answered = self.show_answered;
        html! {
            <section>
                <h2>{ "Queries" }</h2>
                <label class="toolbar">
                    <input
                        type="checkbox"
                        checked={show_answered}
                        onchange={link.callback(move |_| Msg::ShowAnswered(!show_answered))}
                    />
                    { " Include answered" }
                </label>
                if self.queries.is_empty() {
                    <div class="empty">{ "No open queries" }</div>
                }
                { for self.queries.iter().map(|q| {
                    let filename = self.filenames.get(&q.document_id).cloned().unwrap_or_else(|| q.document_id.clone());
                    let where_ = match q.page_number {
                        Some(page) => format!("{}, page {}", filename, page),
                        None => filename,
                    };
                    let draft_id = q.id.clone();
                    let answer_id = q.id.clone();
                    html! {
                        <div class="card query">
                            <div class="query-head">
                                <strong>{ where_ }</strong>
                                <span>{ short_time(&q.created_at) }</span>
                            </div>
                            <p>{ q.question.clone() }</p>
                            {
                                match (&q.status, &q.answer) {
                                    (QueryStatus::Answered, Some(answer)) => html! { <p class="answer">{ answer.clone() }</p> },
                                    _ => html! {
                                        <>
                                            <textarea
                                                placeholder="Answer"
                                                value={self.drafts.get(&q.id).cloned().unwrap_or_default()}
                                                oninput={link.callback(move |e: InputEvent| {
                                                    Msg::Draft(draft_id.clone(), e.target_unchecked_into::<HtmlTextAreaElement>().value())
                                                })}
                                            />
                                            <button class="primary" onclick={link.callback(move |_| Msg::Answer(answer_id.clone()))}>{ "Send answer" }</button>
                                        </>
                                    },
                                }
                            }
                        </div>
                    }
                }) }
            </section>
        }
    }
}
