//! Recent entries of the admin activity log.

use crate::api;
use crate::components::status::short_time;
use crate::components::toast::show_error;
use common::auth::Session;
use common::model::admin_log::AdminLog;
use common::model::profile::Profile;
use num_format::{Locale, ToFormattedString};
use std::collections::HashMap;
use web_sys::HtmlSelectElement;
use yew::platform::spawn_local;
use yew::prelude::*;

const LIMITS: [usize; 3] = [100, 200, 1000];

pub enum Msg {
    Load,
    Loaded(Vec<AdminLog>, Vec<Profile>),
    Limit(usize),
}

#[derive(Properties, PartialEq)]
pub struct ActivityProps {
    pub session: Session,
}

pub struct ActivityPage {
    logs: Vec<AdminLog>,
    actors: HashMap<String, String>,
    limit: usize,
}

impl Component for ActivityPage {
    type Message = Msg;
    type Properties = ActivityProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load);
        Self {
            logs: Vec::new(),
            actors: HashMap::new(),
            limit: 200,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                let session = ctx.props().session.clone();
                let link = ctx.link().clone();
                let url = format!("/api/admin/logs?limit={}", self.limit);
                spawn_local(async move {
                    let logs = api::get::<Vec<AdminLog>>(&session, &url).await;
                    let profiles = api::get::<Vec<Profile>>(&session, "/api/profiles").await;
                    match (logs, profiles) {
                        (Ok(logs), Ok(profiles)) => link.send_message(Msg::Loaded(logs, profiles)),
                        (Err(e), _) | (_, Err(e)) => show_error(e),
                    }
                });
                false
            }
            Msg::Loaded(logs, profiles) => {
                self.logs = logs;
                self.actors = profiles.into_iter().map(|p| (p.id, p.email)).collect();
                true
            }
            Msg::Limit(limit) => {
                self.limit = limit;
                ctx.link().send_message(Msg::Load);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onchange = link.batch_callback(|e: Event| {
            e.target_unchecked_into::<HtmlSelectElement>().value().parse().ok().map(Msg::Limit)
        });
        html! {
            <section>
                <h2>{ "Activity" }</h2>
                <div class="toolbar">
                    <select {onchange}>
                        { for LIMITS.iter().map(|n| html! {
                            <option value={n.to_string()} selected={*n == self.limit}>
                                { format!("Last {}", n.to_formatted_string(&Locale::en)) }
                            </option>
                        }) }
                    </select>
                    <button onclick={link.callback(|_| Msg::Load)}>{ "Refresh" }</button>
                </div>
                <table>
                    <tr><th>{ "When" }</th><th>{ "Who" }</th><th>{ "Action" }</th><th>{ "Details" }</th></tr>
                    { for self.logs.iter().map(|log| {
                        let who = match &log.actor_id {
                            Some(id) => self.actors.get(id).cloned().unwrap_or_else(|| id.clone()),
                            None => "system".to_string(),
                        };
                        html! {
                            <tr>
                                <td>{ short_time(&log.created_at) }</td>
                                <td>{ who }</td>
                                <td>{ log.action.clone() }</td>
                                <td>{ log.details.clone() }</td>
                            </tr>
                        }
                    }) }
                </table>
            </section>
        }
    }
}
