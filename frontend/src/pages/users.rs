//! User administration: directory, account creation, activation and
//! password resets.

use crate::api;
use crate::components::password_dialog::PasswordDialog;
use crate::components::status::short_time;
use crate::components::toast::{show_error, show_toast};
use crate::components::top_sheet::{close_top_sheet, open_top_sheet, TopSheet};
use common::auth::Session;
use common::model::profile::Profile;
use common::model::role::Role;
use common::requests::{CreateUserRequest, SetActiveRequest};
use std::str::FromStr;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    Loaded(Vec<Profile>),
    Name(String),
    Email(String),
    Password(String),
    Role(Role),
    Create,
    Created(Profile),
    CreateFailed,
    SetActive(String, bool),
    Updated(Profile),
    ChangePassword(String),
    ClosePassword,
}

#[derive(Properties, PartialEq)]
pub struct UsersProps {
    pub session: Session,
}

pub struct UsersPage {
    profiles: Vec<Profile>,
    draft: CreateUserRequest,
    busy: bool,
    password_for: Option<Profile>,
    password_ref: NodeRef,
}

fn empty_draft() -> CreateUserRequest {
    CreateUserRequest {
        name: String::new(),
        email: String::new(),
        password: String::new(),
        role: Role::Employee,
    }
}

/// Local checks mirroring the server's; the server has the last word.
pub fn check_draft(draft: &CreateUserRequest) -> Result<(), &'static str> {
    if draft.name.trim().is_empty() {
        return Err("The name is required");
    }
    let email = draft.email.trim();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err("Enter a valid email address");
    }
    if draft.password.chars().count() < 8 {
        return Err("Passwords need at least 8 characters");
    }
    Ok(())
}

impl Component for UsersPage {
    type Message = Msg;
    type Properties = UsersProps;

    fn create(ctx: &Context<Self>) -> Self {
        let session = ctx.props().session.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            match api::get::<Vec<Profile>>(&session, "/api/profiles").await {
                Ok(profiles) => link.send_message(Msg::Loaded(profiles)),
                Err(e) => show_error(e),
            }
        });
        Self {
            profiles: Vec::new(),
            draft: empty_draft(),
            busy: false,
            password_for: None,
            password_ref: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let session = ctx.props().session.clone();
        let link = ctx.link().clone();
        match msg {
            Msg::Loaded(profiles) => self.profiles = profiles,
            Msg::Name(value) => self.draft.name = value,
            Msg::Email(value) => self.draft.email = value,
            Msg::Password(value) => self.draft.password = value,
            Msg::Role(role) => self.draft.role = role,
            Msg::Create => {
                if let Err(problem) = check_draft(&self.draft) {
                    show_error(problem);
                    return false;
                }
                let mut body = self.draft.clone();
                body.name = body.name.trim().to_string();
                body.email = body.email.trim().to_string();
                self.busy = true;
                spawn_local(async move {
                    match api::post::<_, Profile>(&session, "/api/functions/create-user", &body).await {
                        Ok(profile) => link.send_message(Msg::Created(profile)),
                        Err(e) => {
                            show_error(e);
                            link.send_message(Msg::CreateFailed);
                        }
                    }
                });
            }
            Msg::Created(profile) => {
                self.busy = false;
                show_toast(&format!("Created {}", profile.email));
                self.draft = empty_draft();
                self.profiles.push(profile);
            }
            Msg::CreateFailed => self.busy = false,
            Msg::SetActive(id, active) => {
                spawn_local(async move {
                    let url = format!("/api/profiles/{}/active", id);
                    match api::put::<_, Profile>(&session, &url, &SetActiveRequest { active }).await {
                        Ok(profile) => link.send_message(Msg::Updated(profile)),
                        Err(e) => show_error(e),
                    }
                });
                return false;
            }
            Msg::Updated(profile) => {
                if let Some(slot) = self.profiles.iter_mut().find(|p| p.id == profile.id) {
                    *slot = profile;
                }
            }
            Msg::ChangePassword(id) => {
                self.password_for = self.profiles.iter().find(|p| p.id == id).cloned();
                open_top_sheet(&self.password_ref);
            }
            Msg::ClosePassword => {
                close_top_sheet(&self.password_ref);
                self.password_for = None;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let me = ctx.props().session.profile.id.clone();
        let on_role = link.batch_callback(|e: Event| {
            Role::from_str(&e.target_unchecked_into::<HtmlSelectElement>().value()).ok().map(Msg::Role)
        });

        html! {
            <section>
                <h2>{ "Users" }</h2>
                <div class="card form">
                    <h3>{ "New user" }</h3>
                    <input placeholder="Name" value={self.draft.name.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::Name(e.target_unchecked_into::<HtmlInputElement>().value()))} />
                    <input type="email" placeholder="Email" value={self.draft.email.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::Email(e.target_unchecked_into::<HtmlInputElement>().value()))} />
                    <input type="password" placeholder="Initial password" value={self.draft.password.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::Password(e.target_unchecked_into::<HtmlInputElement>().value()))} />
                    <select onchange={on_role}>
                        { for Role::ALL.iter().map(|role| html! {
                            <option value={role.as_str()} selected={self.draft.role == *role}>{ role.label() }</option>
                        }) }
                    </select>
                    <button class="primary" disabled={self.busy} onclick={link.callback(|_| Msg::Create)}>{ "Create" }</button>
                </div>
                <table>
                    <tr><th>{ "Name" }</th><th>{ "Email" }</th><th>{ "Role" }</th><th>{ "Created" }</th><th>{ "Active" }</th><th /></tr>
                    { for self.profiles.iter().map(|p| {
                        let (toggle_id, password_id) = (p.id.clone(), p.id.clone());
                        let active = p.active;
                        html! {
                            <tr class={if p.active { "" } else { "inactive" }}>
                                <td>{ p.name.clone() }</td>
                                <td>{ p.email.clone() }</td>
                                <td>{ p.role.label() }</td>
                                <td>{ short_time(&p.created_at) }</td>
                                <td>
                                    <input
                                        type="checkbox"
                                        checked={active}
                                        disabled={p.id == me}
                                        onchange={link.callback(move |_| Msg::SetActive(toggle_id.clone(), !active))}
                                    />
                                </td>
                                <td>
                                    <button onclick={link.callback(move |_| Msg::ChangePassword(password_id.clone()))}>{ "Password" }</button>
                                </td>
                            </tr>
                        }
                    }) }
                </table>
                <TopSheet node_ref={self.password_ref.clone()}>
                    if let Some(profile) = &self.password_for {
                        <PasswordDialog
                            key={profile.id.clone()}
                            session={ctx.props().session.clone()}
                            user_id={profile.id.clone()}
                            user_label={profile.email.clone()}
                            on_close={link.callback(|_| Msg::ClosePassword)}
                        />
                    }
                </TopSheet>
            </section>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drafts_are_checked_before_sending() {
        let mut draft = empty_draft();
        assert!(check_draft(&draft).is_err());
        draft.name = "Casey".to_string();
        draft.email = "casey@clinic.test".to_string();
        draft.password = "short".to_string();
        assert_eq!(check_draft(&draft), Err("Passwords need at least 8 characters"));
        draft.password = "long enough".to_string();
        assert_eq!(check_draft(&draft), Ok(()));
        draft.email = "casey@".to_string();
        assert!(check_draft(&draft).is_err());
    }
}
