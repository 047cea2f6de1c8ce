//! Password change form, used by admins for any user and by everyone for
//! themselves (`change-password` function).

use crate::api;
use crate::components::toast::{show_error, show_toast};
use common::auth::Session;
use common::requests::ChangePasswordRequest;
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

const MIN_PASSWORD_LEN: usize = 8;

pub enum Msg {
    Password(String),
    Confirm(String),
    Submit,
    Done(bool),
}

#[derive(Properties, PartialEq)]
pub struct PasswordDialogProps {
    pub session: Session,
    pub user_id: AttrValue,
    pub user_label: AttrValue,
    pub on_close: Callback<()>,
}

pub struct PasswordDialog {
    password: String,
    confirm: String,
    busy: bool,
}

/// Local checks before anything is sent.
pub fn check_new_password(password: &str, confirm: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Passwords need at least 8 characters");
    }
    if password != confirm {
        return Err("The passwords do not match");
    }
    Ok(())
}

impl Component for PasswordDialog {
    type Message = Msg;
    type Properties = PasswordDialogProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            password: String::new(),
            confirm: String::new(),
            busy: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Password(value) => self.password = value,
            Msg::Confirm(value) => self.confirm = value,
            Msg::Submit => {
                if let Err(problem) = check_new_password(&self.password, &self.confirm) {
                    show_error(problem);
                    return false;
                }
                self.busy = true;
                let session = ctx.props().session.clone();
                let body = ChangePasswordRequest {
                    user_id: ctx.props().user_id.to_string(),
                    new_password: self.password.clone(),
                };
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api::post_empty(&session, "/api/functions/change-password", &body).await {
                        Ok(()) => {
                            show_toast("Password changed");
                            link.send_message(Msg::Done(true));
                        }
                        Err(e) => {
                            show_error(e);
                            link.send_message(Msg::Done(false));
                        }
                    }
                });
            }
            Msg::Done(changed) => {
                self.busy = false;
                self.password.clear();
                self.confirm.clear();
                if changed {
                    ctx.props().on_close.emit(());
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let on_close = ctx.props().on_close.reform(|_: MouseEvent| ());
        html! {
            <div class="dialog">
                <h3>{ format!("Change password for {}", ctx.props().user_label) }</h3>
                <input
                    type="password"
                    placeholder="New password"
                    value={self.password.clone()}
                    oninput={link.callback(|e: InputEvent| Msg::Password(e.target_unchecked_into::<HtmlInputElement>().value()))}
                />
                <input
                    type="password"
                    placeholder="Repeat password"
                    value={self.confirm.clone()}
                    oninput={link.callback(|e: InputEvent| Msg::Confirm(e.target_unchecked_into::<HtmlInputElement>().value()))}
                />
                <div class="dialog-actions">
                    <button onclick={on_close}>{ "Cancel" }</button>
                    <button class="primary" disabled={self.busy} onclick={link.callback(|_| Msg::Submit)}>{ "Change" }</button>
                </div>
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_passwords_are_checked_locally() {
        assert!(check_new_password("short", "short").is_err());
        assert!(check_new_password("longenough", "different").is_err());
        assert!(check_new_password("longenough", "longenough").is_ok());
    }
}
