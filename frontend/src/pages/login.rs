use crate::auth;
use common::auth::{mock_profiles, Session, MOCK_PASSWORD};
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

pub enum Msg {
    Email(String),
    Password(String),
    Submit,
    Failed(String),
}

#[derive(Properties, PartialEq)]
pub struct LoginProps {
    pub on_signed_in: Callback<Session>,
}

pub struct LoginPage {
    email: String,
    password: String,
    busy: bool,
    error: Option<String>,
}

impl Component for LoginPage {
    type Message = Msg;
    type Properties = LoginProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            busy: false,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Email(value) => self.email = value,
            Msg::Password(value) => self.password = value,
            Msg::Submit => {
                if self.email.trim().is_empty() || self.password.is_empty() {
                    self.error = Some("Enter your email and password".to_string());
                    return true;
                }
                self.busy = true;
                self.error = None;
                let (email, password) = (self.email.trim().to_string(), self.password.clone());
                let link = ctx.link().clone();
                let on_signed_in = ctx.props().on_signed_in.clone();
                spawn_local(async move {
                    match auth::sign_in(&email, &password).await {
                        Ok(session) => on_signed_in.emit(session),
                        Err(message) => link.send_message(Msg::Failed(message)),
                    }
                });
            }
            Msg::Failed(message) => {
                self.busy = false;
                self.password.clear();
                self.error = Some(message);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });
        html! {
            <div class="login">
                <form class="card" {onsubmit}>
                    <h2>{ "MedCode sign in" }</h2>
                    <input
                        type="email"
                        placeholder="Email"
                        value={self.email.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::Email(e.target_unchecked_into::<HtmlInputElement>().value()))}
                    />
                    <input
                        type="password"
                        placeholder="Password"
                        value={self.password.clone()}
                        oninput={link.callback(|e: InputEvent| Msg::Password(e.target_unchecked_into::<HtmlInputElement>().value()))}
                    />
                    if let Some(error) = &self.error {
                        <div class="form-error">{ error.clone() }</div>
                    }
                    <button class="primary" type="submit" disabled={self.busy}>
                        { if self.busy { "Signing in..." } else { "Sign in" } }
                    </button>
                    <details class="demo-accounts">
                        <summary>{ "Offline demo accounts" }</summary>
                        <p>{ format!("Used only when the server cannot be reached. Password: {}", MOCK_PASSWORD) }</p>
                        <ul>
                            { for mock_profiles().into_iter().map(|p| html! {
                                <li>{ format!("{} ({})", p.email, p.role.label()) }</li>
                            }) }
                        </ul>
                    </details>
                </form>
            </div>
        }
    }
}
