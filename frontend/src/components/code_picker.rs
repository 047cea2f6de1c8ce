//! Code entry with autocomplete.
//!
//! Typing at least two characters lists matching catalog entries; picking
//! one or pressing Enter validates the code locally. An invalid code is
//! reported under the input and is not added. Nothing else is blocked.

use common::codes::autocomplete::{self, MAX_RESULTS};
use common::codes::validator::{validate_icd10, validate_procedure};
use common::codes::{CodeEntry, CodeType, ValidationResult};
use web_sys::{HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

/// Which list of a page the picker feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeList {
    /// ICD-10.
    Diagnoses,
    /// CPT and HCPCS side by side.
    Procedures,
}

impl CodeList {
    pub fn label(&self) -> &'static str {
        match self {
            CodeList::Diagnoses => "Diagnoses (ICD-10)",
            CodeList::Procedures => "Procedures (CPT/HCPCS)",
        }
    }

    fn code_types(&self) -> &'static [CodeType] {
        match self {
            CodeList::Diagnoses => &[CodeType::Icd10],
            CodeList::Procedures => &[CodeType::Cpt, CodeType::Hcpcs],
        }
    }

    pub fn validate(&self, code: &str) -> ValidationResult {
        match self {
            CodeList::Diagnoses => validate_icd10(code),
            CodeList::Procedures => validate_procedure(code),
        }
    }

    pub fn suggestions(&self, query: &str) -> Vec<&'static CodeEntry> {
        self.code_types()
            .iter()
            .flat_map(|code_type| autocomplete::search(query, *code_type))
            .take(MAX_RESULTS)
            .collect()
    }
}

pub enum Msg {
    Input(String),
    Pick(String),
    Submit,
}

#[derive(Properties, PartialEq)]
pub struct CodePickerProps {
    pub list: CodeList,
    pub on_add: Callback<String>,
    #[prop_or_default]
    pub disabled: bool,
}

pub struct CodePicker {
    input: String,
    suggestions: Vec<&'static CodeEntry>,
    problem: Option<String>,
}

impl CodePicker {
    fn add(&mut self, ctx: &Context<Self>, code: String) {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return;
        }
        let result = ctx.props().list.validate(&code);
        if result.valid {
            ctx.props().on_add.emit(code);
            self.input.clear();
            self.suggestions.clear();
            self.problem = None;
        } else {
            self.problem = Some(result.message);
        }
    }
}

impl Component for CodePicker {
    type Message = Msg;
    type Properties = CodePickerProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            input: String::new(),
            suggestions: Vec::new(),
            problem: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Input(value) => {
                self.suggestions = ctx.props().list.suggestions(&value);
                self.input = value.to_uppercase();
                self.problem = None;
            }
            Msg::Pick(code) => self.add(ctx, code),
            Msg::Submit => {
                let code = self.input.clone();
                self.add(ctx, code);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let list = ctx.props().list;
        let oninput = link.callback(|e: InputEvent| Msg::Input(e.target_unchecked_into::<HtmlInputElement>().value()));
        let onkeydown = link.batch_callback(|e: KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                Some(Msg::Submit)
            } else {
                None
            }
        });

        html! {
            <div class="code-picker">
                <label>{ list.label() }</label>
                <div class="code-picker-row">
                    <input
                        type="text"
                        value={self.input.clone()}
                        placeholder="Code or description"
                        disabled={ctx.props().disabled}
                        {oninput}
                        {onkeydown}
                    />
                    <button disabled={ctx.props().disabled} onclick={link.callback(|_| Msg::Submit)}>{ "Add" }</button>
                </div>
                if let Some(problem) = &self.problem {
                    <div class="code-problem">{ problem.clone() }</div>
                }
                if !self.suggestions.is_empty() {
                    <ul class="code-suggestions">
                        { for self.suggestions.iter().map(|entry| {
                            let code = entry.code.clone();
                            html! {
                                <li onclick={link.callback(move |_| Msg::Pick(code.clone()))}>
                                    <strong>{ entry.code.clone() }</strong>
                                    <span>{ format!(" {} · {}", entry.code_type.label(), entry.description) }</span>
                                </li>
                            }
                        }) }
                    </ul>
                }
            </div>
        }
    }
}
