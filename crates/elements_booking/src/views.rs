// File: crates/elements_booking/src/views.rs
//! Server-side pages. Templates are compiled into the binary and rendered
//! with Handlebars in strict mode, so a missing field is a render error
//! rather than an empty string.
//!
//! Values that land inside `<script>` go through the `js` helper and a
//! triple-stash: browsers do not decode HTML entities in script blocks.

use std::fmt;

use elements_common::ElementsError;
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;

use crate::logic::Confirmation;

const HOME_TEMPLATE: &str = include_str!("../templates/home.hbs");
const AVAILABILITY_TEMPLATE: &str = include_str!("../templates/availability.hbs");
const SUBMIT_TEMPLATE: &str = include_str!("../templates/submit.hbs");

/// Encodes a value as a JavaScript literal that cannot close its `<script>`.
pub fn js_literal(value: &serde_json::Value) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

handlebars_helper!(js: |v: Json| js_literal(v));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Availability,
    Submit,
}

impl Page {
    const ALL: [Page; 3] = [Page::Home, Page::Availability, Page::Submit];

    fn source(self) -> &'static str {
        match self {
            Page::Home => HOME_TEMPLATE,
            Page::Availability => AVAILABILITY_TEMPLATE,
            Page::Submit => SUBMIT_TEMPLATE,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Page::Home => write!(f, "home"),
            Page::Availability => write!(f, "availability"),
            Page::Submit => write!(f, "submit"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomeContext<'a> {
    pub element_token: &'a str,
    pub client_id: &'a str,
    pub data_center: &'a str,
    pub redirect_uri: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityContext<'a> {
    pub element_token: &'a str,
    pub sub: &'a str,
    pub data_center: &'a str,
    pub duration_minutes: u32,
    pub period_start: String,
    pub period_end: String,
}

/// The template registry, built once at startup and shared read-only.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, ElementsError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_helper("js", Box::new(js));
        for page in Page::ALL {
            registry
                .register_template_string(&page.to_string(), page.source())
                .map_err(|e| {
                    ElementsError::RenderError(format!("template {} failed to compile: {}", page, e))
                })?;
        }
        Ok(Self { registry })
    }

    fn render<T: Serialize>(&self, page: Page, context: &T) -> Result<String, ElementsError> {
        self.registry
            .render(&page.to_string(), context)
            .map_err(|e| ElementsError::RenderError(format!("{}: {}", page, e)))
    }

    pub fn home(&self, context: &HomeContext<'_>) -> Result<String, ElementsError> {
        self.render(Page::Home, context)
    }

    pub fn availability(&self, context: &AvailabilityContext<'_>) -> Result<String, ElementsError> {
        self.render(Page::Availability, context)
    }

    pub fn submit(&self, confirmation: &Confirmation) -> Result<String, ElementsError> {
        self.render(Page::Submit, confirmation)
    }
}
