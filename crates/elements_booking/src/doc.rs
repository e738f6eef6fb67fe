// File: crates/elements_booking/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::CallbackPayload;
use crate::logic::ScheduleOutcome;
use elements_common::services::CalendarEvent;
use elements_config::Contact;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::home_handler,
        crate::handlers::availability_handler,
        crate::handlers::real_time_schedule_click_handler,
        crate::handlers::submit_handler,
        crate::handlers::callback_url_handler
    ),
    components(schemas(ScheduleOutcome, CallbackPayload, CalendarEvent, Contact)),
    tags(
        (name = "Elements", description = "Cronofy Elements booking demo")
    )
)]
pub struct ElementsApiDoc;
