#[cfg(test)]
mod tests {
    use crate::handlers::BookingState;
    use crate::logic::mock::MockSchedulingApi;
    use crate::routes::routes;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use elements_common::services::{ApiError, SchedulingApi};
    use elements_config::AppConfig;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(api: Arc<MockSchedulingApi>) -> Router {
        let mut config = AppConfig::default();
        config.cronofy.client_id = "client_abc".to_string();
        config.cronofy.sub = "acc_1".to_string();
        let api: Arc<dyn SchedulingApi> = api;
        let state = BookingState::new(Arc::new(config), api).unwrap();
        routes(Arc::new(state))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn callback_body() -> Value {
        json!({
            "notification": {"type": "event_created"},
            "event": {
                "event_id": "rts_demo_event_2",
                "summary": "Demo meeting",
                "description": "Booked through a scheduling link",
                "start": "2024-12-13T12:00:00Z",
                "end": "2024-12-13T13:00:00Z",
                "tzid": "Etc/UTC"
            }
        })
    }

    #[tokio::test]
    async fn home_renders_even_when_tokens_fail() {
        let api = Arc::new(MockSchedulingApi {
            token_error: Some(ApiError::InvalidGrant("reused".to_string())),
            element_token_error: Some(ApiError::Http("connection refused".to_string())),
            ..MockSchedulingApi::default()
        });

        let response = app_with(api.clone())
            .oneshot(get("/?code=already_used"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains(r#"const elementToken = "invalid";"#));
        assert_eq!(api.token_requests.lock().unwrap()[0].code, "already_used");
    }

    #[tokio::test]
    async fn home_without_code_skips_exchange() {
        let api = Arc::new(MockSchedulingApi::new());

        let response = app_with(api.clone()).oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(api.token_requests.lock().unwrap().is_empty());
        let html = body_string(response).await;
        assert!(html.contains("token_managed_availability+account_management+agenda"));
    }

    #[tokio::test]
    async fn availability_page_uses_availability_token() {
        let api = Arc::new(MockSchedulingApi::new());

        let response = app_with(api.clone())
            .oneshot(get("/availability"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains(r#"element_token: "token_availability""#));
        assert!(html.contains(r#"members: [{ sub: "acc_1" }]"#));
    }

    #[tokio::test]
    async fn schedule_click_returns_urls() {
        let api = Arc::new(MockSchedulingApi::new());

        let response = app_with(api)
            .oneshot(post_json("/real-time-schedule-click", json!({"clicked": true})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            body["message"],
            "Events scheduled successfully\nhttps://app.cronofy.com/rts/1?locale=en\nhttps://app.cronofy.com/rts/2?locale=es"
        );
        assert_eq!(body["urls"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["contacts"][1]["phoneNumber"], "+34 91 123 4567");
    }

    #[tokio::test]
    async fn schedule_click_with_empty_body_and_total_failure() {
        let api = Arc::new(
            MockSchedulingApi::new()
                .fail_scheduling_for("http://localhost:7070/callback-url?id=1")
                .fail_scheduling_for("http://localhost:7070/callback-url?id=2"),
        );

        let request = Request::builder()
            .method(Method::POST)
            .uri("/real-time-schedule-click")
            .body(Body::empty())
            .unwrap();
        let response = app_with(api).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], 500);
        assert!(body.get("urls").is_none());
    }

    #[tokio::test]
    async fn submit_renders_confirmation() {
        let api = Arc::new(MockSchedulingApi::new());
        // {"start":"2024-12-13T12:00:00Z","end":"2024-12-13T13:00:00Z"}
        let uri = "/submit?slot=%7B%22start%22%3A%222024-12-13T12%3A00%3A00Z%22%2C%22end%22%3A%222024-12-13T13%3A00%3A00Z%22%7D";

        let response = app_with(api.clone()).oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<strong>13 Dec 2024</strong>"));
        assert!(html.contains("<strong>12:00</strong> to <strong>13:00</strong>"));
        assert_eq!(api.created_events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn submit_without_slot_is_bad_request() {
        let api = Arc::new(MockSchedulingApi::new());

        let response = app_with(api.clone()).oneshot(get("/submit")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(api.created_events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_calendar_failure_is_bad_gateway() {
        let api = Arc::new(MockSchedulingApi {
            user_info_error: Some(ApiError::Unauthorized {
                status: 401,
                body: String::new(),
            }),
            ..MockSchedulingApi::default()
        });
        let uri = "/submit?slot=%7B%22start%22%3A%222024-12-13T12%3A00%3A00Z%22%2C%22end%22%3A%222024-12-13T13%3A00%3A00Z%22%7D";

        let response = app_with(api).oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn callback_writes_event_for_contact() {
        let api = Arc::new(MockSchedulingApi::new());

        let response = app_with(api.clone())
            .oneshot(post_json("/callback-url?id=2", callback_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
        let events = api.created_events.lock().unwrap();
        assert_eq!(events[0].1.summary, "Demo meeting with Bruno Garcia");
    }

    #[tokio::test]
    async fn callback_without_resolvable_id_is_rejected() {
        for uri in ["/callback-url", "/callback-url?id=abc", "/callback-url?id=9"] {
            let api = Arc::new(MockSchedulingApi::new());

            let response = app_with(api.clone())
                .oneshot(post_json(uri, callback_body()))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert!(api.created_events.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn callback_write_failure_is_bad_gateway() {
        let api = Arc::new(MockSchedulingApi {
            create_event_error: Some(ApiError::Rejected {
                status: 422,
                body: String::new(),
            }),
            ..MockSchedulingApi::default()
        });

        let response = app_with(api)
            .oneshot(post_json("/callback-url?id=1", callback_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
