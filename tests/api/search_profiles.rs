use std::time::Duration;

use serde_json::{json, Value};

use crate::helpers::{
    spawn_app, spawn_app_with_interval, spawn_fake_provider, CannedResponse, AGENT_ID, API_KEY,
};

fn running() -> CannedResponse {
    CannedResponse::json(json!({ "status": "running" }))
}

#[tokio::test]
async fn search_returns_400_when_company_is_missing() {
    let provider = spawn_fake_provider(CannedResponse::ok(), vec![], running());
    let app = spawn_app(&provider, 3);
    let test_cases = vec![
        (json!({}), "absent company"),
        (json!({ "company": "" }), "empty company"),
        (json!({ "company": null, "titles": ["CEO"] }), "null company"),
    ];

    for (body, description) in test_cases {
        let response = app.post_search(&body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Company name is required" }));
    }

    assert_eq!(provider.state.launch_count(), 0);
}

#[tokio::test]
async fn search_returns_400_for_malformed_json() {
    let provider = spawn_fake_provider(CannedResponse::ok(), vec![], running());
    let app = spawn_app(&provider, 3);

    let response = app
        .api_client
        .post(format!("{}/search-profiles", app.address))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn search_returns_profiles_found_on_third_poll() {
    let provider = spawn_fake_provider(
        CannedResponse::ok(),
        vec![
            running(),
            CannedResponse::json(json!({ "data": [], "status": "running" })),
            CannedResponse::json(json!({
                "data": [{ "fullName": "A B", "jobTitle": "Eng", "profileUrl": "u1" }],
                "status": "finished",
            })),
        ],
        running(),
    );
    let app = spawn_app(&provider, 30);

    let response = app.post_search(&json!({ "company": "Beta Corp" })).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "profiles": [{ "name": "A B", "title": "Eng", "profileUrl": "u1" }] })
    );
    assert_eq!(provider.state.fetch_count(), 3);
}

#[tokio::test]
async fn search_launches_the_agent_with_the_search_url() {
    let provider = spawn_fake_provider(
        CannedResponse::ok(),
        vec![],
        CannedResponse::json(json!({ "data": [], "status": "finished" })),
    );
    let app = spawn_app(&provider, 30);

    app.post_search(&json!({ "company": "Z", "titles": ["X", "Y"] }))
        .await;

    let launches = provider.state.launches.lock().unwrap();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].api_key.as_deref(), Some(API_KEY));

    let body = launches[0].body.as_ref().unwrap();
    assert_eq!(body["id"], json!(AGENT_ID));
    let search = url::Url::parse(body["arguments"]["search"].as_str().unwrap()).unwrap();
    assert_eq!(search.host_str(), Some("www.linkedin.com"));
    assert_eq!(search.path(), "/search/results/people/");
    let keywords: Vec<(String, String)> = search.query_pairs().into_owned().collect();
    assert_eq!(
        keywords,
        vec![("keywords".to_string(), r#"("X" OR "Y") "Z""#.to_string())]
    );

    let fetches = provider.state.fetches.lock().unwrap();
    assert_eq!(fetches.len(), 1);
    assert_eq!(fetches[0].id.as_deref(), Some(AGENT_ID));
    assert_eq!(fetches[0].api_key.as_deref(), Some(API_KEY));
}

#[tokio::test]
async fn search_returns_empty_profiles_when_polling_times_out() {
    let provider = spawn_fake_provider(CannedResponse::ok(), vec![], running());
    let app = spawn_app(&provider, 5);

    let response = app.post_search(&json!({ "company": "Acme" })).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "profiles": [] }));
    assert_eq!(provider.state.fetch_count(), 5);
}

#[tokio::test]
async fn search_keeps_polling_past_malformed_output() {
    let provider = spawn_fake_provider(
        CannedResponse::ok(),
        vec![
            CannedResponse::raw(200, "<html>busy</html>"),
            CannedResponse::json(json!({ "data": "soon", "status": "finished" })),
            CannedResponse::json(json!({ "data": [{ "firstName": "Jane", "lastName": "Doe", "subtitle": "CTO" }] })),
        ],
        running(),
    );
    let app = spawn_app(&provider, 30);

    let response = app.post_search(&json!({ "company": "Acme" })).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "profiles": [{ "name": "Jane Doe", "title": "CTO" }] })
    );
    assert_eq!(provider.state.fetch_count(), 3);
}

#[tokio::test]
async fn search_returns_500_when_launch_fails() {
    let provider = spawn_fake_provider(
        CannedResponse::raw(401, r#"{"error":"bad key"}"#),
        vec![],
        running(),
    );
    let app = spawn_app(&provider, 30);

    let response = app.post_search(&json!({ "company": "Acme" })).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to retrieve LinkedIn profiles" }));
    assert_eq!(provider.state.launch_count(), 1);
    assert_eq!(provider.state.fetch_count(), 0);
}

#[tokio::test]
async fn search_returns_500_when_fetch_output_fails() {
    let provider = spawn_fake_provider(
        CannedResponse::ok(),
        vec![running(), CannedResponse::raw(503, "unavailable")],
        running(),
    );
    let app = spawn_app(&provider, 30);

    let response = app.post_search(&json!({ "company": "Acme" })).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to retrieve LinkedIn profiles" }));
    assert_eq!(provider.state.fetch_count(), 2);
}

#[tokio::test]
async fn search_keeps_polling_after_the_caller_gives_up() {
    let provider = spawn_fake_provider(CannedResponse::ok(), vec![], running());
    let app = spawn_app_with_interval(&provider, 20, 20);

    let _ = app
        .api_client
        .post(format!("{}/search-profiles", app.address))
        .json(&json!({ "company": "Acme" }))
        .timeout(Duration::from_millis(100))
        .send()
        .await;

    for _ in 0..500 {
        if provider.state.fetch_count() == 20 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(provider.state.fetch_count(), 20);
}
