mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{at, TestApp};

async fn project_and_org(app: &TestApp) -> (String, String) {
    let project = app
        .create(
            "/api/projects",
            json!({ "name": "Maple Street", "begin_date": "2025-06-01" }),
        )
        .await;
    let org = app
        .create("/api/organizations", json!({ "name": "Lakeside Church" }))
        .await;
    (project, org)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn registration_hides_password_and_rejects_duplicate_email() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    let id = app.volunteer("Ada", "Lovelace", None, None).await;

    let (status, body) = app.get(&format!("/api/users/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email_address"], "ada.lovelace@example.org");
    assert_eq!(body["data"]["waiver_sign_date"], "2025-06-10");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = app
        .post(
            "/api/users",
            json!({ "email_address": "ADA.LOVELACE@example.org", "password": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = app
        .get("/api/users/email-exists?email=ada.lovelace@example.org")
        .await;
    assert_eq!(body["data"]["exists"], true);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    let (status, body) = app
        .get("/api/users/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn punch_in_shows_on_portal_and_blocks_second_punch() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    let user = app.volunteer("Grace", "Hopper", None, None).await;
    let (project, org) = project_and_org(&app).await;

    let punch = json!({ "project_id": project, "organization_id": org });
    let (status, body) = app
        .post(&format!("/api/users/{}/punch-in", user), punch.clone())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["clock_out_time"], "2025-06-11T00:00:00");

    let (_, portal) = app.get(&format!("/api/users/{}/portal", user)).await;
    assert_eq!(portal["data"]["is_punched_in"], true);
    assert_eq!(portal["data"]["full_name"], "Grace Hopper");

    let (status, _) = app
        .post(&format!("/api/users/{}/punch-in", user), punch)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&format!("/api/users/{}/punch-out", user), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, portal) = app.get(&format!("/api/users/{}/portal", user)).await;
    assert_eq!(portal["data"]["is_punched_in"], false);
}

#[tokio::test]
async fn hours_skip_open_sheets() {
    let app = TestApp::at(at((2025, 6, 10), 15, 0));
    let user = app.volunteer("Grace", "Hopper", None, None).await;
    let (project, org) = project_and_org(&app).await;

    app.create(
        "/api/time-sheets",
        json!({
            "user_id": user,
            "project_id": project,
            "organization_id": org,
            "clock_in_time": "2025-06-09T09:00:00",
            "clock_out_time": "2025-06-09T13:30:00",
        }),
    )
    .await;
    app.post(
        &format!("/api/users/{}/punch-in", user),
        json!({ "project_id": project, "organization_id": org }),
    )
    .await;

    let (status, body) = app.get(&format!("/api/users/{}/hours", user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hours"], 4.5);
    assert_eq!(body["data"]["counted"], 1);
    assert_eq!(body["data"]["open"], 1);

    let (_, body) = app.get(&format!("/api/projects/{}/hours", project)).await;
    assert_eq!(body["data"]["hours"], 4.5);

    let (_, body) = app.get(&format!("/api/users/{}/portal", user)).await;
    assert_eq!(body["data"]["cumulative_hours"], 4.5);
}

#[tokio::test]
async fn negative_interval_is_rejected_on_insert() {
    let app = TestApp::at(at((2025, 6, 10), 15, 0));
    let user = app.volunteer("Grace", "Hopper", None, None).await;
    let (project, org) = project_and_org(&app).await;

    let (status, body) = app
        .post(
            "/api/time-sheets",
            json!({
                "user_id": user,
                "project_id": project,
                "organization_id": org,
                "clock_in_time": "2025-06-09T13:00:00",
                "clock_out_time": "2025-06-09T09:00:00",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn demographics_bucket_by_age_and_gender() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    app.volunteer("A", "Seventeen", Some("2008-01-01"), Some("Female")).await;
    app.volunteer("B", "Eighteen", Some("2007-01-01"), Some("female")).await;
    app.volunteer("C", "TwentySix", Some("1999-01-01"), Some("Male")).await;
    app.volunteer("D", "TwentySeven", Some("1998-01-01"), Some("Male")).await;
    app.volunteer("E", "FiftyFive", Some("1970-01-01"), Some("Female")).await;
    app.volunteer("F", "Unknown", None, Some("Female")).await;

    let (status, body) = app.get("/api/reports/demographics").await;
    assert_eq!(status, StatusCode::OK);
    let counts: Vec<u64> = body["data"]["brackets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![1, 2, 1, 0, 1]);
    assert_eq!(body["data"]["total"], 5);

    let (_, body) = app.get("/api/reports/demographics?gender=FEMALE").await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["brackets"][1]["count"], 1);
}

#[tokio::test]
async fn project_page_filters_and_clamps() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    for n in 0..12 {
        app.create(
            "/api/projects",
            json!({
                "name": format!("Build {:02}", n),
                "begin_date": "2025-01-01",
                "active": n % 2 == 0,
            }),
        )
        .await;
    }

    let (_, body) = app.get("/api/projects?page=0").await;
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["total_count"], 12);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 10);

    let (_, body) = app.get("/api/projects?status=inactive").await;
    assert_eq!(body["data"]["total_count"], 6);

    let (_, body) = app.get("/api/projects?query=build%2011").await;
    assert_eq!(body["data"]["total_count"], 1);

    let (status, _) = app.get("/api/projects?status=dormant").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/projects/active").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn duplicate_project_key_is_rejected() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    let body = json!({ "name": "Maple Street", "begin_date": "2025-06-01" });
    app.create("/api/projects", body.clone()).await;
    let (status, _) = app.post("/api/projects", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn time_card_correction_and_bad_sheet_report() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    let user = app.volunteer("Grace", "Hopper", None, None).await;
    let (project, org) = project_and_org(&app).await;

    // Left open on an earlier day.
    let stale = app
        .create(
            "/api/time-sheets",
            json!({
                "user_id": user,
                "project_id": project,
                "organization_id": org,
                "clock_in_time": "2025-06-08T09:00:00",
                "clock_out_time": "2025-06-09T00:00:00",
            }),
        )
        .await;

    let (_, body) = app.get("/api/reports/bad-time-sheets").await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![stale.as_str()]);

    let (status, body) = app
        .put(
            &format!("/api/time-cards/{}", stale),
            json!({
                "clock_in_time": "2025-06-08T09:00:00",
                "clock_out_time": "2025-06-08T12:00:00",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["volunteer_name"], "Grace Hopper");
    assert_eq!(body["data"]["project_name"], "Maple Street");

    let (_, body) = app.get("/api/reports/bad-time-sheets").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = app.get("/api/time-cards?query=hopper").await;
    assert_eq!(body["data"]["total_count"], 1);
}

#[tokio::test]
async fn referenced_records_cannot_be_deleted() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    let user = app.volunteer("Grace", "Hopper", None, None).await;
    let (project, org) = project_and_org(&app).await;
    app.post(
        &format!("/api/users/{}/punch-in", user),
        json!({ "project_id": project, "organization_id": org }),
    )
    .await;

    let (status, _) = app.delete(&format!("/api/projects/{}", project)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.delete(&format!("/api/organizations/{}", org)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.delete(&format!("/api/users/{}", user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn name_search_requires_a_name() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    app.volunteer("Grace", "Hopper", None, None).await;
    app.volunteer("Grace", "Kelly", None, None).await;

    let (status, _) = app.get("/api/users/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/users/search?first_name=grace").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_insert_cannot_open_a_second_sheet() {
    let app = TestApp::at(at((2025, 6, 10), 9, 0));
    let user = app.volunteer("Grace", "Hopper", None, None).await;
    let (project, org) = project_and_org(&app).await;
    app.post(
        &format!("/api/users/{}/punch-in", user),
        json!({ "project_id": project, "organization_id": org }),
    )
    .await;

    let (status, body) = app
        .post(
            "/api/time-sheets",
            json!({
                "user_id": user,
                "project_id": project,
                "organization_id": org,
                "clock_in_time": "2025-06-10T08:00:00",
                "clock_out_time": "2025-06-11T00:00:00",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = app.get(&format!("/api/users/{}/hours", user)).await;
    assert_eq!(body["data"]["open"], 1);

    let (status, _) = app
        .post(&format!("/api/users/{}/punch-out", user), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, portal) = app.get(&format!("/api/users/{}/portal", user)).await;
    assert_eq!(portal["data"]["is_punched_in"], false);
}
