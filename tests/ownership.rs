mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn foreign_exercise_is_indistinguishable_from_missing() {
    let app = TestApp::new().await;
    let (alice, _) = app.signup("alice@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;
    let id = app.exercise(&alice, "Squat").await;
    let missing = Uuid::new_v4();

    let foreign_get = app.get(&format!("/api/v1/exercises/{id}"), &bob).await;
    let missing_get = app.get(&format!("/api/v1/exercises/{missing}"), &bob).await;
    assert_eq!(foreign_get.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_get.body["detail"], missing_get.body["detail"]);

    let r = app
        .patch(&format!("/api/v1/exercises/{id}"), &bob, json!({ "name": "Hijacked" }))
        .await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    assert_eq!(r.body["detail"], missing_get.body["detail"]);

    let r = app.delete(&format!("/api/v1/exercises/{id}"), &bob).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);

    // Untouched for the owner.
    let r = app.get(&format!("/api/v1/exercises/{id}"), &alice).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["name"], "Squat");
}

#[tokio::test]
async fn foreign_workout_is_indistinguishable_from_missing() {
    let app = TestApp::new().await;
    let (alice, _) = app.signup("alice@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;

    let w = app
        .post("/api/v1/workouts", &alice, json!({ "date": "2024-01-15", "note": "legs" }))
        .await;
    assert_eq!(w.status, StatusCode::CREATED);
    let id = w.body["id"].as_str().unwrap();
    let missing = app.get(&format!("/api/v1/workouts/{}", Uuid::new_v4()), &bob).await;

    let r = app.get(&format!("/api/v1/workouts/{id}"), &bob).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    assert_eq!(r.body["detail"], missing.body["detail"]);

    let r = app
        .patch(&format!("/api/v1/workouts/{id}"), &bob, json!({ "note": "mine now" }))
        .await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);

    let r = app.delete(&format!("/api/v1/workouts/{id}"), &bob).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);

    let r = app.get(&format!("/api/v1/workouts/{id}"), &alice).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["note"], "legs");
}

#[tokio::test]
async fn exercise_names_are_unique_per_owner_only() {
    let app = TestApp::new().await;
    let (alice, _) = app.signup("alice@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;

    app.exercise(&alice, "Bench Press").await;
    app.exercise(&bob, "Bench Press").await;

    let r = app
        .post("/api/v1/exercises", &alice, json!({ "name": "Bench Press" }))
        .await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert_eq!(r.body["detail"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn renaming_onto_an_existing_name_is_rejected() {
    let app = TestApp::new().await;
    let (alice, _) = app.signup("alice@example.com").await;
    app.exercise(&alice, "Deadlift").await;
    let row = app.exercise(&alice, "Row").await;

    let r = app
        .patch(&format!("/api/v1/exercises/{row}"), &alice, json!({ "name": "Deadlift" }))
        .await;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);

    let r = app
        .patch(&format!("/api/v1/exercises/{row}"), &alice, json!({ "name": "Barbell Row" }))
        .await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["name"], "Barbell Row");
}

#[tokio::test]
async fn listings_only_show_own_rows() {
    let app = TestApp::new().await;
    let (alice, _) = app.signup("alice@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;
    app.exercise(&alice, "Squat").await;
    app.exercise(&alice, "Bench").await;
    app.exercise(&bob, "Curl").await;

    let r = app.get("/api/v1/exercises", &alice).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["total"], 2);
    let names: Vec<_> = r.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Bench", "Squat"]);
}

#[tokio::test]
async fn sets_cannot_reference_someone_elses_exercise() {
    let app = TestApp::new().await;
    let (alice, _) = app.signup("alice@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;
    let alices = app.exercise(&alice, "Squat").await;

    let r = app
        .post(
            "/api/v1/workouts",
            &bob,
            json!({
                "date": "2024-01-15",
                "sets": [{ "exercise_id": alices, "reps": 5, "weight_kg": 100.0 }]
            }),
        )
        .await;
    assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(r.body["errors"][0]["field"], "sets[0].exercise_id");

    // Nothing was written.
    let r = app.get("/api/v1/workouts", &bob).await;
    assert_eq!(r.body["total"], 0);
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let app = TestApp::new().await;
    let (alice, _) = app.signup("alice@example.com").await;

    let r = app.get("/api/v1/exercises/admin/all", &alice).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
    assert_eq!(r.body["detail"]["code"], "FORBIDDEN");

    let r = app.get("/api/v1/workouts/admin/all", &alice).await;
    assert_eq!(r.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_sees_everything_only_through_admin_routes() {
    let app = TestApp::new().await;
    let (alice, _) = app.signup("alice@example.com").await;
    let (bob, _) = app.signup("bob@example.com").await;
    let admin = app.admin("admin@example.com").await;

    let alices = app.exercise(&alice, "Squat").await;
    app.exercise(&bob, "Curl").await;
    let w = app
        .post("/api/v1/workouts", &bob, json!({ "date": "2024-02-01" }))
        .await;
    let bobs_workout = w.body["id"].as_str().unwrap().to_string();

    let r = app.get("/api/v1/exercises/admin/all", &admin).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["total"], 2);

    let r = app.get(&format!("/api/v1/exercises/admin/{alices}"), &admin).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["name"], "Squat");

    let r = app.get("/api/v1/workouts/admin/all", &admin).await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["total"], 1);

    let r = app.get(&format!("/api/v1/workouts/admin/{bobs_workout}"), &admin).await;
    assert_eq!(r.status, StatusCode::OK);

    // User routes stay owner-scoped for admins too.
    let r = app.get(&format!("/api/v1/exercises/{alices}"), &admin).await;
    assert_eq!(r.status, StatusCode::NOT_FOUND);
    let r = app.get("/api/v1/exercises", &admin).await;
    assert_eq!(r.body["total"], 0);
}
