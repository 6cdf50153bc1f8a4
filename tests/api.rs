use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use diettrack_api::config::Config;
use diettrack_api::db::{MemoryStore, Store};
use diettrack_api::models::day::today;
use diettrack_api::models::food::{Food, FoodCategory, NewFood};
use diettrack_api::services::analyzer::RandomChoiceAnalyzer;
use diettrack_api::storage::UploadStore;
use diettrack_api::{build_router, AppState};

struct TestApp {
    router: Router,
    store: Arc<dyn Store>,
}

fn test_config(upload_dir: PathBuf) -> Config {
    Config {
        database_url: String::new(),
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3000".into(),
        extra_origins: Vec::new(),
        db_max_connections: 1,
        jwt_secret: "integration-secret".into(),
        jwt_ttl_secs: 3600,
        upload_dir,
        seed_default_foods: false,
    }
}

async fn spawn_app() -> TestApp {
    let dir = std::env::temp_dir().join(format!("diettrack-test-{}", Uuid::new_v4()));
    let config = test_config(dir.clone());
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config),
        uploads: Arc::new(UploadStore::open(dir).await.unwrap()),
        analyzer: Arc::new(RandomChoiceAnalyzer::default()),
    };
    TestApp {
        router: build_router(state),
        store,
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "name": "Test User", "email": email, "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn default_food(&self) -> Food {
        self.store
            .insert_food(NewFood {
                name: "Test Oats".into(),
                category: FoodCategory::Breakfast,
                calories: 100.0,
                protein: 10.0,
                carbs: 20.0,
                fats: 2.0,
                fiber: 1.0,
                owner: None,
            })
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;
    let (status, body) = app.call("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");

    let (status, _) = app.call("GET", "/readyz", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_then_login() {
    let app = spawn_app().await;
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ana", "email": "Ana@Example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "ana@example.com");
    assert!(body["_id"].is_string());
    assert!(body.get("profilePhoto").is_none());

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profilePhoto"], "");
    let token = body["token"].as_str().unwrap();

    let (status, me) = app.call("GET", "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Ana");
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_and_bad_login() {
    let app = spawn_app().await;
    app.register("dup@example.com").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Again", "email": "dup@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
    assert_eq!(body["error"]["message"], "User already exists");

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "dup@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
    assert_eq!(body["error"]["code"], 401);

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_google_login_links_existing_account() {
    let app = spawn_app().await;
    app.register("g@example.com").await;
    let (status, body) = app
        .call(
            "POST",
            "/api/auth/google",
            None,
            Some(json!({ "email": "g@example.com", "name": "G", "googleId": "google-42" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Test User");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_protected_routes_need_token() {
    let app = spawn_app().await;
    let (status, body) = app.call("GET", "/api/habits", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 401);

    let (status, _) = app.call("GET", "/api/habits", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_diet_entry_scales_portion() {
    let app = spawn_app().await;
    let token = app.register("eater@example.com").await;
    let food = app.default_food().await;

    let (status, entry) = app
        .call(
            "POST",
            "/api/diet/entries",
            Some(&token),
            Some(json!({
                "foodId": food.id,
                "date": today().to_string(),
                "category": "breakfast",
                "quantity": 250
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", entry);
    assert_eq!(entry["calories"], 250);
    assert_eq!(entry["protein"], 25.0);
    assert_eq!(entry["foodName"], "Test Oats");
    assert_eq!(entry["unit"], "grams");
    assert_eq!(entry["completed"], false);

    let id = entry["_id"].as_str().unwrap();
    let (status, updated) = app
        .call(
            "PUT",
            &format!("/api/diet/entries/{}", id),
            Some(&token),
            Some(json!({ "quantity": 50, "completed": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["calories"], 50);
    assert_eq!(updated["completed"], true);

    let (_, daily) = app.call("GET", "/api/analytics/daily", Some(&token), None).await;
    assert_eq!(daily["consumed"]["calories"], 50);
    assert_eq!(daily["remaining"]["calories"], 1950);

    let (status, body) = app
        .call("DELETE", &format!("/api/diet/entries/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Entry removed");
}

#[tokio::test]
async fn test_malformed_ids_get_json_errors() {
    let app = spawn_app().await;
    let token = app.register("typo@example.com").await;

    for (method, uri, body) in [
        ("PUT", "/api/diet/entries/not-an-id", Some(json!({ "completed": true }))),
        ("PATCH", "/api/diet/entries/not-an-id/toggle", None),
        ("GET", "/api/habits/not-an-id/streak", None),
        ("PATCH", "/api/habits/not-an-id/entries/2026-01-01/toggle", None),
        ("PUT", "/api/water/not-an-id", Some(json!({ "glasses": 1 }))),
    ] {
        let (status, resp) = app.call(method, uri, Some(&token), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert!(resp["message"].is_string(), "{} {}: {}", method, uri, resp);
        assert_eq!(resp["error"]["code"], 400);
    }
}

#[tokio::test]
async fn test_entry_for_unknown_food_is_not_found() {
    let app = spawn_app().await;
    let token = app.register("lost@example.com").await;
    let (status, body) = app
        .call(
            "POST",
            "/api/diet/entries",
            Some(&token),
            Some(json!({
                "foodId": Uuid::new_v4(),
                "date": "2026-01-05",
                "category": "lunch",
                "quantity": 100
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Food not found");
}

#[tokio::test]
async fn test_users_cannot_touch_each_others_records() {
    let app = spawn_app().await;
    let alice = app.register("alice@example.com").await;
    let bob = app.register("bob@example.com").await;
    let food = app.default_food().await;

    let (_, entry) = app
        .call(
            "POST",
            "/api/diet/entries",
            Some(&alice),
            Some(json!({ "foodId": food.id, "date": "2026-01-05", "category": "dinner", "quantity": 100 })),
        )
        .await;
    let entry_id = entry["_id"].as_str().unwrap();

    let (_, habit) = app
        .call("POST", "/api/habits", Some(&alice), Some(json!({ "name": "Stretch" })))
        .await;
    let habit_id = habit["_id"].as_str().unwrap();

    let (_, water) = app
        .call("POST", "/api/water", Some(&alice), Some(json!({ "glasses": 2 })))
        .await;
    let water_id = water["_id"].as_str().unwrap();

    let attempts = [
        ("PATCH", format!("/api/diet/entries/{}/toggle", entry_id), None),
        ("DELETE", format!("/api/diet/entries/{}", entry_id), None),
        ("GET", format!("/api/habits/{}/streak", habit_id), None),
        ("PATCH", format!("/api/habits/{}/entries/2026-01-05/toggle", habit_id), None),
        ("DELETE", format!("/api/habits/{}", habit_id), None),
        ("PUT", format!("/api/water/{}", water_id), Some(json!({ "glasses": 0 }))),
    ];
    for (method, uri, body) in attempts {
        let (status, _) = app.call(method, &uri, Some(&bob), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
    }

    let (_, entries) = app.call("GET", "/api/diet/entries", Some(&bob), None).await;
    assert_eq!(entries.as_array().unwrap().len(), 0);
    let (_, entries) = app.call("GET", "/api/diet/entries", Some(&alice), None).await;
    assert_eq!(entries.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_habit_toggle_and_streak() {
    let app = spawn_app().await;
    let token = app.register("habits@example.com").await;
    let (status, habit) = app
        .call("POST", "/api/habits", Some(&token), Some(json!({ "name": "Walk" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(habit["icon"], "✓");
    assert_eq!(habit["color"], "#3b82f6");
    let id = habit["_id"].as_str().unwrap();

    let days = [today(), today() - Duration::days(1), today() - Duration::days(2)];
    for day in days {
        let (status, entry) = app
            .call(
                "PATCH",
                &format!("/api/habits/{}/entries/{}/toggle", id, day),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entry["completed"], true);
    }

    let (_, streak) = app
        .call("GET", &format!("/api/habits/{}/streak", id), Some(&token), None)
        .await;
    assert_eq!(streak, json!({ "currentStreak": 3, "bestStreak": 3 }));

    // Un-toggling yesterday splits the run.
    let yesterday = today() - Duration::days(1);
    app.call(
        "PATCH",
        &format!("/api/habits/{}/entries/{}/toggle", id, yesterday),
        Some(&token),
        None,
    )
    .await;
    let (_, streak) = app
        .call("GET", &format!("/api/habits/{}/streak", id), Some(&token), None)
        .await;
    assert_eq!(streak, json!({ "currentStreak": 1, "bestStreak": 1 }));

    let (_, entries) = app
        .call("GET", &format!("/api/habits/{}/entries", id), Some(&token), None)
        .await;
    assert_eq!(entries.as_array().unwrap().len(), 3);

    let (_, body) = app
        .call("DELETE", &format!("/api/habits/{}", id), Some(&token), None)
        .await;
    assert_eq!(body["message"], "Habit deleted");
    let (_, list) = app.call("GET", "/api/habits", Some(&token), None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_water_logging() {
    let app = spawn_app().await;
    let token = app.register("water@example.com").await;

    let (_, empty) = app.call("GET", "/api/water/today", Some(&token), None).await;
    assert_eq!(empty["glasses"], 0);
    assert_eq!(empty["target"], 8);

    app.call("POST", "/api/water", Some(&token), Some(json!({}))).await;
    let (_, log) = app
        .call("POST", "/api/water", Some(&token), Some(json!({ "glasses": 2 })))
        .await;
    assert_eq!(log["glasses"], 3);

    let (_, log) = app
        .call("POST", "/api/water", Some(&token), Some(json!({ "glasses": -1 })))
        .await;
    assert_eq!(log["glasses"], 2);

    let (status, _) = app
        .call("POST", "/api/water", Some(&token), Some(json!({ "glasses": -5 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = log["_id"].as_str().unwrap();
    let (status, _) = app
        .call("PUT", &format!("/api/water/{}", id), Some(&token), Some(json!({ "glasses": -1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, history) = app.call("GET", "/api/water/history", Some(&token), None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_water_increment_overflow_is_bad_request() {
    let app = spawn_app().await;
    let token = app.register("flood@example.com").await;

    let (status, log) = app
        .call("POST", "/api/water", Some(&token), Some(json!({ "glasses": i32::MAX })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["glasses"], i32::MAX);

    let (status, body) = app
        .call("POST", "/api/water", Some(&token), Some(json!({ "glasses": 1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Glasses out of range");

    let (_, today_log) = app.call("GET", "/api/water/today", Some(&token), None).await;
    assert_eq!(today_log["glasses"], i32::MAX);
}

#[tokio::test]
async fn test_analytics_with_no_entries() {
    let app = spawn_app().await;
    let token = app.register("empty@example.com").await;

    let (_, weekly) = app.call("GET", "/api/analytics/weekly", Some(&token), None).await;
    let weekly = weekly.as_object().unwrap();
    assert_eq!(weekly.len(), 7);
    assert!(weekly.contains_key(&today().to_string()));

    let (_, macros) = app.call("GET", "/api/analytics/macros", Some(&token), None).await;
    assert_eq!(macros["percentages"], json!({ "protein": 0, "carbs": 0, "fats": 0 }));

    let (_, monthly) = app.call("GET", "/api/analytics/monthly", Some(&token), None).await;
    assert_eq!(monthly["days"], 30);
    assert_eq!(monthly["average"]["calories"], 0);
}

#[tokio::test]
async fn test_summaries_skip_incomplete_entries() {
    let app = spawn_app().await;
    let token = app.register("pending@example.com").await;
    let food = app.default_food().await;

    let (status, entry) = app
        .call(
            "POST",
            "/api/diet/entries",
            Some(&token),
            Some(json!({
                "foodId": food.id,
                "date": today().to_string(),
                "category": "lunch",
                "quantity": 100
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", entry);
    assert_eq!(entry["completed"], false);
    let day = today().to_string();

    let (_, daily) = app.call("GET", "/api/analytics/daily", Some(&token), None).await;
    assert_eq!(daily["consumed"]["calories"], 0);
    assert_eq!(daily["remaining"]["calories"], 2000);
    let (_, weekly) = app.call("GET", "/api/analytics/weekly", Some(&token), None).await;
    assert_eq!(weekly[&day]["calories"], 0);
    let (_, monthly) = app.call("GET", "/api/analytics/monthly", Some(&token), None).await;
    assert_eq!(monthly["total"]["calories"], 0);
    let (_, macros) = app.call("GET", "/api/analytics/macros", Some(&token), None).await;
    assert_eq!(macros["grams"]["protein"], 0.0);
    assert_eq!(macros["percentages"]["protein"], 0);

    let id = entry["_id"].as_str().unwrap();
    let (status, toggled) = app
        .call("PATCH", &format!("/api/diet/entries/{}/toggle", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["completed"], true);

    let (_, daily) = app.call("GET", "/api/analytics/daily", Some(&token), None).await;
    assert_eq!(daily["consumed"]["calories"], 100);
    assert_eq!(daily["remaining"]["calories"], 1900);
    let (_, weekly) = app.call("GET", "/api/analytics/weekly", Some(&token), None).await;
    assert_eq!(weekly[&day]["calories"], 100);
    let (_, monthly) = app.call("GET", "/api/analytics/monthly", Some(&token), None).await;
    assert_eq!(monthly["total"]["calories"], 100);
    let (_, macros) = app.call("GET", "/api/analytics/macros", Some(&token), None).await;
    assert_eq!(macros["grams"]["protein"], 10.0);
    assert!(macros["percentages"]["protein"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_pdf_export_headers() {
    let app = spawn_app().await;
    let token = app.register("pdf@example.com").await;
    let req = Request::builder()
        .uri("/api/analytics/export-pdf")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=diet-report.pdf"
    );
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_profile_update_recomputes_targets() {
    let app = spawn_app().await;
    let token = app.register("profile@example.com").await;
    let (status, user) = app
        .call(
            "PUT",
            "/api/users/profile",
            Some(&token),
            Some(json!({
                "age": "30", "height": 180, "weight": 80,
                "gender": "male", "activityLevel": "moderate", "goal": "maintenance"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", user);
    assert_eq!(user["calorieTarget"], 2759);
    assert_eq!(user["proteinTarget"], 207);

    let (_, preview) = app
        .call(
            "POST",
            "/api/users/profile/preview-targets",
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(preview["calorieTarget"], 2759);
    assert_eq!(preview["proteinTarget"], 160);

    let (status, _) = app
        .call("PUT", "/api/users/profile", Some(&token), Some(json!({ "age": 500 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, user) = app
        .call("PUT", "/api/users/settings", Some(&token), Some(json!({ "waterTarget": 10 })))
        .await;
    assert_eq!(user["waterTarget"], 10);
    assert_eq!(user["calorieTarget"], 2759);
}

#[tokio::test]
async fn test_analyze_image_returns_detection() {
    let app = spawn_app().await;
    let token = app.register("camera@example.com").await;
    let boundary = "XBOUNDARYX";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"plate.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let req = Request::builder()
        .method("POST")
        .uri("/api/foods/analyze-image")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, json) = app.send(req).await;
    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["success"], true);
    assert_eq!(json["detected"]["quantity"], 100.0);
    assert_eq!(json["detected"]["unit"], "grams");
    assert_eq!(json["message"], "Food detected successfully (Mock AI)");
    assert!(json["imageUrl"].as_str().unwrap().starts_with("/uploads/food-"));
}

#[tokio::test]
async fn test_food_search() {
    let app = spawn_app().await;
    let token = app.register("search@example.com").await;
    app.default_food().await;

    let (_, empty) = app.call("GET", "/api/foods/search?q=", Some(&token), None).await;
    assert_eq!(empty, json!([]));

    let (status, custom) = app
        .call(
            "POST",
            "/api/foods",
            Some(&token),
            Some(json!({ "name": "Oat Bar", "calories": 400, "protein": 8, "carbs": 60, "fats": 12 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(custom["isCustom"], true);

    let (_, hits) = app.call("GET", "/api/foods/search?q=OAT", Some(&token), None).await;
    assert_eq!(hits.as_array().unwrap().len(), 2);

    let other = app.register("other@example.com").await;
    let (_, hits) = app.call("GET", "/api/foods?search=oat", Some(&other), None).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
}
