mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::TestApp;

fn dates(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|t| t["trainingDate"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_training_types_are_public() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/api/trainings/types", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["trainingTypeName"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["AEROBIC", "STRENGTH", "YOGA", "STRETCHING", "RESISTANCE", "ZUMBA"]
    );
}

#[tokio::test]
async fn test_create_training_links_trainer() {
    let app = TestApp::new();
    let jane = app.register_trainee("Jane", "Roe").await;
    app.register_trainer("Joe", "Johnson", "STRENGTH").await;

    app.add_training(&jane, "Joe.Johnson", "STRENGTH", "2024-05-01", 60)
        .await;

    let profile = app.get("/api/trainees/Jane.Roe", &jane).await;
    assert_eq!(profile.body["trainers"][0]["username"], "Joe.Johnson");

    let all = app.get("/api/trainings", &jane).await;
    assert_eq!(all.status, StatusCode::OK);
    let training = &all.body[0];
    assert_eq!(training["traineeUsername"], "Jane.Roe");
    assert_eq!(training["trainerUsername"], "Joe.Johnson");
    assert_eq!(training["trainingName"], "STRENGTH");
    assert_eq!(training["trainingType"], "STRENGTH");
    assert_eq!(training["trainingDuration"], 60);

    let id = training["id"].as_str().unwrap();
    let by_id = app.get(&format!("/api/trainings/{id}"), &jane).await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(&by_id.body, training);
}

#[tokio::test]
async fn test_create_training_requires_participant() {
    let app = TestApp::new();
    app.register_trainee("Jane", "Roe").await;
    app.register_trainer("Joe", "Johnson", "STRENGTH").await;
    let outsider = app.register_trainee("John", "Smith").await;

    let response = app
        .request(
            Method::POST,
            "/api/trainings",
            Some(&outsider),
            Some(json!({
                "traineeUsername": "Jane.Roe",
                "trainerUsername": "Joe.Johnson",
                "trainingTypeName": "STRENGTH",
                "trainingDate": "2024-05-01",
                "trainingDuration": 60
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let invalid = app
        .request(
            Method::POST,
            "/api/trainings",
            Some(&outsider),
            Some(json!({
                "traineeUsername": "John.Smith",
                "trainerUsername": "Joe.Johnson",
                "trainingTypeName": "STRENGTH",
                "trainingDate": "2024-05-01",
                "trainingDuration": 0
            })),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trainee_trainings_filters() {
    let app = TestApp::new();
    let jane = app.register_trainee("Jane", "Roe").await;
    app.register_trainer("Joe", "Johnson", "STRENGTH").await;
    app.register_trainer("Ann", "Lee", "YOGA").await;

    app.add_training(&jane, "Joe.Johnson", "STRENGTH", "2024-05-10", 60).await;
    app.add_training(&jane, "Ann.Lee", "YOGA", "2024-05-01", 45).await;
    app.add_training(&jane, "Joe.Johnson", "AEROBIC", "2024-06-01", 30).await;

    let all = app.get("/api/trainings/trainee/Jane.Roe", &jane).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(dates(&all.body), vec!["2024-05-01", "2024-05-10", "2024-06-01"]);

    let in_may = app
        .get(
            "/api/trainings/trainee/Jane.Roe?periodFrom=2024-05-01&periodTo=2024-05-10",
            &jane,
        )
        .await;
    assert_eq!(dates(&in_may.body), vec!["2024-05-01", "2024-05-10"]);

    let with_joe = app
        .get("/api/trainings/trainee/Jane.Roe?trainerName=Joe.Johnson", &jane)
        .await;
    assert_eq!(dates(&with_joe.body), vec!["2024-05-10", "2024-06-01"]);

    let aerobic = app
        .get(
            "/api/trainings/trainee/Jane.Roe?trainerName=Joe.Johnson&trainingType=AEROBIC",
            &jane,
        )
        .await;
    assert_eq!(dates(&aerobic.body), vec!["2024-06-01"]);

    let bad_date = app
        .get("/api/trainings/trainee/Jane.Roe?periodFrom=yesterday", &jane)
        .await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);

    let unknown = app.get("/api/trainings/trainee/Nobody.Here", &jane).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trainer_trainings_filters() {
    let app = TestApp::new();
    let jane = app.register_trainee("Jane", "Roe").await;
    let john = app.register_trainee("John", "Smith").await;
    let joe = app.register_trainer("Joe", "Johnson", "STRENGTH").await;

    app.add_training(&jane, "Joe.Johnson", "STRENGTH", "2024-05-10", 60).await;
    app.add_training(&john, "Joe.Johnson", "STRENGTH", "2024-05-12", 60).await;

    let all = app.get("/api/trainings/trainer/Joe.Johnson", &joe).await;
    assert_eq!(dates(&all.body), vec!["2024-05-10", "2024-05-12"]);

    let janes = app
        .get("/api/trainings/trainer/Joe.Johnson?traineeName=Jane.Roe", &joe)
        .await;
    assert_eq!(dates(&janes.body), vec!["2024-05-10"]);

    let later = app
        .get("/api/trainings/trainer/Joe.Johnson?periodFrom=2024-05-11", &joe)
        .await;
    assert_eq!(dates(&later.body), vec!["2024-05-12"]);
}

#[tokio::test]
async fn test_update_and_delete_training() {
    let app = TestApp::new();
    let jane = app.register_trainee("Jane", "Roe").await;
    let joe = app.register_trainer("Joe", "Johnson", "STRENGTH").await;
    let outsider = app.register_trainee("John", "Smith").await;
    app.add_training(&jane, "Joe.Johnson", "STRENGTH", "2024-05-10", 60).await;

    let all = app.get("/api/trainings", &jane).await;
    let id = all.body[0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/trainings/{id}");

    let forbidden = app
        .request(
            Method::PUT,
            &uri,
            Some(&outsider),
            Some(json!({ "trainingDuration": 90 })),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let updated = app
        .request(
            Method::PUT,
            &uri,
            Some(&joe),
            Some(json!({ "trainingDate": "2024-05-11", "trainingDuration": 90 })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["trainingDate"], "2024-05-11");
    assert_eq!(updated.body["trainingDuration"], 90);

    let deleted = app.request(Method::DELETE, &uri, Some(&jane), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!(true));

    let gone = app.get(&uri, &jane).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    // The only training between the pair is gone, so is the link
    let profile = app.get("/api/trainees/Jane.Roe", &jane).await;
    assert_eq!(profile.body["trainers"], json!([]));
}

#[tokio::test]
async fn test_invalid_training_id_is_bad_request() {
    let app = TestApp::new();
    let jane = app.register_trainee("Jane", "Roe").await;

    let response = app.get("/api/trainings/not-a-uuid", &jane).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_trainee_removes_trainings() {
    let app = TestApp::new();
    let jane = app.register_trainee("Jane", "Roe").await;
    let joe = app.register_trainer("Joe", "Johnson", "STRENGTH").await;
    app.add_training(&jane, "Joe.Johnson", "STRENGTH", "2024-05-10", 60).await;

    let deleted = app
        .request(Method::DELETE, "/api/trainees/Jane.Roe", Some(&jane), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let trainings = app.get("/api/trainings/trainer/Joe.Johnson", &joe).await;
    assert_eq!(trainings.body, json!([]));

    let profile = app.get("/api/trainers/Joe.Johnson", &joe).await;
    assert_eq!(profile.body["trainees"], json!([]));
}
