use std::sync::Arc;

use serde_json::{Value, json};
use tokio::task::JoinHandle;

use clinic_auth::{AuthConfig, AuthState, JwtService};
use clinic_server::{AppState, build_app};
use clinic_storage::{InMemoryAccountStore, InMemoryPatientStore};

fn test_state() -> AppState {
    let jwt = JwtService::new(&AuthConfig {
        secret: "integration-test-secret".into(),
        ..AuthConfig::default()
    })
    .expect("jwt service");

    AppState {
        accounts: Arc::new(InMemoryAccountStore::new()),
        patients: Arc::new(InMemoryPatientStore::new()),
        auth: AuthState::new(Arc::new(jwt)),
    }
}

async fn start_server() -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(test_state());

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

/// Registers a user and logs in; returns (user id, raw token).
async fn register_and_login(
    client: &reqwest::Client,
    base: &str,
    name: &str,
    email: &str,
    role: &str,
) -> (String, String) {
    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({
            "name": name,
            "email": email,
            "password": "hunter2",
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{base}/login"))
        .json(&json!({ "email": email, "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["role"], role);
    let token = body["token"].as_str().unwrap().to_string();
    // Raw token, no transport prefix baked in.
    assert!(!token.starts_with("Bearer "));

    (user_id, token)
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn register_hides_password_and_login_errors_are_uniform() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({
            "name": "Rita",
            "email": "rita@clinic.test",
            "password": "hunter2",
            "role": "receptionist",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let text = resp.text().await.unwrap();
    assert!(!text.contains("hunter2"));
    assert!(!text.contains("password"));

    // Duplicate email surfaces as a 500 with the adapter's error text.
    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({
            "name": "Rita Again",
            "email": "rita@clinic.test",
            "password": "hunter2",
            "role": "receptionist",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    // Unknown role is rejected before storage.
    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({
            "name": "Eve",
            "email": "eve@clinic.test",
            "password": "x",
            "role": "admin",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Wrong password and unknown email must be byte-identical.
    let resp = client
        .post(format!("{base}/login"))
        .json(&json!({ "email": "rita@clinic.test", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let wrong_password = resp.text().await.unwrap();

    let resp = client
        .post(format!("{base}/login"))
        .json(&json!({ "email": "nobody@clinic.test", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let unknown_email = resp.text().await.unwrap();

    assert_eq!(wrong_password, unknown_email);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn token_and_role_gates_reject_bad_requests() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let (_, receptionist_token) = register_and_login(
        &client,
        &base,
        "Rita",
        "rita@clinic.test",
        "receptionist",
    )
    .await;

    // Missing header
    let resp = client
        .get(format!("{base}/api/receptionist/patients"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Malformed headers
    for value in ["Bearer", "Token abc", "Bearer a b", "bearer lowercase"] {
        let resp = client
            .get(format!("{base}/api/receptionist/patients"))
            .header("Authorization", value)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401, "header {value:?} should be rejected");
    }

    // Garbage token
    let resp = client
        .get(format!("{base}/api/receptionist/patients"))
        .header("Authorization", "Bearer not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Valid token, wrong role
    let resp = client
        .get(format!("{base}/api/doctor/patients"))
        .header("Authorization", bearer(&receptionist_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("permissions"));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn receptionist_patient_lifecycle() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let (receptionist_id, token) = register_and_login(
        &client,
        &base,
        "Rita",
        "rita@clinic.test",
        "receptionist",
    )
    .await;
    let auth = bearer(&token);
    let patients_url = format!("{base}/api/receptionist/patients");

    // Validation failures never reach storage.
    let bad_bodies = [
        json!({ "age": 30, "gender": "F" }),
        json!({ "name": "Jane", "age": 0, "gender": "F" }),
        json!({ "name": "Jane", "age": -3, "gender": "F" }),
        json!({ "name": "Jane", "age": 30 }),
        json!({ "name": "Jane", "age": 30, "gender": "F", "diagnosis": "flu" }),
        json!({ "name": "Jane", "age": 30, "gender": "F", "diagnosis": "" }),
        json!({ "name": "Jane", "age": 30, "gender": "F", "diagnosis": null }),
    ];
    for body in &bad_bodies {
        let resp = client
            .post(&patients_url)
            .header("Authorization", &auth)
            .json(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "body {body} should be rejected");
    }
    let resp = client
        .get(&patients_url)
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    let listed: Vec<Value> = resp.json().await.unwrap();
    assert!(listed.is_empty(), "no write should have happened");

    // Create
    let resp = client
        .post(&patients_url)
        .header("Authorization", &auth)
        .json(&json!({ "name": "Jane", "age": 30, "gender": "F" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let jane: Value = resp.json().await.unwrap();
    let jane_id = jane["id"].as_str().unwrap().to_string();
    assert!(jane["diagnosis"].is_null());
    assert_eq!(jane["created_by"], receptionist_id.as_str());

    // Second record for pagination
    let resp = client
        .post(&patients_url)
        .header("Authorization", &auth)
        .json(&json!({ "name": "Adam", "age": 41, "gender": "M" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // page=2, limit=1 over a 2-row set sorted by name returns the second name.
    let resp = client
        .get(format!("{patients_url}?page=2&limit=1"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    let page: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["name"], "Jane");

    // Case-insensitive name filter
    let resp = client
        .get(format!("{patients_url}?name=jAnE"))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    let filtered: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["name"], "Jane");

    // Update requires every demographic field
    let patient_url = format!("{patients_url}/{jane_id}");
    let incomplete = [
        json!({ "age": 31, "gender": "F" }),
        json!({ "name": "Jane D", "gender": "F" }),
        json!({ "name": "Jane D", "age": 31 }),
    ];
    for body in &incomplete {
        let resp = client
            .put(&patient_url)
            .header("Authorization", &auth)
            .json(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "body {body} should be rejected");
    }

    // Diagnosis key presence is rejected even alongside valid fields,
    // and even as an explicit null.
    for diagnosis in [json!("flu"), json!(""), json!(null)] {
        let resp = client
            .put(&patient_url)
            .header("Authorization", &auth)
            .json(&json!({
                "name": "Jane D",
                "age": 31,
                "gender": "F",
                "diagnosis": diagnosis,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    // Valid update
    let resp = client
        .put(&patient_url)
        .header("Authorization", &auth)
        .json(&json!({ "name": "Jane D", "age": 31, "gender": "F" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "Jane D");
    assert_eq!(updated["age"], 31);
    assert!(updated["diagnosis"].is_null());

    // Update of a missing record is a 404
    let resp = client
        .put(format!("{patients_url}/00000000-0000-0000-0000-000000000000"))
        .header("Authorization", &auth)
        .json(&json!({ "name": "X", "age": 1, "gender": "F" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Delete is not silently idempotent: 204 then 404.
    let resp = client
        .delete(&patient_url)
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
    assert!(resp.text().await.unwrap().is_empty());

    let resp = client
        .delete(&patient_url)
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .get(&patient_url)
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn listing_far_past_the_last_page_is_empty() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let (_, token) = register_and_login(
        &client,
        &base,
        "Rita",
        "rita@clinic.test",
        "receptionist",
    )
    .await;
    let auth = bearer(&token);
    let patients_url = format!("{base}/api/receptionist/patients");

    let resp = client
        .post(&patients_url)
        .header("Authorization", &auth)
        .json(&json!({ "name": "Jane", "age": 30, "gender": "F" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Page numbers up to i64::MAX are valid input; the offset must
    // saturate instead of overflowing.
    for query in [
        format!("page={}&limit=20", i64::MAX),
        format!("page={max}&limit={max}", max = i64::MAX),
        "page=2&limit=20".to_string(),
    ] {
        let resp = client
            .get(format!("{patients_url}?{query}"))
            .header("Authorization", &auth)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "query {query:?}");
        let rows: Vec<Value> = resp.json().await.unwrap();
        assert!(rows.is_empty(), "query {query:?} should be past the data");
    }

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn doctor_updates_diagnosis_only() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let (receptionist_id, receptionist_token) = register_and_login(
        &client,
        &base,
        "Rita",
        "rita@clinic.test",
        "receptionist",
    )
    .await;
    let (doctor_id, doctor_token) =
        register_and_login(&client, &base, "Dora", "dora@clinic.test", "doctor").await;
    assert_ne!(receptionist_id, doctor_id);

    // Receptionist creates the record.
    let resp = client
        .post(format!("{base}/api/receptionist/patients"))
        .header("Authorization", bearer(&receptionist_token))
        .json(&json!({ "name": "Jane", "age": 30, "gender": "F" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let jane: Value = resp.json().await.unwrap();
    let jane_id = jane["id"].as_str().unwrap().to_string();
    assert_eq!(jane["created_by"], receptionist_id.as_str());

    let doctor_patient_url = format!("{base}/api/doctor/patients/{jane_id}");

    // Doctors cannot create patients.
    let resp = client
        .post(format!("{base}/api/doctor/patients"))
        .header("Authorization", bearer(&doctor_token))
        .json(&json!({ "name": "Mallory", "age": 50, "gender": "F" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);

    // Empty diagnosis is rejected.
    let resp = client
        .put(&doctor_patient_url)
        .header("Authorization", bearer(&doctor_token))
        .json(&json!({ "diagnosis": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Setting the diagnosis leaves demographics untouched and stamps
    // the doctor as the last writer.
    let resp = client
        .put(&doctor_patient_url)
        .header("Authorization", bearer(&doctor_token))
        .json(&json!({ "diagnosis": "flu" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(&doctor_patient_url)
        .header("Authorization", bearer(&doctor_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let jane: Value = resp.json().await.unwrap();
    assert_eq!(jane["diagnosis"], "flu");
    assert_eq!(jane["name"], "Jane");
    assert_eq!(jane["age"], 30);
    assert_eq!(jane["gender"], "F");
    assert_eq!(jane["created_by"], doctor_id.as_str());

    // Diagnosis update of a missing record is a 404.
    let resp = client
        .put(format!(
            "{base}/api/doctor/patients/00000000-0000-0000-0000-000000000000"
        ))
        .header("Authorization", bearer(&doctor_token))
        .json(&json!({ "diagnosis": "flu" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn csv_export_has_headers_and_record() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let (_, token) = register_and_login(
        &client,
        &base,
        "Rita",
        "rita@clinic.test",
        "receptionist",
    )
    .await;
    let auth = bearer(&token);

    let resp = client
        .post(format!("{base}/api/receptionist/patients"))
        .header("Authorization", &auth)
        .json(&json!({ "name": "Jane", "age": 30, "gender": "F" }))
        .send()
        .await
        .unwrap();
    let jane: Value = resp.json().await.unwrap();
    let jane_id = jane["id"].as_str().unwrap().to_string();

    let resp = client
        .get(format!(
            "{base}/api/receptionist/patients/{jane_id}/export/csv"
        ))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/csv");
    assert_eq!(
        resp.headers()["content-disposition"],
        format!("attachment; filename=\"patient_{jane_id}.csv\"").as_str()
    );

    let body = resp.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "ID,Name,Age,Gender,Diagnosis,Created By");
    assert!(lines[1].starts_with(&jane_id));
    assert!(lines[1].contains("Jane,30,F,,"));

    // Export of a missing record is a 404.
    let resp = client
        .get(format!(
            "{base}/api/receptionist/patients/00000000-0000-0000-0000-000000000000/export/csv"
        ))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
