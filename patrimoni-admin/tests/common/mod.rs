//! In-process mock of the Patrimoni backend
//!
//! Serves wire-format records (snake_case aliases mixed with canonical
//! keys) on 127.0.0.1 with an OS-assigned port, and records what the
//! client sent so tests can assert on it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use serde_json::{json, Value};

use patrimoni_admin::ApiClient;
use patrimoni_common::config::ClientConfig;

pub const VALID_TOKEN: &str = "tok-123";
pub const PASSWORD: &str = "mirèio1859";
pub const THROTTLED_USER: &str = "throttled";
pub const FAILING_ID: i64 = 99;

/// One received multipart file
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub path: String,
    pub field: String,
    pub file_name: Option<String>,
    pub size: usize,
}

#[derive(Default)]
pub struct MockState {
    pub me_calls: AtomicUsize,
    pub me_delay_ms: AtomicU64,
    /// When non-zero, the next `/auth/me` waits this long and then fails
    pub me_fail_next_after_ms: AtomicU64,
    pub login_calls: AtomicUsize,
    pub articles: Mutex<Vec<Value>>,
    pub cartes: Mutex<Vec<Value>>,
    pub uploads: Mutex<Vec<Upload>>,
    pub last_body: Mutex<Option<Value>>,
    pub last_query: Mutex<HashMap<String, String>>,
    pub last_public_auth: Mutex<Option<String>>,
}

impl MockState {
    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> HashMap<String, String> {
        self.last_query.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Start the server with `article_count` articles and one carte
    pub async fn start(article_count: i64) -> Self {
        let state = Arc::new(MockState::default());
        *state.articles.lock().unwrap() = (1..=article_count).map(wire_article).collect();
        state.cartes.lock().unwrap().push(json!({
            "id": 1,
            "titre": "Plan de 1750",
            "iframe_url": "http://localhost:3000/carte/1",
            "legende": "Cadastre",
            "image_stored": false
        }));

        let app = Router::new()
            .route("/auth/me", get(me))
            .route("/auth/login", post(login))
            .route("/articles", get(list_articles))
            .route(
                "/articles/:id",
                get(get_article).put(update_article).delete(delete_article),
            )
            .route(
                "/articles/:id/image",
                post(upload_article_image).delete(delete_article_image),
            )
            .route("/cartes", get(list_cartes).post(create_carte))
            .route("/cartes/:id/image", put(upload_carte_image))
            .route("/histoires/menu", get(menu))
            .route("/dictionnaire", get(dictionary))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(ClientConfig::with_api_base(&self.base_url).unwrap()).unwrap()
    }
}

/// An article as an older endpoint would send it
pub fn wire_article(id: i64) -> Value {
    json!({
        "id": id,
        "title": format!("Article {id}"),
        "description": "Texte",
        "image_url": format!("https://cdn.example.org/{id}.jpg"),
        "source_url": null,
        "date_ajout": "2024-03-01",
        "image_stored": false
    })
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn authorized(headers: &HeaderMap) -> bool {
    bearer(headers).as_deref() == Some(VALID_TOKEN)
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.me_calls.fetch_add(1, Ordering::SeqCst);
    let fail_after = state.me_fail_next_after_ms.swap(0, Ordering::SeqCst);
    if fail_after > 0 {
        tokio::time::sleep(Duration::from_millis(fail_after)).await;
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Erreur interne");
    }
    let delay = state.me_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    Json(json!({"id": 1, "username": "frederic", "is_admin": true})).into_response()
}

async fn login(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    let username = form.get("username").map(String::as_str).unwrap_or("");
    let password = form.get("password").map(String::as_str).unwrap_or("");
    if username == THROTTLED_USER {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "15")],
            Json(json!({"detail": "Trop de tentatives de connexion."})),
        )
            .into_response();
    }
    if password != PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Identifiants invalides");
    }
    Json(json!({"access_token": VALID_TOKEN, "token_type": "bearer"})).into_response()
}

async fn list_articles(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    *state.last_public_auth.lock().unwrap() = bearer(&headers);
    *state.last_query.lock().unwrap() = query.clone();
    let skip: usize = query.get("skip").and_then(|s| s.parse().ok()).unwrap_or(0);
    let limit: usize = query
        .get("limit")
        .and_then(|s| s.parse().ok())
        .unwrap_or(usize::MAX);
    let articles = state.articles.lock().unwrap();
    let page: Vec<Value> = articles.iter().skip(skip).take(limit).cloned().collect();
    Json(Value::Array(page)).into_response()
}

fn find_article(state: &MockState, id: i64) -> Option<Value> {
    state
        .articles
        .lock()
        .unwrap()
        .iter()
        .find(|a| a["id"] == json!(id))
        .cloned()
}

fn set_article_field(state: &MockState, id: i64, key: &str, value: Value) -> Option<Value> {
    let mut articles = state.articles.lock().unwrap();
    let article = articles.iter_mut().find(|a| a["id"] == json!(id))?;
    article[key] = value;
    Some(article.clone())
}

async fn get_article(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    match find_article(&state, id) {
        Some(article) => Json(article).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Article introuvable"),
    }
}

async fn update_article(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    *state.last_body.lock().unwrap() = Some(body.clone());
    let Some(mut article) = find_article(&state, id) else {
        return detail(StatusCode::NOT_FOUND, "Article introuvable");
    };
    if let (Some(target), Some(changes)) = (article.as_object_mut(), body.as_object()) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(article).into_response()
}

async fn delete_article(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    if id == FAILING_ID {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "");
    }
    state
        .articles
        .lock()
        .unwrap()
        .retain(|a| a["id"] != json!(id));
    StatusCode::NO_CONTENT.into_response()
}

async fn record_upload(path: String, state: &MockState, mut multipart: Multipart) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        state.uploads.lock().unwrap().push(Upload {
            path: path.clone(),
            field: name,
            file_name,
            size,
        });
    }
}

async fn upload_article_image(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    record_upload(format!("/articles/{id}/image"), &state, multipart).await;
    match set_article_field(&state, id, "image_stored", json!(true)) {
        Some(article) => Json(article).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Article introuvable"),
    }
}

async fn delete_article_image(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    match set_article_field(&state, id, "image_stored", json!(false)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => detail(StatusCode::NOT_FOUND, "Article introuvable"),
    }
}

async fn list_cartes(State(state): State<Arc<MockState>>) -> Response {
    Json(Value::Array(state.cartes.lock().unwrap().clone())).into_response()
}

async fn create_carte(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    *state.last_body.lock().unwrap() = Some(body.clone());
    let mut carte = body;
    carte["id"] = json!(2);
    carte["image_stored"] = json!(false);
    state.cartes.lock().unwrap().push(carte.clone());
    (StatusCode::CREATED, Json(carte)).into_response()
}

async fn upload_carte_image(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    record_upload(format!("/cartes/{id}/image"), &state, multipart).await;
    Json(json!({
        "id": id,
        "titre": "Plan de 1750",
        "iframeUrl": null,
        "legende": "Cadastre",
        "imageStored": true
    }))
    .into_response()
}

async fn menu() -> Response {
    Json(json!({
        "Légende": {
            "Moyen Âge": [
                {"id": 4, "titre": "La Tarasque", "description_courte": "Le monstre du Rhône"}
            ]
        },
        "Histoire": {}
    }))
    .into_response()
}

async fn dictionary(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    *state.last_query.lock().unwrap() = query;
    Json(json!({
        "items": [
            {"id": 7, "theme": "Nature", "categorie": "Animaux",
             "mots_francais": "cigale", "mots_provencal": "cigalo"}
        ],
        "total": 12,
        "pages": 2,
        "page": 1,
        "limit": 10
    }))
    .into_response()
}
