//! Client wrapper against the mock backend: normalization, payloads,
//! images, pagination and error handling

mod common;

use serde_json::json;

use common::{MockBackend, FAILING_ID, VALID_TOKEN};
use patrimoni_admin::api::DictionaryQuery;
use patrimoni_admin::{ApiError, ListState};
use patrimoni_common::events::{LogoutReason, SessionEvent};
use patrimoni_common::models::{Article, Carte, PendingImage};
use patrimoni_common::pagination::PageCursor;

fn png(size: usize) -> PendingImage {
    PendingImage::new("vue.png", "image/png", vec![7u8; size])
}

#[tokio::test]
async fn test_list_responses_are_normalized() {
    let backend = MockBackend::start(2).await;
    let client = backend.client();

    let articles = client.list::<Article>().await.unwrap();
    assert_eq!(articles.len(), 2);
    let first = &articles[0];
    assert_eq!(first.id, Some(1));
    assert_eq!(first.title, "Article 1");
    assert_eq!(first.image_url, "https://cdn.example.org/1.jpg");
    assert_eq!(first.source_url, "");
    assert_eq!(first.added_on, "2024-03-01");
    assert!(!first.image_stored);
}

#[tokio::test]
async fn test_public_channel_never_sends_token() {
    let backend = MockBackend::start(1).await;
    let client = backend.client();
    client.set_token(Some(VALID_TOKEN.into()));

    client.list::<Article>().await.unwrap();
    assert_eq!(*backend.state.last_public_auth.lock().unwrap(), None);
}

#[tokio::test]
async fn test_update_sends_only_present_keys() {
    let backend = MockBackend::start(1).await;
    let client = backend.client();
    client.set_token(Some(VALID_TOKEN.into()));

    let updated: Article = client
        .update(1, &json!({"title": "Nouveau titre", "unknown": 1}))
        .await
        .unwrap();
    assert_eq!(
        backend.state.last_body(),
        Some(json!({"titre": "Nouveau titre"}))
    );
    assert_eq!(updated.title, "Nouveau titre");
}

#[tokio::test]
async fn test_unauthorized_update_clears_credential_and_rejects() {
    let backend = MockBackend::start(1).await;
    let client = backend.client();
    client.set_token(Some("expired".into()));
    let mut events = client.subscribe();

    let err = client
        .update::<Article, _>(1, &json!({"titre": "X"}))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!client.has_token());
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Logout {
            reason: LogoutReason::TokenInvalidOrExpired
        }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_carte_blank_iframe_sent_as_null() {
    let backend = MockBackend::start(0).await;
    let client = backend.client();
    client.set_token(Some(VALID_TOKEN.into()));

    let draft = Carte {
        title: "Plan".into(),
        iframe_url: Some("   ".into()),
        ..Default::default()
    };
    let created: Carte = client.create(&draft).await.unwrap();
    assert_eq!(
        backend.state.last_body(),
        Some(json!({"titre": "Plan", "iframeUrl": null, "legende": ""}))
    );
    assert_eq!(created.id, Some(2));
    assert_eq!(created.iframe_url, None);
}

#[tokio::test]
async fn test_article_image_upload_uses_file_field() {
    let backend = MockBackend::start(1).await;
    let client = backend.client();
    client.set_token(Some(VALID_TOKEN.into()));

    let article: Article = client.upload_image(1, &png(64)).await.unwrap();
    assert!(article.image_stored);

    let uploads = backend.state.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].path, "/articles/1/image");
    assert_eq!(uploads[0].field, "file");
    assert_eq!(uploads[0].file_name.as_deref(), Some("vue.png"));
    assert_eq!(uploads[0].size, 64);

    assert_eq!(
        client.display_image(&article, 1),
        Some(format!("{}/articles/1/image?v=1", backend.base_url))
    );
}

#[tokio::test]
async fn test_carte_image_upload_uses_put_and_image_field() {
    let backend = MockBackend::start(0).await;
    let client = backend.client();
    client.set_token(Some(VALID_TOKEN.into()));

    let carte: Carte = client.upload_image(1, &png(16)).await.unwrap();
    assert!(carte.image_stored);
    let uploads = backend.state.uploads();
    assert_eq!(uploads[0].path, "/cartes/1/image");
    assert_eq!(uploads[0].field, "image");
}

#[tokio::test]
async fn test_oversized_image_rejected_before_network() {
    let backend = MockBackend::start(1).await;
    let client = backend.client();
    client.set_token(Some(VALID_TOKEN.into()));

    let too_big = png(client.config().max_image_bytes as usize + 1);
    let err = client.upload_image::<Article>(1, &too_big).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(backend.state.uploads().is_empty());
}

#[tokio::test]
async fn test_image_delete_refetches_on_no_content() {
    let backend = MockBackend::start(1).await;
    let client = backend.client();
    client.set_token(Some(VALID_TOKEN.into()));

    client.upload_image::<Article>(1, &png(8)).await.unwrap();
    let article: Article = client.delete_image(1).await.unwrap();
    assert_eq!(article.id, Some(1));
    assert!(!article.image_stored);
}

#[tokio::test]
async fn test_overfetch_detects_next_page() {
    let backend = MockBackend::start(25).await;
    let client = backend.client();

    let mut cursor = PageCursor::new(10);
    let first = client.list_articles_overfetch(&mut cursor).await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert!(first.has_next);
    assert_eq!(cursor.pages(), 2);
    let query = backend.state.last_query();
    assert_eq!(query.get("skip").map(String::as_str), Some("0"));
    assert_eq!(query.get("limit").map(String::as_str), Some("11"));

    cursor.next();
    cursor.next();
    assert_eq!(cursor.page(), 2);
    client.list_articles_overfetch(&mut cursor).await.unwrap();
    assert_eq!(cursor.pages(), 3);
    cursor.next();

    let last = client.list_articles_overfetch(&mut cursor).await.unwrap();
    assert_eq!(last.items.len(), 5);
    assert!(!last.has_next);
    assert_eq!(last.items[0].id, Some(21));
    assert_eq!(
        backend.state.last_query().get("skip").map(String::as_str),
        Some("20")
    );
}

#[tokio::test]
async fn test_dictionary_filters_and_envelope() {
    let backend = MockBackend::start(0).await;
    let client = backend.client();

    let query = DictionaryQuery {
        theme: Some("tous".into()),
        category: Some("Animaux".into()),
        page: Some(1),
        ..Default::default()
    };
    let page = client.list_dictionary(&query).await.unwrap();
    assert_eq!(page.items[0].french_word, "cigale");
    assert_eq!(page.items[0].provencal_word, "cigalo");
    assert_eq!((page.page, page.pages, page.total), (1, 2, Some(12)));

    let sent = backend.state.last_query();
    assert!(!sent.contains_key("theme"));
    assert_eq!(sent.get("categorie").map(String::as_str), Some("Animaux"));
}

#[tokio::test]
async fn test_menu_keeps_grouping_keys() {
    let backend = MockBackend::start(0).await;
    let menu = backend.client().histoires_menu().await.unwrap();
    let items = &menu["Légende"]["Moyen Âge"];
    assert_eq!(items[0].title, "La Tarasque");
    assert_eq!(items[0].short_description, "Le monstre du Rhône");
    assert!(menu["Histoire"].is_empty());
}

#[tokio::test]
async fn test_not_found_surfaces_server_detail() {
    let backend = MockBackend::start(1).await;
    let err = backend.client().get::<Article>(42).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "Article introuvable");
}

#[tokio::test]
async fn test_network_failure_message() {
    let client = patrimoni_admin::ApiClient::new(
        patrimoni_common::config::ClientConfig::with_api_base("http://127.0.0.1:9").unwrap(),
    )
    .unwrap();
    let err = client.list::<Article>().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.user_message(), "Une erreur inattendue est survenue.");
}

#[tokio::test]
async fn test_truncated_error_body_keeps_status() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let head = "HTTP/1.1 500 Internal Server Error\r\n\
                    content-type: application/json\r\n\
                    content-length: 200\r\n\r\n{\"detail\": \"Base ind";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    let client = patrimoni_admin::ApiClient::new(
        patrimoni_common::config::ClientConfig::with_api_base(&format!("http://{addr}")).unwrap(),
    )
    .unwrap();
    let err = client.get::<Article>(1).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "Erreur serveur.");
}

#[tokio::test]
async fn test_list_prunes_only_after_server_confirms() {
    let backend = MockBackend::start(3).await;
    let client = backend.client();
    client.set_token(Some(VALID_TOKEN.into()));

    let mut articles = client.list::<Article>().await.unwrap();
    articles.push(Article {
        id: Some(FAILING_ID),
        ..Default::default()
    });
    let mut list = ListState::new(articles);

    let request = list.request_delete(2).unwrap();
    list.confirm_delete(request, |id| client.delete::<Article>(id))
        .await
        .unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.items().iter().all(|a| a.id != Some(2)));

    let request = list.request_delete(FAILING_ID).unwrap();
    let err = list
        .confirm_delete(request, |id| client.delete::<Article>(id))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Erreur serveur.");
    assert_eq!(list.len(), 3);
}
