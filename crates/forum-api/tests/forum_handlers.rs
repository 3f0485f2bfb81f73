use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use forum_api::handlers::ErrorBody;
use forum_api::{configure_routes, AppState};
use forum_core::models::{Post, User};
use forum_core::traits::ThreadRepo;
use forum_core::{ForumUsecase, PostUsecase};
use forum_db_sqlite::SqliteForumRepo;
use serde_json::{json, Value};

async fn state() -> (web::Data<AppState>, Arc<SqliteForumRepo>) {
    let repo = Arc::new(SqliteForumRepo::new("sqlite::memory:", 1).await.unwrap());
    for nickname in ["alice", "bob"] {
        repo.insert_user(&User {
            nickname: nickname.into(),
            fullname: String::new(),
            about: String::new(),
            email: format!("{nickname}@example.org"),
        })
        .await
        .unwrap();
    }

    let state = web::Data::new(AppState {
        forums: ForumUsecase::new(repo.clone(), repo.clone(), repo.clone()),
        posts: PostUsecase::new(repo.clone()),
    });
    (state, repo)
}

#[actix_web::test]
async fn forum_create_maps_outcomes_to_statuses() {
    let (state, _) = state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/forum/create")
        .set_json(json!({"slug": "tech", "title": "Tech talk", "user": "ALICE"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"], "alice");

    let req = test::TestRequest::post()
        .uri("/api/forum/create")
        .set_json(json!({"slug": "tech", "title": "Other", "user": "bob"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"], "alice");
    assert_eq!(body["title"], "Tech talk");

    let req = test::TestRequest::post()
        .uri("/api/forum/create")
        .set_json(json!({"slug": "misc", "title": "Misc", "user": "nobody"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert!(body.message.contains("nobody"));
}

#[actix_web::test]
async fn malformed_input_is_rejected_at_the_boundary() {
    let (state, _) = state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/forum/create")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/forum/tech/threads?limit=lots").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert!(body.message.starts_with("malformed query"));
}

#[actix_web::test]
async fn thread_create_and_forum_listings() {
    let (state, _) = state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/forum/create")
        .set_json(json!({"slug": "tech", "title": "Tech talk", "user": "alice"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let thread = json!({
        "slug": "news",
        "title": "Release notes",
        "author": "bob",
        "forum": "elsewhere",
        "message": "What changed",
        "created": "2024-03-01T12:00:00Z",
    });
    let req = test::TestRequest::post().uri("/api/forum/tech/create").set_json(&thread).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["forum"], "tech");

    let req = test::TestRequest::post().uri("/api/forum/tech/create").set_json(&thread).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let existing: Value = test::read_body_json(resp).await;
    assert_eq!(existing["id"], created["id"]);

    let req = test::TestRequest::post().uri("/api/forum/ghost/create").set_json(&thread).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/forum/tech/details").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let forum: Value = test::read_body_json(resp).await;
    assert_eq!(forum["threads"], 1);

    let req = test::TestRequest::get()
        .uri("/api/forum/tech/threads?limit=10&desc=true&since=2024-03-02T00:00:00Z")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let threads: Value = test::read_body_json(resp).await;
    assert_eq!(threads.as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get().uri("/api/forum/tech/users").to_request();
    let users: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(users[0]["nickname"], "bob");

    for uri in ["/api/forum/ghost/details", "/api/forum/ghost/threads", "/api/forum/ghost/users"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

async fn seeded_post(state: &web::Data<AppState>, repo: &SqliteForumRepo) -> Post {
    state
        .forums
        .create_forum(forum_core::Forum {
            slug: "tech".into(),
            title: "Tech talk".into(),
            author: "alice".into(),
            threads: 0,
            posts: 0,
        })
        .await;
    let thread = state
        .forums
        .create_thread(
            "tech",
            forum_core::NewThread {
                title: "Release notes".into(),
                author: "alice".into(),
                message: "What changed".into(),
                ..Default::default()
            },
        )
        .await
        .into_value()
        .unwrap();
    assert!(repo.find_by_id_or_slug(thread.id, "").await.unwrap().is_some());
    repo.insert_post(&Post {
        id: 0,
        parent: 0,
        author: "bob".into(),
        message: "hello".into(),
        is_edited: false,
        forum: "tech".into(),
        thread: thread.id,
        created: None,
    })
    .await
    .unwrap()
}

#[actix_web::test]
async fn post_details_and_edit() {
    let (state, repo) = state().await;
    let post = seeded_post(&state, &repo).await;

    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/post/{}/details?related=user,forum", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let full: Value = test::read_body_json(resp).await;
    assert_eq!(full["post"]["message"], "hello");
    assert_eq!(full["author"]["nickname"], "bob");
    assert_eq!(full["forum"]["slug"], "tech");
    assert!(full.get("thread").is_none());

    let req = test::TestRequest::post()
        .uri(&format!("/api/post/{}/details", post.id))
        .set_json(json!({}))
        .to_request();
    let unchanged: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(unchanged["message"], "hello");
    assert_eq!(unchanged["isEdited"], false);

    let req = test::TestRequest::post()
        .uri(&format!("/api/post/{}/details", post.id))
        .set_json(json!({"message": "hello, world"}))
        .to_request();
    let edited: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(edited["message"], "hello, world");
    assert_eq!(edited["isEdited"], true);

    let req = test::TestRequest::get().uri("/api/post/99999/details").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/post/abc/details").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn repeated_related_key_uses_first_value() {
    let (state, repo) = state().await;
    let post = seeded_post(&state, &repo).await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/post/{}/details?related=user&related=forum", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let full: Value = test::read_body_json(resp).await;
    assert_eq!(full["author"]["nickname"], "bob");
    assert!(full.get("forum").is_none());
    assert!(full.get("thread").is_none());
}
