/// Router tests for task CRUD and the ownership guard

mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{TestContext, TEST_SECRET};
use serde_json::json;
use todoapp_shared::auth::jwt::{Claims, TokenService};

#[tokio::test]
async fn test_create_task_defaults() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;

    let response = ctx
        .send(
            Method::POST,
            "/api/tasks",
            Some(&user.bearer()),
            Some(json!({ "title": "Faire les courses", "description": "Pain, lait" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["message"], "Tâche créée avec succès");
    assert_eq!(body["task"]["title"], "Faire les courses");
    assert_eq!(body["task"]["description"], "Pain, lait");
    assert_eq!(body["task"]["completed"], false);
    assert_eq!(body["task"]["user_id"].as_i64(), Some(user.id));
}

#[tokio::test]
async fn test_create_task_requires_title() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;

    for body in [
        json!({ "description": "sans titre" }),
        json!({ "title": "" }),
        json!({ "title": null }),
        json!({ "title": "t".repeat(300) }),
    ] {
        let response = ctx
            .send(Method::POST, "/api/tasks", Some(&user.bearer()), Some(body))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.message(), "Le titre est requis");
    }
    assert_eq!(ctx.store.task_count(), 0);
}

#[tokio::test]
async fn test_create_task_after_account_deleted() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;
    ctx.send(Method::DELETE, "/api/users/account", Some(&user.bearer()), None)
        .await;

    let response = ctx
        .send(
            Method::POST,
            "/api/tasks",
            Some(&user.bearer()),
            Some(json!({ "title": "Orpheline" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "Utilisateur non trouvé");
    assert_eq!(ctx.store.task_count(), 0);
}

#[tokio::test]
async fn test_list_only_own_tasks_newest_first() {
    let ctx = TestContext::new();
    let a = ctx.register("a@example.com", "motdepasse").await;
    let b = ctx.register("b@example.com", "motdepasse").await;

    let first = ctx.create_task(&a, "premier").await;
    let second = ctx.create_task(&a, "second").await;
    ctx.create_task(&b, "autre").await;

    let response = ctx.send(Method::GET, "/api/tasks", Some(&a.bearer()), None).await;

    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<i64> = response.json()["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn test_ownership_guard_on_single_task_routes() {
    let ctx = TestContext::new();
    let owner = ctx.register("a@example.com", "motdepasse").await;
    let other = ctx.register("b@example.com", "motdepasse").await;
    let task_id = ctx.create_task(&owner, "privée").await;
    let uri = format!("/api/tasks/{}", task_id);

    let read = ctx.send(Method::GET, &uri, Some(&other.bearer()), None).await;
    let update = ctx
        .send(
            Method::PUT,
            &uri,
            Some(&other.bearer()),
            Some(json!({ "title": "volée" })),
        )
        .await;
    let delete = ctx.send(Method::DELETE, &uri, Some(&other.bearer()), None).await;

    for response in [&read, &update, &delete] {
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.message(), "Accès non autorisé à cette tâche");
    }

    // Nothing was changed by the rejected calls
    let own = ctx.send(Method::GET, &uri, Some(&owner.bearer()), None).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.json()["task"]["title"], "privée");
    assert_eq!(ctx.store.task_count(), 1);
}

#[tokio::test]
async fn test_missing_task_is_404_before_ownership() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let body = (method == Method::PUT).then(|| json!({ "completed": true }));
        let response = ctx
            .send(method, "/api/tasks/9999", Some(&user.bearer()), body)
            .await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.message(), "Tâche non trouvée");
    }
}

#[tokio::test]
async fn test_invalid_task_id() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;

    let response = ctx
        .send(Method::GET, "/api/tasks/abc", Some(&user.bearer()), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "ID de tâche invalide");
}

#[tokio::test]
async fn test_task_routes_require_token_before_anything_else() {
    let ctx = TestContext::new();

    let missing = ctx.send(Method::GET, "/api/tasks/abc", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message(), "Accès non autorisé. Token manquant.");

    let list = ctx.send(Method::GET, "/api/tasks", None, None).await;
    assert_eq!(list.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_task_routes_reject_foreign_and_expired_tokens() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;
    let task_id = ctx.create_task(&user, "Faire les courses").await;
    let user_id = i32::try_from(user.id).unwrap();

    let foreign = TokenService::new("another-secret-that-is-also-32-bytes!")
        .unwrap()
        .issue(user_id)
        .unwrap();
    let expired = TokenService::new(TEST_SECRET)
        .unwrap()
        .issue_claims(&Claims::with_expiration(user_id, Duration::hours(-1)))
        .unwrap();

    let uri = format!("/api/tasks/{}", task_id);
    for token in [&foreign, &expired] {
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let response = ctx
                .send(
                    method,
                    &uri,
                    Some(&format!("Bearer {}", token)),
                    Some(json!({ "completed": true })),
                )
                .await;

            assert_eq!(response.status, StatusCode::UNAUTHORIZED);
            assert_eq!(response.message(), "Accès non autorisé. Token invalide.");
        }
    }

    let task = ctx.send(Method::GET, &uri, Some(&user.bearer()), None).await;
    assert_eq!(task.json()["task"]["completed"], false);
}

#[tokio::test]
async fn test_unknown_routes_return_json_404() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;

    let unknown = ctx.send(Method::GET, "/api/unknown", None, None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.message(), "Route non trouvée");

    let nested = ctx
        .send(Method::GET, "/api/tasks/1/extra", Some(&user.bearer()), None)
        .await;
    assert_eq!(nested.status, StatusCode::NOT_FOUND);
    assert_eq!(nested.message(), "Route non trouvée");
}

#[tokio::test]
async fn test_update_task_partial_fields() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;

    let created = ctx
        .send(
            Method::POST,
            "/api/tasks",
            Some(&user.bearer()),
            Some(json!({ "title": "Lire", "description": "Un chapitre" })),
        )
        .await
        .json();
    let uri = format!("/api/tasks/{}", created["task"]["id"]);

    let completed = ctx
        .send(Method::PUT, &uri, Some(&user.bearer()), Some(json!({ "completed": true })))
        .await;
    assert_eq!(completed.status, StatusCode::OK);
    let body = completed.json();
    assert_eq!(body["message"], "Tâche mise à jour avec succès");
    assert_eq!(body["task"]["completed"], true);
    assert_eq!(body["task"]["title"], "Lire");
    assert_eq!(body["task"]["description"], "Un chapitre");

    let cleared = ctx
        .send(Method::PUT, &uri, Some(&user.bearer()), Some(json!({ "description": null })))
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.json()["task"]["description"].is_null());

    let empty_title = ctx
        .send(Method::PUT, &uri, Some(&user.bearer()), Some(json!({ "title": "" })))
        .await;
    assert_eq!(empty_title.status, StatusCode::BAD_REQUEST);

    let long_title = ctx
        .send(Method::PUT, &uri, Some(&user.bearer()), Some(json!({ "title": "t".repeat(300) })))
        .await;
    assert_eq!(long_title.status, StatusCode::BAD_REQUEST);
    assert_eq!(long_title.message(), "Un champ dépasse la longueur autorisée");
}

#[tokio::test]
async fn test_delete_task() {
    let ctx = TestContext::new();
    let user = ctx.register("jean@example.com", "motdepasse").await;
    let task_id = ctx.create_task(&user, "Jeter").await;
    let uri = format!("/api/tasks/{}", task_id);

    let deleted = ctx.send(Method::DELETE, &uri, Some(&user.bearer()), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.message(), "Tâche supprimée avec succès");

    let gone = ctx.send(Method::GET, &uri, Some(&user.bearer()), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_banner_and_health() {
    let ctx = TestContext::new();

    let banner = ctx.send(Method::GET, "/", None, None).await;
    assert_eq!(banner.status, StatusCode::OK);
    assert_eq!(banner.text, "API Todo App - Backend fonctionne correctement");

    let health = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["status"], "healthy");
    assert_eq!(health.json()["database"], "connected");

    ctx.store.set_unavailable(true);
    let degraded = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(degraded.json()["status"], "degraded");
    assert_eq!(degraded.json()["database"], "disconnected");
}

#[tokio::test]
async fn test_security_headers_on_api_responses() {
    let ctx = TestContext::new();

    let request = axum::http::Request::builder()
        .uri("/")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(ctx.app.clone(), request).await.unwrap();

    assert_eq!(response.headers().get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
}
