mod common;

#[cfg(test)]
mod tests {
    use super::common::{spawn_stub, StubReply, STUB_API_KEY};
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use simpletask::db::db::Db;
    use simpletask::libs::config::{Config, OpenAiConfig};
    use simpletask::server::identity::IDENTITY_COOKIE;
    use simpletask::server::{router, AppState};
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tower::ServiceExt;

    const API_KEY: &str = "test-api-key";

    fn build_app(db: &Db, api_key: Option<&str>, openai: OpenAiConfig) -> Router {
        let mut config = Config::default();
        config.server.api_key = api_key.map(String::from);
        config.openai = openai;

        router(AppState::new(&config, db.clone()).unwrap())
    }

    struct ApiTestContext {
        _temp_dir: TempDir,
        db: Db,
        app: Router,
    }

    impl AsyncTestContext for ApiTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("api.db")).unwrap();
            let app = build_app(&db, Some(API_KEY), OpenAiConfig::default());

            ApiTestContext {
                _temp_dir: temp_dir,
                db,
                app,
            }
        }
    }

    struct Call<'a> {
        method: Method,
        uri: &'a str,
        body: Option<Value>,
        api_key: Option<&'a str>,
        cookie: Option<String>,
    }

    impl<'a> Call<'a> {
        fn new(method: Method, uri: &'a str) -> Self {
            Call {
                method,
                uri,
                body: None,
                api_key: Some(API_KEY),
                cookie: None,
            }
        }

        fn json(mut self, body: Value) -> Self {
            self.body = Some(body);
            self
        }

        fn api_key(mut self, key: Option<&'a str>) -> Self {
            self.api_key = key;
            self
        }

        fn cookie(mut self, cookie: String) -> Self {
            self.cookie = Some(cookie);
            self
        }

        async fn send(self, app: &Router) -> (StatusCode, Option<String>, Value) {
            let mut request = Request::builder().method(self.method).uri(self.uri);
            if let Some(key) = self.api_key {
                request = request.header("x-api-key", key);
            }
            if let Some(cookie) = self.cookie {
                request = request.header(COOKIE, cookie);
            }
            let body = match self.body {
                Some(body) => {
                    request = request.header(CONTENT_TYPE, "application/json");
                    Body::from(body.to_string())
                }
                None => Body::empty(),
            };

            let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
            let status = response.status();
            let set_cookie = response
                .headers()
                .get(SET_COOKIE)
                .map(|v| v.to_str().unwrap().to_string());
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
            };

            (status, set_cookie, body)
        }
    }

    async fn create_task(app: &Router, body: Value) -> i64 {
        let (status, _, created) = Call::new(Method::POST, "/api/tasks").json(body).send(app).await;
        assert_eq!(status, StatusCode::CREATED);
        created["id"].as_i64().unwrap()
    }

    /// Turns a `Set-Cookie` value into the `Cookie` header a browser would send back.
    fn cookie_pair(set_cookie: &str) -> String {
        set_cookie.split(';').next().unwrap().to_string()
    }

    // === AUTHENTICATION ===

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_health_needs_no_key(ctx: &mut ApiTestContext) {
        let (status, _, body) = Call::new(Method::GET, "/health").api_key(None).send(&ctx.app).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_missing_or_wrong_key_is_unauthorized(ctx: &mut ApiTestContext) {
        let (status, _, body) = Call::new(Method::GET, "/api/tasks").api_key(None).send(&ctx.app).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized", "message": "Invalid API Key" }));

        let (status, _, _) = Call::new(Method::POST, "/api/tasks")
            .api_key(Some("nope"))
            .json(json!({ "title": "sneaky" }))
            .send(&ctx.app)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Nothing was written
        let (_, _, tasks) = Call::new(Method::GET, "/api/tasks").send(&ctx.app).await;
        assert_eq!(tasks, json!([]));
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_unconfigured_server_key_fails_closed(ctx: &mut ApiTestContext) {
        let app = build_app(&ctx.db, None, OpenAiConfig::default());

        let (status, _, body) = Call::new(Method::GET, "/api/config").send(&app).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Configuration Error");
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_config_reports_ai_availability(ctx: &mut ApiTestContext) {
        let (status, _, body) = Call::new(Method::GET, "/api/config").send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ai_available": false }));

        let with_ai = build_app(
            &ctx.db,
            Some(API_KEY),
            OpenAiConfig {
                api_key: Some("sk-anything".into()),
                ..OpenAiConfig::default()
            },
        );
        let (_, _, body) = Call::new(Method::GET, "/api/config").send(&with_ai).await;
        assert_eq!(body, json!({ "ai_available": true }));
    }

    // === TASKS ===

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_create_task_with_title_only(ctx: &mut ApiTestContext) {
        let (status, _, body) = Call::new(Method::POST, "/api/tasks")
            .json(json!({ "title": "fix bug", "use_ai": false }))
            .send(&ctx.app)
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "id": 1, "status": "created", "title": "fix bug", "description": "" }));

        let (status, _, task) = Call::new(Method::GET, "/api/tasks/1").send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["description"], "");
        assert_eq!(task["status"], "open");
        assert_eq!(task["created_by"], "Anonymous");
        assert!(task["completed_at"].is_null());
        assert!(task["created_at"].is_string());
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_create_task_requires_title(ctx: &mut ApiTestContext) {
        for body in [json!({ "description": "no title" }), json!({ "title": "   " })] {
            let (status, _, error) = Call::new(Method::POST, "/api/tasks").json(body).send(&ctx.app).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error["message"], "Field 'title' is required");
        }
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_malformed_body_is_bad_request(ctx: &mut ApiTestContext) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/tasks")
            .header("x-api-key", API_KEY)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{ title: "))
            .unwrap();

        let response = ctx.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_get_missing_task(ctx: &mut ApiTestContext) {
        let (status, _, body) = Call::new(Method::GET, "/api/tasks/404").send(&ctx.app).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Task not found" }));
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_complete_and_reopen_task(ctx: &mut ApiTestContext) {
        let id = create_task(&ctx.app, json!({ "title": "fix bug", "use_ai": false })).await;
        let uri = format!("/api/tasks/{}", id);

        let (status, _, body) = Call::new(Method::PUT, &uri).json(json!({ "status": "completed" })).send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "updated" }));

        let (_, _, task) = Call::new(Method::GET, &uri).send(&ctx.app).await;
        assert_eq!(task["status"], "completed");
        assert!(task["completed_at"].is_string());

        Call::new(Method::PUT, &uri).json(json!({ "status": "open" })).send(&ctx.app).await;
        let (_, _, task) = Call::new(Method::GET, &uri).send(&ctx.app).await;
        assert_eq!(task["status"], "open");
        assert!(task["completed_at"].is_null());
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_invalid_status_is_rejected(ctx: &mut ApiTestContext) {
        let id = create_task(&ctx.app, json!({ "title": "fix bug", "use_ai": false })).await;
        let uri = format!("/api/tasks/{}", id);

        let (status, _, _) = Call::new(Method::PUT, &uri)
            .json(json!({ "status": "archived", "title": "renamed" }))
            .send(&ctx.app)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // The rejected request changed nothing
        let (_, _, task) = Call::new(Method::GET, &uri).send(&ctx.app).await;
        assert_eq!(task["status"], "open");
        assert_eq!(task["title"], "fix bug");

        let (status, _, _) = Call::new(Method::GET, "/api/tasks?status=archived").send(&ctx.app).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_update_task_content(ctx: &mut ApiTestContext) {
        let id = create_task(&ctx.app, json!({ "title": "draft", "description": "first", "use_ai": false })).await;
        let uri = format!("/api/tasks/{}", id);

        Call::new(Method::PUT, &uri)
            .json(json!({ "title": "final", "description": "second" }))
            .send(&ctx.app)
            .await;
        let (_, _, task) = Call::new(Method::GET, &uri).send(&ctx.app).await;
        assert_eq!(task["title"], "final");
        assert_eq!(task["description"], "second");

        // Description alone keeps the title
        Call::new(Method::PUT, &uri).json(json!({ "description": "third" })).send(&ctx.app).await;
        let (_, _, task) = Call::new(Method::GET, &uri).send(&ctx.app).await;
        assert_eq!(task["title"], "final");
        assert_eq!(task["description"], "third");

        // Title alone clears the description
        Call::new(Method::PUT, &uri).json(json!({ "title": "only title" })).send(&ctx.app).await;
        let (_, _, task) = Call::new(Method::GET, &uri).send(&ctx.app).await;
        assert_eq!(task["title"], "only title");
        assert_eq!(task["description"], "");
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_list_and_search_tasks(ctx: &mut ApiTestContext) {
        let deploy = create_task(&ctx.app, json!({ "title": "Deploy", "use_ai": false })).await;
        let docs = create_task(&ctx.app, json!({ "title": "Docs", "use_ai": false })).await;
        let done = create_task(&ctx.app, json!({ "title": "Old deploy", "use_ai": false })).await;
        Call::new(Method::PUT, &format!("/api/tasks/{}", done))
            .json(json!({ "status": "completed" }))
            .send(&ctx.app)
            .await;
        for text in ["rollback failed", "another rollback"] {
            Call::new(Method::POST, &format!("/api/tasks/{}/messages", docs))
                .json(json!({ "content": text, "use_ai": false }))
                .send(&ctx.app)
                .await;
        }

        let ids = |tasks: &Value| -> Vec<i64> { tasks.as_array().unwrap().iter().map(|t| t["id"].as_i64().unwrap()).collect() };

        let (_, _, open) = Call::new(Method::GET, "/api/tasks").send(&ctx.app).await;
        assert_eq!(ids(&open), vec![docs, deploy]);

        let (_, _, completed) = Call::new(Method::GET, "/api/tasks?status=completed").send(&ctx.app).await;
        assert_eq!(ids(&completed), vec![done]);

        let (_, _, found) = Call::new(Method::GET, "/api/tasks?status=open&search=ROLLBACK").send(&ctx.app).await;
        assert_eq!(ids(&found), vec![docs]);

        let (_, _, found) = Call::new(Method::GET, "/api/tasks?status=completed&search=deploy").send(&ctx.app).await;
        assert_eq!(ids(&found), vec![done]);
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_delete_task_removes_messages(ctx: &mut ApiTestContext) {
        let id = create_task(&ctx.app, json!({ "title": "temporary", "use_ai": false })).await;
        let messages_uri = format!("/api/tasks/{}/messages", id);
        Call::new(Method::POST, &messages_uri)
            .json(json!({ "content": "note", "use_ai": false }))
            .send(&ctx.app)
            .await;

        let (status, _, body) = Call::new(Method::DELETE, &format!("/api/tasks/{}", id)).send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "deleted" }));

        let (status, _, _) = Call::new(Method::GET, &format!("/api/tasks/{}", id)).send(&ctx.app).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, messages) = Call::new(Method::GET, &messages_uri).send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(messages, json!([]));
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_mutating_missing_ids_is_idempotent(ctx: &mut ApiTestContext) {
        let (status, _, body) = Call::new(Method::PUT, "/api/tasks/77").json(json!({ "status": "completed" })).send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "updated" }));

        let (status, _, _) = Call::new(Method::DELETE, "/api/tasks/77").send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = Call::new(Method::PUT, "/api/messages/77").json(json!({ "content": "x" })).send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = Call::new(Method::DELETE, "/api/messages/77").send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
    }

    // === IDENTITY ===

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_identify_sets_author(ctx: &mut ApiTestContext) {
        let (status, set_cookie, body) = Call::new(Method::POST, "/api/identify")
            .json(json!({ "name": "  Grace  " }))
            .send(&ctx.app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success", "user_name": "Grace" }));
        let cookie = cookie_pair(&set_cookie.unwrap());
        assert!(cookie.starts_with(IDENTITY_COOKIE));

        let (_, _, created) = Call::new(Method::POST, "/api/tasks")
            .json(json!({ "title": "Audit", "use_ai": false }))
            .cookie(cookie.clone())
            .send(&ctx.app)
            .await;
        let id = created["id"].as_i64().unwrap();
        let (_, _, task) = Call::new(Method::GET, &format!("/api/tasks/{}", id)).send(&ctx.app).await;
        assert_eq!(task["created_by"], "Grace");

        let messages_uri = format!("/api/tasks/{}/messages", id);
        Call::new(Method::POST, &messages_uri)
            .json(json!({ "content": "started", "use_ai": false }))
            .cookie(format!("theme=dark; {}", cookie))
            .send(&ctx.app)
            .await;
        let (_, _, thread) = Call::new(Method::GET, &messages_uri).send(&ctx.app).await;
        assert_eq!(thread[0]["user_name"], "Grace");
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_tampered_identity_is_anonymous(ctx: &mut ApiTestContext) {
        let forged = format!("{}=R3JhY2U.{}", IDENTITY_COOKIE, "00".repeat(32));

        let (_, _, created) = Call::new(Method::POST, "/api/tasks")
            .json(json!({ "title": "Audit", "use_ai": false }))
            .cookie(forged)
            .send(&ctx.app)
            .await;
        let (_, _, task) = Call::new(Method::GET, &format!("/api/tasks/{}", created["id"])).send(&ctx.app).await;

        assert_eq!(task["created_by"], "Anonymous");
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_identify_requires_name(ctx: &mut ApiTestContext) {
        let (status, set_cookie, _) = Call::new(Method::POST, "/api/identify").json(json!({ "name": " " })).send(&ctx.app).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(set_cookie.is_none());
    }

    // === MESSAGES ===

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_message_thread_lifecycle(ctx: &mut ApiTestContext) {
        let task_id = create_task(&ctx.app, json!({ "title": "Release", "use_ai": false })).await;
        let messages_uri = format!("/api/tasks/{}/messages", task_id);

        let (status, _, first) = Call::new(Method::POST, &messages_uri)
            .json(json!({ "content": "first", "use_ai": false }))
            .send(&ctx.app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["content"], "first");
        assert_eq!(first["original_content"], "first");
        let (_, _, second) = Call::new(Method::POST, &messages_uri)
            .json(json!({ "content": "second", "use_ai": false }))
            .send(&ctx.app)
            .await;

        let (_, _, thread) = Call::new(Method::GET, &messages_uri).send(&ctx.app).await;
        let thread = thread.as_array().unwrap().clone();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0]["id"], first["id"]);
        assert_eq!(thread[1]["id"], second["id"]);
        assert_eq!(thread[0]["is_edited"], false);
        assert_eq!(thread[0]["task_id"], task_id);

        let edit_uri = format!("/api/messages/{}", first["id"]);
        let (status, _, body) = Call::new(Method::PUT, &edit_uri).json(json!({ "content": "first" })).send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "updated" }));

        let (_, _, thread) = Call::new(Method::GET, &messages_uri).send(&ctx.app).await;
        assert_eq!(thread[0]["is_edited"], true);
        assert_eq!(thread[0]["original_content"], "first");

        let (status, _, body) = Call::new(Method::DELETE, &edit_uri).send(&ctx.app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "deleted" }));
        let (_, _, thread) = Call::new(Method::GET, &messages_uri).send(&ctx.app).await;
        assert_eq!(thread.as_array().unwrap().len(), 1);
        assert_eq!(thread[0]["id"], second["id"]);
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_message_validation(ctx: &mut ApiTestContext) {
        let task_id = create_task(&ctx.app, json!({ "title": "Release", "use_ai": false })).await;

        let (status, _, _) = Call::new(Method::POST, &format!("/api/tasks/{}/messages", task_id))
            .json(json!({ "content": "" }))
            .send(&ctx.app)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, body) = Call::new(Method::POST, "/api/tasks/999/messages")
            .json(json!({ "content": "hello?" }))
            .send(&ctx.app)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Task not found" }));

        let (status, _, _) = Call::new(Method::PUT, "/api/messages/1").json(json!({})).send(&ctx.app).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // === AI REWRITING ===

    fn ai_config(base_url: String) -> OpenAiConfig {
        OpenAiConfig {
            api_key: Some(STUB_API_KEY.into()),
            base_url,
            timeout_secs: 1,
            ..OpenAiConfig::default()
        }
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_create_rewrites_but_edit_does_not(ctx: &mut ApiTestContext) {
        let base_url = spawn_stub(StubReply::Rewrite {
            task: json!({ "title": "Fix the login defect", "description": "Investigate the failing sign-in." }),
            text: "Could you please take a look?".into(),
        })
        .await;
        let app = build_app(&ctx.db, Some(API_KEY), ai_config(base_url));

        let (_, _, created) = Call::new(Method::POST, "/api/tasks")
            .json(json!({ "title": "fix login", "description": "its broke" }))
            .send(&app)
            .await;
        assert_eq!(created["title"], "Fix the login defect");
        assert_eq!(created["description"], "Investigate the failing sign-in.");
        let task_id = created["id"].as_i64().unwrap();

        let (_, _, stored) = Call::new(Method::GET, &format!("/api/tasks/{}", task_id)).send(&app).await;
        assert_eq!(stored["title"], "Fix the login defect");

        let messages_uri = format!("/api/tasks/{}/messages", task_id);
        let (_, _, message) = Call::new(Method::POST, &messages_uri).json(json!({ "content": "pls look" })).send(&app).await;
        assert_eq!(message["content"], "Could you please take a look?");
        assert_eq!(message["original_content"], "pls look");

        let (_, _, skipped) = Call::new(Method::POST, &messages_uri)
            .json(json!({ "content": "raw text", "use_ai": false }))
            .send(&app)
            .await;
        assert_eq!(skipped["content"], "raw text");

        Call::new(Method::PUT, &format!("/api/messages/{}", message["id"]))
            .json(json!({ "content": "edited by hand" }))
            .send(&app)
            .await;
        let (_, _, thread) = Call::new(Method::GET, &messages_uri).send(&app).await;
        assert_eq!(thread[0]["content"], "edited by hand");
        assert_eq!(thread[0]["original_content"], "pls look");
        assert_eq!(thread[0]["is_edited"], true);
    }

    #[test_context(ApiTestContext)]
    #[tokio::test]
    async fn test_rewrite_failure_keeps_submitted_text(ctx: &mut ApiTestContext) {
        let base_url = spawn_stub(StubReply::Status(503)).await;
        let app = build_app(&ctx.db, Some(API_KEY), ai_config(base_url));

        let (status, _, created) = Call::new(Method::POST, "/api/tasks")
            .json(json!({ "title": "fix login", "description": "its broke" }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "fix login");
        assert_eq!(created["description"], "its broke");

        let (status, _, message) = Call::new(Method::POST, &format!("/api/tasks/{}/messages", created["id"]))
            .json(json!({ "content": "pls look" }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(message["content"], "pls look");
        assert_eq!(message["original_content"], "pls look");
    }
}
