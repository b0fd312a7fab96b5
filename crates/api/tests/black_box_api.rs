use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use marginalia_auth::{JwtClaims, PrincipalId, Role};
use marginalia_comments::{CommentRegistry, CommentSettings, EnglishCatalog, NamespaceSettings};
use marginalia_core::NamespaceName;
use marginalia_infra::AppConfig;
use reqwest::StatusCode;
use serde_json::json;

const SECRET: &str = "black-box-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig {
            jwt_secret: SECRET.to_string(),
            labels: serde_json::from_value(json!({
                "resources": [{"resource_type": "Order", "resource_id": "1", "label": "Order R-001"}]
            }))
            .expect("labels"),
            ..AppConfig::default()
        };
        let registry = CommentRegistry::build(
            &CommentSettings::default(),
            &[
                NamespaceSettings::named("sales"),
                NamespaceSettings::named("support"),
                NamespaceSettings {
                    comments: Some(false),
                    ..NamespaceSettings::named("ops")
                },
            ],
            &EnglishCatalog::new(),
        )
        .expect("registry");

        // Same router as prod, bound to an ephemeral port.
        let app = marginalia_api::app::build_app(&config, Arc::new(registry))
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(roles: &[&'static str], namespaces: Option<Vec<&str>>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: PrincipalId::new(),
        principal_type: "AdminUser".to_string(),
        namespaces: namespaces.map(|ns| ns.into_iter().map(|n| NamespaceName::new(n).unwrap()).collect()),
        roles: roles.iter().map(|r| Role::new(*r)).collect(),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn client() -> reqwest::Client {
    // Redirect responses are asserted on, not followed.
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn list(
    client: &reqwest::Client,
    server: &TestServer,
    token: &str,
    namespace: &str,
    scope: Option<&str>,
) -> serde_json::Value {
    let mut url = server.url(&format!("/{namespace}/comments"));
    if let Some(scope) = scope {
        url = format!("{url}?scope={scope}");
    }
    let res = client.get(url).bearer_auth(token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public_and_everything_else_requires_a_token() {
    let server = TestServer::spawn().await;
    let client = client();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/sales/comments")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/sales/comments"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_echoes_claims() {
    let server = TestServer::spawn().await;
    let token = mint_jwt(&["operator"], Some(vec!["sales"]));

    let body: serde_json::Value = client()
        .get(server.url("/whoami"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["principal_type"], "AdminUser");
    assert_eq!(body["namespaces"], json!(["sales"]));
    assert_eq!(body["roles"], json!(["operator"]));
}

#[tokio::test]
async fn create_binds_namespace_and_author_from_context() {
    let server = TestServer::spawn().await;
    let client = client();
    let token = mint_jwt(&["admin"], None);
    let referer = server.url("/support/tickets/5");

    let res = client
        .post(server.url("/support/comments"))
        .bearer_auth(&token)
        .header(reqwest::header::REFERER, &referer)
        .json(&json!({
            "body": "Customer called back",
            "resource_type": "Ticket",
            "resource_id": "5",
            "namespace": "sales",
            "author_id": "999"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[reqwest::header::LOCATION], referer.as_str());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["redirect_to"], referer.as_str());
    assert!(body.get("flash").is_none());

    let page = list(&client, &server, &token, "support", None).await;
    let rows = page["comments"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["namespace"], "support");
    assert_eq!(rows[0]["body"], "Customer called back");
    assert_eq!(rows[0]["author_type"], "AdminUser");
    assert_ne!(rows[0]["author_id"], "999");
    assert_eq!(rows[0]["resource"], "Ticket #5");

    let sales = list(&client, &server, &token, "sales", None).await;
    assert!(sales["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blank_body_flashes_and_persists_nothing() {
    let server = TestServer::spawn().await;
    let client = client();
    let token = mint_jwt(&["operator"], None);

    let res = client
        .post(server.url("/support/comments"))
        .bearer_auth(&token)
        .json(&json!({ "body": "   ", "resource_type": "Ticket", "resource_id": "5" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[reqwest::header::LOCATION], "/support");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["flash"]["error"], "Comment wasn't saved, text was empty.");

    let page = list(&client, &server, &token, "support", None).await;
    assert!(page["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn destroying_missing_comment_redirects_without_flash() {
    let server = TestServer::spawn().await;
    let client = client();
    let token = mint_jwt(&["admin"], None);
    let referer = server.url("/sales/orders");

    for id in ["42", "0190a2f4-0000-7000-8000-000000000000"] {
        let res = client
            .delete(server.url(&format!("/sales/comments/{id}")))
            .bearer_auth(&token)
            .header(reqwest::header::REFERER, &referer)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["redirect_to"], referer.as_str());
        assert!(body.get("flash").is_none());
    }
}

#[tokio::test]
async fn rows_listed_under_all_scope_can_be_shown_and_destroyed() {
    let server = TestServer::spawn().await;
    let client = client();
    let token = mint_jwt(&["admin"], None);

    let res = client
        .post(server.url("/support/comments"))
        .bearer_auth(&token)
        .json(&json!({ "body": "refund issued", "resource_type": "Order", "resource_id": "9" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    // Not in the sales default scope, but listed under "all".
    assert!(list(&client, &server, &token, "sales", None).await["comments"].as_array().unwrap().is_empty());
    let all = list(&client, &server, &token, "sales", Some("all")).await;
    let rows = all["comments"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(all["index"]["row_actions"], json!(["show", "destroy"]));
    let id = rows[0]["id"].as_str().unwrap().to_string();

    let res = client
        .get(server.url(&format!("/sales/comments/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let shown: serde_json::Value = res.json().await.unwrap();
    assert_eq!(shown["namespace"], "support");

    let res = client
        .delete(server.url(&format!("/sales/comments/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[reqwest::header::LOCATION], "/sales");

    let res = client
        .get(server.url(&format!("/support/comments/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(list(&client, &server, &token, "support", None).await["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn disabled_and_unknown_namespaces_are_not_found() {
    let server = TestServer::spawn().await;
    let client = client();
    let token = mint_jwt(&["admin"], None);

    for path in ["/ops/comments", "/billing/comments", "/ops/registrations/comments"] {
        let res = client.get(server.url(path)).bearer_auth(&token).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
    }

    let res = client
        .post(server.url("/ops/comments"))
        .bearer_auth(&token)
        .json(&json!({ "body": "hi", "resource_type": "Host", "resource_id": "1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The namespace itself exists; only its comments entry is absent.
    let nav: serde_json::Value = client
        .get(server.url("/ops/navigation"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(nav["namespace"], "ops");
    assert!(nav["menu"].is_null());
}

#[tokio::test]
async fn role_permissions_are_enforced() {
    let server = TestServer::spawn().await;
    let client = client();

    let viewer = mint_jwt(&["viewer"], None);
    let res = client
        .post(server.url("/sales/comments"))
        .bearer_auth(&viewer)
        .json(&json!({ "body": "hi", "resource_type": "Order", "resource_id": "1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    let operator = mint_jwt(&["operator"], None);
    let res = client
        .delete(server.url("/sales/comments/42"))
        .bearer_auth(&operator)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let sales_only = mint_jwt(&["admin"], Some(vec!["sales"]));
    let res = client
        .get(server.url("/support/comments"))
        .bearer_auth(&sales_only)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "namespace_forbidden");
}

#[tokio::test]
async fn index_offers_one_scope_per_namespace_plus_all() {
    let server = TestServer::spawn().await;
    let client = client();
    let token = mint_jwt(&["admin"], None);

    for (ns, body) in [("sales", "a"), ("support", "b"), ("support", "c")] {
        let res = client
            .post(server.url(&format!("/{ns}/comments")))
            .bearer_auth(&token)
            .json(&json!({ "body": body, "resource_type": "Order", "resource_id": "1" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    let page = list(&client, &server, &token, "support", None).await;
    assert_eq!(page["scope"], "support");
    let keys: Vec<&str> = page["scopes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["all", "sales", "support", "ops"]);
    let defaults: Vec<&str> = page["scopes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["is_default"] == true)
        .map(|s| s["key"].as_str().unwrap())
        .collect();
    assert_eq!(defaults, vec!["support"]);
    assert_eq!(page["scopes"][0]["count"], serde_json::Value::Null);
    assert_eq!(page["scopes"][2]["count"], 2);
    assert_eq!(page["comments"].as_array().unwrap().len(), 2);
    assert_eq!(page["index"]["columns"].as_array().unwrap().len(), 6);

    let all = list(&client, &server, &token, "support", Some("all")).await;
    assert_eq!(all["comments"].as_array().unwrap().len(), 3);

    let res = client
        .get(server.url("/support/comments?order=body_sideways"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn navigation_and_registration_describe_the_feature() {
    let server = TestServer::spawn().await;
    let client = client();
    let token = mint_jwt(&["viewer"], None);

    let nav: serde_json::Value = client
        .get(server.url("/sales/navigation"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(nav["menu"]["label"], "Comments");
    assert_eq!(nav["menu"]["url"], "/sales/comments");

    let reg: serde_json::Value = client
        .get(server.url("/sales/registrations/comments"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reg["batch_actions"], false);
    assert_eq!(reg["commentable"], false);
    assert_eq!(
        reg["permitted_params"],
        json!(["body", "namespace", "resource_id", "resource_type"])
    );
}

#[tokio::test]
async fn resource_panel_lists_only_that_resource() {
    let server = TestServer::spawn().await;
    let client = client();
    let token = mint_jwt(&["admin"], None);

    for id in ["1", "1", "2"] {
        client
            .post(server.url("/sales/comments"))
            .bearer_auth(&token)
            .json(&json!({ "body": format!("note on {id}"), "resource_type": "Order", "resource_id": id }))
            .send()
            .await
            .unwrap();
    }

    let panel: serde_json::Value = client
        .get(server.url("/sales/resources/Order/1/comments"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(panel["resource"]["resource_type"], "Order");
    let rows = panel["comments"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["resource_id"] == "1"));
    assert!(rows.iter().all(|r| r["resource"] == "Order R-001"));
}

#[tokio::test]
async fn foreign_referer_falls_back_to_namespace_root() {
    let server = TestServer::spawn().await;
    let token = mint_jwt(&["admin"], None);

    let res = client()
        .post(server.url("/sales/comments"))
        .bearer_auth(&token)
        .header(reqwest::header::REFERER, "https://evil.example/phish")
        .json(&json!({ "body": "hello", "resource_type": "Order", "resource_id": "1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[reqwest::header::LOCATION], "/sales");
}
