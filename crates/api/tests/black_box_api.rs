use std::sync::Arc;

use reqwest::{StatusCode, header::LOCATION, redirect::Policy};
use serde_json::Value;

use formgate_api::{app, config::SessionSettings};
use formgate_auth::CredentialLoader;
use formgate_infra::{InMemoryUserStore, seed_users};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        formgate_observability::tracing::init_for_tests();

        let store = InMemoryUserStore::new();
        seed_users(&store, &app::dev_seed_users()).expect("seed users");
        let loader: Arc<dyn CredentialLoader> = Arc::new(store);

        // Same router as prod, bound to an ephemeral port.
        let app = app::build_router(loader, &SessionSettings::default()).expect("build router");
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

/// Browser-like client: keeps the session cookie, does not follow redirects.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

fn location(res: &reqwest::Response) -> &str {
    res.headers()
        .get(LOCATION)
        .expect("redirect without location")
        .to_str()
        .unwrap()
}

async fn login(
    client: &reqwest::Client,
    srv: &TestServer,
    username: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(srv.url("/login"))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn login_page_is_public() {
    let srv = TestServer::spawn().await;

    let res = client().get(srv.url("/login")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["view"], "login");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn home_redirects_anonymous_users_to_login() {
    let srv = TestServer::spawn().await;

    let res = client().get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn admin_user_reaches_admin_and_home() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = login(&client, &srv, "alice", "alice123").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let res = client.get(srv.url("/admin")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "admin console");
    assert_eq!(body["username"], "alice");

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["view"], "index");
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn user_without_admin_role_is_sent_to_403() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = login(&client, &srv, "bob", "bob123").await;
    assert_eq!(location(&res), "/");

    let res = client.get(srv.url("/admin")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/403");

    let res = client.get(srv.url("/403")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "access denied");

    // Home only needs a session.
    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_admin_request_is_denied() {
    let srv = TestServer::spawn().await;

    let res = client().get(srv.url("/admin")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/403");
}

#[tokio::test]
async fn unknown_user_and_wrong_password_fail_identically() {
    let srv = TestServer::spawn().await;
    let client = client();

    let unknown = login(&client, &srv, "eve", "anything").await;
    let wrong = login(&client, &srv, "alice", "not-alices").await;

    assert_eq!(unknown.status(), StatusCode::SEE_OTHER);
    assert_eq!(unknown.status(), wrong.status());
    assert_eq!(location(&unknown), "/login?error");
    assert_eq!(location(&unknown), location(&wrong));

    // No session was established.
    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(location(&res), "/login");

    let res = client.get(srv.url("/login?error")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "invalid credentials");
}

#[tokio::test]
async fn missing_form_fields_count_as_failed_login() {
    let srv = TestServer::spawn().await;

    let res = client()
        .post(srv.url("/login"))
        .form(&[("username", "alice")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login?error");
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let srv = TestServer::spawn().await;
    let client = client();

    login(&client, &srv, "alice", "alice123").await;
    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/logout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["view"], "login");

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[tokio::test]
async fn sessions_are_isolated_per_client() {
    let srv = TestServer::spawn().await;
    let alice = client();
    let stranger = client();

    login(&alice, &srv, "alice", "alice123").await;

    let res = alice.get(srv.url("/admin")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = stranger.get(srv.url("/admin")).send().await.unwrap();
    assert_eq!(location(&res), "/403");
}

#[tokio::test]
async fn unmatched_paths_are_denied_by_default() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client.get(srv.url("/reports")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/403");

    // Even an admin session does not open unlisted paths.
    login(&client, &srv, "alice", "alice123").await;
    let res = client.get(srv.url("/reports")).send().await.unwrap();
    assert_eq!(location(&res), "/403");
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = client().get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

/// The `id=...` pair from the response's session cookie, if one was set.
fn session_cookie(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("id="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

#[tokio::test]
async fn login_issues_a_fresh_session_id() {
    let srv = TestServer::spawn().await;
    // Cookies are carried by hand so the old id can be replayed.
    let bare = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    // Anonymous requests do not start a session.
    let res = bare.get(srv.url("/login")).send().await.unwrap();
    assert!(session_cookie(&res).is_none());

    let res = bare
        .post(srv.url("/login"))
        .form(&[("username", "bob"), ("password", "bob123")])
        .send()
        .await
        .unwrap();
    let before = session_cookie(&res).expect("session cookie after first login");

    let res = bare
        .post(srv.url("/login"))
        .header(reqwest::header::COOKIE, &before)
        .form(&[("username", "alice"), ("password", "alice123")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let after = session_cookie(&res).expect("session cookie after second login");
    assert_ne!(before, after);

    let res = bare
        .get(srv.url("/"))
        .header(reqwest::header::COOKIE, &before)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let res = bare
        .get(srv.url("/"))
        .header(reqwest::header::COOKIE, &after)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
}
