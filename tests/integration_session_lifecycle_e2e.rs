use serde_json::json;
use session_keeper::{config::Config, routes, state::AppState};

// Shared test context
struct TestContext {
    client: reqwest::Client,
    base_url: String,
    state: AppState,
}

impl TestContext {
    async fn new() -> Self {
        let config = Config {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            session_duration_days: 14,
            // reqwest's cookie store only replays Secure cookies over https
            cookie_secure: false,
            sweep_interval_secs: None,
        };
        let state = AppState::new(&config).unwrap();

        let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = routes::router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: Self::client(),
            base_url: format!("http://{}", addr),
            state,
        }
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap()
    }

    async fn login(&self, client: &reqwest::Client, username: &str) -> reqwest::Response {
        client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({ "username": username }))
            .send()
            .await
            .unwrap()
    }

    async fn authenticated(&self, client: &reqwest::Client) -> bool {
        let body: serde_json::Value = client
            .get(format!("{}/api/auth/session", self.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["authenticated"].as_bool().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_login_whoami_logout() {
        let context = TestContext::new().await;
        let client = &context.client;

        assert!(!context.authenticated(client).await);

        // Step 1: Login
        let login_response = context.login(client, "alice").await;
        assert_eq!(login_response.status().as_u16(), 200, "Login failed");

        let cookies = login_response.cookies().collect::<Vec<_>>();
        let session_cookie = cookies
            .iter()
            .find(|c| c.name() == "session")
            .expect("session cookie not found in login response");
        assert!(session_cookie.value().starts_with("alice:"));
        assert!(session_cookie.http_only());
        assert_eq!(session_cookie.path(), Some("/"));
        assert!(session_cookie.expires().is_some());

        // Step 2: Session is recognized
        assert!(context.authenticated(client).await);

        let me_response = client
            .get(format!("{}/api/auth/me", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(me_response.status().as_u16(), 200);
        let me_body: Value = me_response.json().await.unwrap();
        assert_eq!(me_body["identity"], "alice");

        // Step 3: Logout clears the cookie and the stored session
        let logout_response = client
            .post(format!("{}/api/auth/logout", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(logout_response.status().as_u16(), 200);

        let cleared = logout_response
            .cookies()
            .find(|c| c.name() == "session")
            .expect("clearing cookie not found in logout response");
        assert_eq!(cleared.value(), "");

        assert!(!context.state.sessions.contains("alice"));
        assert!(!context.authenticated(client).await);

        let me_response = client
            .get(format!("{}/api/auth/me", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(me_response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_second_login_replaces_first() {
        let context = TestContext::new().await;
        let first = TestContext::client();
        let second = TestContext::client();

        assert_eq!(context.login(&first, "bob").await.status().as_u16(), 200);
        assert!(context.authenticated(&first).await);

        assert_eq!(context.login(&second, "bob").await.status().as_u16(), 200);
        assert!(context.authenticated(&second).await);
        assert!(!context.authenticated(&first).await);
    }

    #[tokio::test]
    async fn test_forged_and_malformed_cookies_rejected() {
        let context = TestContext::new().await;
        assert_eq!(context.login(&context.client, "carol").await.status().as_u16(), 200);

        let plain = reqwest::Client::new();
        for cookie in ["session=carol:forged", "session=carol", "session=", "session=nobody:abc"] {
            let response = plain
                .get(format!("{}/api/auth/me", context.base_url))
                .header("cookie", cookie)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status().as_u16(), 401, "cookie {:?} accepted", cookie);
        }

        assert!(context.authenticated(&context.client).await);
    }

    #[tokio::test]
    async fn test_login_rejects_invalid_username() {
        let context = TestContext::new().await;

        let response = context.login(&context.client, "a:b").await;
        assert_eq!(response.status().as_u16(), 400);

        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("Username"));
        assert!(context.state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_logout_without_session_still_clears() {
        let context = TestContext::new().await;

        let response = context
            .client
            .post(format!("{}/api/auth/logout", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert!(response.cookies().any(|c| c.name() == "session" && c.value().is_empty()));
    }
}
