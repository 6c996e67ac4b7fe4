//! SSO token exchange: landing page → login → redirect → access_token.

use yqfk_core::error::{Result, YqfkError};
use yqfk_core::types::{AccessToken, Credentials};

use crate::extract;
use crate::session::PortalSession;

impl PortalSession {
    /// Run the three-step SSO exchange and return the report API token.
    ///
    /// Nothing is retried; the first failing step ends the exchange.
    pub async fn resolve_token(&self, credentials: &Credentials) -> Result<AccessToken> {
        // 1. Anti-forgery token from the landing page
        let page = self.fetch_landing_page().await?;
        let form_token = extract::extract_form_token(&page)?;
        tracing::debug!("SSO form token found");

        // 2. Login
        let body = self.login(credentials, &form_token).await?;
        extract::check_login(&body)?;
        tracing::info!("SSO login succeeded for {}", credentials.username());

        // 3. Follow the embedded redirect and read the token off the final URL
        let redirect = extract::extract_redirect_url(&body)?;
        let final_url = self.follow_redirect(&redirect).await?;
        let token = extract::extract_access_token(&final_url)?;
        Ok(AccessToken::new(token))
    }

    async fn fetch_landing_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoints.sso_url)
            .send()
            .await
            .map_err(|e| YqfkError::PageFetch(format!("landing page: {e}")))?;
        tracing::debug!("SSO landing page: {}", response.status());
        response
            .text()
            .await
            .map_err(|e| YqfkError::PageFetch(format!("landing page body: {e}")))
    }

    async fn login(&self, credentials: &Credentials, form_token: &str) -> Result<String> {
        let form = [
            ("username", credentials.username()),
            ("password", credentials.password()),
            ("__token__", form_token),
        ];
        let response = self
            .client
            .post(&self.endpoints.sso_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| YqfkError::PageFetch(format!("login: {e}")))?;
        response
            .text()
            .await
            .map_err(|e| YqfkError::PageFetch(format!("login body: {e}")))
    }

    /// GET the redirect target and return the URL the client ends up on.
    async fn follow_redirect(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| YqfkError::PageFetch(format!("token redirect: {e}")))?;
        Ok(response.url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Endpoints;
    use httpmock::prelude::*;

    fn session_for(server: &MockServer) -> PortalSession {
        PortalSession::new(Endpoints {
            sso_url: server.url("/home.html"),
            report_base_url: server.url("/base_info/"),
        })
        .unwrap()
    }

    /// JSON-style escaping the portal applies to the embedded URL.
    fn json_escaped(url: &str) -> String {
        url.replace('/', "\\/")
    }

    #[tokio::test]
    async fn test_resolve_token_end_to_end() {
        let server = MockServer::start_async().await;

        let landing = server
            .mock_async(|when, then| {
                when.method(GET).path("/home.html");
                then.status(200)
                    .body(r#"<script>var token = "abc123";</script>"#);
            })
            .await;

        let login_body = format!(
            r#"{{"code":1,"message":"验证通过","info":"{}"}}"#,
            json_escaped(&server.url("/start"))
        );
        let login = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/home.html")
                    .header("content-type", "application/x-www-form-urlencoded");
                then.status(200).body(login_body);
            })
            .await;

        let redirect = server
            .mock_async(|when, then| {
                when.method(GET).path("/start");
                then.status(302)
                    .header("Location", server.url("/cb?access_token=TOK1"));
            })
            .await;

        let callback = server
            .mock_async(|when, then| {
                when.method(GET).path("/cb").query_param("access_token", "TOK1");
                then.status(200).body("ok");
            })
            .await;

        let session = session_for(&server);
        let token = session
            .resolve_token(&Credentials::new("alice", "pw"))
            .await
            .unwrap();

        assert_eq!(token.as_str(), "TOK1");
        landing.assert_async().await;
        login.assert_async().await;
        redirect.assert_async().await;
        callback.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_failure_stops_before_redirect() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/home.html");
                then.status(200).body(r#"var token = "abc123";"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/home.html");
                // Carries a redirect URL but no success marker
                then.status(200).body(format!(
                    r#"{{"code":0,"message":"密码错误","info":"{}"}}"#,
                    json_escaped(&server.url("/start"))
                ));
            })
            .await;
        let redirect = server
            .mock_async(|when, then| {
                when.method(GET).path("/start");
                then.status(200);
            })
            .await;

        let session = session_for(&server);
        let err = session
            .resolve_token(&Credentials::new("alice", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, YqfkError::LoginFailed));
        redirect.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_session_cookie_carried_to_login() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/home.html");
                then.status(200)
                    .header("Set-Cookie", "PHPSESSID=s1; path=/")
                    .body(r#"var token = "abc123";"#);
            })
            .await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/home.html")
                    .cookie("PHPSESSID", "s1");
                then.status(200).body(r#"{"message":"密码错误"}"#);
            })
            .await;

        let session = session_for(&server);
        let err = session
            .resolve_token(&Credentials::new("alice", "pw"))
            .await
            .unwrap_err();

        // Login mock only answers when the landing-page cookie came along
        assert!(matches!(err, YqfkError::LoginFailed));
        login.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_missing_form_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/home.html");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;
        let login = server
            .mock_async(|when, then| {
                when.method(POST).path("/home.html");
                then.status(200);
            })
            .await;

        let session = session_for(&server);
        let err = session
            .resolve_token(&Credentials::new("alice", "pw"))
            .await
            .unwrap_err();

        assert!(matches!(err, YqfkError::TokenNotFound));
        login.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_redirect_without_access_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/home.html");
                then.status(200).body(r#"var token = "abc123";"#);
            })
            .await;
        let login_body = format!(
            r#"{{"message":"验证通过","info":"{}"}}"#,
            json_escaped(&server.url("/cb?code=expired"))
        );
        server
            .mock_async(|when, then| {
                when.method(POST).path("/home.html");
                then.status(200).body(login_body);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cb");
                then.status(200);
            })
            .await;

        let session = session_for(&server);
        let err = session
            .resolve_token(&Credentials::new("alice", "pw"))
            .await
            .unwrap_err();

        assert!(matches!(err, YqfkError::AccessTokenNotFound));
    }

    #[tokio::test]
    async fn test_unreachable_portal() {
        let session = PortalSession::new(Endpoints {
            sso_url: "http://127.0.0.1:1/home.html".into(),
            report_base_url: "http://127.0.0.1:1/".into(),
        })
        .unwrap();
        let err = session
            .resolve_token(&Credentials::new("alice", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, YqfkError::PageFetch(_)));
    }
}
