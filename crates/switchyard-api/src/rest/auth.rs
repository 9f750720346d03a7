// REST session authentication
//
// Form-encoded login sets a session cookie in the client's jar; the
// response may also carry a CSRF token required on writes.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::client::RestClient;
use crate::error::Error;

impl RestClient {
    /// `POST /login` with form-encoded credentials.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url("login")?;
        debug!("logging in at {}", url);

        let resp = self
            .http()
            .post(url)
            .form(&[
                ("username", username),
                ("password", password.expose_secret()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", body.trim()),
            });
        }

        let token = resp
            .headers()
            .get("X-Csrf-Token")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.set_csrf_token(token);

        debug!("login successful");
        Ok(())
    }

    /// `POST /logout`. Sessions are a scarce resource on most switches.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.url("logout")?;
        debug!("logging out at {}", url);
        self.post(url, &serde_json::json!({})).await?;
        self.set_csrf_token(None);
        Ok(())
    }
}
