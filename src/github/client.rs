//! Code-host REST client: per-installation JWT auth and a process-lifetime client cache.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize as De, Serialize as Ser};

use super::models::Review;

#[derive(Debug)]
pub enum Error {
  Http(reqwest::Error),
  Auth(String),
  CodeHost(String),
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Ser, De)]
struct Claims {
  iat: i64,
  exp: i64,
  iss: String,
}

#[derive(De)]
struct InstallationTokenRep {
  token: String,
}

/// Lists reviews for a PR, authenticating as a specific installation.
pub trait Client: 'static + Sync + Send + std::fmt::Debug {
  fn list_reviews(&self, installation_id: i64, repo_full_name: &str, pr_number: u64) -> Result<Vec<Review>>;
}

/// Mints and caches per-installation access tokens from a GitHub App id + private key.
#[derive(Debug)]
pub struct ClientCache {
  app_id: String,
  private_key_pem: String,
  base_url: String,
  client: &'static reqwest::blocking::Client,
  tokens: RwLock<HashMap<i64, CachedToken>>,
}

#[derive(Clone, Debug)]
struct CachedToken {
  token: String,
  expires_at: chrono::DateTime<Utc>,
}

impl ClientCache {
  pub fn new(app_id: String, private_key_pem: String, client: &'static reqwest::blocking::Client) -> Self {
    Self::with_base_url(app_id, private_key_pem, "https://api.github.com".to_string(), client)
  }

  /// Like `new`, but overriding the API base URL. Used by tests to point at a mock server.
  pub fn with_base_url(app_id: String,
                       private_key_pem: String,
                       base_url: String,
                       client: &'static reqwest::blocking::Client)
                       -> Self {
    Self { app_id,
           private_key_pem,
           base_url,
           client,
           tokens: RwLock::new(HashMap::new()) }
  }

  fn app_jwt(&self) -> Result<String> {
    let now = Utc::now();
    let claims = Claims { iat: (now - Duration::seconds(60)).timestamp(),
                          exp: (now + Duration::minutes(9)).timestamp(),
                          iss: self.app_id.clone() };

    let key = EncodingKey::from_rsa_pem(self.private_key_pem.as_bytes())
      .map_err(|e| Error::Auth(format!("invalid app private key: {}", e)))?;

    encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| Error::Auth(e.to_string()))
  }

  fn installation_token(&self, installation_id: i64) -> Result<String> {
    if let Some(cached) = self.tokens
                              .read()
                              .unwrap_or_else(|e| e.into_inner())
                              .get(&installation_id)
    {
      if cached.expires_at > Utc::now() + Duration::minutes(1) {
        return Ok(cached.token.clone());
      }
    }

    let jwt = self.app_jwt()?;
    let url = format!("{}/app/installations/{}/access_tokens", self.base_url, installation_id);

    let rep: InstallationTokenRep = self.client
                                         .post(&url)
                                         .header("authorization", format!("Bearer {}", jwt))
                                         .header("accept", "application/vnd.github+json")
                                         .header("user-agent", "prbridge")
                                         .send()
                                         .and_then(|r| r.error_for_status())
                                         .map_err(Error::Http)?
                                         .json()
                                         .map_err(Error::Http)?;

    self.tokens.write().unwrap_or_else(|e| e.into_inner()).insert(installation_id,
                                                                   CachedToken { token: rep.token.clone(),
                                                                                 expires_at: Utc::now()
                                                                                   + Duration::minutes(55) });

    Ok(rep.token)
  }
}

impl Client for ClientCache {
  fn list_reviews(&self, installation_id: i64, repo_full_name: &str, pr_number: u64) -> Result<Vec<Review>> {
    let token = self.installation_token(installation_id)?;
    let url = format!("{}/repos/{}/pulls/{}/reviews", self.base_url, repo_full_name, pr_number);

    self.client
        .get(&url)
        .header("authorization", format!("Bearer {}", token))
        .header("accept", "application/vnd.github+json")
        .header("user-agent", "prbridge")
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(Error::Http)?
        .json()
        .map_err(Error::Http)
  }
}
