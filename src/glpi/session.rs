use crate::config::Settings;
use crate::error::{Error, Result};
use crate::glpi::urls::{self, Urls};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const PAGE_SIZE: usize = 50;
const RANGE_EXCEEDED: &str = "ERROR_RANGE_EXCEED_TOTAL";
const NOT_FOUND: &str = "ERROR_RESOURCE_NOT_FOUND_NOR_COMMONDBTM";

/// An authenticated GLPI REST session. The session is killed on drop.
pub struct Session {
    client: Client,
    urls: Urls,
    user_token: String,
    session_token: String,
}

/// What one page of a paginated listing turned out to be.
#[derive(Debug, PartialEq)]
pub enum Page {
    Items(Vec<Value>),
    End,
}

/// Classifies a page body. GLPI ends a listing with an error array
/// (`["ERROR_...", "message"]`) rather than an empty page.
pub fn classify_page(body: Value) -> Result<Page> {
    match body {
        Value::Array(items) => match items.first() {
            None => Ok(Page::End),
            Some(Value::String(code)) if code == RANGE_EXCEEDED || code == NOT_FOUND => Ok(Page::End),
            Some(Value::String(code)) if code.starts_with("ERROR_") => Err(Error::Api {
                status: 400,
                url: String::new(),
                body: Value::Array(items).to_string(),
            }),
            Some(_) => Ok(Page::Items(items)),
        },
        other => Err(Error::Api {
            status: 200,
            url: String::new(),
            body: format!("expected a list, got {}", other),
        }),
    }
}

#[derive(Deserialize)]
struct CreatedItem {
    #[serde(deserialize_with = "crate::glpi::de::u64_lenient")]
    id: u64,
}

#[derive(Serialize)]
struct Input<'a, T: Serialize> {
    input: &'a T,
}

fn build_client(settings: &Settings, accept_invalid_certs: bool) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()?)
}

fn request_session_token(client: &Client, urls: &Urls, user_token: &str) -> Result<String> {
    let response = client
        .get(urls.init_session())
        .header("Authorization", format!("user_token {}", user_token))
        .send()?;
    let status = response.status();
    let body: Value = response.json()?;

    match body.get("session_token").and_then(Value::as_str) {
        Some(token) if status.is_success() => Ok(token.to_string()),
        _ => Err(Error::Session(format!("HTTP {}: {}", status, body))),
    }
}

impl Session {
    /// Opens a session against the configured instance, trying https before
    /// http for bare hosts.
    pub fn open(settings: &Settings) -> Result<Self> {
        let mut last_error = None;
        for home in urls::candidate_homes(&settings.instance) {
            match Self::open_at(settings, Urls::new(&home)) {
                Ok(session) => return Ok(session),
                Err(Error::Http(e)) if e.is_connect() || e.is_timeout() => {
                    log::debug!("Could not reach {}: {}", home, e);
                    last_error = Some(Error::Http(e));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            Error::Session(format!("no usable address for '{}'", settings.instance))
        }))
    }

    fn open_at(settings: &Settings, urls: Urls) -> Result<Self> {
        log::debug!("Initializing the REST session at {}", urls.init_session());
        let client = build_client(settings, false)?;
        let (client, session_token) = match request_session_token(&client, &urls, &settings.token) {
            Ok(token) => (client, token),
            Err(Error::Http(e)) if settings.no_verify && e.is_connect() => {
                log::warn!(
                    "TLS connection to {} failed ({}), retrying without certificate validation",
                    urls.home,
                    e
                );
                let client = build_client(settings, true)?;
                let token = request_session_token(&client, &urls, &settings.token)?;
                (client, token)
            }
            Err(e) => return Err(e),
        };
        log::info!("Session opened on {}", urls.home);

        Ok(Session {
            client,
            urls,
            user_token: settings.token.clone(),
            session_token,
        })
    }

    pub fn urls(&self) -> &Urls {
        &self.urls
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("user_token {}", self.user_token))
            .header("Session-Token", &self.session_token)
    }

    fn checked(url: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        })
    }

    /// GET a single resource and decode it.
    pub fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("GET {}", url);
        let response = self.authorized(self.client.get(url)).send()?;
        let body = Self::checked(url, response)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET a resource referenced by a link in a previous response.
    pub fn follow<T: DeserializeOwned>(&self, href: &str) -> Result<T> {
        self.get(&self.urls.resolve_link(href))
    }

    /// Fetches every record of a collection, page by page.
    pub fn list_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut records = Vec::new();
        let mut start = 0;
        loop {
            let page_url = urls::with_range(url, start, PAGE_SIZE);
            log::debug!("GET {}", page_url);
            let response = self.authorized(self.client.get(&page_url)).send()?;
            let status = response.status();
            let text = response.text()?;
            let body: Value = match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(_) if !status.is_success() => {
                    return Err(Error::Api {
                        status: status.as_u16(),
                        url: page_url,
                        body: text,
                    })
                }
                Err(e) => return Err(e.into()),
            };

            let page = classify_page(body).map_err(|e| match e {
                Error::Api { body, .. } => Error::Api {
                    status: status.as_u16(),
                    url: page_url.clone(),
                    body,
                },
                other => other,
            })?;
            match page {
                Page::End => break,
                Page::Items(items) => {
                    let count = items.len();
                    for item in items {
                        records.push(serde_json::from_value(item)?);
                    }
                    if count < PAGE_SIZE {
                        break;
                    }
                    start += PAGE_SIZE;
                }
            }
        }
        log::debug!("Fetched {} records from {}", records.len(), url);
        Ok(records)
    }

    /// POSTs `{"input": body}` and returns the id of the created item.
    pub fn create<T: Serialize>(&self, itemtype: &str, body: &T) -> Result<u64> {
        let url = self.urls.endpoint(itemtype);
        log::debug!("POST {}", url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&Input { input: body })
            .send()?;
        let created: CreatedItem = Self::checked(&url, response)?.json()?;
        Ok(created.id)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let url = self.urls.kill_session();
        log::debug!("Killing session: {}", url);
        match self.authorized(self.client.get(&url)).send() {
            Ok(response) if !response.status().is_success() => {
                log::warn!("killSession returned HTTP {}", response.status());
            }
            Ok(_) => {}
            Err(e) => log::warn!("Failed to kill the GLPI session: {}", e),
        }
    }
}
