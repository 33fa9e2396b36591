//! Device session client for the heating controller
//!
//! The controller's web interface hands out a session cookie on the login
//! page and expects a salted SHA-1 of that token as the login password.
//! Sessions are dropped silently after inactivity or a backend restart, so
//! the client treats any load failure as a stale session: it discards the
//! handle, re-authenticates, and retries the whole page set exactly once.

pub mod page;
pub mod typing;

use crate::config::DeviceConfig;
use crate::error::{KotelError, Result};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use typing::{RegisterValue, TypeOverrides};

/// One of the controller's register pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageId {
    /// Heating circuit settings
    Heating,
    /// Domestic hot water settings
    HotWater,
    /// Compressor settings and counters
    Compressor,
    /// Auxiliary electric boiler settings
    Boiler,
    /// Temperature sensor readings
    Temperatures,
    /// Output/relay statuses
    Statuses,
}

impl PageId {
    /// The full poll set
    pub const ALL: [PageId; 6] = [
        PageId::Heating,
        PageId::HotWater,
        PageId::Compressor,
        PageId::Boiler,
        PageId::Temperatures,
        PageId::Statuses,
    ];

    /// Resource name of the page on the controller
    pub fn resource(&self) -> &'static str {
        match self {
            PageId::Heating => "PAGE215.XML",
            PageId::HotWater => "PAGE213.XML",
            PageId::Compressor => "PAGE214.XML",
            PageId::Boiler => "PAGE218.XML",
            PageId::Temperatures => "PAGE210.XML",
            PageId::Statuses => "PAGE211.XML",
        }
    }

    /// Short identifier used in logs and errors
    pub fn key(&self) -> &'static str {
        match self {
            PageId::Heating => "heating",
            PageId::HotWater => "hot_water",
            PageId::Compressor => "compressor",
            PageId::Boiler => "boiler",
            PageId::Temperatures => "temperatures",
            PageId::Statuses => "statuses",
        }
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Typed registers of one page, keyed by register name
pub type PageSnapshot = HashMap<String, RegisterValue>;

/// One complete poll across all requested pages
pub type DeviceSnapshot = HashMap<PageId, PageSnapshot>;

/// Factory for authenticated device sessions
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Perform the login handshake and return a live session
    async fn open_session(&self) -> Result<Box<dyn DeviceSession>>;
}

/// An authenticated session able to fetch page documents
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Fetch the raw XML body of one page
    async fn fetch_page(&self, page: PageId) -> Result<String>;
}

#[async_trait]
impl<T: DeviceTransport + ?Sized> DeviceTransport for Arc<T> {
    async fn open_session(&self) -> Result<Box<dyn DeviceSession>> {
        (**self).open_session().await
    }
}

/// Session manager for the controller
///
/// Owns the transport and the current session handle. `load_pages` is the
/// single entry point; it re-authenticates lazily on failure.
pub struct KotelClient {
    transport: Box<dyn DeviceTransport>,
    session: Option<Box<dyn DeviceSession>>,
    overrides: TypeOverrides,
}

impl KotelClient {
    /// Create a client over an arbitrary transport
    pub fn new(transport: Box<dyn DeviceTransport>, overrides: TypeOverrides) -> Self {
        Self {
            transport,
            session: None,
            overrides,
        }
    }

    /// Create an HTTP client for the configured controller
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(
            Box::new(HttpTransport::new(config)),
            typing::default_overrides(),
        )
    }

    /// Load the requested pages into one snapshot
    ///
    /// Tries the existing session first. Any failure discards the handle
    /// and retries once through a freshly authenticated session; a second
    /// failure propagates. The fresh handle is kept even when its fetch
    /// fails, so the next cycle starts from the regular attempt path.
    pub async fn load_pages(&mut self, pages: &[PageId]) -> Result<DeviceSnapshot> {
        if let Some(session) = self.session.as_deref() {
            match fetch_all(session, pages, &self.overrides).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => {
                    warn!("Error during fetching; trying again with a fresh session: {e}");
                    self.session = None;
                }
            }
        }

        let session = self.session.insert(self.transport.open_session().await?);
        fetch_all(session.as_ref(), pages, &self.overrides).await
    }
}

async fn fetch_all(
    session: &dyn DeviceSession,
    pages: &[PageId],
    overrides: &TypeOverrides,
) -> Result<DeviceSnapshot> {
    let mut snapshot = DeviceSnapshot::new();
    for &page in pages {
        let content = session.fetch_page(page).await?;
        let registers = page::parse_page(&content, overrides)?;
        debug!("Found {} registers in page {page}", registers.len());
        snapshot.insert(page, registers);
    }
    info!("Loaded {} pages into a snapshot", snapshot.len());
    Ok(snapshot)
}

/// HTTP transport performing the cookie-and-digest login handshake
pub struct HttpTransport {
    base_url: Url,
    username: String,
    password: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the configured controller
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.timeout,
        }
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| KotelError::connection(format!("Invalid URL path {path}: {e}")))
    }
}

#[async_trait]
impl DeviceTransport for HttpTransport {
    async fn open_session(&self) -> Result<Box<dyn DeviceSession>> {
        debug!("Creating a fresh device session");

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(self.timeout)
            .user_agent(format!("kotel2influx/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KotelError::connection(format!("Failed to build HTTP client: {e}")))?;

        // Login page sets the session cookie the digest is salted with.
        let login_url = self.build_url("syswww/login.xml")?;
        let response = client
            .get(login_url.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        if !response.status().is_success() {
            return Err(KotelError::connection(format!(
                "Login page request failed with status {}",
                response.status()
            )));
        }

        let token = session_token(jar.as_ref(), &login_url)?;
        debug!("The login token is {token}");

        let mut sha1 = Sha1::new();
        sha1.update(token.as_bytes());
        sha1.update(self.password.as_bytes());
        let pass = hex::encode(sha1.finalize());

        let submit_url = self.build_url("syswww/LOGIN.XML")?;
        let response = client
            .post(submit_url)
            .form(&[("USER", self.username.as_str()), ("PASS", pass.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;
        if !response.status().is_success() {
            return Err(KotelError::authentication(format!(
                "Login submit failed with status {}",
                response.status()
            )));
        }
        debug!("Logged in using pass={pass}");

        Ok(Box::new(HttpSession {
            client,
            base_url: self.base_url.clone(),
        }))
    }
}

/// Live HTTP session carrying the authenticated cookie jar
struct HttpSession {
    client: Client,
    base_url: Url,
}

#[async_trait]
impl DeviceSession for HttpSession {
    async fn fetch_page(&self, page: PageId) -> Result<String> {
        let url = self
            .base_url
            .join(page.resource())
            .map_err(|e| KotelError::connection(format!("Invalid page URL: {e}")))?;

        let response = self.client.get(url).send().await.map_err(map_transport_error)?;
        if !response.status().is_success() {
            return Err(KotelError::connection(format!(
                "Page {page} request failed with status {}",
                response.status()
            )));
        }

        let content = response.text().await.map_err(map_transport_error)?;
        debug!("Loaded page {page}");
        Ok(content)
    }
}

/// Pull the session token out of the cookie the login page set
fn session_token(jar: &Jar, url: &Url) -> Result<String> {
    use reqwest::cookie::CookieStore;

    let header = jar
        .cookies(url)
        .ok_or_else(|| KotelError::authentication("Login page did not set a session cookie"))?;
    let cookies = header
        .to_str()
        .map_err(|e| KotelError::authentication(format!("Unreadable session cookie: {e}")))?;

    // First cookie pair carries the token.
    let first = cookies.split(';').next().unwrap_or("");
    let token = first.splitn(2, '=').nth(1).ok_or_else(|| {
        KotelError::authentication(format!("Session cookie has no value: {cookies:?}"))
    })?;
    Ok(token.trim().to_string())
}

fn map_transport_error(e: reqwest::Error) -> KotelError {
    if e.is_timeout() {
        KotelError::timeout(format!("Device request timed out: {e}"))
    } else if e.is_connect() {
        KotelError::connection(format!("Device connection failed: {e}"))
    } else {
        KotelError::Http(e)
    }
}
