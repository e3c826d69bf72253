//! BlueLink account session

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::envelope::{self, response_string, str_field};
use crate::error::{BlueLinkError, Result};
use crate::types::{AuthContext, VehicleRecord};
use crate::vehicle::Vehicle;

/// Anti-forgery token issuer
const TOKEN_PATH: &str = "/etc/designs/ownercommon/us/token.json";
/// Anti-forgery token check
const CSRF_CHECK_PATH: &str = "/libs/granite/csrf/token.json";
/// Credential submission
const LOGIN_PATH: &str = "/bin/common/connectCar";
/// Account info (vehicle list)
const ACCOUNT_PATH: &str = "/bin/common/MyAccountServlet";

const LOGIN_ACTION: &str = "login";
const VEHICLES_ACTION: &str = "get cars";

/// HTTP channel shared by a session and all of its vehicles.
///
/// Wraps one `reqwest::Client` (one connection pool, one cookie jar).
#[derive(Debug)]
pub(crate) struct Channel {
    client: Client,
    base_url: Url,
    home: String,
}

impl Channel {
    fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let base_url = Url::parse(&config.base_url)?;
        let home = base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            home,
        })
    }

    /// Service origin without trailing slash; sent as the `url` form field
    pub(crate) fn home(&self) -> &str {
        &self.home
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// POST a form and validate the response envelope.
    pub(crate) async fn post_form(
        &self,
        path: &str,
        headers: HeaderMap,
        fields: &[(&str, String)],
        action: &str,
    ) -> Result<Value> {
        let url = self.url(path)?;
        debug!(%url, action, "POST");

        let response = self
            .client
            .post(url)
            .headers(headers)
            .form(fields)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        envelope::validate(status, &body, action)
    }
}

/// BlueLink account session
///
/// Owns the credentials, the login state and the vehicle list cache.
///
/// ```rust,no_run
/// use bluelink_client::BlueLink;
///
/// # async fn run() -> bluelink_client::Result<()> {
/// let mut bluelink = BlueLink::from_env()?;
/// bluelink.login().await?;
///
/// if let Some(car) = bluelink.vehicle("KM8KN4AE0NU000001").await? {
///     car.lock().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct BlueLink {
    credentials: Credentials,
    channel: Arc<Channel>,
    auth: Arc<OnceLock<AuthContext>>,
    vehicles: BTreeMap<String, Vehicle>,
}

impl BlueLink {
    /// Create a session against the production service
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a session with credentials taken from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?)
    }

    /// Create a session with custom transport configuration
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        Ok(Self {
            credentials,
            channel: Arc::new(Channel::new(&config)?),
            auth: Arc::new(OnceLock::new()),
            vehicles: BTreeMap::new(),
        })
    }

    /// Account email
    pub fn email(&self) -> &str {
        &self.credentials.email
    }

    /// Whether `login()` has completed
    pub fn is_logged_in(&self) -> bool {
        self.auth.get().is_some()
    }

    /// Log in to the dashboard.
    ///
    /// Does nothing if the session is already logged in.
    #[instrument(skip(self))]
    pub async fn login(&mut self) -> Result<()> {
        if self.is_logged_in() {
            return Ok(());
        }

        let csrf = self.fetch_csrf_token().await?;
        self.check_csrf_token(&csrf).await?;

        let fields = [
            (":cq_csrf_token", csrf),
            ("username", self.credentials.email.clone()),
            ("password", self.credentials.password.clone()),
            ("url", format!("{}/us/en/index.html", self.channel.home())),
        ];
        let json = self
            .channel
            .post_form(LOGIN_PATH, HeaderMap::new(), &fields, LOGIN_ACTION)
            .await?;

        let token = str_field(response_string(&json, LOGIN_ACTION)?, "jwt_id", LOGIN_ACTION)?;

        // Cannot already be set: `&mut self` and the early return above
        let _ = self.auth.set(AuthContext {
            username: self.credentials.email.clone(),
            pin: self.credentials.pin.clone(),
            token: token.to_string(),
        });
        info!(email = %self.credentials.email, "Logged in");
        Ok(())
    }

    async fn fetch_csrf_token(&self) -> Result<String> {
        let url = self.channel.url(TOKEN_PATH)?;
        debug!(%url, "Fetching CSRF token");

        let response = self.channel.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(BlueLinkError::Status {
                action: LOGIN_ACTION.to_string(),
                status: status.as_u16(),
            });
        }

        let json: Value =
            serde_json::from_str(&body).map_err(|_| BlueLinkError::MalformedResponse {
                action: LOGIN_ACTION.to_string(),
                body: body.clone(),
            })?;
        Ok(str_field(&json, "jwt_token", LOGIN_ACTION)?.to_string())
    }

    async fn check_csrf_token(&self, csrf: &str) -> Result<()> {
        let url = self.channel.url(CSRF_CHECK_PATH)?;
        debug!(%url, "Validating CSRF token");

        let response = self
            .channel
            .client
            .get(url)
            .header("csrf_token", csrf)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(BlueLinkError::CsrfRejected);
        }
        Ok(())
    }

    /// Vehicles on the account, keyed by VIN.
    ///
    /// Fetched on first use and cached for the lifetime of the session.
    #[instrument(skip(self))]
    pub async fn vehicles(&mut self) -> Result<&BTreeMap<String, Vehicle>> {
        let auth = self.auth.get().ok_or(BlueLinkError::NotLoggedIn)?;

        if !self.vehicles.is_empty() {
            return Ok(&self.vehicles);
        }

        let fields = [
            ("username", self.credentials.email.clone()),
            ("token", auth.token.clone()),
            ("url", format!("{}/us/en/page/dashboard.html", self.channel.home())),
            ("service", "getOwnerInfoService".to_string()),
        ];
        let json = self
            .channel
            .post_form(ACCOUNT_PATH, HeaderMap::new(), &fields, VEHICLES_ACTION)
            .await?;

        let list = envelope::field(
            response_string(&json, VEHICLES_ACTION)?,
            "OwnersVehiclesInfo",
            VEHICLES_ACTION,
        )?
        .as_array()
        .ok_or_else(|| {
            BlueLinkError::unexpected(VEHICLES_ACTION, "`OwnersVehiclesInfo` is not a list")
        })?;

        let mut vehicles = BTreeMap::new();
        for info in list {
            let record = VehicleRecord::from_info(info)
                .map_err(|e| BlueLinkError::unexpected(VEHICLES_ACTION, e.to_string()))?;
            vehicles.insert(
                record.vin.clone(),
                Vehicle::new(record, self.channel.clone(), self.auth.clone()),
            );
        }
        debug!(count = vehicles.len(), "Fetched vehicles");

        self.vehicles = vehicles;
        Ok(&self.vehicles)
    }

    /// Look up a vehicle by VIN; `None` if the account has no such vehicle
    pub async fn vehicle(&mut self, vin: &str) -> Result<Option<&Vehicle>> {
        Ok(self.vehicles().await?.get(vin))
    }

    /// Build a handle for a vehicle record that did not come from `vehicles()`.
    ///
    /// The handle shares this session's channel and login state.
    pub fn vehicle_handle(&self, record: VehicleRecord) -> Vehicle {
        Vehicle::new(record, self.channel.clone(), self.auth.clone())
    }
}

impl fmt::Debug for BlueLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlueLink")
            .field("email", &self.credentials.email)
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}
