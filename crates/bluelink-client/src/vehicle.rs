//! Vehicle handle and remote actions

use std::fmt;
use std::sync::{Arc, OnceLock};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::Channel;
use crate::envelope::{field, response_string};
use crate::error::{BlueLinkError, Result};
use crate::types::{AuthContext, Coordinates, StartOptions, VehicleRecord};

/// Protocol generation marker sent with every vehicle request
const GENERATION: &str = "2";

/// Headers the dashboard's browser client sends with remote actions
const BROWSER_HEADERS: [(&str, &str); 11] = [
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    (
        "content-type",
        "application/x-www-form-urlencoded; charset=UTF-8",
    ),
    ("csrf-token", "undefined"),
    (
        "sec-ch-ua",
        r#"" Not A;Brand";v="99", "Chromium";v="96", "Google Chrome";v="96""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""macOS""#),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    ("x-requested-with", "XMLHttpRequest"),
];

/// Remote actions a vehicle supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteAction {
    Lock,
    Unlock,
    Start,
    Stop,
    Find,
    Odometer,
}

impl RemoteAction {
    /// Service code sent in the `service` form field
    pub fn service(&self) -> &'static str {
        match self {
            RemoteAction::Lock => "remotelock",
            RemoteAction::Unlock => "remoteunlock",
            RemoteAction::Start => "ignitionstart",
            RemoteAction::Stop => "ignitionstop",
            RemoteAction::Find => "getFindMyCar",
            RemoteAction::Odometer => "getRecMaintenanceTimeline",
        }
    }

    /// Endpoint path; maintenance history lives on its own servlet
    pub fn path(&self) -> &'static str {
        match self {
            RemoteAction::Odometer => "/bin/common/VehicleHealthServlet",
            _ => "/bin/common/remoteAction",
        }
    }
}

impl fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service())
    }
}

fn browser_headers() -> HeaderMap {
    BROWSER_HEADERS
        .into_iter()
        .map(|(name, value)| {
            (
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect()
}

/// A vehicle on a BlueLink account
///
/// Handles are created by [`BlueLink::vehicles`](crate::BlueLink::vehicles)
/// and share the session's HTTP channel and login state.
#[derive(Clone)]
pub struct Vehicle {
    record: VehicleRecord,
    channel: Arc<Channel>,
    auth: Arc<OnceLock<AuthContext>>,
}

impl Vehicle {
    pub(crate) fn new(
        record: VehicleRecord,
        channel: Arc<Channel>,
        auth: Arc<OnceLock<AuthContext>>,
    ) -> Self {
        Self {
            record,
            channel,
            auth,
        }
    }

    pub fn nickname(&self) -> &str {
        &self.record.nickname
    }

    pub fn model(&self) -> &str {
        &self.record.model
    }

    pub fn year(&self) -> u16 {
        self.record.year
    }

    pub fn vin(&self) -> &str {
        &self.record.vin
    }

    pub fn registration_id(&self) -> &str {
        &self.record.registration_id
    }

    /// Whether the vehicle has a BlueLink telematics unit
    pub fn is_bluelink(&self) -> bool {
        self.record.bluelink
    }

    /// Raw account-info entry for this vehicle
    pub fn info(&self) -> &Value {
        &self.record.info
    }

    #[instrument(skip(self), fields(vin = %self.record.vin))]
    pub async fn lock(&self) -> Result<bool> {
        self.request(RemoteAction::Lock, Vec::new()).await?;
        Ok(true)
    }

    #[instrument(skip(self), fields(vin = %self.record.vin))]
    pub async fn unlock(&self) -> Result<bool> {
        self.request(RemoteAction::Unlock, Vec::new()).await?;
        Ok(true)
    }

    /// Remote start with climate control.
    ///
    /// `options.duration` is not capped locally; the service rejects
    /// anything above 10 minutes.
    #[instrument(skip(self), fields(vin = %self.record.vin))]
    pub async fn start(&self, options: StartOptions) -> Result<bool> {
        let extra = options
            .form_fields()
            .map_err(|e| BlueLinkError::unexpected(RemoteAction::Start.service(), e.to_string()))?;
        self.request(RemoteAction::Start, extra).await?;
        Ok(true)
    }

    #[instrument(skip(self), fields(vin = %self.record.vin))]
    pub async fn stop(&self) -> Result<bool> {
        self.request(RemoteAction::Stop, Vec::new()).await?;
        Ok(true)
    }

    /// Locate the vehicle
    #[instrument(skip(self), fields(vin = %self.record.vin))]
    pub async fn find(&self) -> Result<Coordinates> {
        let action = RemoteAction::Find.service();
        let json = self.request(RemoteAction::Find, Vec::new()).await?;

        let coord = field(response_string(&json, action)?, "coord", action)?;
        serde_json::from_value(coord.clone())
            .map_err(|e| BlueLinkError::unexpected(action, format!("invalid `coord`: {}", e)))
    }

    /// Current mileage from the latest maintenance record
    #[instrument(skip(self), fields(vin = %self.record.vin))]
    pub async fn odometer(&self) -> Result<u64> {
        let action = RemoteAction::Odometer.service();
        let json = self.request(RemoteAction::Odometer, Vec::new()).await?;

        let latest = field(response_string(&json, action)?, "MaintenanceInfo", action)?
            .get(0)
            .ok_or_else(|| BlueLinkError::unexpected(action, "no maintenance records"))?;

        parse_mileage(field(latest, "CurrentMileage", action)?)
            .ok_or_else(|| BlueLinkError::unexpected(action, "`CurrentMileage` is not a number"))
    }

    /// Send one remote action and validate the response.
    async fn request(
        &self,
        action: RemoteAction,
        extra: Vec<(&'static str, String)>,
    ) -> Result<Value> {
        let auth = self.auth.get().ok_or(BlueLinkError::NotLoggedIn)?;

        let mut fields: Vec<(&str, String)> = auth.form_fields().into();
        fields.extend([
            ("vin", self.record.vin.clone()),
            ("url", self.channel.home().to_string()),
            ("gen", GENERATION.to_string()),
            ("regId", self.record.registration_id.clone()),
            ("service", action.service().to_string()),
        ]);
        fields.extend(extra);

        debug!(%action, path = action.path(), "Sending remote action");
        self.channel
            .post_form(action.path(), browser_headers(), &fields, action.service())
            .await
    }
}

/// Mileage arrives as a number or a numeric string
fn parse_mileage(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl fmt::Debug for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vehicle")
            .field("nickname", &self.record.nickname)
            .field("vin", &self.record.vin)
            .field("bluelink", &self.record.bluelink)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_odometer_uses_maintenance_endpoint() {
        assert_eq!(
            RemoteAction::Odometer.path(),
            "/bin/common/VehicleHealthServlet"
        );
        for action in [
            RemoteAction::Lock,
            RemoteAction::Unlock,
            RemoteAction::Start,
            RemoteAction::Stop,
            RemoteAction::Find,
        ] {
            assert_eq!(action.path(), "/bin/common/remoteAction");
        }
    }

    #[test]
    fn test_service_codes() {
        assert_eq!(RemoteAction::Lock.service(), "remotelock");
        assert_eq!(RemoteAction::Unlock.service(), "remoteunlock");
        assert_eq!(RemoteAction::Start.service(), "ignitionstart");
        assert_eq!(RemoteAction::Stop.service(), "ignitionstop");
        assert_eq!(RemoteAction::Find.to_string(), "getFindMyCar");
    }

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert_eq!(headers.len(), 11);
        assert_eq!(headers["x-requested-with"], "XMLHttpRequest");
        assert_eq!(headers["sec-ch-ua-platform"], "\"macOS\"");
        assert_eq!(
            headers["content-type"],
            "application/x-www-form-urlencoded; charset=UTF-8"
        );
    }

    #[test]
    fn test_parse_mileage() {
        assert_eq!(parse_mileage(&json!(12345)), Some(12345));
        assert_eq!(parse_mileage(&json!("12345")), Some(12345));
        assert_eq!(parse_mileage(&json!(" 87 ")), Some(87));
        assert_eq!(parse_mileage(&json!(100.9)), Some(100));
        assert_eq!(parse_mileage(&json!("n/a")), None);
        assert_eq!(parse_mileage(&json!(null)), None);
    }
}
