//! Request and response types for the BlueLink client

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Auth Types
// =============================================================================

/// Authorization attached to every vehicle request, set once by `login()`
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Account identifier (the login email)
    pub username: String,
    pub pin: String,
    /// Session token (`jwt_id` from the login response)
    pub token: String,
}

impl AuthContext {
    /// Form fields carried by every authorized request
    pub(crate) fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("username", self.username.clone()),
            ("pin", self.pin.clone()),
            ("token", self.token.clone()),
        ]
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Vehicle Types
// =============================================================================

/// Vehicle entry from the account info (`OwnersVehiclesInfo`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(rename = "VehicleNickName", default, deserialize_with = "nullable_string")]
    pub nickname: String,
    #[serde(rename = "Name", default, deserialize_with = "nullable_string")]
    pub model: String,
    #[serde(rename = "Year", deserialize_with = "loose_year")]
    pub year: u16,
    #[serde(rename = "VinNumber")]
    pub vin: String,
    #[serde(rename = "RegistrationID", deserialize_with = "loose_string")]
    pub registration_id: String,
    #[serde(rename = "IsBlueLinkCar", default, deserialize_with = "loose_bool")]
    pub bluelink: bool,
    /// Raw account-info entry as returned by the service
    #[serde(skip)]
    pub info: Value,
}

impl VehicleRecord {
    /// Parse one `OwnersVehiclesInfo` entry, keeping a copy of the raw JSON
    pub fn from_info(info: &Value) -> serde_json::Result<Self> {
        let mut record = Self::deserialize(info)?;
        record.info = info.clone();
        Ok(record)
    }
}

/// Vehicle location reported by `getFindMyCar`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl From<Coordinates> for (f64, f64) {
    fn from(c: Coordinates) -> Self {
        (c.latitude, c.longitude)
    }
}

// =============================================================================
// Remote Start Types
// =============================================================================

/// Climate setpoint for remote start
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temperature {
    Hi,
    Lo,
    /// Numeric setpoint, passed through as written (`72`, `72.5`)
    Degrees(f32),
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Hi => f.write_str("HI"),
            Temperature::Lo => f.write_str("LO"),
            Temperature::Degrees(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for Temperature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("hi") {
            Ok(Temperature::Hi)
        } else if s.eq_ignore_ascii_case("lo") {
            Ok(Temperature::Lo)
        } else {
            s.parse::<f32>()
                .ok()
                .filter(|t| t.is_finite())
                .map(Temperature::Degrees)
                .ok_or_else(|| format!("invalid temperature '{}': expected HI, LO, or a number", s))
        }
    }
}

/// Options for `Vehicle::start`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartOptions {
    /// Minutes to run the engine; the service caps this at 10
    pub duration: u32,
    pub temperature: Temperature,
    pub defrost: bool,
    /// Seat heat level, service scale 0-4
    pub driver_seat_heat: u8,
    pub passenger_seat_heat: u8,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            duration: 10,
            temperature: Temperature::Lo,
            defrost: false,
            driver_seat_heat: 4,
            passenger_seat_heat: 4,
        }
    }
}

/// Seat heater sub-document; the service wants it as a JSON string value
#[derive(Debug, Serialize)]
pub(crate) struct SeatHeaterVentInfo {
    #[serde(rename = "drvSeatHeatState")]
    pub driver: u8,
    #[serde(rename = "astSeatHeatState")]
    pub passenger: u8,
}

impl StartOptions {
    /// Action-specific form fields for `ignitionstart`
    pub(crate) fn form_fields(&self) -> serde_json::Result<Vec<(&'static str, String)>> {
        let seat_info = serde_json::to_string(&SeatHeaterVentInfo {
            driver: self.driver_seat_heat,
            passenger: self.passenger_seat_heat,
        })?;

        Ok(vec![
            ("airCtrl", "true".to_string()),
            ("igniOnDuration", self.duration.to_string()),
            ("airTempvalue", self.temperature.to_string()),
            ("defrost", self.defrost.to_string()),
            ("heating1", "0".to_string()),
            ("seatHeaterVentInfo", seat_info),
        ])
    }
}

// =============================================================================
// Lenient field decoding
// =============================================================================

fn nullable_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn loose_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn loose_year<'de, D: Deserializer<'de>>(d: D) -> Result<u16, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid year {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid year '{}'", s))),
        other => Err(serde::de::Error::custom(format!("invalid year {}", other))),
    }
}

fn loose_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "y" | "yes"
        ),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_vehicle_record_from_info() {
        let info = json!({
            "VehicleNickName": "Daily",
            "Name": "Ioniq 5",
            "Year": "2022",
            "VinNumber": "KM8KN4AE0NU000001",
            "RegistrationID": "H00001",
            "IsBlueLinkCar": "true",
            "Color": "Gravity Gold"
        });
        let record = VehicleRecord::from_info(&info).unwrap();
        assert_eq!(record.nickname, "Daily");
        assert_eq!(record.model, "Ioniq 5");
        assert_eq!(record.year, 2022);
        assert_eq!(record.vin, "KM8KN4AE0NU000001");
        assert_eq!(record.registration_id, "H00001");
        assert!(record.bluelink);
        assert_eq!(record.info["Color"], "Gravity Gold");
    }

    #[test]
    fn test_vehicle_record_numeric_fields() {
        let info = json!({
            "VehicleNickName": null,
            "Name": "Tucson",
            "Year": 2021,
            "VinNumber": "5NMJB3AE0MH000002",
            "RegistrationID": 42,
            "IsBlueLinkCar": 0
        });
        let record = VehicleRecord::from_info(&info).unwrap();
        assert_eq!(record.nickname, "");
        assert_eq!(record.year, 2021);
        assert_eq!(record.registration_id, "42");
        assert!(!record.bluelink);
    }

    #[test]
    fn test_vehicle_record_requires_vin() {
        let info = json!({"Name": "Tucson", "Year": 2021, "RegistrationID": "R"});
        assert!(VehicleRecord::from_info(&info).is_err());
    }

    #[test]
    fn test_temperature_parse() {
        assert_eq!("HI".parse::<Temperature>().unwrap(), Temperature::Hi);
        assert_eq!("lo".parse::<Temperature>().unwrap(), Temperature::Lo);
        assert_eq!("72".parse::<Temperature>().unwrap(), Temperature::Degrees(72.0));
        assert_eq!("72.5".parse::<Temperature>().unwrap(), Temperature::Degrees(72.5));
        assert!("warm".parse::<Temperature>().is_err());
        assert!("NaN".parse::<Temperature>().is_err());
    }

    #[test]
    fn test_temperature_display() {
        assert_eq!(Temperature::Hi.to_string(), "HI");
        assert_eq!(Temperature::Lo.to_string(), "LO");
        assert_eq!(Temperature::Degrees(68.0).to_string(), "68");
        assert_eq!(Temperature::Degrees(68.5).to_string(), "68.5");
    }

    #[test]
    fn test_start_form_fields() {
        let opts = StartOptions {
            duration: 5,
            temperature: Temperature::Degrees(70.0),
            defrost: true,
            driver_seat_heat: 2,
            passenger_seat_heat: 0,
        };
        let fields = opts.form_fields().unwrap();
        assert_eq!(
            fields,
            vec![
                ("airCtrl", "true".to_string()),
                ("igniOnDuration", "5".to_string()),
                ("airTempvalue", "70".to_string()),
                ("defrost", "true".to_string()),
                ("heating1", "0".to_string()),
                (
                    "seatHeaterVentInfo",
                    r#"{"drvSeatHeatState":2,"astSeatHeatState":0}"#.to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_start_defaults() {
        let opts = StartOptions::default();
        assert_eq!(opts.duration, 10);
        assert_eq!(opts.temperature, Temperature::Lo);
        assert!(!opts.defrost);
        assert_eq!(opts.driver_seat_heat, 4);
        assert_eq!(opts.passenger_seat_heat, 4);
    }

    #[test]
    fn test_coordinates_into_pair() {
        let c: Coordinates = serde_json::from_value(json!({"lat": 37.1, "lon": -122.1})).unwrap();
        assert_eq!(<(f64, f64)>::from(c), (37.1, -122.1));
    }
}
