//! In-process dashboard stand-in for command tests

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use bluelink_client::testing::TestServer;
use bluelink_client::{BlueLink, Credentials};
use serde_json::{json, Value};

use crate::output::{OutputContext, OutputFormat};

pub const VIN: &str = "KM8KN4AE0NU000001";

fn success(response: Value) -> String {
    json!({"E_IFRESULT": "Z:Success", "RESPONSE_STRING": response}).to_string()
}

/// Remote action reply that always succeeds
pub fn remote_success() -> String {
    success(json!({}))
}

/// Remote action reply rejected by the service
pub fn remote_failure(message: &str) -> String {
    json!({"E_IFRESULT": "Z:Fail", "E_IFFAILMSG": message}).to_string()
}

/// Serve the login, account and remote action endpoints; every remote action
/// answers with `remote_body`
pub async fn start(remote_body: String) -> TestServer {
    let router = Router::new()
        .route(
            "/etc/designs/ownercommon/us/token.json",
            get(|| async { json!({"jwt_token": "CSRF1"}).to_string() }),
        )
        .route("/libs/granite/csrf/token.json", get(|| async { "{}" }))
        .route(
            "/bin/common/connectCar",
            post(|| async { success(json!({"jwt_id": "T1"})) }),
        )
        .route(
            "/bin/common/MyAccountServlet",
            post(|| async {
                success(json!({
                    "OwnersVehiclesInfo": [{
                        "VehicleNickName": "Daily",
                        "Name": "Ioniq 5",
                        "Year": "2022",
                        "VinNumber": VIN,
                        "RegistrationID": "REG-1",
                        "IsBlueLinkCar": "true"
                    }]
                }))
            }),
        )
        .route("/bin/common/remoteAction", post(remote_action))
        .with_state(Arc::new(remote_body));

    TestServer::start(router)
        .await
        .expect("Failed to start test server")
}

async fn remote_action(State(body): State<Arc<String>>) -> String {
    body.as_str().to_string()
}

pub fn session(server: &TestServer) -> BlueLink {
    server
        .session(Credentials::new("owner@example.com", "secret", "1234").unwrap())
        .unwrap()
}

pub fn quiet_context() -> OutputContext {
    OutputContext::new(OutputFormat::Table, true, true)
}
