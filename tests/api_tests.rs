use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use tqp_api::config::Config;
use tqp_api::state::AppState;
use tqp_api::{build_default_state, configure_routes};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/IGameServersService/GetServerList/v1/";

/// App state pointed at a fake upstream.
fn state_for(upstream: &MockServer) -> web::Data<AppState> {
    let config = Config {
        upstream_url: format!("{}{}", upstream.uri(), LIST_PATH),
        steam_api_key: "test-key".to_string(),
        upstream_timeout_secs: 2,
        ..Config::default()
    };
    web::Data::new(build_default_state(&config).expect("state should build"))
}

fn listing(servers: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "response": { "servers": servers } }))
}

async fn mount(upstream: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(response)
        .mount(upstream)
        .await;
}

macro_rules! get_json {
    ($app:expr, $method:ident, $uri:expr) => {{
        let req = test::TestRequest::$method().uri($uri).to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

// =============================================================================
// HEALTH
// =============================================================================

#[actix_web::test]
async fn test_health_endpoint() {
    let upstream = MockServer::start().await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (status, body) = get_json!(app, get, "/api/health");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "TrueQuickplay API is running");
}

// =============================================================================
// SERVER LIST
// =============================================================================

#[actix_web::test]
async fn test_single_server_is_enriched() {
    let upstream = MockServer::start().await;
    mount(
        &upstream,
        listing(json!([
            {"addr": "1.2.3.4:27015", "name": "Test", "map": "ctf_2fort", "players": 5, "max_players": 24}
        ])),
    )
    .await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (status, body) = get_json!(app, get, "/api/servers");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fromCache"], false);
    assert_eq!(body["isMockData"], false);
    assert!(body.get("isErrorFallback").is_none());

    let servers = body["servers"].as_array().unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0]["id"], "1.2.3.4:27015");
    assert_eq!(servers[0]["name"], "Test");
    assert_eq!(servers[0]["map"], "ctf_2fort");
    assert_eq!(servers[0]["gamemode"], "Capture the Flag");
    assert_eq!(servers[0]["players"], "5/24");
    assert_eq!(servers[0]["address"], "1.2.3.4:27015");
    assert_eq!(servers[0]["region"], "North America");
}

#[actix_web::test]
async fn test_malformed_records_are_dropped() {
    let upstream = MockServer::start().await;
    mount(
        &upstream,
        listing(json!([
            {"addr": "185.1.1.1:27015", "name": "Keep me", "map": "koth_harvest"},
            {"name": "No address"},
            {"addr": "no-port", "name": "Bad address"},
            {"addr": "24.0.0.1:27016"}
        ])),
    )
    .await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (_, body) = get_json!(app, get, "/api/servers");
    let servers = body["servers"].as_array().unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0]["name"], "Keep me");
    assert_eq!(servers[0]["region"], "Europe");
    assert_eq!(servers[1]["name"], "Unknown Server");
    assert_eq!(servers[1]["map"], "Unknown Map");
    assert_eq!(servers[1]["gamemode"], "Unknown");
    assert_eq!(servers[1]["players"], "0/0");
}

#[actix_web::test]
async fn test_badly_typed_record_does_not_fail_refresh() {
    let upstream = MockServer::start().await;
    mount(
        &upstream,
        listing(json!([
            {"addr": "1.2.3.4:27015", "name": "Test", "map": "ctf_2fort", "players": 5, "max_players": 24},
            {"addr": 12345, "name": "Numeric address"},
            {"addr": "5.6.7.8:27016", "name": "Float counts", "players": 3.0, "max_players": 24}
        ])),
    )
    .await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (status, body) = get_json!(app, get, "/api/servers");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fromCache"], false);
    assert_eq!(body["isMockData"], false);
    assert!(body.get("isErrorFallback").is_none());

    let servers = body["servers"].as_array().unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0]["name"], "Test");
    assert_eq!(servers[0]["players"], "5/24");
    assert_eq!(servers[1]["name"], "Float counts");
    assert_eq!(servers[1]["players"], "3.0/24");
}

#[actix_web::test]
async fn test_empty_upstream_serves_placeholder_servers() {
    let upstream = MockServer::start().await;
    mount(&upstream, listing(json!([]))).await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (status, body) = get_json!(app, get, "/api/servers");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isMockData"], true);
    assert_eq!(body["fromCache"], false);

    let ids: Vec<&str> = body["servers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["mock1", "mock2", "mock3"]);

    let (_, cache) = get_json!(app, get, "/api/debug/cache");
    assert_eq!(cache["cacheExists"], true);
    assert_eq!(cache["isMockData"], true);
    assert_eq!(cache["serverCount"], 3);
}

#[actix_web::test]
async fn test_second_request_is_served_from_cache() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(listing(json!([{"addr": "1.2.3.4:27015", "map": "cp_dustbowl"}])))
        .expect(1)
        .mount(&upstream)
        .await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (_, first) = get_json!(app, get, "/api/servers");
    let (_, second) = get_json!(app, get, "/api/servers");

    assert_eq!(first["fromCache"], false);
    assert_eq!(second["fromCache"], true);
    assert_eq!(second["cacheAge"], "0 seconds");
    assert_eq!(second["servers"], first["servers"]);
    assert_eq!(second["requestId"], 2);
}

#[actix_web::test]
async fn test_forced_refresh_bypasses_cache() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(listing(json!([{"addr": "1.2.3.4:27015"}])))
        .expect(2)
        .mount(&upstream)
        .await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    get_json!(app, get, "/api/servers");
    let (_, body) = get_json!(app, get, "/api/servers?refresh=true");
    assert_eq!(body["fromCache"], false);

    // Only the literal "true" forces a refresh
    let (_, body) = get_json!(app, get, "/api/servers?refresh=1");
    assert_eq!(body["fromCache"], true);
}

#[actix_web::test]
async fn test_upstream_failure_falls_back_to_cache() {
    let upstream = MockServer::start().await;
    mount(&upstream, listing(json!([]))).await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    get_json!(app, get, "/api/servers");

    upstream.reset().await;
    mount(&upstream, ResponseTemplate::new(500)).await;

    let (status, body) = get_json!(app, get, "/api/servers?refresh=true");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isErrorFallback"], true);
    assert_eq!(body["fromCache"], true);
    assert_eq!(body["isMockData"], true);
    assert_eq!(body["servers"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_upstream_failure_without_cache_is_server_error() {
    let upstream = MockServer::start().await;
    mount(&upstream, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (status, body) = get_json!(app, get, "/api/servers");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error fetching servers");
    assert!(body["error"].as_str().unwrap().contains("decoded"));
    assert!(body.get("servers").is_none());
}

// =============================================================================
// DEBUG
// =============================================================================

#[actix_web::test]
async fn test_clear_cache_resets_state() {
    let upstream = MockServer::start().await;
    mount(&upstream, listing(json!([{"addr": "1.2.3.4:27015"}]))).await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    get_json!(app, get, "/api/servers");

    let (status, body) = get_json!(app, delete, "/api/debug/cache");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cache cleared successfully");

    let (_, cache) = get_json!(app, get, "/api/debug/cache");
    assert_eq!(cache["cacheExists"], false);
    assert_eq!(cache["cacheAge"], Value::Null);
    assert_eq!(cache["isMockData"], false);
    assert_eq!(cache["serverCount"], 0);
    assert_eq!(cache["timestamp"], "1970-01-01T00:00:00.000Z");
}

#[actix_web::test]
async fn test_request_stats_count_server_requests() {
    let upstream = MockServer::start().await;
    mount(&upstream, listing(json!([{"addr": "1.2.3.4:27015"}, {"addr": "5.6.7.8:27015"}]))).await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (_, before) = get_json!(app, get, "/api/debug/requests");
    assert_eq!(before["totalRequests"], 0);
    assert_eq!(before["cacheStatus"]["exists"], false);

    get_json!(app, get, "/api/servers");
    get_json!(app, get, "/api/servers");

    let (_, after) = get_json!(app, get, "/api/debug/requests");
    assert_eq!(after["totalRequests"], 2);
    assert_eq!(after["cacheStatus"]["exists"], true);
    assert_eq!(after["cacheStatus"]["serverCount"], 2);
    assert!(after["currentTime"].as_str().unwrap().ends_with('Z'));
}

// =============================================================================
// JOIN
// =============================================================================

#[actix_web::test]
async fn test_join_url() {
    let upstream = MockServer::start().await;
    let app = test::init_service(App::new().app_data(state_for(&upstream)).configure(configure_routes)).await;

    let (status, body) = get_json!(app, get, "/api/join/1.2.3.4:27015");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["joinUrl"], "steam://connect/1.2.3.4:27015/?appid=440");

    // Any address is templated as given
    let (status, body) = get_json!(app, get, "/api/join/1.2.3.4");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["joinUrl"], "steam://connect/1.2.3.4/?appid=440");
}
