// src/models/server.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the upstream server list, kept as sent.
///
/// Fields are read on demand so a badly typed entry only fails itself
/// during enrichment, never the whole list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawServer(Value);

impl RawServer {
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// The `address:port` value, if present. Not-a-string is `Err` with the value as sent.
    pub fn addr(&self) -> Option<Result<&str, String>> {
        self.field("addr").map(|v| v.as_str().ok_or_else(|| v.to_string()))
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name").and_then(Value::as_str)
    }

    pub fn map(&self) -> Option<&str> {
        self.field("map").and_then(Value::as_str)
    }

    /// Player count rendered exactly as upstream reported it.
    pub fn players(&self) -> Option<String> {
        self.field("players").map(count_text)
    }

    pub fn max_players(&self) -> Option<String> {
        self.field("max_players").map(count_text)
    }
}

fn count_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<Value> for RawServer {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Normalized record handed to clients. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: String,
    pub name: String,
    pub map: String,
    pub gamemode: String,
    pub players: String,
    pub region: String,
    pub address: String,
}

impl ServerInfo {
    fn placeholder(id: &str, name: &str, map: &str, gamemode: &str, players: &str, region: &str, address: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            map: map.to_string(),
            gamemode: gamemode.to_string(),
            players: players.to_string(),
            region: region.to_string(),
            address: address.to_string(),
        }
    }
}

/// Placeholder list served when upstream advertises no tagged servers.
pub fn synthetic_servers() -> Vec<ServerInfo> {
    vec![
        ServerInfo::placeholder(
            "mock1",
            "TrueQuickplay Test Server",
            "cp_dustbowl",
            "Control Points",
            "12/24",
            "North America East",
            "127.0.0.1:27015",
        ),
        ServerInfo::placeholder(
            "mock2",
            "Community Server #1",
            "pl_upward",
            "Payload",
            "18/24",
            "Europe",
            "127.0.0.1:27016",
        ),
        ServerInfo::placeholder(
            "mock3",
            "2Fort 24/7",
            "ctf_2fort",
            "Capture the Flag",
            "22/24",
            "Asia Pacific",
            "127.0.0.1:27017",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_dataset_is_fixed() {
        let servers = synthetic_servers();
        assert_eq!(servers.len(), 3);
        assert_eq!(servers, synthetic_servers());
        assert!(servers.iter().all(|s| s.address.starts_with("127.0.0.1:")));
    }

    #[test]
    fn raw_server_ignores_unknown_fields() {
        let raw: RawServer = serde_json::from_str(
            r#"{"addr":"1.2.3.4:27015","gameport":27015,"name":"Test","bots":0,"secure":true}"#,
        )
        .unwrap();
        assert_eq!(raw.addr(), Some(Ok("1.2.3.4:27015")));
        assert_eq!(raw.name(), Some("Test"));
        assert!(raw.map().is_none());
        assert!(raw.players().is_none());
    }

    #[test]
    fn raw_server_tolerates_odd_types() {
        let raw: Vec<RawServer> = serde_json::from_str(
            r#"[{"addr":12345,"name":7,"players":5.0,"max_players":"24"}, "not an object", null]"#,
        )
        .unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0].addr(), Some(Err("12345".to_string())));
        assert_eq!(raw[0].name(), None);
        assert_eq!(raw[0].players().as_deref(), Some("5.0"));
        assert_eq!(raw[0].max_players().as_deref(), Some("24"));
        assert_eq!(raw[1].addr(), None);
        assert_eq!(raw[2].addr(), None);
    }
}
