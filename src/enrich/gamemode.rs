/// Map-name prefix to gamemode label. The prefix is everything before the first `_`.
pub const GAMEMODE_PREFIXES: &[(&str, &str)] = &[
    ("cp", "Control Points"),
    ("pl", "Payload"),
    ("plr", "Payload Race"),
    ("ctf", "Capture the Flag"),
    ("koth", "King of the Hill"),
    ("arena", "Arena"),
    ("mvm", "Mann vs Machine"),
    ("sd", "Special Delivery"),
    ("tc", "Territorial Control"),
    ("tr", "Training"),
    ("pd", "Player Destruction"),
    ("pass", "PASS Time"),
    ("rd", "Robot Destruction"),
    ("mge", "MGE"),
    ("jump", "Jump"),
    ("trade", "Trade"),
];

pub const OTHER_GAMEMODE: &str = "Other";
pub const UNKNOWN_GAMEMODE: &str = "Unknown";

pub fn classify_gamemode(map: Option<&str>) -> &'static str {
    let map = match map {
        Some(m) if !m.is_empty() => m,
        _ => return UNKNOWN_GAMEMODE,
    };

    let prefix = map.split('_').next().unwrap_or(map);
    GAMEMODE_PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, label)| *label)
        .unwrap_or(OTHER_GAMEMODE)
}
