//! Synonym tables for room and function names
//!
//! German smart-home vocabulary is full of synonyms ("Licht", "Lampe",
//! "Beleuchtung" all mean lighting) and regionalisms ("Stube" for
//! "Wohnzimmer"). Each alias group below is bidirectional: any member of a
//! group matches any other member. The tables are consulted as the last
//! tier of fuzzy enum matching, after exact, containment and path-segment
//! matching have failed.

use once_cell::sync::Lazy;

/// Bidirectional alias groups for room and function names
pub static ALIAS_GROUPS: Lazy<Vec<Vec<&'static str>>> = Lazy::new(|| {
    vec![
        // Functions
        vec!["licht", "lampe", "lampen", "beleuchtung", "light", "lighting"],
        vec![
            "heizung",
            "temperatur",
            "heizen",
            "thermostat",
            "heating",
            "klima",
        ],
        vec![
            "rollladen",
            "rolladen",
            "rollo",
            "jalousie",
            "beschattung",
            "blinds",
        ],
        vec!["steckdose", "steckdosen", "stecker", "socket", "outlet"],
        vec!["musik", "radio", "lautsprecher", "audio", "sound"],
        vec!["lüftung", "ventilator", "lüfter", "fan"],
        vec!["fernseher", "fernsehen", "tv", "glotze"],
        vec!["fenster", "window"],
        // Rooms
        vec![
            "wohnzimmer",
            "stube",
            "wohnstube",
            "living_room",
            "livingroom",
        ],
        vec!["schlafzimmer", "bedroom"],
        vec!["küche", "kueche", "kitchen"],
        vec!["bad", "badezimmer", "bathroom"],
        vec!["kinderzimmer", "nursery"],
        vec!["büro", "buero", "arbeitszimmer", "office"],
        vec!["flur", "diele", "gang", "korridor", "hallway"],
        vec!["esszimmer", "dining_room"],
        vec!["garten", "garden", "draußen", "draussen"],
        vec!["keller", "basement"],
        vec!["dachboden", "speicher", "attic"],
    ]
});

/// Generic object names that never identify a device on their own
///
/// These show up as state or channel display names on practically every
/// device ("Status", "Ein", "Battery", ...) and would make device-name
/// matching useless if kept.
pub static NAME_STOPLIST: &[&str] = &[
    "status", "state", "ein", "aus", "on", "off", "level", "wert", "value", "power", "battery",
    "batterie", "signal", "info", "switch", "aktion", "action",
];

/// The alias group containing the given lowercased term, if any
pub fn alias_group_of(term: &str) -> Option<&'static [&'static str]> {
    ALIAS_GROUPS
        .iter()
        .find(|group| group.contains(&term))
        .map(|group| group.as_slice())
}

/// Whether a name is too generic or too short to identify a device
pub fn is_insignificant(name: &str, min_length: usize) -> bool {
    name.len() < min_length || NAME_STOPLIST.contains(&name)
}
