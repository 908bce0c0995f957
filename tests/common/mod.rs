//! Shared fixtures: a small mocked household with a handful of rooms,
//! lighting and heating functions, and one user-defined device outside
//! every enum.

// each test binary uses a different subset of the fixture
#![allow(dead_code)]

use smarthome_intent::config::FastPathConfig;
use smarthome_intent::executor::FastPathExecutor;
use smarthome_intent::mock::{
    dimmer_metadata, sensor_metadata, switch_metadata, thermostat_metadata, MockObjectStore,
};
use smarthome_intent::parser::IntentParser;
use smarthome_intent::resolver::EnumResolver;
use smarthome_intent::store::ObjectStore;
use serde_json::json;
use std::sync::Arc;

pub const WZ_DECKENLICHT: &str = "hm.0.licht_wz.on";
pub const WZ_STEHLAMPE: &str = "hue.0.stehlampe.on";
pub const WZ_DECKENLAMPE: &str = "hue.0.deckenlampe.on";
pub const WZ_HEIZUNG: &str = "hm.0.heizung_wz.set";
pub const SZ_NACHTTISCH: &str = "hue.0.nachttisch.on";
pub const SZ_HEIZUNG: &str = "hm.0.heizung_sz.set";
pub const K_LICHT: &str = "hm.0.licht_k.on";
pub const VENTILATOR: &str = "0_userdata.0.standventilator";
pub const BUERO_THERMOMETER: &str = "hm.0.thermometer_buero.temp";

/// The default household used by most tests
pub fn sample_store() -> MockObjectStore {
    MockObjectStore::new()
        .with_room(
            "enum.rooms.wohnzimmer",
            "Wohnzimmer",
            // device-level id for the ceiling light on purpose: its "on"
            // state is only listed in the function enum
            &["hm.0.licht_wz", WZ_STEHLAMPE, WZ_DECKENLAMPE, WZ_HEIZUNG],
        )
        .with_room(
            "enum.rooms.schlafzimmer",
            "Schlafzimmer",
            &[SZ_NACHTTISCH, SZ_HEIZUNG],
        )
        .with_room("enum.rooms.kueche", "Küche", &[K_LICHT])
        .with_room("enum.rooms.buero", "Büro", &[VENTILATOR, BUERO_THERMOMETER])
        .with_function(
            "enum.functions.beleuchtung",
            "Beleuchtung",
            &[
                WZ_DECKENLICHT,
                WZ_STEHLAMPE,
                WZ_DECKENLAMPE,
                SZ_NACHTTISCH,
                K_LICHT,
            ],
        )
        .with_function(
            "enum.functions.heizung",
            "Heizung",
            &[WZ_HEIZUNG, SZ_HEIZUNG],
        )
        .with_object(WZ_DECKENLICHT, switch_metadata("Deckenlicht"))
        .with_display_names(WZ_DECKENLICHT, &["Ein", "Schalter", "Deckenlicht"])
        .with_object(WZ_STEHLAMPE, switch_metadata("Stehlampe"))
        .with_display_names(WZ_STEHLAMPE, &["Ein", "Stehlampe"])
        .with_object(WZ_DECKENLAMPE, switch_metadata("Deckenlampe"))
        .with_display_names(WZ_DECKENLAMPE, &["Ein", "Deckenlampe"])
        .with_object(SZ_NACHTTISCH, dimmer_metadata("Nachttischlampe"))
        .with_display_names(SZ_NACHTTISCH, &["Ein", "Nachttischlampe"])
        .with_object(K_LICHT, switch_metadata("Küchenlicht"))
        .with_display_names(K_LICHT, &["Ein", "Küchenlicht"])
        .with_object(WZ_HEIZUNG, thermostat_metadata("Heizung Wohnzimmer"))
        .with_display_names(WZ_HEIZUNG, &["Solltemperatur", "Thermostat"])
        .with_object(SZ_HEIZUNG, thermostat_metadata("Heizung Schlafzimmer"))
        .with_display_names(SZ_HEIZUNG, &["Solltemperatur", "Thermostat"])
        .with_user_state(VENTILATOR)
        .with_object(VENTILATOR, switch_metadata("Standventilator"))
        .with_display_names(VENTILATOR, &["Standventilator"])
        .with_object(BUERO_THERMOMETER, sensor_metadata("Thermometer Büro", Some("°C")))
        .with_display_names(BUERO_THERMOMETER, &["Istwert", "Thermometer"])
        .with_value(BUERO_THERMOMETER, json!(23.5))
        .with_value(WZ_HEIZUNG, json!(21.0))
        .with_value(SZ_HEIZUNG, json!(20.0))
        .with_value(SZ_NACHTTISCH, json!(0.0))
        .with_value(WZ_STEHLAMPE, json!(false))
}

/// Wired-up parser, resolver and executor over one mock store
pub struct Harness {
    pub store: Arc<MockObjectStore>,
    pub resolver: Arc<EnumResolver>,
    pub parser: IntentParser,
    pub executor: FastPathExecutor,
}

pub async fn harness() -> Harness {
    harness_with(sample_store()).await
}

pub async fn harness_with(store: MockObjectStore) -> Harness {
    let store = Arc::new(store);
    let config = FastPathConfig::default();
    let resolver = Arc::new(EnumResolver::new(
        store.clone() as Arc<dyn ObjectStore>,
        config.clone(),
    ));
    resolver.load().await;

    let parser = IntentParser::new(resolver.clone());
    let executor = FastPathExecutor::new(
        store.clone() as Arc<dyn ObjectStore>,
        resolver.clone(),
        config,
    );

    Harness {
        store,
        resolver,
        parser,
        executor,
    }
}

/// Read-only sensor metadata re-export for tests that extend the fixture
pub fn readonly_sensor(name: &str) -> smarthome_intent::store::ObjectMetadata {
    sensor_metadata(name, Some("°C"))
}
