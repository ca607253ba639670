mod common;

use common::{ScriptedTransport, client, player_json, request_body};
use roster_terminal::models::FieldValue;
use roster_terminal::player_api::PlayerApi;
use roster_terminal::player_store::{PlayerStore, PlayerUpdater};
use serde_json::json;

fn loaded_player(transport: &std::sync::Arc<ScriptedTransport>, api: &PlayerApi) -> PlayerStore {
    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    let mut store = PlayerStore::new("p1");
    assert!(store.fetch(api));
    assert!(store.player().is_some());
    store
}

#[test]
fn fetch_hits_player_endpoint() {
    let transport = ScriptedTransport::new();
    let api = PlayerApi::new(client(&transport));
    let store = loaded_player(&transport, &api);

    assert_eq!(transport.last_request().url, "http://backend.test/api/players/p1");
    let player = store.player().expect("player");
    assert_eq!(player.full_name(), "Sam Hill");
    assert_eq!(player.skill("speed"), Some(88));
}

#[test]
fn empty_player_id_fails_without_request() {
    let transport = ScriptedTransport::new();
    let api = PlayerApi::new(client(&transport));
    let mut store = PlayerStore::new("  ");

    assert!(!store.fetch(&api));
    assert_eq!(store.error(), Some("No player ID provided"));
    assert!(!store.loading());
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn basic_info_edit_merges_one_field() {
    let transport = ScriptedTransport::new();
    let api = PlayerApi::new(client(&transport));
    let mut store = loaded_player(&transport, &api);
    let before = store.player().cloned().expect("player");

    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    let mut updater = PlayerUpdater::new();
    assert!(store.commit_basic_info(&mut updater, &api, "firstName", &FieldValue::from("Samuel")));

    let request = transport.last_request();
    assert_eq!(request.method, reqwest::Method::PATCH);
    assert_eq!(request.url, "http://backend.test/api/players/p1/basicInfoUpdate");
    assert_eq!(request_body(&request), json!({"field": "firstName", "value": "Samuel"}));

    let after = store.player().expect("player");
    assert_eq!(after.first_name, "Samuel");
    assert_eq!(after.last_name, before.last_name);
    assert_eq!(after.jersey_number, before.jersey_number);
    assert_eq!(after.attributes, before.attributes);
    assert!(updater.basic_info.error.is_none());
    assert!(!updater.loading());
}

#[test]
fn skill_edit_merges_into_attributes() {
    let transport = ScriptedTransport::new();
    let api = PlayerApi::new(client(&transport));
    let mut store = loaded_player(&transport, &api);

    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    let mut updater = PlayerUpdater::new();
    assert!(store.commit_skill(&mut updater, &api, "speed", 93));

    assert_eq!(
        request_body(&transport.last_request()),
        json!({"skillName": "speed", "skillValue": 93})
    );
    let player = store.player().expect("player");
    assert_eq!(player.skill("speed"), Some(93));
    assert_eq!(player.skill("throwPower"), Some(91));
}

#[test]
fn rejected_skill_returns_none_and_keeps_player() {
    let transport = ScriptedTransport::new();
    let api = PlayerApi::new(client(&transport));
    let mut store = loaded_player(&transport, &api);
    let before = store.player().cloned().expect("player");

    transport.push_json(200, json!({"success": false, "error": "speed must be 0-99"}));
    let mut updater = PlayerUpdater::new();
    assert!(updater.update_skill(&api, "p1", "speed", 150).is_none());
    assert_eq!(updater.skill.error.as_deref(), Some("speed must be 0-99"));
    assert!(!updater.skill.loading);

    transport.push_json(400, json!({"success": false, "error": "speed must be 0-99"}));
    assert!(!store.commit_skill(&mut updater, &api, "speed", 150));
    assert_eq!(store.player(), Some(&before));
}

#[test]
fn unknown_skill_is_rejected_locally() {
    let transport = ScriptedTransport::new();
    let api = PlayerApi::new(client(&transport));
    let mut updater = PlayerUpdater::new();

    assert!(updater.update_skill(&api, "p1", "teleport", 50).is_none());
    assert_eq!(updater.skill.error.as_deref(), Some("Unknown skill: teleport"));
    assert!(updater.update_basic_info(&api, "", "age", &FieldValue::Int(30)).is_none());
    assert_eq!(updater.basic_info.error.as_deref(), Some("No player ID provided"));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn basic_info_error_does_not_touch_skill_status() {
    let transport = ScriptedTransport::new();
    transport.push_network_error("timeout");
    let api = PlayerApi::new(client(&transport));
    let mut updater = PlayerUpdater::new();

    assert!(updater.update_basic_info(&api, "p1", "age", &FieldValue::Int(30)).is_none());
    assert_eq!(updater.basic_info.error.as_deref(), Some("Network error"));
    assert!(updater.skill.error.is_none());
}

#[test]
fn switching_players_ignores_the_old_response() {
    let mut store = PlayerStore::new("p1");
    let old = store.begin_fetch().expect("ticket");
    let new = store.set_player_id("p2").expect("ticket");

    let p2 = serde_json::from_value(player_json("p2", "r1")).expect("player");
    let p1 = serde_json::from_value(player_json("p1", "r1")).expect("player");
    assert!(store.settle_fetch(new, Ok(p2)));
    assert!(!store.settle_fetch(old, Ok(p1)));
    assert_eq!(store.player().map(|p| p.id.as_str()), Some("p2"));
}
