mod common;

use std::path::Path;

use common::{ScriptedTransport, player_json, roster_json, services};
use roster_terminal::models::{FieldValue, User};
use roster_terminal::provider::{handle_command, log_line};
use roster_terminal::state::{AppState, Delta, EditTarget, ProviderCommand, Screen, apply_delta};
use serde_json::json;

/// Sends everything queued in the outbox through the provider and applies the
/// results, the way the event loop does.
fn pump(state: &mut AppState, transport: &std::sync::Arc<ScriptedTransport>) {
    let services = services(transport);
    loop {
        let commands = state.take_outbox();
        if commands.is_empty() {
            break;
        }
        for cmd in commands {
            let delta = handle_command(&services, Path::new("."), cmd);
            apply_delta(state, delta);
        }
    }
}

fn signed_in_state() -> AppState {
    let mut state = AppState::default();
    apply_delta(
        &mut state,
        Delta::LoggedIn(Ok(User {
            user_id: "u1".to_string(),
            username: Some("newtest".to_string()),
        })),
    );
    state
}

#[test]
fn login_moves_to_rosters_and_queues_fetch() {
    let mut state = signed_in_state();
    assert_eq!(state.screen, Screen::Rosters);
    assert!(state.auth.is_logged_in());
    assert!(state.modals.success.visible);
    assert!(matches!(
        state.take_outbox().as_slice(),
        [ProviderCommand::FetchRosters { .. }]
    ));
}

#[test]
fn restored_anonymous_session_stays_on_login() {
    let mut state = AppState::default();
    apply_delta(&mut state, Delta::SessionRestored(None));
    assert!(state.session_checked);
    assert_eq!(state.screen, Screen::Login);
    assert!(state.take_outbox().is_empty());
}

#[test]
fn blank_login_is_rejected_before_any_command() {
    let mut state = AppState::default();
    state.login_username = "newtest".to_string();
    state.submit_login(false);
    assert_eq!(state.auth.error.as_deref(), Some("Password is required"));
    assert!(state.take_outbox().is_empty());
}

#[test]
fn create_from_template_refetches_rosters() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    transport.push_json(200, json!({"success": true, "rosters": []}));
    pump(&mut state, &transport);

    transport.push_json(
        200,
        json!({"success": true, "templates": [{"rosterId": "t1", "name": "Base", "isTemplate": true}]}),
    );
    state.show_templates();
    pump(&mut state, &transport);
    assert_eq!(state.templates.templates().len(), 1);

    state.start_create();
    assert_eq!(
        state.edit_target,
        Some(EditTarget::CreateFromTemplate { template_id: "t1".to_string() })
    );
    state.modals.edit.input = "Dynasty".to_string();
    state.confirm_edit();

    // The backend answers with the id only.
    transport.push_json(200, json!({"success": true, "roster": {"id": "r1"}}));
    transport.push_json(200, json!({"success": true, "rosters": [roster_json("r1", "Dynasty")]}));
    pump(&mut state, &transport);

    assert_eq!(state.screen, Screen::Rosters);
    assert_eq!(state.rosters.rosters().len(), 1);
    assert!(state.modals.success.visible);
    assert_eq!(state.modals.success.message, "Created \"Dynasty\"");
    assert_eq!(transport.last_request().url, "http://backend.test/api/rosters");
}

#[test]
fn rename_patches_list_without_refetch() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    transport.push_json(200, json!({"success": true, "rosters": [roster_json("r1", "Alpha")]}));
    pump(&mut state, &transport);
    let sent = transport.request_count();

    state.start_rename();
    state.modals.edit.input = "Bravo".to_string();
    state.confirm_edit();
    transport.push_json(200, json!({"success": true, "roster": {"id": "r1", "name": "Bravo"}}));
    pump(&mut state, &transport);

    assert_eq!(transport.request_count(), sent + 1);
    assert_eq!(state.rosters.rosters()[0].name.as_deref(), Some("Bravo"));
    assert!(!state.rosters.take_refetch());
}

#[test]
fn reopening_same_roster_after_leaving_fetches_again() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    state.take_outbox();

    state.open_roster("r1");
    let stale = state
        .take_outbox()
        .into_iter()
        .find_map(|cmd| match cmd {
            ProviderCommand::FetchRoster { ticket, .. } => Some(ticket),
            _ => None,
        })
        .expect("first fetch");
    state.leave_roster_detail();

    let late = serde_json::from_value(roster_json("r1", "Alpha")).expect("roster");
    apply_delta(&mut state, Delta::RosterDetail { ticket: stale, result: Ok(late) });
    assert!(state.roster_detail.roster().is_none());

    state.open_roster("r1");
    assert!(
        state
            .outbox
            .iter()
            .any(|cmd| matches!(cmd, ProviderCommand::FetchRoster { roster_id, .. } if roster_id == "r1"))
    );
    transport.push_json(200, json!({"success": true, "roster": roster_json("r1", "Alpha")}));
    pump(&mut state, &transport);

    assert_eq!(state.screen, Screen::RosterDetail);
    assert!(!state.roster_detail.loading());
    assert_eq!(state.roster_detail.roster().and_then(|r| r.name.as_deref()), Some("Alpha"));
}

#[test]
fn blank_rename_shows_error_without_request() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    transport.push_json(200, json!({"success": true, "rosters": [roster_json("r1", "Alpha")]}));
    pump(&mut state, &transport);
    let sent = transport.request_count();

    state.start_rename();
    state.modals.edit.input = "   ".to_string();
    state.confirm_edit();

    assert!(state.modals.error.visible);
    assert_eq!(state.modals.error.message, "Roster name cannot be empty");
    assert!(state.take_outbox().is_empty());
    assert_eq!(transport.request_count(), sent);
}

#[test]
fn confirmed_delete_removes_roster() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    transport.push_json(
        200,
        json!({"success": true, "rosters": [roster_json("r1", "Alpha"), roster_json("r2", "Bravo")]}),
    );
    pump(&mut state, &transport);

    state.roster_selected = 1;
    state.start_delete();
    assert!(state.modals.confirm.as_ref().is_some_and(|c| c.danger));

    state.resolve_confirm(false);
    assert!(state.take_outbox().is_empty());

    state.start_delete();
    state.resolve_confirm(true);
    transport.push_json(200, json!({"success": true, "message": "Roster deleted"}));
    pump(&mut state, &transport);

    let ids: Vec<&str> = state.rosters.rosters().iter().map(|r| r.roster_id.as_str()).collect();
    assert_eq!(ids, vec!["r1"]);
    assert_eq!(state.roster_selected, 0);
}

#[test]
fn roster_to_player_edit_round_trip() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    transport.push_json(200, json!({"success": true, "rosters": [roster_json("r1", "Alpha")]}));
    pump(&mut state, &transport);

    let mut roster = roster_json("r1", "Alpha");
    roster["players"] = json!([player_json("p1", "r1")]);
    transport.push_json(200, json!({"success": true, "roster": roster}));
    state.open_roster("r1");
    pump(&mut state, &transport);
    assert_eq!(state.screen, Screen::RosterDetail);
    assert_eq!(state.selected_player().map(|p| p.id.as_str()), Some("p1"));

    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    state.open_player("p1");
    pump(&mut state, &transport);
    assert_eq!(state.player.player().map(|p| p.age), Some(24));

    let age_idx = state
        .player_fields()
        .iter()
        .position(|(f, _)| *f == "age")
        .expect("age field");
    state.field_selected = age_idx;
    state.start_player_edit();
    assert_eq!(state.modals.edit.current_value, "24");
    state.modals.edit.input = "25".to_string();
    state.confirm_edit();

    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    pump(&mut state, &transport);
    let player = state.player.player().expect("player");
    assert_eq!(player.age, 25);
    assert_eq!(player.first_name, "Sam");
    assert_eq!(state.modals.success.message, "age updated successfully");
}

#[test]
fn rejected_skill_edit_shows_backend_message() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    state.take_outbox();

    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    state.open_player("p1");
    pump(&mut state, &transport);

    let speed_idx = state
        .player_fields()
        .iter()
        .position(|(f, _)| *f == "speed")
        .expect("speed field");
    state.field_selected = speed_idx;
    state.start_player_edit();
    state.modals.edit.input = "150".to_string();
    state.confirm_edit();

    transport.push_json(200, json!({"success": false, "error": "speed must be 0-99"}));
    pump(&mut state, &transport);

    assert_eq!(state.modals.error.message, "speed must be 0-99");
    assert_eq!(state.player.player().and_then(|p| p.skill("speed")), Some(88));
}

fn select_field(state: &mut AppState, field: &str) {
    state.field_selected = state
        .player_fields()
        .iter()
        .position(|(f, _)| *f == field)
        .expect("field");
}

#[test]
fn queued_basic_and_skill_edits_both_land() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    state.take_outbox();

    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    state.open_player("p1");
    pump(&mut state, &transport);

    select_field(&mut state, "age");
    state.start_player_edit();
    state.modals.edit.input = "25".to_string();
    state.confirm_edit();

    select_field(&mut state, "speed");
    state.start_player_edit();
    state.modals.edit.input = "93".to_string();
    state.confirm_edit();

    let queued = state.outbox.len();
    assert_eq!(queued, 2);
    assert!(state.updater.basic_info.loading);
    assert!(state.updater.skill.loading);

    // Each PATCH answers with the record as stored before the other edit.
    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    pump(&mut state, &transport);

    let player = state.player.player().expect("player");
    assert_eq!(player.age, 25);
    assert_eq!(player.skill("speed"), Some(93));
    assert_eq!(player.skill("throwPower"), Some(91));
    assert_eq!(player.first_name, "Sam");
    assert!(!state.updater.basic_info.loading && state.updater.basic_info.error.is_none());
    assert!(!state.updater.skill.loading && state.updater.skill.error.is_none());
}

#[test]
fn rejected_skill_does_not_undo_basic_edit() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    state.take_outbox();

    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    state.open_player("p1");
    pump(&mut state, &transport);

    select_field(&mut state, "age");
    state.start_player_edit();
    state.modals.edit.input = "25".to_string();
    state.confirm_edit();
    select_field(&mut state, "speed");
    state.start_player_edit();
    state.modals.edit.input = "150".to_string();
    state.confirm_edit();

    transport.push_json(200, json!({"success": true, "player": player_json("p1", "r1")}));
    transport.push_json(200, json!({"success": false, "error": "speed must be 0-99"}));
    pump(&mut state, &transport);

    let player = state.player.player().expect("player");
    assert_eq!(player.age, 25);
    assert_eq!(player.skill("speed"), Some(88));
    assert!(state.updater.basic_info.error.is_none());
    assert_eq!(state.updater.skill.error.as_deref(), Some("speed must be 0-99"));
}

#[test]
fn provider_outcomes_reach_the_console() {
    let mut state = AppState::default();
    let failed = Delta::DownloadFinished(Err(anyhow::anyhow!("disk full")));
    let line = log_line(&failed).expect("download failure is logged");
    assert!(line.starts_with("[WARN] Download failed"));
    assert!(line.contains("disk full"));
    apply_delta(&mut state, Delta::Log(line));
    apply_delta(&mut state, failed);
    assert!(state.logs.back().is_some_and(|l| l.contains("disk full")));
    assert!(state.modals.error.visible);

    let saved = Delta::DownloadFinished(Ok("exports/roster.json".into()));
    assert!(log_line(&saved).is_some_and(|l| l.contains("roster.json")));
    assert!(log_line(&Delta::SessionRestored(None)).is_none());
}

#[test]
fn non_numeric_input_never_leaves_the_dialog() {
    let mut state = AppState::default();
    let player = serde_json::from_value(player_json("p1", "r1")).expect("player");
    let ticket = state.player.set_player_id("p1").expect("ticket");
    state.player.settle_fetch(ticket, Ok(player));
    state.screen = Screen::PlayerDetail;

    state.field_selected = 2;
    state.start_player_edit();
    assert_eq!(state.modals.edit.field, "jerseyNumber");
    state.modals.edit.input = "twelve".to_string();
    state.confirm_edit();

    assert_eq!(state.modals.error.message, "Please enter a valid number");
    assert!(state.take_outbox().is_empty());
    assert_eq!(
        state.player.player().and_then(|p| p.field_value("jerseyNumber")),
        Some(FieldValue::Int(12))
    );
}

#[test]
fn stale_roster_list_delta_is_ignored() {
    let mut state = signed_in_state();
    let first = match state.take_outbox().pop() {
        Some(ProviderCommand::FetchRosters { ticket }) => ticket,
        other => panic!("unexpected command: {other:?}"),
    };
    state.request_rosters();

    let rosters = vec![serde_json::from_value(roster_json("r1", "Old")).expect("roster")];
    apply_delta(&mut state, Delta::Rosters { ticket: first, result: Ok(rosters) });
    assert!(state.rosters.rosters().is_empty());
    assert!(state.rosters.loading());
}

#[test]
fn logout_returns_to_login_and_drops_caches() {
    let transport = ScriptedTransport::new();
    let mut state = signed_in_state();
    transport.push_json(200, json!({"success": true, "rosters": [roster_json("r1", "Alpha")]}));
    pump(&mut state, &transport);

    state.request_logout();
    state.resolve_confirm(true);
    transport.push_json(200, json!({"success": true}));
    pump(&mut state, &transport);

    assert_eq!(state.screen, Screen::Login);
    assert!(!state.auth.is_logged_in());
    assert!(state.rosters.rosters().is_empty());
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = AppState::default();
    for i in 0..250 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert!(state.logs.back().is_some_and(|l| l.ends_with("line 249")));
}
