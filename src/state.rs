use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;

use crate::auth_store::AuthStore;
use crate::fetch_state::RequestTicket;
use crate::http_client::ApiResult;
use crate::modals::{ConfirmModal, EditKind, Modals};
use crate::models::{CreateRosterForm, CreatedRoster, FieldValue, Player, RenamedRoster, Roster, User};
use crate::player_store::{PlayerStore, PlayerUpdater, RosterDownloader};
use crate::roster_store::{
    RosterDetailStore, RosterListStore, TemplateStore, validate_create, validate_roster_name,
};
use crate::skills;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Rosters,
    Templates,
    RosterDetail,
    PlayerDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

/// What the confirmation dialog runs when accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeleteRoster { roster_id: String },
    Logout,
}

/// What the edit dialog is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    RenameRoster { roster_id: String },
    CreateFromTemplate { template_id: String },
    PlayerField,
}

/// Work for the provider thread. Fetches carry the ticket their store issued.
#[derive(Debug, Clone)]
pub enum ProviderCommand {
    RestoreSession,
    Login { username: String, password: String },
    Register { username: String, password: String },
    Logout,
    FetchRosters { ticket: RequestTicket },
    FetchTemplates { ticket: RequestTicket },
    FetchRoster { ticket: RequestTicket, roster_id: String },
    FetchPlayer { ticket: RequestTicket, player_id: String },
    CreateRoster { form: CreateRosterForm },
    RenameRoster { roster_id: String, name: String },
    DeleteRoster { roster_id: String },
    UpdateBasicInfo { player_id: String, field: String, value: FieldValue },
    UpdateSkill { player_id: String, skill: String, value: i64 },
    DownloadRoster { roster_id: String },
}

impl ProviderCommand {
    /// Short name for logs. Never includes credentials.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderCommand::RestoreSession => "restore_session",
            ProviderCommand::Login { .. } => "login",
            ProviderCommand::Register { .. } => "register",
            ProviderCommand::Logout => "logout",
            ProviderCommand::FetchRosters { .. } => "fetch_rosters",
            ProviderCommand::FetchTemplates { .. } => "fetch_templates",
            ProviderCommand::FetchRoster { .. } => "fetch_roster",
            ProviderCommand::FetchPlayer { .. } => "fetch_player",
            ProviderCommand::CreateRoster { .. } => "create_roster",
            ProviderCommand::RenameRoster { .. } => "rename_roster",
            ProviderCommand::DeleteRoster { .. } => "delete_roster",
            ProviderCommand::UpdateBasicInfo { .. } => "update_basic_info",
            ProviderCommand::UpdateSkill { .. } => "update_skill",
            ProviderCommand::DownloadRoster { .. } => "download_roster",
        }
    }
}

/// Results coming back from the provider thread.
#[derive(Debug)]
pub enum Delta {
    Log(String),
    SessionRestored(Option<User>),
    LoggedIn(anyhow::Result<User>),
    LoggedOut(anyhow::Result<()>),
    Rosters { ticket: RequestTicket, result: ApiResult<Vec<Roster>> },
    Templates { ticket: RequestTicket, result: ApiResult<Vec<Roster>> },
    RosterDetail { ticket: RequestTicket, result: ApiResult<Roster> },
    Player { ticket: RequestTicket, result: ApiResult<Player> },
    /// `name` is what the user submitted; the backend may omit it.
    RosterCreated { name: String, result: ApiResult<CreatedRoster> },
    RosterRenamed { roster_id: String, name: String, result: ApiResult<RenamedRoster> },
    RosterDeleted { roster_id: String, result: ApiResult<String> },
    BasicInfoUpdated { player_id: String, field: String, value: FieldValue, result: ApiResult<Player> },
    SkillUpdated { player_id: String, skill: String, value: i64, result: ApiResult<Player> },
    DownloadFinished(anyhow::Result<PathBuf>),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub auth: AuthStore,
    pub session_checked: bool,
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginField,
    pub rosters: RosterListStore,
    pub templates: TemplateStore,
    pub roster_detail: RosterDetailStore,
    pub player: PlayerStore,
    pub updater: PlayerUpdater,
    pub downloader: RosterDownloader,
    pub modals: Modals<PendingAction>,
    pub edit_target: Option<EditTarget>,
    pub roster_selected: usize,
    pub template_selected: usize,
    pub player_selected: usize,
    pub field_selected: usize,
    pub logs: VecDeque<String>,
    /// Commands queued for the provider thread; the event loop drains it.
    pub outbox: Vec<ProviderCommand>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PathBuf::from("."), Duration::from_millis(crate::config::DEFAULT_SUCCESS_MODAL_MS))
    }
}

impl AppState {
    pub fn new(download_dir: PathBuf, success_duration: Duration) -> Self {
        Self {
            screen: Screen::Login,
            auth: AuthStore::new(),
            session_checked: false,
            login_username: String::new(),
            login_password: String::new(),
            login_focus: LoginField::Username,
            rosters: RosterListStore::new(),
            templates: TemplateStore::new(),
            roster_detail: RosterDetailStore::new(),
            player: PlayerStore::new(""),
            updater: PlayerUpdater::new(),
            downloader: RosterDownloader::new(download_dir),
            modals: Modals::new(success_duration),
            edit_target: None,
            roster_selected: 0,
            template_selected: 0,
            player_selected: 0,
            field_selected: 0,
            logs: VecDeque::new(),
            outbox: Vec::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let line = format!("{} {}", Local::now().format("%H:%M:%S"), msg.into());
        self.logs.push_back(line);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn take_outbox(&mut self) -> Vec<ProviderCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn restore_session(&mut self) {
        self.outbox.push(ProviderCommand::RestoreSession);
    }

    pub fn submit_login(&mut self, register: bool) {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();
        if !self.auth.begin(&username, &password) {
            return;
        }
        let cmd = if register {
            ProviderCommand::Register { username, password }
        } else {
            ProviderCommand::Login { username, password }
        };
        self.outbox.push(cmd);
    }

    pub fn request_logout(&mut self) {
        self.modals.show_confirm(
            ConfirmModal::new("Log out", "End this session?", PendingAction::Logout)
                .labels("Log out", "Stay"),
        );
    }

    pub fn request_rosters(&mut self) {
        let ticket = self.rosters.begin_fetch();
        self.outbox.push(ProviderCommand::FetchRosters { ticket });
    }

    pub fn request_templates(&mut self) {
        let ticket = self.templates.begin_fetch();
        self.outbox.push(ProviderCommand::FetchTemplates { ticket });
    }

    /// Screen re-focus: refetch what the screen shows.
    pub fn refresh_screen(&mut self) {
        match self.screen {
            Screen::Login => {}
            Screen::Rosters => self.request_rosters(),
            Screen::Templates => self.request_templates(),
            Screen::RosterDetail => {
                if let Some((ticket, roster_id)) = self.roster_detail.begin_refetch() {
                    self.outbox.push(ProviderCommand::FetchRoster { ticket, roster_id });
                }
            }
            Screen::PlayerDetail => {
                if let Some(ticket) = self.player.begin_fetch() {
                    let player_id = self.player.player_id().to_string();
                    self.outbox.push(ProviderCommand::FetchPlayer { ticket, player_id });
                }
            }
        }
    }

    pub fn show_rosters(&mut self) {
        self.screen = Screen::Rosters;
        self.request_rosters();
    }

    pub fn show_templates(&mut self) {
        self.screen = Screen::Templates;
        self.request_templates();
    }

    pub fn open_roster(&mut self, roster_id: &str) {
        self.screen = Screen::RosterDetail;
        self.player_selected = 0;
        if let Some(ticket) = self.roster_detail.set_roster_id(Some(roster_id))
            && let Some(roster_id) = self.roster_detail.roster_id()
        {
            self.outbox.push(ProviderCommand::FetchRoster {
                ticket,
                roster_id: roster_id.to_string(),
            });
        }
    }

    pub fn open_player(&mut self, player_id: &str) {
        self.screen = Screen::PlayerDetail;
        self.field_selected = 0;
        if let Some(ticket) = self.player.set_player_id(player_id) {
            self.outbox.push(ProviderCommand::FetchPlayer {
                ticket,
                player_id: self.player.player_id().to_string(),
            });
        }
    }

    pub fn leave_player(&mut self) {
        self.player.detach();
        self.screen = Screen::RosterDetail;
    }

    pub fn leave_roster_detail(&mut self) {
        self.roster_detail.detach();
        self.screen = Screen::Rosters;
    }

    pub fn selected_roster(&self) -> Option<&Roster> {
        self.rosters.rosters().get(self.roster_selected)
    }

    pub fn selected_template(&self) -> Option<&Roster> {
        self.templates.templates().get(self.template_selected)
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.roster_detail
            .roster()
            .and_then(|r| r.players.get(self.player_selected))
    }

    pub fn start_rename(&mut self) {
        let Some(roster) = self.selected_roster() else {
            return;
        };
        let roster_id = roster.roster_id.clone();
        let current = FieldValue::Text(roster.name.clone().unwrap_or_default());
        self.modals.show_edit("name", &current, EditKind::Basic);
        self.edit_target = Some(EditTarget::RenameRoster { roster_id });
    }

    pub fn start_create(&mut self) {
        let Some(template) = self.selected_template() else {
            return;
        };
        let template_id = template.roster_id.clone();
        let suggested = FieldValue::Text(format!("{} copy", template.display_name()));
        self.modals.show_edit("name", &suggested, EditKind::Basic);
        self.edit_target = Some(EditTarget::CreateFromTemplate { template_id });
    }

    pub fn start_delete(&mut self) {
        let Some(roster) = self.selected_roster() else {
            return;
        };
        let confirm = ConfirmModal::new(
            "Delete roster",
            format!("Delete \"{}\"? This cannot be undone.", roster.display_name()),
            PendingAction::DeleteRoster {
                roster_id: roster.roster_id.clone(),
            },
        )
        .labels("Delete", "Cancel")
        .danger();
        self.modals.show_confirm(confirm);
    }

    /// Editable fields on the player screen: basic info first, then every skill.
    pub fn player_fields(&self) -> Vec<(&'static str, EditKind)> {
        let mut fields: Vec<(&'static str, EditKind)> = [
            "firstName",
            "lastName",
            "jerseyNumber",
            "position",
            "age",
            "height",
            "weightPounds",
            "isImpactPlayer",
        ]
        .into_iter()
        .map(|f| (f, EditKind::Basic))
        .collect();
        fields.extend(skills::all_skills().into_iter().map(|s| (s, EditKind::Skill)));
        fields
    }

    pub fn start_player_edit(&mut self) {
        let Some(player) = self.player.player() else {
            return;
        };
        let fields = self.player_fields();
        let Some((field, kind)) = fields.get(self.field_selected).copied() else {
            return;
        };
        let current = player
            .field_value(field)
            .unwrap_or(FieldValue::Text(String::new()));
        self.modals.show_edit(field, &current, kind);
        self.edit_target = Some(EditTarget::PlayerField);
    }

    pub fn cancel_edit(&mut self) {
        self.modals.hide_edit();
        self.edit_target = None;
    }

    /// Accepts the edit dialog. Domain validation happens here, before a
    /// command is queued.
    pub fn confirm_edit(&mut self) {
        let Some(target) = self.edit_target.take() else {
            self.modals.hide_edit();
            return;
        };
        let edit = self.modals.edit.clone();
        self.modals.hide_edit();

        match target {
            EditTarget::RenameRoster { roster_id } => match validate_roster_name(&edit.input) {
                Ok(name) => self
                    .outbox
                    .push(ProviderCommand::RenameRoster { roster_id, name }),
                Err(err) => self.modals.show_error(err.to_string()),
            },
            EditTarget::CreateFromTemplate { template_id } => {
                match validate_create(&template_id, &edit.input) {
                    Ok(form) => self.outbox.push(ProviderCommand::CreateRoster { form }),
                    Err(err) => self.modals.show_error(err.to_string()),
                }
            }
            EditTarget::PlayerField => {
                let value = match edit.parse_input() {
                    Ok(value) => value,
                    Err(err) => {
                        self.modals.show_error(err.to_string());
                        return;
                    }
                };
                let player_id = self.player.player_id().to_string();
                match edit.kind {
                    EditKind::Basic => {
                        if !self.updater.begin_basic_info(&player_id, &edit.field) {
                            let msg = self.updater.basic_info.error.clone().unwrap_or_default();
                            self.modals.show_error(msg);
                            return;
                        }
                        self.outbox.push(ProviderCommand::UpdateBasicInfo {
                            player_id,
                            field: edit.field,
                            value,
                        });
                    }
                    EditKind::Skill => {
                        let Some(value) = value.as_i64() else {
                            self.modals.show_error("Please enter a valid number");
                            return;
                        };
                        if !self.updater.begin_skill(&player_id, &edit.field) {
                            let msg = self.updater.skill.error.clone().unwrap_or_default();
                            self.modals.show_error(msg);
                            return;
                        }
                        self.outbox.push(ProviderCommand::UpdateSkill {
                            player_id,
                            skill: edit.field,
                            value,
                        });
                    }
                }
            }
        }
    }

    pub fn resolve_confirm(&mut self, accepted: bool) {
        match self.modals.resolve_confirm(accepted) {
            Some(PendingAction::DeleteRoster { roster_id }) => {
                self.outbox.push(ProviderCommand::DeleteRoster { roster_id });
            }
            Some(PendingAction::Logout) => {
                self.auth.loading = true;
                self.outbox.push(ProviderCommand::Logout);
            }
            None => {}
        }
    }

    pub fn request_download(&mut self) {
        let roster_id = match self.screen {
            Screen::RosterDetail => self.roster_detail.roster_id().map(str::to_string),
            _ => self.selected_roster().map(|r| r.roster_id.clone()),
        };
        let Some(roster_id) = roster_id else {
            return;
        };
        if self.downloader.downloading {
            self.push_log("[INFO] Download already running");
            return;
        }
        self.downloader.begin();
        self.outbox.push(ProviderCommand::DownloadRoster { roster_id });
    }

    fn clamp_selection(&mut self) {
        self.roster_selected = self
            .roster_selected
            .min(self.rosters.rosters().len().saturating_sub(1));
        self.template_selected = self
            .template_selected
            .min(self.templates.templates().len().saturating_sub(1));
        let players = self.roster_detail.roster().map_or(0, |r| r.players.len());
        self.player_selected = self.player_selected.min(players.saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Rosters => self.roster_selected += 1,
            Screen::Templates => self.template_selected += 1,
            Screen::RosterDetail => self.player_selected += 1,
            Screen::PlayerDetail => {
                self.field_selected = (self.field_selected + 1)
                    .min(self.player_fields().len().saturating_sub(1));
            }
            Screen::Login => {}
        }
        self.clamp_selection();
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Rosters => self.roster_selected = self.roster_selected.saturating_sub(1),
            Screen::Templates => self.template_selected = self.template_selected.saturating_sub(1),
            Screen::RosterDetail => self.player_selected = self.player_selected.saturating_sub(1),
            Screen::PlayerDetail => self.field_selected = self.field_selected.saturating_sub(1),
            Screen::Login => {}
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    let now = Instant::now();
    match delta {
        Delta::Log(msg) => state.push_log(msg),
        Delta::SessionRestored(user) => {
            state.session_checked = true;
            state.auth.user = user;
            if let Some(user) = &state.auth.user {
                let name = user.display_name().to_string();
                state.push_log(format!("[INFO] Session restored for {name}"));
                state.show_rosters();
            }
        }
        Delta::LoggedIn(result) => {
            if state.auth.settle(result) {
                state.login_password.clear();
                let name = state
                    .auth
                    .user
                    .as_ref()
                    .map(|u| u.display_name().to_string())
                    .unwrap_or_default();
                state.modals.show_success(format!("Welcome, {name}"), now);
                state.show_rosters();
            } else if let Some(err) = state.auth.error.clone() {
                state.modals.show_error(err);
            }
        }
        Delta::LoggedOut(result) => {
            if state.auth.settle_logout(result) {
                state.rosters = RosterListStore::new();
                state.templates = TemplateStore::new();
                state.roster_detail = RosterDetailStore::new();
                state.player = PlayerStore::new("");
                state.screen = Screen::Login;
                state.modals.show_success("Logged out", now);
            } else if let Some(err) = state.auth.error.clone() {
                state.modals.show_error(err);
            }
        }
        Delta::Rosters { ticket, result } => {
            if state.rosters.settle_fetch(ticket, result) {
                state.clamp_selection();
                if let Some(err) = state.rosters.error() {
                    let msg = format!("[WARN] Rosters: {err}");
                    state.push_log(msg);
                }
            }
        }
        Delta::Templates { ticket, result } => {
            if state.templates.settle_fetch(ticket, result) {
                state.clamp_selection();
                if let Some(err) = state.templates.error() {
                    let msg = format!("[WARN] Templates: {err}");
                    state.push_log(msg);
                }
            }
        }
        Delta::RosterDetail { ticket, result } => {
            if state.roster_detail.settle_fetch(ticket, result) {
                state.clamp_selection();
            }
        }
        Delta::Player { ticket, result } => {
            state.player.settle_fetch(ticket, result);
        }
        Delta::RosterCreated { name, result } => match state.rosters.settle_create(result) {
            Ok(created) => {
                state.modals.show_success(format!("Created \"{name}\""), now);
                state.push_log(format!("[INFO] Roster {} created", created.id));
                state.screen = Screen::Rosters;
                if state.rosters.take_refetch() {
                    state.request_rosters();
                }
            }
            Err(err) => state.modals.show_error(err.to_string()),
        },
        Delta::RosterRenamed { roster_id, name, result } => {
            match state.rosters.settle_rename(&roster_id, &name, result) {
                Ok(_) => state.modals.show_success("Roster renamed", now),
                Err(err) => state.modals.show_error(err.to_string()),
            }
        }
        Delta::RosterDeleted { roster_id, result } => {
            match state.rosters.settle_delete(&roster_id, result) {
                Ok(message) => {
                    state.clamp_selection();
                    state.modals.show_success(message, now);
                }
                Err(err) => state.modals.show_error(err.to_string()),
            }
        }
        Delta::BasicInfoUpdated { player_id, field, value, result } => {
            if state.updater.settle_basic_info(result).is_none() {
                let msg = state.updater.basic_info.error.clone().unwrap_or_default();
                state.modals.show_error(msg);
                return;
            }
            settle_player_merge(state, &player_id, &field, &value, now);
        }
        Delta::SkillUpdated { player_id, skill, value, result } => {
            if state.updater.settle_skill(result).is_none() {
                let msg = state.updater.skill.error.clone().unwrap_or_default();
                state.modals.show_error(msg);
                return;
            }
            settle_player_merge(state, &player_id, &skill, &FieldValue::Int(value), now);
        }
        Delta::DownloadFinished(result) => {
            if state.downloader.finish(result) {
                let path = state
                    .downloader
                    .last_saved
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                state.modals.show_success(format!("Saved {path}"), now);
            } else {
                let msg = state
                    .downloader
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "Download failed".to_string());
                state.modals.show_error(msg);
            }
        }
    }
}

fn settle_player_merge(state: &mut AppState, player_id: &str, field: &str, value: &FieldValue, now: Instant) {
    // The user may have moved to another player while the edit was in flight.
    if state.player.player_id() == player_id
        && let Err(err) = state.player.merge_field(field, value)
    {
        state.modals.show_error(err.to_string());
        return;
    }
    let label = skills::skill_label(field).unwrap_or(field).to_string();
    state.modals.show_success(format!("{label} updated successfully"), now);
}
