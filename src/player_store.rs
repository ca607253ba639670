use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};

use crate::download_api::{DownloadApi, save_export};
use crate::fetch_state::{LoadStatus, MutationStatus, RequestTicket, Resource};
use crate::http_client::ApiResult;
use crate::models::{FieldValue, Player};
use crate::player_api::PlayerApi;
use crate::skills;

/// Detail view of one player.
#[derive(Debug, Clone, Default)]
pub struct PlayerStore {
    player_id: String,
    player: Resource<Player>,
}

impl PlayerStore {
    pub fn new(player_id: &str) -> Self {
        Self {
            player_id: player_id.trim().to_string(),
            player: Resource::new(),
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.data()
    }

    pub fn status(&self) -> &LoadStatus {
        self.player.status()
    }

    pub fn loading(&self) -> bool {
        self.player.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.player.error()
    }

    /// Switches to another player. Returns a ticket when a fetch is due.
    pub fn set_player_id(&mut self, player_id: &str) -> Option<RequestTicket> {
        let player_id = player_id.trim();
        if player_id == self.player_id && self.player.data().is_some() {
            return None;
        }
        self.player_id = player_id.to_string();
        self.player.clear();
        self.begin_fetch()
    }

    /// `None` means no request should go out: an empty id fails the store
    /// on the spot.
    pub fn begin_fetch(&mut self) -> Option<RequestTicket> {
        if self.player_id.is_empty() {
            self.player.clear();
            self.player.fail_now("No player ID provided");
            return None;
        }
        Some(self.player.begin())
    }

    pub fn settle_fetch(&mut self, ticket: RequestTicket, result: ApiResult<Player>) -> bool {
        self.player.settle(ticket, result)
    }

    pub fn fetch(&mut self, api: &PlayerApi) -> bool {
        let Some(ticket) = self.begin_fetch() else {
            return false;
        };
        let result = api.get_player(&self.player_id);
        self.settle_fetch(ticket, result)
    }

    pub fn refetch(&mut self, api: &PlayerApi) -> bool {
        self.fetch(api)
    }

    pub fn detach(&mut self) {
        self.player.detach();
    }

    /// Applies one accepted edit to the cached player without touching any
    /// other field.
    pub fn merge_field(&mut self, field: &str, value: &FieldValue) -> Result<()> {
        let player = self
            .player
            .data_mut()
            .ok_or_else(|| anyhow!("No player loaded"))?;
        player.merge_field(field, value)
    }

    /// Sends a basic-info edit through `updater` and merges it on success.
    pub fn commit_basic_info(
        &mut self,
        updater: &mut PlayerUpdater,
        api: &PlayerApi,
        field: &str,
        value: &FieldValue,
    ) -> bool {
        let player_id = self.player_id.clone();
        if updater
            .update_basic_info(api, &player_id, field, value)
            .is_none()
        {
            return false;
        }
        self.merge_after_update(&mut updater.basic_info, field, value)
    }

    pub fn commit_skill(
        &mut self,
        updater: &mut PlayerUpdater,
        api: &PlayerApi,
        skill: &str,
        value: i64,
    ) -> bool {
        let player_id = self.player_id.clone();
        if updater.update_skill(api, &player_id, skill, value).is_none() {
            return false;
        }
        self.merge_after_update(&mut updater.skill, skill, &FieldValue::Int(value))
    }

    fn merge_after_update(
        &mut self,
        status: &mut MutationStatus,
        field: &str,
        value: &FieldValue,
    ) -> bool {
        match self.merge_field(field, value) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(field, error = %err, "server accepted edit but local merge failed");
                status.error = Some(err.to_string());
                false
            }
        }
    }
}

/// Single-field player edits.
///
/// Failures never surface as `Err`: both operations return `None` and leave
/// the message in the matching [`MutationStatus`]. Callers check the return
/// value.
#[derive(Debug, Clone, Default)]
pub struct PlayerUpdater {
    pub basic_info: MutationStatus,
    pub skill: MutationStatus,
}

impl PlayerUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> bool {
        self.basic_info.loading || self.skill.loading
    }

    /// Validates and marks the basic-info edit as in flight. `false` means
    /// the edit was rejected locally and nothing should be sent.
    pub fn begin_basic_info(&mut self, player_id: &str, field: &str) -> bool {
        self.basic_info.begin();
        match validate_target(player_id, field) {
            Ok(()) => true,
            Err(err) => {
                self.basic_info.reject(err.to_string());
                false
            }
        }
    }

    pub fn settle_basic_info(&mut self, result: ApiResult<Player>) -> Option<Player> {
        self.basic_info.finish(result)
    }

    pub fn begin_skill(&mut self, player_id: &str, skill: &str) -> bool {
        self.skill.begin();
        let checked = validate_target(player_id, skill).and_then(|()| {
            if skills::is_skill(skill) {
                Ok(())
            } else {
                Err(anyhow!("Unknown skill: {skill}"))
            }
        });
        match checked {
            Ok(()) => true,
            Err(err) => {
                self.skill.reject(err.to_string());
                false
            }
        }
    }

    pub fn settle_skill(&mut self, result: ApiResult<Player>) -> Option<Player> {
        self.skill.finish(result)
    }

    pub fn update_basic_info(
        &mut self,
        api: &PlayerApi,
        player_id: &str,
        field: &str,
        value: &FieldValue,
    ) -> Option<Player> {
        if !self.begin_basic_info(player_id, field) {
            return None;
        }
        let result = api.update_basic_info(player_id, field, value);
        self.settle_basic_info(result)
    }

    pub fn update_skill(
        &mut self,
        api: &PlayerApi,
        player_id: &str,
        skill: &str,
        value: i64,
    ) -> Option<Player> {
        if !self.begin_skill(player_id, skill) {
            return None;
        }
        let result = api.update_skill(player_id, skill, value);
        self.settle_skill(result)
    }
}

fn validate_target(player_id: &str, field: &str) -> Result<()> {
    if player_id.trim().is_empty() {
        bail!("No player ID provided");
    }
    if field.trim().is_empty() {
        bail!("No field selected");
    }
    Ok(())
}

/// Fetches a roster export and saves it under `dir`.
pub fn run_download(api: &DownloadApi, dir: &Path, roster_id: &str) -> Result<PathBuf> {
    if roster_id.trim().is_empty() {
        bail!("No roster ID provided");
    }
    let export = api.fetch_export(roster_id)?;
    save_export(dir, &export)
}

/// Roster export downloads. `download` reports success as a flag and never
/// returns an error.
#[derive(Debug, Clone)]
pub struct RosterDownloader {
    dir: PathBuf,
    pub downloading: bool,
    pub last_saved: Option<PathBuf>,
    pub last_error: Option<String>,
}

impl RosterDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            downloading: false,
            last_saved: None,
            last_error: None,
        }
    }

    pub fn begin(&mut self) {
        self.downloading = true;
        self.last_error = None;
    }

    pub fn finish(&mut self, result: Result<PathBuf>) -> bool {
        self.downloading = false;
        match result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "roster export saved");
                self.last_saved = Some(path);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "roster download failed");
                self.last_error = Some(err.to_string());
                false
            }
        }
    }

    pub fn download(&mut self, api: &DownloadApi, roster_id: &str) -> bool {
        self.begin();
        let result = run_download(api, &self.dir, roster_id);
        self.finish(result)
    }
}
