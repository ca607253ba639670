use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};

use crate::auth_api::AuthApi;
use crate::config::AppConfig;
use crate::download_api::DownloadApi;
use crate::http_client::HttpClient;
use crate::player_api::PlayerApi;
use crate::player_store::run_download;
use crate::roster_api::RosterApi;
use crate::session::Session;
use crate::state::{Delta, ProviderCommand};

/// Every backend service, sharing one client and one session.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthApi,
    pub rosters: RosterApi,
    pub players: PlayerApi,
    pub downloads: DownloadApi,
}

impl Services {
    pub fn new(http: HttpClient) -> Self {
        Self {
            auth: AuthApi::new(http.clone()),
            rosters: RosterApi::new(http.clone()),
            players: PlayerApi::new(http.clone()),
            downloads: DownloadApi::new(http),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::from_config(config, Session::new())?;
        Ok(Self::new(http))
    }
}

/// Runs one command to completion. Commands are handled in arrival order on a
/// single thread, so two edits never race each other on the backend.
pub fn handle_command(services: &Services, download_dir: &Path, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::RestoreSession => Delta::SessionRestored(services.auth.current_user()),
        ProviderCommand::Login { username, password } => {
            Delta::LoggedIn(services.auth.login(&username, &password))
        }
        ProviderCommand::Register { username, password } => {
            Delta::LoggedIn(services.auth.register(&username, &password))
        }
        ProviderCommand::Logout => Delta::LoggedOut(services.auth.logout()),
        ProviderCommand::FetchRosters { ticket } => Delta::Rosters {
            ticket,
            result: services.rosters.get_user_rosters(),
        },
        ProviderCommand::FetchTemplates { ticket } => Delta::Templates {
            ticket,
            result: services.rosters.get_template_rosters(),
        },
        ProviderCommand::FetchRoster { ticket, roster_id } => Delta::RosterDetail {
            ticket,
            result: services.rosters.get_roster(&roster_id),
        },
        ProviderCommand::FetchPlayer { ticket, player_id } => Delta::Player {
            ticket,
            result: services.players.get_player(&player_id),
        },
        ProviderCommand::CreateRoster { form } => Delta::RosterCreated {
            result: services.rosters.create_roster_from_template(&form),
            name: form.roster_name,
        },
        ProviderCommand::RenameRoster { roster_id, name } => {
            let result = services.rosters.update_roster(&roster_id, &name);
            Delta::RosterRenamed { roster_id, name, result }
        }
        ProviderCommand::DeleteRoster { roster_id } => {
            let result = services.rosters.delete_roster(&roster_id);
            Delta::RosterDeleted { roster_id, result }
        }
        ProviderCommand::UpdateBasicInfo { player_id, field, value } => {
            let result = services.players.update_basic_info(&player_id, &field, &value);
            Delta::BasicInfoUpdated { player_id, field, value, result }
        }
        ProviderCommand::UpdateSkill { player_id, skill, value } => {
            let result = services.players.update_skill(&player_id, &skill, value);
            Delta::SkillUpdated { player_id, skill, value, result }
        }
        ProviderCommand::DownloadRoster { roster_id } => {
            Delta::DownloadFinished(run_download(&services.downloads, download_dir, &roster_id))
        }
    }
}

/// Console line for outcomes that happen off screen. The UI shows the modal;
/// this keeps a record in the footer log.
pub fn log_line(delta: &Delta) -> Option<String> {
    match delta {
        Delta::LoggedIn(Err(err)) => Some(format!("[WARN] Login failed: {err}")),
        Delta::LoggedOut(Err(err)) => Some(format!("[WARN] Logout failed: {err}")),
        Delta::DownloadFinished(Ok(path)) => {
            Some(format!("[INFO] Saved roster export to {}", path.display()))
        }
        Delta::DownloadFinished(Err(err)) => Some(format!("[WARN] Download failed: {err:#}")),
        Delta::RosterCreated { result: Err(err), .. } => {
            Some(format!("[WARN] Roster create failed: {err}"))
        }
        _ => None,
    }
}

pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    services: Services,
    download_dir: PathBuf,
) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("provider".to_string())
        .spawn(move || {
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.label(), "provider command");
                let delta = handle_command(&services, &download_dir, cmd);
                if let Some(line) = log_line(&delta)
                    && tx.send(Delta::Log(line)).is_err()
                {
                    break;
                }
                if tx.send(delta).is_err() {
                    break;
                }
            }
            tracing::info!("provider thread stopped");
        })
        .context("failed to spawn provider thread")
}
