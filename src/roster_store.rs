use anyhow::{Result, bail};

use crate::fetch_state::{LoadStatus, MutationStrategy, RequestTicket, Resource};
use crate::http_client::ApiResult;
use crate::models::{CreateRosterForm, CreatedRoster, RenamedRoster, Roster};
use crate::roster_api::RosterApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterMutation {
    Create,
    Rename,
    Delete,
}

impl RosterMutation {
    pub fn strategy(self) -> MutationStrategy {
        match self {
            RosterMutation::Create => MutationStrategy::RefetchAfter,
            RosterMutation::Rename | RosterMutation::Delete => MutationStrategy::OptimisticPatch,
        }
    }
}

fn enforce_membership(roster: &mut Roster) {
    let dropped = roster.retain_own_players();
    if dropped > 0 {
        tracing::warn!(roster_id = %roster.roster_id, dropped, "dropped players from another roster");
    }
}

pub fn validate_roster_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Roster name cannot be empty");
    }
    Ok(name.to_string())
}

/// Builds the create request, rejecting blank input before anything is sent.
pub fn validate_create(template_id: &str, roster_name: &str) -> Result<CreateRosterForm> {
    if template_id.trim().is_empty() {
        bail!("No template selected");
    }
    Ok(CreateRosterForm {
        template_id: template_id.trim().to_string(),
        roster_name: validate_roster_name(roster_name)?,
    })
}

/// The signed-in user's rosters.
///
/// Mutations report failure through `Err` and leave the cached list as it
/// was; callers handle the error. Creation refetches the list, rename and
/// delete patch it in place.
#[derive(Debug, Clone, Default)]
pub struct RosterListStore {
    list: Resource<Vec<Roster>>,
    refetch_due: bool,
}

impl RosterListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rosters(&self) -> &[Roster] {
        self.list.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get(&self, roster_id: &str) -> Option<&Roster> {
        self.rosters().iter().find(|r| r.roster_id == roster_id)
    }

    pub fn status(&self) -> &LoadStatus {
        self.list.status()
    }

    pub fn loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.list.error()
    }

    pub fn begin_fetch(&mut self) -> RequestTicket {
        self.list.begin()
    }

    pub fn settle_fetch(&mut self, ticket: RequestTicket, result: ApiResult<Vec<Roster>>) -> bool {
        let result = result.map(|mut rosters| {
            rosters.iter_mut().for_each(enforce_membership);
            rosters
        });
        self.list.settle(ticket, result)
    }

    pub fn fetch(&mut self, api: &RosterApi) -> bool {
        let ticket = self.begin_fetch();
        self.settle_fetch(ticket, api.get_user_rosters())
    }

    pub fn detach(&mut self) {
        self.list.detach();
    }

    pub fn create_roster(
        &mut self,
        api: &RosterApi,
        template_id: &str,
        roster_name: &str,
    ) -> Result<CreatedRoster> {
        let form = validate_create(template_id, roster_name)?;
        let created = self.settle_create(api.create_roster_from_template(&form))?;
        if self.take_refetch() {
            self.fetch(api);
        }
        Ok(created)
    }

    pub fn update_roster(
        &mut self,
        api: &RosterApi,
        roster_id: &str,
        name: &str,
    ) -> Result<RenamedRoster> {
        let name = validate_roster_name(name)?;
        let result = api.update_roster(roster_id, &name);
        self.settle_rename(roster_id, &name, result)
    }

    pub fn delete_roster(&mut self, api: &RosterApi, roster_id: &str) -> Result<String> {
        if roster_id.trim().is_empty() {
            bail!("No roster ID provided");
        }
        let result = api.delete_roster(roster_id);
        self.settle_delete(roster_id, result)
    }

    pub fn settle_create(&mut self, result: ApiResult<CreatedRoster>) -> Result<CreatedRoster> {
        let created = result?;
        tracing::info!(roster_id = %created.id, "roster created");
        self.reconcile(RosterMutation::Create, &created.id, None);
        Ok(created)
    }

    pub fn settle_rename(
        &mut self,
        roster_id: &str,
        name: &str,
        result: ApiResult<RenamedRoster>,
    ) -> Result<RenamedRoster> {
        let renamed = result?;
        self.reconcile(RosterMutation::Rename, roster_id, Some(name));
        Ok(renamed)
    }

    pub fn settle_delete(&mut self, roster_id: &str, result: ApiResult<String>) -> Result<String> {
        let message = result?;
        self.reconcile(RosterMutation::Delete, roster_id, None);
        Ok(message)
    }

    /// Whether an accepted mutation left the list in need of a refetch.
    /// Reading the flag clears it.
    pub fn take_refetch(&mut self) -> bool {
        std::mem::take(&mut self.refetch_due)
    }

    /// Brings the cache in line with an accepted mutation, following the
    /// mutation's strategy.
    fn reconcile(&mut self, mutation: RosterMutation, roster_id: &str, name: Option<&str>) {
        match mutation.strategy() {
            MutationStrategy::RefetchAfter => self.refetch_due = true,
            MutationStrategy::OptimisticPatch => {
                let patched = match (mutation, name) {
                    (RosterMutation::Rename, Some(name)) => self.apply_rename(roster_id, name),
                    (RosterMutation::Delete, _) => self.apply_removal(roster_id),
                    _ => false,
                };
                if !patched {
                    tracing::debug!(roster_id, ?mutation, "mutated roster was not in the cached list");
                }
            }
        }
    }

    /// Rewrites `name` of the matching entry only.
    pub fn apply_rename(&mut self, roster_id: &str, name: &str) -> bool {
        let Some(rosters) = self.list.data_mut() else {
            return false;
        };
        match rosters.iter_mut().find(|r| r.roster_id == roster_id) {
            Some(roster) => {
                roster.name = Some(name.to_string());
                true
            }
            None => false,
        }
    }

    pub fn apply_removal(&mut self, roster_id: &str) -> bool {
        let Some(rosters) = self.list.data_mut() else {
            return false;
        };
        let before = rosters.len();
        rosters.retain(|r| r.roster_id != roster_id);
        rosters.len() != before
    }
}

/// Read-only list of template rosters.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    list: Resource<Vec<Roster>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates(&self) -> &[Roster] {
        self.list.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.list.error()
    }

    pub fn begin_fetch(&mut self) -> RequestTicket {
        self.list.begin()
    }

    pub fn settle_fetch(&mut self, ticket: RequestTicket, result: ApiResult<Vec<Roster>>) -> bool {
        self.list.settle(ticket, result)
    }

    pub fn fetch(&mut self, api: &RosterApi) -> bool {
        let ticket = self.begin_fetch();
        self.settle_fetch(ticket, api.get_template_rosters())
    }

    pub fn detach(&mut self) {
        self.list.detach();
    }
}

/// One roster with its players, refetched whenever the selected id changes.
/// Independent from [`RosterListStore`]; the two may disagree until refetched.
#[derive(Debug, Clone, Default)]
pub struct RosterDetailStore {
    roster_id: Option<String>,
    requested: bool,
    detail: Resource<Roster>,
}

impl RosterDetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster_id(&self) -> Option<&str> {
        self.roster_id.as_deref()
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.detail.data()
    }

    pub fn loading(&self) -> bool {
        self.detail.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.detail.error()
    }

    /// Points the store at `roster_id`. Returns a ticket when a request has
    /// to go out; `None` when the id is unchanged and still being served, or
    /// missing (the latter fails the store immediately).
    pub fn set_roster_id(&mut self, roster_id: Option<&str>) -> Option<RequestTicket> {
        let roster_id = roster_id.map(str::trim).filter(|id| !id.is_empty());
        if self.requested && self.roster_id.as_deref() == roster_id {
            return None;
        }
        self.requested = true;
        self.roster_id = roster_id.map(str::to_string);
        self.detail.clear();
        if self.roster_id.is_none() {
            self.detail.fail_now("No roster ID provided");
            return None;
        }
        Some(self.detail.begin())
    }

    /// Ticket for fetching the current id again.
    pub fn begin_refetch(&mut self) -> Option<(RequestTicket, String)> {
        let roster_id = self.roster_id.clone()?;
        Some((self.detail.begin(), roster_id))
    }

    pub fn settle_fetch(&mut self, ticket: RequestTicket, result: ApiResult<Roster>) -> bool {
        let result = result.map(|mut roster| {
            enforce_membership(&mut roster);
            roster
        });
        self.detail.settle(ticket, result)
    }

    pub fn load(&mut self, api: &RosterApi, roster_id: Option<&str>) -> bool {
        let Some(ticket) = self.set_roster_id(roster_id) else {
            return false;
        };
        let Some(roster_id) = self.roster_id.clone() else {
            return false;
        };
        self.settle_fetch(ticket, api.get_roster(&roster_id))
    }

    pub fn refetch(&mut self, api: &RosterApi) -> bool {
        let Some((ticket, roster_id)) = self.begin_refetch() else {
            return false;
        };
        self.settle_fetch(ticket, api.get_roster(&roster_id))
    }

    /// The screen went away. Whatever is in flight is ignored and the next
    /// `set_roster_id` fetches again, even for the same id.
    pub fn detach(&mut self) {
        self.detail.detach();
        self.requested = false;
    }
}
