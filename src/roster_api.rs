use serde_json::json;

use crate::http_client::{ApiError, ApiResult, HttpClient, take_field};
use crate::models::{CreateRosterForm, CreatedRoster, RenamedRoster, Roster};

#[derive(Clone)]
pub struct RosterApi {
    http: HttpClient,
}

impl RosterApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn get_user_rosters(&self) -> ApiResult<Vec<Roster>> {
        let mut data = self.http.get_json("/api/rosters")?;
        let rosters: Vec<Roster> = take_field(&mut data, "rosters")?;
        tracing::debug!(count = rosters.len(), "fetched user rosters");
        Ok(rosters)
    }

    pub fn get_template_rosters(&self) -> ApiResult<Vec<Roster>> {
        let mut data = self.http.get_json("/api/rosters/templates")?;
        take_field(&mut data, "templates")
    }

    pub fn get_roster(&self, roster_id: &str) -> ApiResult<Roster> {
        let mut data = self.http.get_json(&format!("/api/rosters/{roster_id}"))?;
        take_field(&mut data, "roster")
    }

    pub fn create_roster_from_template(&self, form: &CreateRosterForm) -> ApiResult<CreatedRoster> {
        let body = serde_json::to_value(form).map_err(|e| ApiError::Decode {
            detail: format!("serialize create form: {e}"),
        })?;
        let mut data = self.http.post_json("/api/rosters/create", Some(&body))?;
        take_field(&mut data, "roster")
    }

    pub fn update_roster(&self, roster_id: &str, name: &str) -> ApiResult<RenamedRoster> {
        let body = json!({ "name": name });
        let mut data = self
            .http
            .patch_json(&format!("/api/rosters/{roster_id}"), &body)?;
        take_field(&mut data, "roster")
    }

    /// Returns the server's confirmation message.
    pub fn delete_roster(&self, roster_id: &str) -> ApiResult<String> {
        let mut data = self.http.delete_json(&format!("/api/rosters/{roster_id}"))?;
        Ok(take_field::<String>(&mut data, "message").unwrap_or_else(|_| "Roster deleted".to_string()))
    }
}
