use serde_json::json;

use crate::http_client::{ApiResult, HttpClient, take_field};
use crate::models::{FieldValue, Player};

#[derive(Clone)]
pub struct PlayerApi {
    http: HttpClient,
}

impl PlayerApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn get_player(&self, player_id: &str) -> ApiResult<Player> {
        let mut data = self.http.get_json(&format!("/api/players/{player_id}"))?;
        take_field(&mut data, "player")
    }

    pub fn update_basic_info(
        &self,
        player_id: &str,
        field: &str,
        value: &FieldValue,
    ) -> ApiResult<Player> {
        let body = json!({ "field": field, "value": value });
        let mut data = self
            .http
            .patch_json(&format!("/api/players/{player_id}/basicInfoUpdate"), &body)?;
        take_field(&mut data, "player")
    }

    pub fn update_skill(&self, player_id: &str, skill: &str, value: i64) -> ApiResult<Player> {
        let body = json!({ "skillName": skill, "skillValue": value });
        let mut data = self
            .http
            .patch_json(&format!("/api/players/{player_id}/skillsUpdate"), &body)?;
        take_field(&mut data, "player")
    }
}
