use std::fmt;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub roster_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, alias = "user")]
    pub owner: Option<User>,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Roster {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed roster)")
    }

    pub fn is_template(&self) -> bool {
        self.is_template.unwrap_or(false)
    }

    /// Drops players that belong to a different roster and returns how many
    /// were removed. Players without a roster id are kept.
    pub fn retain_own_players(&mut self) -> usize {
        let before = self.players.len();
        let roster_id = self.roster_id.clone();
        self.players
            .retain(|p| p.roster_id.is_empty() || p.roster_id == roster_id);
        before - self.players.len()
    }
}

/// A player record. The identity fields the client reasons about are typed;
/// every other backend attribute (skill ratings, contract data, appearance)
/// is kept verbatim in `attributes` so single-field merges work for any name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub jersey_number: i64,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub weight_pounds: i64,
    #[serde(default)]
    pub overall_rating: i64,
    #[serde(default)]
    pub is_impact_player: bool,
    #[serde(default)]
    pub roster_id: String,
    #[serde(default)]
    pub loadouts: Vec<PlayerLoadout>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn skill(&self, name: &str) -> Option<i64> {
        self.attributes.get(name).and_then(json_as_i64)
    }

    /// Current value of any field by its wire name.
    pub fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => FieldValue::Text(self.id.clone()),
            "firstName" => FieldValue::Text(self.first_name.clone()),
            "lastName" => FieldValue::Text(self.last_name.clone()),
            "jerseyNumber" => FieldValue::Int(self.jersey_number),
            "position" => FieldValue::Int(self.position),
            "age" => FieldValue::Int(self.age),
            "height" => FieldValue::Int(self.height),
            "weightPounds" => FieldValue::Int(self.weight_pounds),
            "overallRating" => FieldValue::Int(self.overall_rating),
            "isImpactPlayer" => FieldValue::Bool(self.is_impact_player),
            "rosterId" => FieldValue::Text(self.roster_id.clone()),
            other => return self.attributes.get(other).and_then(FieldValue::from_json),
        };
        Some(value)
    }

    /// Shallow merge of one field. Every other field is left untouched.
    pub fn merge_field(&mut self, field: &str, value: &FieldValue) -> Result<()> {
        match field {
            "id" | "rosterId" | "loadouts" => {
                return Err(anyhow!("{field} is not editable"));
            }
            "firstName" => self.first_name = value.to_string(),
            "lastName" => self.last_name = value.to_string(),
            "jerseyNumber" => self.jersey_number = expect_int(field, value)?,
            "position" => self.position = expect_int(field, value)?,
            "age" => self.age = expect_int(field, value)?,
            "height" => self.height = expect_int(field, value)?,
            "weightPounds" => self.weight_pounds = expect_int(field, value)?,
            "overallRating" => self.overall_rating = expect_int(field, value)?,
            "isImpactPlayer" => {
                self.is_impact_player = value
                    .as_bool()
                    .ok_or_else(|| anyhow!("{field} expects true or false"))?;
            }
            other => {
                self.attributes.insert(other.to_string(), value.to_json());
            }
        }
        Ok(())
    }
}

fn expect_int(field: &str, value: &FieldValue) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| anyhow!("{field} expects a whole number"))
}

fn json_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLoadout {
    #[serde(default)]
    pub loadout_id: String,
    #[serde(default)]
    pub player_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub loadout_type: i64,
    #[serde(default)]
    pub loadout_category: i64,
    #[serde(default)]
    pub loadout_elements: Vec<LoadoutElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadoutElement {
    #[serde(default)]
    pub loadout_element_id: String,
    #[serde(default)]
    pub element_name: String,
    #[serde(default)]
    pub element_category: String,
    #[serde(default)]
    pub element_type: String,
}

/// Value carried by a basic-info update: text, number or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRosterForm {
    pub template_id: String,
    pub roster_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoster {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub player_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedRoster {
    pub id: String,
    #[serde(default)]
    pub name: String,
}
