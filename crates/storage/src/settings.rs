use buddygym_domain as domain;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%H:%M";

/// Settings as stored in a JSON document. Missing keys take their default.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Document {
    pub display_unit: Option<String>,
    pub utc_offset_minutes: Option<i32>,
    pub reminder_time: Option<String>,
    pub history_limit: Option<usize>,
    pub active_session_threshold_hours: Option<u32>,
    pub active_session_policy: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
    #[error("invalid time: {0}")]
    InvalidTime(String),
    #[error("unknown active session policy: {0}")]
    UnknownPolicy(String),
    #[error(transparent)]
    Invalid(#[from] domain::SettingsError),
}

impl From<&domain::Settings> for Document {
    fn from(value: &domain::Settings) -> Self {
        Self {
            display_unit: Some(value.display_unit.to_string()),
            utc_offset_minutes: Some(value.utc_offset_minutes),
            reminder_time: Some(value.reminder_time.format(TIME_FORMAT).to_string()),
            history_limit: Some(value.history_limit),
            active_session_threshold_hours: Some(value.active_session_threshold_hours),
            active_session_policy: Some(value.active_session_policy.to_string()),
        }
    }
}

impl TryFrom<Document> for domain::Settings {
    type Error = Error;

    fn try_from(value: Document) -> Result<Self, Self::Error> {
        let default = domain::Settings::default();
        let settings = domain::Settings {
            display_unit: match value.display_unit {
                Some(unit) => unit.parse().map_err(|_| Error::UnknownUnit(unit))?,
                None => default.display_unit,
            },
            utc_offset_minutes: value
                .utc_offset_minutes
                .unwrap_or(default.utc_offset_minutes),
            reminder_time: match value.reminder_time {
                Some(time) => parse_time(&time)?,
                None => default.reminder_time,
            },
            history_limit: value.history_limit.unwrap_or(default.history_limit),
            active_session_threshold_hours: value
                .active_session_threshold_hours
                .unwrap_or(default.active_session_threshold_hours),
            active_session_policy: match value.active_session_policy {
                Some(policy) => policy.parse().map_err(|_| Error::UnknownPolicy(policy))?,
                None => default.active_session_policy,
            },
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Parse a `HH:MM` time of day.
pub fn parse_time(time: &str) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
        .map_err(|_| Error::InvalidTime(time.to_string()))
}

pub fn from_json(json: &str) -> Result<domain::Settings, Error> {
    domain::Settings::try_from(serde_json::from_str::<Document>(json)?)
}

pub fn to_json(settings: &domain::Settings) -> Result<String, Error> {
    Ok(serde_json::to_string(&Document::from(settings))?)
}
