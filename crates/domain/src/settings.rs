use chrono::{Duration, FixedOffset, NaiveTime};
use strum::{Display, EnumString};

use crate::{ReadError, Unit, UpdateError, UserID};

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self, user_id: UserID) -> Result<Settings, ReadError>;
    async fn set_settings(&self, user_id: UserID, settings: Settings)
    -> Result<Settings, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    /// Stored settings of the user, or the defaults if none were stored.
    async fn read_settings(&self, user_id: UserID) -> Result<Settings, ReadError>;
    async fn write_settings(
        &self,
        user_id: UserID,
        settings: Settings,
    ) -> Result<Settings, UpdateError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub display_unit: Unit,
    pub utc_offset_minutes: i32,
    pub reminder_time: NaiveTime,
    pub history_limit: usize,
    /// Unfinished sessions without activity for this long are no longer
    /// considered active.
    pub active_session_threshold_hours: u32,
    pub active_session_policy: ActiveSessionPolicy,
}

impl Settings {
    pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.utc_offset()?;
        if self.history_limit == 0 {
            return Err(SettingsError::InvalidHistoryLimit);
        }
        if self.active_session_threshold_hours == 0 {
            return Err(SettingsError::InvalidActiveSessionThreshold);
        }
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, SettingsError> {
        if self.utc_offset_minutes.abs() > Self::MAX_UTC_OFFSET_MINUTES {
            return Err(SettingsError::InvalidUtcOffset(self.utc_offset_minutes));
        }
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or(SettingsError::InvalidUtcOffset(self.utc_offset_minutes))
    }

    #[must_use]
    pub fn active_session_threshold(&self) -> Duration {
        Duration::hours(i64::from(self.active_session_threshold_hours))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_unit: Unit::Kg,
            utc_offset_minutes: 0,
            reminder_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default(),
            history_limit: 20,
            active_session_threshold_hours: 2,
            active_session_policy: ActiveSessionPolicy::default(),
        }
    }
}

/// What starting a workout does while another one is still active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ActiveSessionPolicy {
    /// Continue the active session.
    #[default]
    Resume,
    /// Refuse to start a new session.
    Reject,
    /// Finish the active session and start a new one.
    FinishAndStartNew,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    #[error("UTC offset must be within ±14 hours ({0} minutes)")]
    InvalidUtcOffset(i32),
    #[error("history limit must be greater than zero")]
    InvalidHistoryLimit,
    #[error("active session threshold must be greater than zero")]
    InvalidActiveSessionThreshold,
}
