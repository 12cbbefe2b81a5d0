//! Derives the enforcement banner for a player record.

use chrono::DateTime;
use chrono::Utc;

use crate::model::PlayerRecord;

/// Unix milliseconds of 2000-01-01T00:00:00Z. Temporary ban expirations are
/// stored as minutes past this instant.
const BAN_EPOCH_UNIX_MS: i64 = 946_684_800_000;

const MS_PER_MINUTE: i64 = 60_000;

pub fn ban_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(BAN_EPOCH_UNIX_MS).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Instant a temporary ban lifts. Saturates instead of overflowing.
pub fn temp_ban_expiry(expiration_minutes: i64) -> DateTime<Utc> {
    expiration_minutes
        .checked_mul(MS_PER_MINUTE)
        .and_then(|offset| BAN_EPOCH_UNIX_MS.checked_add(offset))
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(if expiration_minutes < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BanDisplayState {
    None,
    Permanent {
        reason: Option<String>,
        date: Option<String>,
        admin: Option<String>,
    },
    TemporaryActive {
        reason: Option<String>,
        date: Option<String>,
        admin: Option<String>,
        expires_at: DateTime<Utc>,
    },
    /// A temporary ban whose expiry has passed. Rendered exactly like `None`.
    TemporaryExpired,
}

impl BanDisplayState {
    pub fn is_displayed(&self) -> bool {
        matches!(
            self,
            BanDisplayState::Permanent { .. } | BanDisplayState::TemporaryActive { .. }
        )
    }

    /// Admin who placed the displayed ban, if any.
    pub fn admin(&self) -> Option<&str> {
        match self {
            BanDisplayState::Permanent { admin, .. }
            | BanDisplayState::TemporaryActive { admin, .. } => admin.as_deref(),
            BanDisplayState::None | BanDisplayState::TemporaryExpired => None,
        }
    }
}

/// Permanent bans always win over temporary ones. A temporary ban counts as
/// expired once `now` reaches the expiry instant.
pub fn evaluate(record: &PlayerRecord, now: DateTime<Utc>) -> BanDisplayState {
    if record.is_permabanned {
        return BanDisplayState::Permanent {
            reason: record.permaban_reason.clone(),
            date: record.permaban_date.clone(),
            admin: record.permaban_admin_ckey.clone(),
        };
    }

    let Some(expiration) = record.time_ban_expiration.filter(|_| record.is_time_banned) else {
        return BanDisplayState::None;
    };

    let expires_at = temp_ban_expiry(expiration);
    if now >= expires_at {
        return BanDisplayState::TemporaryExpired;
    }

    BanDisplayState::TemporaryActive {
        reason: record.time_ban_reason.clone(),
        date: record.time_ban_date.clone(),
        admin: record.time_ban_admin_ckey.clone(),
        expires_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn temp_banned(expiration: i64) -> PlayerRecord {
        PlayerRecord {
            ckey: "bob".to_string(),
            is_time_banned: true,
            time_ban_reason: Some("griefing".to_string()),
            time_ban_date: Some("2024-01-01".to_string()),
            time_ban_admin_ckey: Some("admin".to_string()),
            time_ban_expiration: Some(expiration),
            ..PlayerRecord::default()
        }
    }

    #[test]
    fn epoch_is_turn_of_millennium() {
        assert_eq!(ban_epoch().to_rfc3339(), "2000-01-01T00:00:00+00:00");
        assert_eq!(temp_ban_expiry(1), ban_epoch() + Duration::minutes(1));
    }

    #[test]
    fn permaban_wins_over_tempban() {
        let record = PlayerRecord {
            is_permabanned: true,
            permaban_reason: Some("cheating".to_string()),
            permaban_date: Some("2023-05-05".to_string()),
            permaban_admin_ckey: Some("headmin".to_string()),
            ..temp_banned(i64::from(i32::MAX))
        };
        let state = evaluate(&record, ban_epoch());
        assert_eq!(
            state,
            BanDisplayState::Permanent {
                reason: Some("cheating".to_string()),
                date: Some("2023-05-05".to_string()),
                admin: Some("headmin".to_string()),
            }
        );
        assert_eq!(state.admin(), Some("headmin"));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let record = temp_banned(5000);
        let expires_at = temp_ban_expiry(5000);

        let before = evaluate(&record, expires_at - Duration::milliseconds(1));
        assert!(matches!(before, BanDisplayState::TemporaryActive { .. }));
        assert!(before.is_displayed());

        assert_eq!(evaluate(&record, expires_at), BanDisplayState::TemporaryExpired);
        assert!(!evaluate(&record, expires_at).is_displayed());
    }

    #[test]
    fn long_expired_tempban_renders_nothing() {
        // 5000 minutes after the epoch is early January 2000.
        let state = evaluate(&temp_banned(5000), Utc::now());
        assert_eq!(state, BanDisplayState::TemporaryExpired);
        assert!(!state.is_displayed());
    }

    #[test]
    fn tempban_without_expiration_is_not_displayed() {
        let record = PlayerRecord {
            time_ban_expiration: None,
            ..temp_banned(0)
        };
        assert_eq!(evaluate(&record, ban_epoch()), BanDisplayState::None);

        let unflagged = PlayerRecord {
            is_time_banned: false,
            ..temp_banned(i64::from(i32::MAX))
        };
        assert_eq!(evaluate(&unflagged, ban_epoch()), BanDisplayState::None);
    }

    #[test]
    fn huge_expirations_saturate() {
        assert_eq!(temp_ban_expiry(i64::MAX), DateTime::<Utc>::MAX_UTC);
        let state = evaluate(&temp_banned(i64::MAX), Utc::now());
        assert!(matches!(state, BanDisplayState::TemporaryActive { .. }));
    }
}
