// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Protocol time: 32-bit seconds since a fixed epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// 2025-01-01T00:00:00Z as a Unix timestamp.
pub const PROTOCOL_EPOCH_UNIX_SECS: u64 = 1_735_689_600;

/// Converts a Unix timestamp to protocol seconds.
///
/// Instants before the epoch clamp to 0; values past the 32-bit range wrap.
pub fn to_protocol_secs(unix_secs: u64, epoch: u64) -> u32 {
    unix_secs.saturating_sub(epoch) as u32
}

/// Converts protocol seconds back to a Unix timestamp.
pub fn to_unix_secs(protocol_secs: u32, epoch: u64) -> u64 {
    epoch + u64::from(protocol_secs)
}

/// Current protocol time relative to `epoch`.
pub fn protocol_now(epoch: u64) -> u32 {
    let unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    to_protocol_secs(unix, epoch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_maps_to_zero() {
        assert_eq!(to_protocol_secs(PROTOCOL_EPOCH_UNIX_SECS, PROTOCOL_EPOCH_UNIX_SECS), 0);
        assert_eq!(to_protocol_secs(PROTOCOL_EPOCH_UNIX_SECS + 90, PROTOCOL_EPOCH_UNIX_SECS), 90);
    }

    #[test]
    fn test_before_epoch_clamps() {
        assert_eq!(to_protocol_secs(1_000, PROTOCOL_EPOCH_UNIX_SECS), 0);
    }

    #[test]
    fn test_round_trip_unix() {
        assert_eq!(
            to_unix_secs(3_600, PROTOCOL_EPOCH_UNIX_SECS),
            PROTOCOL_EPOCH_UNIX_SECS + 3_600
        );
    }

    #[test]
    fn test_now_is_after_epoch() {
        assert!(protocol_now(PROTOCOL_EPOCH_UNIX_SECS) > 0);
    }
}
