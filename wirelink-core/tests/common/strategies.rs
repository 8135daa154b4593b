// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};

/// Application payload used by packet round-trip properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub symbol: String,
    pub quantity: i32,
    pub tags: Vec<String>,
}

/// Strategy for generating 32-byte arrays (keys).
pub fn bytes32_strategy() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

/// Strategy for generating order payloads.
pub fn order_strategy() -> impl Strategy<Value = Order> {
    (
        any::<u64>(),
        "[A-Z]{1,6}",
        any::<i32>(),
        prop::collection::vec("[a-z]{0,8}", 0..4),
    )
        .prop_map(|(id, symbol, quantity, tags)| Order {
            id,
            symbol,
            quantity,
            tags,
        })
}

/// Strategy for optional payloads (absent about a quarter of the time).
pub fn maybe_order_strategy() -> impl Strategy<Value = Option<Order>> {
    prop::option::weighted(0.75, order_strategy())
}

/// Strategy for delays in milliseconds.
pub fn delay_ms_strategy() -> impl Strategy<Value = u64> {
    1u64..60_000
}
