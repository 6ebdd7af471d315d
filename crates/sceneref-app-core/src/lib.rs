// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for sceneref front ends (config storage,
//! persisted scan preferences). Storage adapters stay in their own crates.

pub mod config;
pub mod prefs;
