// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Access to the external push server.

pub mod application;
pub mod client;

pub use application::PushApplication;
pub use client::{PushClient, UpsClient};

#[cfg(test)]
pub use client::MockPushClient;
