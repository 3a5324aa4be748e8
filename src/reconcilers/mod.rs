// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The event-driven and the poll-driven reconcilers.

pub mod binding;
pub mod drift;
pub mod secret;

pub use binding::{BindingRequestHandler, SecretEvent};
pub use drift::{DriftReconciler, VariantServiceBindingMapping};
pub use secret::SecretReconciler;
