// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Keeping config documents and MobileClient annotations in step with the variants.

pub mod annotations;
pub mod documents;

pub use annotations::{AnnotationManager, VariantDescriptor};
pub use documents::{stored_config, BoundVariant, ClientConfigSync};
