// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::{MobileClient, ServiceBinding};
use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// A custom resource the operator cannot run without
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredCrd {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl RequiredCrd {
    pub fn of<K: Resource<DynamicType = ()>>() -> Self {
        Self {
            group: K::group(&()).into_owned(),
            version: K::version(&()).into_owned(),
            kind: K::kind(&()).into_owned(),
        }
    }
}

impl std::fmt::Display for RequiredCrd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}/{})", self.kind, self.group, self.version)
    }
}

/// The MobileClient and ServiceBinding CRDs
pub fn required_crds() -> Vec<RequiredCrd> {
    vec![RequiredCrd::of::<MobileClient>(), RequiredCrd::of::<ServiceBinding>()]
}

/// Wait for the MobileClient and ServiceBinding CRDs to become available.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_crds(client: &Client) -> Result<()> {
    for crd in required_crds() {
        wait_for_crd(client, &crd).await?;
    }
    Ok(())
}

async fn wait_for_crd(client: &Client, crd: &RequiredCrd) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_crd_exists(client, crd).await {
            Ok(true) => {
                info!("{} is available", crd);
                return Ok(());
            }
            Ok(false) => {
                info!("{} not yet available, waiting {} seconds...", crd, interval);
            }
            Err(e) => {
                warn!(
                    "Error checking for {}: {}, retrying in {} seconds...",
                    crd, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

async fn check_crd_exists(client: &Client, crd: &RequiredCrd) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[crd.group.as_str()])
        .run()
        .await?;

    let found = discovery
        .groups()
        .filter(|group| group.name() == crd.group)
        .flat_map(|group| group.recommended_resources())
        .any(|(ar, _)| ar.kind == crd.kind && ar.version == crd.version);

    Ok(found)
}
