// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Labels on the Secrets this operator reads and writes
pub mod labels {
    /// Marks a Secret as a binding request produced by the service catalog
    pub const SECRET_TYPE: &str = "secretType";
    /// Value of [`SECRET_TYPE`] for mobile client binding requests
    pub const BINDING_SECRET_TYPE_MOBILE: &str = "mobile-client-binding-secret";

    pub const MOBILE: &str = "mobile";
    pub const SERVICE_NAME: &str = "serviceName";
    pub const SERVICE_INSTANCE_ID: &str = "serviceInstanceId";
    pub const CLIENT_ID: &str = "clientId";
    pub const PUSH_APPLICATION_ID: &str = "pushApplicationId";

    /// Value of [`SERVICE_NAME`] on every client config document
    pub const UPS_SERVICE_NAME: &str = "ups";
}

/// Data keys of a binding request Secret
pub mod binding {
    pub const APP_TYPE: &str = "appType";
    pub const CLIENT_ID: &str = "clientId";
    pub const SERVICE_BINDING_ID: &str = "serviceBindingId";
    pub const SERVICE_INSTANCE_NAME: &str = "serviceInstanceName";

    pub const GOOGLE_KEY: &str = "googleKey";
    pub const PROJECT_NUMBER: &str = "projectNumber";

    pub const IOS_CERT: &str = "cert";
    pub const IOS_PASSPHRASE: &str = "passphrase";
    pub const IOS_IS_PRODUCTION: &str = "isProduction";

    /// Owner kind that marks a Secret as created for a ServiceBinding
    pub const SERVICE_BINDING_OWNER_KIND: &str = "ServiceBinding";
}

/// Data keys of a client config document
pub mod config_document {
    pub const URI: &str = "uri";
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const CONFIG: &str = "config";
    pub const SERVICE_INSTANCE_NAME: &str = super::binding::SERVICE_INSTANCE_NAME;

    pub const NAME_VALUE: &str = "ups";
    pub const TYPE_VALUE: &str = "push";

    /// Prefix of the generated config Secret names
    pub const NAME_PREFIX: &str = "ups-secret";
    /// Length of the random suffix of generated names
    pub const NAME_SUFFIX_LEN: usize = 5;

    /// Annotation linking a platform entry back to its ServiceBinding external id
    pub fn binding_annotation(platform: &str) -> String {
        format!("binding/{}", platform)
    }
}

/// Keys of the bootstrap Secret describing the push application
pub mod bootstrap {
    pub const URI: &str = "uri";
    pub const APPLICATION_ID: &str = "applicationId";
    pub const SERVICE_INSTANCE_ID_LABEL: &str = "serviceInstanceID";
}

/// Annotations on the MobileClient custom resource, templated by service instance name
pub mod annotations {
    pub fn push_application(service_instance_name: &str) -> String {
        format!("org.aerogear.binding.{}/push-application", service_instance_name)
    }

    pub fn ups_url(service_instance_name: &str) -> String {
        format!("org.aerogear.binding.{}/ups-url", service_instance_name)
    }

    pub fn variants(service_instance_name: &str) -> String {
        format!("org.aerogear.binding-ext.{}/variants", service_instance_name)
    }
}

/// The operator name used as field manager
pub const OPERATOR_NAME: &str = "ups-config-operator";

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRDs
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Pause before a closed Secret watch is re-established
pub const WATCH_RESTART_DELAY_SECS: u64 = 1;
