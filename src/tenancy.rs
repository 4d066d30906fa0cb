//! Tenant and organization injection into mutating request bodies.
//!
//! A key is injected only when it is missing from the body. An explicit
//! `null` or empty string is the caller's choice and is left alone. The same
//! rule applies to `tenantId` and `organizationId`.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::credentials::CredentialStore;
use crate::request::{Method, RequestBody};

pub const TENANT_ID_FIELD: &str = "tenantId";
pub const ORGANIZATION_ID_FIELD: &str = "organizationId";

/// Insert `tenantId` / `organizationId` into `body` where strictly absent.
///
/// Returns the names of the fields that were added.
pub fn inject_tenancy(
    body: &mut Map<String, Value>,
    tenant_id: Option<&str>,
    organization_id: Option<&str>,
) -> Vec<&'static str> {
    let mut injected = Vec::new();
    for (field, value) in [
        (TENANT_ID_FIELD, tenant_id),
        (ORGANIZATION_ID_FIELD, organization_id),
    ] {
        if let Some(value) = value {
            if !body.contains_key(field) {
                body.insert(field.to_string(), Value::String(value.to_string()));
                injected.push(field);
            }
        }
    }
    injected
}

/// Applies [`inject_tenancy`] using the current credential store values.
#[derive(Clone)]
pub struct TenancyInjector {
    credentials: Arc<dyn CredentialStore>,
}

impl TenancyInjector {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    /// `tenant_override` is the per-call `tenantId` option, which wins over the store.
    pub fn apply(&self, method: Method, body: &mut RequestBody, tenant_override: Option<&str>) {
        if !method.is_mutating() {
            return;
        }
        let Some(map) = body.as_object_mut() else {
            return;
        };

        let context = self.credentials.auth_context();
        let tenant_id = tenant_override.map(str::to_string).or(context.tenant_id);
        let organization_id = context.organization_id;

        let injected = inject_tenancy(map, tenant_id.as_deref(), organization_id.as_deref());
        if !injected.is_empty() {
            trace!("Injected {:?} into {} body", injected, method);
        }
    }
}
