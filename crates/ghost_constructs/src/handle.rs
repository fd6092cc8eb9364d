//! Resource handles and the import-or-provision decision.
//!
//! A handle is either `Imported` (identifiers supplied by the operator) or
//! `Provisioned` (declared in the template by this run). Both carry the same
//! attribute record, so consumers read identifiers without caring which
//! branch produced them.

use serde::Serialize;

/// Outcome of resolving one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum Handle<A> {
    Imported {
        attributes: A,
    },
    Provisioned {
        /// Logical id of the primary resource.
        resource: String,
        /// Logical ids of auxiliary resources declared with it.
        children: Vec<String>,
        attributes: A,
    },
}

impl<A> Handle<A> {
    pub fn imported(attributes: A) -> Self {
        Handle::Imported { attributes }
    }

    pub fn provisioned(resource: impl Into<String>, children: Vec<String>, attributes: A) -> Self {
        Handle::Provisioned {
            resource: resource.into(),
            children,
            attributes,
        }
    }

    pub fn attributes(&self) -> &A {
        match self {
            Handle::Imported { attributes } | Handle::Provisioned { attributes, .. } => attributes,
        }
    }

    pub fn is_imported(&self) -> bool {
        matches!(self, Handle::Imported { .. })
    }

    /// Logical id of the declared resource, if this run provisioned it.
    pub fn resource(&self) -> Option<&str> {
        match self {
            Handle::Imported { .. } => None,
            Handle::Provisioned { resource, .. } => Some(resource),
        }
    }

    pub fn children(&self) -> &[String] {
        match self {
            Handle::Imported { .. } => &[],
            Handle::Provisioned { children, .. } => children,
        }
    }
}

/// Which branch a resolver takes.
#[derive(Debug, PartialEq, Eq)]
pub enum Decision<'a, T> {
    Import(&'a T),
    Provision,
}

/// Import when import settings are present, provision otherwise.
pub fn decide<T>(import_settings: Option<&T>) -> Decision<'_, T> {
    match import_settings {
        Some(import) => Decision::Import(import),
        None => Decision::Provision,
    }
}
