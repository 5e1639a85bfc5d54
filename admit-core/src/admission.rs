//! Runs a [`Strategy`] over incoming objects before they are stored.
//!
//! Create: namespace checks, [`Strategy::prepare_for_create`], name
//! generation, system fields, [`Strategy::default_for_validation`],
//! [`Strategy::validate`].
//!
//! Update: a missing previous object is either created (when the strategy
//! allows it) or rejected as not found; otherwise namespace checks,
//! [`Strategy::prepare_for_update`], [`Strategy::default_for_validation`],
//! [`Strategy::validate_update`].
//!
//! Any field error rejects the whole request with every error attached.
use crate::{
    error::ErrorResponse,
    field::ErrorList,
    metadata::Time,
    resource::{Resource, ResourceExt},
    strategy::{Context, Strategy},
};
use thiserror::Error;

/// Reasons an object is refused
#[derive(Debug, Error)]
pub enum Error {
    /// The object failed validation
    #[error("{kind} \"{name}\" is invalid: {errors}")]
    Invalid {
        /// Kind of the object
        kind: &'static str,
        /// Name of the object
        name: String,
        /// Every field error found
        errors: ErrorList,
    },

    /// The object names a different namespace than the request
    #[error("the namespace of the provided object does not match the namespace sent on the request")]
    NamespaceMismatch,

    /// An update targeted an object that does not exist
    #[error("{kind} \"{name}\" not found")]
    NotFound {
        /// Kind of the object
        kind: &'static str,
        /// Name of the object
        name: String,
    },
}

impl Error {
    /// The API status returned to the caller
    pub fn status(&self) -> ErrorResponse {
        match self {
            Error::Invalid { kind, name, errors } => ErrorResponse::invalid(kind, name, errors),
            Error::NamespaceMismatch => ErrorResponse::bad_request(self.to_string()),
            Error::NotFound { kind, name } => ErrorResponse::not_found(kind, name),
        }
    }
}

/// Admission pipeline for one strategy
#[derive(Clone, Debug, Default)]
pub struct Admission<S> {
    strategy: S,
}

impl<S: Strategy> Admission<S> {
    /// Wraps `strategy`
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// The wrapped strategy
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Admits a new object, returning it ready for storage
    #[tracing::instrument(skip_all, fields(kind = <S::Object as Resource>::KIND))]
    pub fn create(&self, ctx: &Context, mut obj: S::Object) -> Result<S::Object, Error> {
        self.check_namespace(ctx, &mut obj)?;
        self.strategy.prepare_for_create(&mut obj);

        let meta = obj.meta_mut();
        if meta.name.as_deref().unwrap_or_default().is_empty() {
            if let Some(base) = meta.generate_name.as_deref().filter(|b| !b.is_empty()) {
                meta.name = Some(self.strategy.generate_name(base));
            }
        }
        meta.creation_timestamp = Some(Time(jiff::Timestamp::now()));

        self.strategy.default_for_validation(&mut obj);
        let errors = self.strategy.validate(ctx, &obj);
        reject_invalid(&obj, errors)?;
        tracing::debug!(name = obj.name_any(), namespace = obj.namespace_any(), "admitted create");
        Ok(obj)
    }

    /// Admits a change to `old`, returning the new object ready for storage
    #[tracing::instrument(skip_all, fields(kind = <S::Object as Resource>::KIND))]
    pub fn update(&self, ctx: &Context, mut obj: S::Object, old: Option<&S::Object>) -> Result<S::Object, Error> {
        let Some(old) = old else {
            if self.strategy.allow_create_on_update() {
                tracing::debug!(name = obj.name_any(), "creating on update");
                return self.create(ctx, obj);
            }
            return Err(Error::NotFound {
                kind: <S::Object as Resource>::KIND,
                name: obj.name_any().to_string(),
            });
        };

        self.check_namespace(ctx, &mut obj)?;
        obj.meta_mut().creation_timestamp = old.meta().creation_timestamp.clone();
        self.strategy.prepare_for_update(&mut obj, old);

        self.strategy.default_for_validation(&mut obj);
        let errors = self.strategy.validate_update(ctx, &obj, old);
        reject_invalid(&obj, errors)?;
        tracing::debug!(name = obj.name_any(), namespace = obj.namespace_any(), "admitted update");
        Ok(obj)
    }

    fn check_namespace(&self, ctx: &Context, obj: &mut S::Object) -> Result<(), Error> {
        let meta = obj.meta_mut();
        if !self.strategy.namespace_scoped() {
            meta.namespace = None;
            return Ok(());
        }
        let Some(requested) = ctx.namespace() else {
            return Ok(());
        };
        match meta.namespace.as_deref() {
            None | Some("") => meta.namespace = Some(requested.to_string()),
            Some(ns) if ns != requested => return Err(Error::NamespaceMismatch),
            Some(_) => {}
        }
        Ok(())
    }
}

fn reject_invalid<K: Resource>(obj: &K, errors: ErrorList) -> Result<(), Error> {
    if errors.is_empty() {
        return Ok(());
    }
    tracing::debug!(name = obj.name_any(), errors = errors.len(), "rejected invalid object");
    Err(Error::Invalid {
        kind: K::KIND,
        name: obj.name_any().to_string(),
        errors,
    })
}
