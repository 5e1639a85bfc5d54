//! Registry of wire types and their conversions to internal representations.
//!
//! A [`Scheme`] maps every registered [`GroupVersionKind`] to a pair of
//! conversions between the versioned (external) type and the unversioned
//! (internal) type, plus an optional defaulting function for the external
//! type. Conversion between two wire versions always passes through the
//! internal representation.
//!
//! Schemes are assembled once with [`SchemeBuilder`] during startup and are
//! read-only afterwards, so a single instance can be shared between threads.
//! Registration mistakes panic in [`SchemeBuilder`] rather than surfacing at
//! the first request that happens to need the broken entry.
use crate::{
    gvk::{GroupVersion, GroupVersionKind, ParseGroupVersionError},
    metadata::TypeMeta,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    marker::PhantomData,
};
use thiserror::Error;

/// Errors decoding or encoding wire objects
#[derive(Debug, Error)]
pub enum Error {
    /// The object has no `apiVersion` or `kind`
    #[error("object is missing {0}")]
    MissingTypeMeta(&'static str),

    /// The `apiVersion` could not be parsed
    #[error(transparent)]
    ParseGroupVersion(#[from] ParseGroupVersionError),

    /// No conversion is registered for the type
    #[error("no kind {0} is registered")]
    NotRegistered(GroupVersionKind),

    /// The internal type has no wire representation in the requested version
    #[error("{internal} has no representation in {gv}")]
    NoVersionFor {
        /// Name of the internal type
        internal: &'static str,
        /// The requested group version
        gv: GroupVersion,
    },

    /// The registered kind decodes to a different internal type than requested
    #[error("{gvk} decodes to {actual}, not {expected}")]
    TypeMismatch {
        /// Kind of the wire object
        gvk: GroupVersionKind,
        /// Internal type the caller asked for
        expected: &'static str,
        /// Internal type registered for the kind
        actual: &'static str,
    },

    /// The wire object does not have the shape of its declared kind
    #[error("failed to decode {gvk}: {source}")]
    Decode {
        /// Kind of the wire object
        gvk: GroupVersionKind,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The external object could not be serialized
    #[error("failed to encode {gvk}: {source}")]
    Encode {
        /// Kind being encoded
        gvk: GroupVersionKind,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

/// Result of scheme operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fills in omitted fields of an external object
pub type DefaultingFunc<E> = fn(&mut E);

trait ErasedConversion: Send + Sync {
    fn to_internal(&self, gvk: &GroupVersionKind, value: serde_json::Value) -> Result<Box<dyn Any>>;
    fn to_external(&self, gvk: &GroupVersionKind, internal: Box<dyn Any>) -> Result<serde_json::Value>;
    fn set_defaulter(&mut self, defaulter: Box<dyn Any + Send + Sync>) -> bool;
    fn external_type(&self) -> TypeId;
    fn internal_type(&self) -> TypeId;
    fn internal_type_name(&self) -> &'static str;
}

struct Conversion<E, I> {
    defaulter: Option<DefaultingFunc<E>>,
    marker: PhantomData<fn(E) -> I>,
}

impl<E, I> ErasedConversion for Conversion<E, I>
where
    E: Serialize + DeserializeOwned + From<I> + 'static,
    I: From<E> + 'static,
{
    fn to_internal(&self, gvk: &GroupVersionKind, value: serde_json::Value) -> Result<Box<dyn Any>> {
        let mut external: E = serde_json::from_value(value).map_err(|source| Error::Decode {
            gvk: gvk.clone(),
            source,
        })?;
        if let Some(defaulter) = self.defaulter {
            defaulter(&mut external);
        }
        Ok(Box::new(I::from(external)))
    }

    fn to_external(&self, gvk: &GroupVersionKind, internal: Box<dyn Any>) -> Result<serde_json::Value> {
        let internal = internal.downcast::<I>().map_err(|_| Error::TypeMismatch {
            gvk: gvk.clone(),
            expected: type_name::<I>(),
            actual: "another type",
        })?;
        let mut value = serde_json::to_value(E::from(*internal)).map_err(|source| Error::Encode {
            gvk: gvk.clone(),
            source,
        })?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("apiVersion".into(), gvk.api_version().into());
            obj.insert("kind".into(), gvk.kind.clone().into());
        }
        Ok(value)
    }

    fn set_defaulter(&mut self, defaulter: Box<dyn Any + Send + Sync>) -> bool {
        match defaulter.downcast::<DefaultingFunc<E>>() {
            Ok(f) if self.defaulter.is_none() => {
                self.defaulter = Some(*f);
                true
            }
            _ => false,
        }
    }

    fn external_type(&self) -> TypeId {
        TypeId::of::<E>()
    }

    fn internal_type(&self) -> TypeId {
        TypeId::of::<I>()
    }

    fn internal_type_name(&self) -> &'static str {
        type_name::<I>()
    }
}

/// Immutable registry of wire types
pub struct Scheme {
    kinds: HashMap<GroupVersionKind, Box<dyn ErasedConversion>>,
    // (group version, internal type) -> kind, for encoding
    versions: HashMap<(GroupVersion, TypeId), GroupVersionKind>,
}

impl Scheme {
    /// Starts building a new scheme
    pub fn builder() -> SchemeBuilder {
        SchemeBuilder {
            kinds: HashMap::new(),
            versions: HashMap::new(),
        }
    }

    /// Whether `gvk` has a registered conversion
    pub fn is_registered(&self, gvk: &GroupVersionKind) -> bool {
        self.kinds.contains_key(gvk)
    }

    /// Whether any kind is registered in `gv`
    pub fn recognizes(&self, gv: &GroupVersion) -> bool {
        self.versions.keys().any(|(v, _)| v == gv)
    }

    /// All registered kinds, in no particular order
    pub fn kinds(&self) -> impl Iterator<Item = &GroupVersionKind> {
        self.kinds.keys()
    }

    fn lookup(&self, value: &serde_json::Value) -> Result<(GroupVersionKind, &dyn ErasedConversion)> {
        let types = TypeMeta::of(value);
        if types.api_version.is_empty() {
            return Err(Error::MissingTypeMeta("apiVersion"));
        }
        if types.kind.is_empty() {
            return Err(Error::MissingTypeMeta("kind"));
        }
        let gvk = GroupVersionKind::from_api_version(&types.api_version, &types.kind)?;
        match self.kinds.get(&gvk) {
            Some(conversion) => Ok((gvk, conversion.as_ref())),
            None => Err(Error::NotRegistered(gvk)),
        }
    }

    fn decode_any(&self, value: serde_json::Value) -> Result<(GroupVersionKind, Box<dyn Any>, TypeId)> {
        let (gvk, conversion) = self.lookup(&value)?;
        tracing::trace!(%gvk, "converting to internal");
        let internal = conversion.to_internal(&gvk, value)?;
        Ok((gvk, internal, conversion.internal_type()))
    }

    /// Decodes a wire object into its internal representation, applying defaults
    pub fn to_internal<I: 'static>(&self, value: serde_json::Value) -> Result<I> {
        let (gvk, conversion) = self.lookup(&value)?;
        if conversion.internal_type() != TypeId::of::<I>() {
            return Err(Error::TypeMismatch {
                gvk,
                expected: type_name::<I>(),
                actual: conversion.internal_type_name(),
            });
        }
        tracing::trace!(%gvk, "converting to internal");
        let internal = conversion.to_internal(&gvk, value)?;
        internal.downcast::<I>().map(|i| *i).map_err(|_| Error::TypeMismatch {
            gvk,
            expected: type_name::<I>(),
            actual: "another type",
        })
    }

    /// Encodes an internal object as the wire type registered for it in `gv`.
    ///
    /// No defaults are applied in this direction.
    pub fn to_external<I: 'static>(&self, internal: I, gv: &GroupVersion) -> Result<serde_json::Value> {
        self.encode_any(Box::new(internal), TypeId::of::<I>(), type_name::<I>(), gv)
    }

    fn encode_any(
        &self,
        internal: Box<dyn Any>,
        internal_type: TypeId,
        internal_name: &'static str,
        gv: &GroupVersion,
    ) -> Result<serde_json::Value> {
        let gvk = self
            .versions
            .get(&(gv.clone(), internal_type))
            .ok_or_else(|| Error::NoVersionFor {
                internal: internal_name,
                gv: gv.clone(),
            })?;
        let conversion = self.kinds.get(gvk).ok_or_else(|| Error::NotRegistered(gvk.clone()))?;
        tracing::trace!(%gvk, "converting to external");
        conversion.to_external(gvk, internal)
    }

    /// Converts a wire object to another registered version of the same kind
    pub fn convert(&self, value: serde_json::Value, desired_api_version: &str) -> Result<serde_json::Value> {
        let gv: GroupVersion = desired_api_version.parse()?;
        let (gvk, internal, internal_type) = self.decode_any(value)?;
        let internal_name = self.kinds.get(&gvk).map_or("unknown", |c| c.internal_type_name());
        self.encode_any(internal, internal_type, internal_name, &gv)
    }
}

impl std::fmt::Debug for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<String> = self.kinds.keys().map(ToString::to_string).collect();
        kinds.sort();
        f.debug_struct("Scheme").field("kinds", &kinds).finish()
    }
}

/// Builder for a [`Scheme`].
///
/// Every method panics on a malformed registration.
pub struct SchemeBuilder {
    kinds: HashMap<GroupVersionKind, Box<dyn ErasedConversion>>,
    versions: HashMap<(GroupVersion, TypeId), GroupVersionKind>,
}

impl SchemeBuilder {
    /// Registers the external type `E` as `kind` in `gv`, converting to and from the internal type `I`.
    ///
    /// # Panics
    /// When the version or kind is empty, when the kind is already registered,
    /// or when `gv` already has a kind for the internal type `I`.
    pub fn add_known_type<E, I>(mut self, gv: &GroupVersion, kind: &str) -> Self
    where
        E: Serialize + DeserializeOwned + From<I> + 'static,
        I: From<E> + 'static,
    {
        assert!(
            !gv.version.is_empty() && !kind.is_empty(),
            "registration of {} needs a version and a kind",
            type_name::<E>()
        );
        let gvk = gv.with_kind(kind);
        assert!(!self.kinds.contains_key(&gvk), "kind {gvk} was already registered");
        let previous = self.versions.insert((gv.clone(), TypeId::of::<I>()), gvk.clone());
        if let Some(previous) = previous {
            panic!("{} is already registered as {previous}", type_name::<I>());
        }
        tracing::debug!(%gvk, external = type_name::<E>(), internal = type_name::<I>(), "registered kind");
        self.kinds.insert(gvk, Box::new(Conversion::<E, I> {
            defaulter: None,
            marker: PhantomData,
        }));
        self
    }

    /// Registers a defaulting function for every kind whose external type is `E`.
    ///
    /// # Panics
    /// When no kind uses `E`, or a defaulter for `E` was already registered.
    pub fn add_defaulting_func<E: 'static>(mut self, defaulter: DefaultingFunc<E>) -> Self {
        let mut found = false;
        for (gvk, conversion) in self
            .kinds
            .iter_mut()
            .filter(|(_, c)| c.external_type() == TypeId::of::<E>())
        {
            assert!(
                conversion.set_defaulter(Box::new(defaulter)),
                "a defaulting function for {gvk} was already registered"
            );
            found = true;
        }
        assert!(
            found,
            "defaulting function for {} does not match a registered kind",
            type_name::<E>()
        );
        tracing::debug!(external = type_name::<E>(), "registered defaulting function");
        self
    }

    /// Finalizes construction
    pub fn build(self) -> Scheme {
        Scheme {
            kinds: self.kinds,
            versions: self.versions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct WidgetV1 {
        #[serde(default)]
        size_in_cm: u32,
        #[serde(default)]
        color: String,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct WidgetV2 {
        size: Size,
        color: String,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Size {
        cm: u32,
    }

    #[derive(Debug, PartialEq)]
    struct Widget {
        size: u32,
        color: String,
    }

    impl From<WidgetV1> for Widget {
        fn from(w: WidgetV1) -> Self {
            Widget {
                size: w.size_in_cm,
                color: w.color,
            }
        }
    }

    impl From<Widget> for WidgetV1 {
        fn from(w: Widget) -> Self {
            WidgetV1 {
                size_in_cm: w.size,
                color: w.color,
            }
        }
    }

    impl From<WidgetV2> for Widget {
        fn from(w: WidgetV2) -> Self {
            Widget {
                size: w.size.cm,
                color: w.color,
            }
        }
    }

    impl From<Widget> for WidgetV2 {
        fn from(w: Widget) -> Self {
            WidgetV2 {
                size: Size { cm: w.size },
                color: w.color,
            }
        }
    }

    fn default_color(w: &mut WidgetV1) {
        if w.color.is_empty() {
            w.color = "grey".into();
        }
    }

    fn scheme() -> Scheme {
        let v1 = GroupVersion::gv("toys.example.io", "v1");
        let v2 = GroupVersion::gv("toys.example.io", "v2");
        Scheme::builder()
            .add_known_type::<WidgetV1, Widget>(&v1, "Widget")
            .add_known_type::<WidgetV2, Widget>(&v2, "Widget")
            .add_defaulting_func::<WidgetV1>(default_color)
            .build()
    }

    #[test]
    fn decodes_with_defaults() {
        let widget: Widget = scheme()
            .to_internal(serde_json::json!({
                "apiVersion": "toys.example.io/v1",
                "kind": "Widget",
                "sizeInCm": 4
            }))
            .unwrap();
        assert_eq!(widget, Widget {
            size: 4,
            color: "grey".into()
        });
    }

    #[test]
    fn encodes_without_defaults() {
        let widget = Widget {
            size: 2,
            color: String::new(),
        };
        let value = scheme()
            .to_external(widget, &GroupVersion::gv("toys.example.io", "v1"))
            .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "apiVersion": "toys.example.io/v1",
                "kind": "Widget",
                "sizeInCm": 2,
                "color": ""
            })
        );
    }

    #[test]
    fn converts_between_versions() {
        let value = scheme()
            .convert(
                serde_json::json!({
                    "apiVersion": "toys.example.io/v2",
                    "kind": "Widget",
                    "size": { "cm": 7 },
                    "color": "red"
                }),
                "toys.example.io/v1",
            )
            .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "apiVersion": "toys.example.io/v1",
                "kind": "Widget",
                "sizeInCm": 7,
                "color": "red"
            })
        );
    }

    #[test]
    fn reports_wire_errors() {
        let scheme = scheme();
        assert!(matches!(
            scheme.to_internal::<Widget>(serde_json::json!({ "kind": "Widget" })),
            Err(Error::MissingTypeMeta("apiVersion"))
        ));
        assert!(matches!(
            scheme.to_internal::<Widget>(serde_json::json!({ "apiVersion": "toys.example.io/v3", "kind": "Widget" })),
            Err(Error::NotRegistered(_))
        ));
        assert!(matches!(
            scheme.to_internal::<String>(serde_json::json!({ "apiVersion": "toys.example.io/v1", "kind": "Widget" })),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            scheme.to_internal::<Widget>(serde_json::json!({ "apiVersion": "toys.example.io/v2", "kind": "Widget", "size": 3 })),
            Err(Error::Decode { .. })
        ));
        assert!(matches!(
            scheme.to_external(Widget { size: 1, color: "red".into() }, &GroupVersion::gv("other", "v1")),
            Err(Error::NoVersionFor { .. })
        ));
        assert!(scheme.recognizes(&GroupVersion::gv("toys.example.io", "v2")));
        assert!(scheme.is_registered(&GroupVersionKind::gvk("toys.example.io", "v1", "Widget")));
    }

    #[test]
    fn scheme_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Scheme>();
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_kind_panics() {
        let v1 = GroupVersion::gv("toys.example.io", "v1");
        let _ = Scheme::builder()
            .add_known_type::<WidgetV1, Widget>(&v1, "Widget")
            .add_known_type::<WidgetV2, Widget>(&v1, "Widget");
    }

    #[test]
    #[should_panic(expected = "does not match a registered kind")]
    fn orphan_defaulter_panics() {
        let _ = Scheme::builder().add_defaulting_func::<WidgetV1>(default_color);
    }

    #[test]
    #[should_panic(expected = "needs a version and a kind")]
    fn empty_kind_panics() {
        let _ = Scheme::builder().add_known_type::<WidgetV1, Widget>(&GroupVersion::gv("g", "v1"), "");
    }
}
