//! Building blocks for versioned API objects
//!
//! This crate carries everything that does not depend on a particular kind:
//! field paths and error lists, name and label grammars, API group/version
//! addressing, the conversion [`Scheme`], selectors, and the
//! [`Strategy`]-driven [`Admission`] pipeline that runs before an object is
//! stored. Kinds themselves live in `admit-api`.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

pub mod admission;
pub use admission::Admission;

mod error;
pub use error::{ErrorResponse, StatusCause, StatusDetails};

pub mod field;
pub use field::{ErrorList, FieldError, Path};

pub mod fields;

pub mod gvk;
pub use gvk::{GroupVersion, GroupVersionKind};

pub mod labels;

pub mod metadata;

pub mod predicate;
pub use predicate::SelectionPredicate;

mod resource;
pub use resource::{Resource, ResourceExt};

pub mod scheme;
pub use scheme::Scheme;

pub mod strategy;
pub use strategy::{Context, Strategy};

pub mod validation;
