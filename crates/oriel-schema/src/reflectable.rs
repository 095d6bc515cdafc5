//! The [`Reflectable`] capability interface and its impls for common types.
//!
//! Model types implement `Reflectable` by returning a [`ModelShape`] that
//! lists their fields:
//!
//! ```
//! use oriel_schema::{FieldDecl, FieldInfo, ModelShape, Reflectable, TypeShape};
//!
//! struct Pet {
//!     id: uuid::Uuid,
//!     name: String,
//! }
//!
//! impl Reflectable for Pet {
//!     fn shape() -> TypeShape {
//!         ModelShape::new("Pet", || {
//!             vec![
//!                 FieldDecl::of::<uuid::Uuid>("id"),
//!                 FieldDecl::of::<String>("name")
//!                     .with_metadata(FieldInfo::new().with_description("Display name")),
//!             ]
//!         })
//!         .into()
//!     }
//! }
//! ```
//!
//! [`ModelShape`]: crate::shape::ModelShape

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use indexmap::{IndexMap, IndexSet};

use crate::shape::TypeShape;

/// A type that can describe its own shape to the reflector.
pub trait Reflectable {
    fn shape() -> TypeShape;
}

macro_rules! reflect_as {
    ($shape:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Reflectable for $ty {
                fn shape() -> TypeShape {
                    $shape
                }
            }
        )+
    };
}

reflect_as!(TypeShape::Bool => bool);
reflect_as!(TypeShape::Int => i8, i16, i32, u8, u16, u32);
reflect_as!(TypeShape::Long => i64, u64, i128, u128, isize, usize);
reflect_as!(TypeShape::Float => f32);
reflect_as!(TypeShape::Double => f64);
reflect_as!(TypeShape::Str => String, str, char, Cow<'_, str>);
reflect_as!(TypeShape::Date => NaiveDate);
reflect_as!(TypeShape::Time => NaiveTime);
reflect_as!(TypeShape::DateTime => NaiveDateTime);
reflect_as!(TypeShape::Uuid => uuid::Uuid);
reflect_as!(TypeShape::Any => serde_json::Value);

impl<Tz: TimeZone> Reflectable for DateTime<Tz> {
    fn shape() -> TypeShape {
        TypeShape::DateTime
    }
}

impl<T: Reflectable> Reflectable for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::optional(T::shape())
    }
}

macro_rules! reflect_delegate {
    ($($wrapper:ident),+) => {
        $(
            impl<T: Reflectable + ?Sized> Reflectable for $wrapper<T> {
                fn shape() -> TypeShape {
                    T::shape()
                }
            }
        )+
    };
}

reflect_delegate!(Box, Arc, Rc);

impl<T: Reflectable + ?Sized> Reflectable for &T {
    fn shape() -> TypeShape {
        T::shape()
    }
}

macro_rules! reflect_list {
    ($($list:ident),+) => {
        $(
            impl<T: Reflectable, S> Reflectable for $list<T, S> {
                fn shape() -> TypeShape {
                    TypeShape::list(T::shape())
                }
            }
        )+
    };
}

reflect_list!(HashSet, IndexSet);

impl<T: Reflectable> Reflectable for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }
}

impl<T: Reflectable> Reflectable for VecDeque<T> {
    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }
}

impl<T: Reflectable> Reflectable for BTreeSet<T> {
    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }
}

impl<T: Reflectable> Reflectable for [T] {
    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }
}

impl<T: Reflectable, const N: usize> Reflectable for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }
}

macro_rules! reflect_map {
    ($($map:ident),+) => {
        $(
            impl<K: Reflectable, V: Reflectable, S> Reflectable for $map<K, V, S> {
                fn shape() -> TypeShape {
                    TypeShape::Map(Box::new(K::shape()), Box::new(V::shape()))
                }
            }
        )+
    };
}

reflect_map!(HashMap, IndexMap);

impl<K: Reflectable, V: Reflectable> Reflectable for BTreeMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::Map(Box::new(K::shape()), Box::new(V::shape()))
    }
}
