//! Entity descriptors - schema derivation from a field list
//!
//! An entity is a plain struct with exactly one `key` field. The `entity!`
//! macro generates the struct together with an [`Entity`] implementation:
//! an ordered list of [`Column`] descriptors, the position of the primary
//! key, and the value marshalling used by the SQL layer. A missing or
//! duplicated `key` marker does not parse, so schema errors are compile
//! errors, never runtime ones.

use crate::{Error, Result};

pub use rusqlite::types::Value;

/// Primary key of a persisted row.
///
/// Keys are assigned by the storage engine on insert; a freshly built entity
/// carries [`RowId::UNSET`] until [`crate::Store::add`] writes the assigned
/// key back. The integer is only reachable through [`RowId::value`] so raw
/// integers and keys cannot be mixed by accident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(i64);

impl RowId {
    /// The not-yet-assigned key
    pub const UNSET: RowId = RowId(0);

    pub fn new(value: i64) -> Self {
        RowId(value)
    }

    /// The raw integer, as bound into SQL and compared in the map
    pub fn value(self) -> i64 {
        self.0
    }

    /// Whether the storage engine has assigned this key
    pub fn is_set(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage class of a single column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integral field, stored as INTEGER
    Integer,
    /// Floating-point field, stored as REAL
    Real,
    /// String field, stored as TEXT
    Text,
    /// Extended field (list, enum), round-tripped through [`crate::TextCodec`]
    /// and stored as TEXT
    Encoded,
}

impl FieldKind {
    /// The SQLite column type this kind is declared as
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldKind::Integer => "INTEGER",
            FieldKind::Real => "REAL",
            FieldKind::Text | FieldKind::Encoded => "TEXT",
        }
    }
}

/// One column descriptor: field name plus storage class
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Conversion between a field type and its SQL value.
///
/// Built-in kinds (integers, floats, strings) are implemented here; extended
/// types opt in through [`crate::TextCodec`] and the `text_encoded!` macro.
/// A type implementing neither cannot appear in an `entity!` field list.
pub trait FieldType: Sized {
    const KIND: FieldKind;

    fn to_sql(&self) -> Result<Value>;
    fn from_sql(value: Value) -> Result<Self>;
}

macro_rules! integer_field {
    ($($t:ty),+) => {
        $(
            impl FieldType for $t {
                const KIND: FieldKind = FieldKind::Integer;

                fn to_sql(&self) -> Result<Value> {
                    i64::try_from(*self)
                        .map(Value::Integer)
                        .map_err(|_| Error::Codec(format!(
                            "integer {self} does not fit an INTEGER column"
                        )))
                }

                fn from_sql(value: Value) -> Result<Self> {
                    match value {
                        Value::Integer(i) => <$t>::try_from(i).map_err(|_| {
                            Error::Codec(format!(
                                "INTEGER {i} out of range for {}", stringify!($t)
                            ))
                        }),
                        other => Err(Error::Codec(format!(
                            "expected INTEGER, got {other:?}"
                        ))),
                    }
                }
            }
        )+
    };
}

integer_field!(i32, u32, i64, u64);

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Real;

    fn to_sql(&self) -> Result<Value> {
        Ok(Value::Real(*self))
    }

    fn from_sql(value: Value) -> Result<Self> {
        match value {
            Value::Real(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            other => Err(Error::Codec(format!("expected REAL, got {other:?}"))),
        }
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_sql(&self) -> Result<Value> {
        Ok(Value::Text(self.clone()))
    }

    fn from_sql(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(Error::Codec(format!("expected TEXT, got {other:?}"))),
        }
    }
}

impl FieldType for RowId {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_sql(&self) -> Result<Value> {
        Ok(Value::Integer(self.0))
    }

    fn from_sql(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(RowId(i)),
            other => Err(Error::Codec(format!("expected INTEGER key, got {other:?}"))),
        }
    }
}

/// A struct persisted as one table, one row per instance.
///
/// Implemented by the `entity!` macro; the contract is pure metadata plus
/// value marshalling, no storage access. `COLUMNS` is ordered as the fields
/// are declared and `KEY_INDEX` points at the primary-key column within it.
pub trait Entity: Clone + Send + Sync + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [Column];
    const KEY_INDEX: usize;

    fn key(&self) -> RowId;
    fn set_key(&mut self, id: RowId);

    /// All column values in `COLUMNS` order, key included
    fn values(&self) -> Result<Vec<Value>>;

    /// Rebuild an entity from all column values in `COLUMNS` order
    fn from_values(values: Vec<Value>) -> Result<Self>;
}

/// Pulls the next column value during decode, naming the missing column on
/// short rows. Used by `entity!`-generated `from_values`.
pub fn take_value(
    values: &mut std::vec::IntoIter<Value>,
    table: &'static str,
    column: &'static str,
) -> Result<Value> {
    values
        .next()
        .ok_or_else(|| Error::Codec(format!("{table}: missing value for column {column}")))
}

/// Declares an entity struct and derives its [`Entity`] implementation.
///
/// The first field must be written `key name: RowId` and is the primary key;
/// the macro grammar accepts exactly one such marker, so leaving it out or
/// writing a second one fails to compile. Remaining fields may be any type
/// implementing [`FieldType`].
///
/// ```
/// use rowcache::entity;
///
/// entity! {
///     /// A named counter.
///     pub struct Counter {
///         key id: RowId,
///         name: String,
///         count: u64,
///     }
/// }
/// ```
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(#[$kmeta:meta])*
            key $kf:ident: RowId,
            $(
                $(#[$fmeta:meta])*
                $f:ident: $ft:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(#[$kmeta])*
            pub $kf: $crate::entity::RowId,
            $(
                $(#[$fmeta])*
                pub $f: $ft,
            )+
        }

        impl $crate::entity::Entity for $name {
            const TABLE: &'static str = stringify!($name);
            const COLUMNS: &'static [$crate::entity::Column] = &[
                $crate::entity::Column {
                    name: stringify!($kf),
                    kind: $crate::entity::FieldKind::Integer,
                },
                $(
                    $crate::entity::Column {
                        name: stringify!($f),
                        kind: <$ft as $crate::entity::FieldType>::KIND,
                    },
                )+
            ];
            const KEY_INDEX: usize = 0;

            fn key(&self) -> $crate::entity::RowId {
                self.$kf
            }

            fn set_key(&mut self, id: $crate::entity::RowId) {
                self.$kf = id;
            }

            fn values(&self) -> $crate::Result<::std::vec::Vec<$crate::entity::Value>> {
                ::std::result::Result::Ok(::std::vec![
                    $crate::entity::FieldType::to_sql(&self.$kf)?,
                    $($crate::entity::FieldType::to_sql(&self.$f)?,)+
                ])
            }

            fn from_values(
                values: ::std::vec::Vec<$crate::entity::Value>,
            ) -> $crate::Result<Self> {
                let mut values = values.into_iter();
                ::std::result::Result::Ok(Self {
                    $kf: $crate::entity::FieldType::from_sql($crate::entity::take_value(
                        &mut values,
                        <Self as $crate::entity::Entity>::TABLE,
                        stringify!($kf),
                    )?)?,
                    $(
                        $f: $crate::entity::FieldType::from_sql($crate::entity::take_value(
                            &mut values,
                            <Self as $crate::entity::Entity>::TABLE,
                            stringify!($f),
                        )?)?,
                    )+
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    entity! {
        /// Test-only entity covering every field kind.
        pub struct Sample {
            key id: RowId,
            name: String,
            weight: f64,
            count: u64,
            tags: Vec<String>,
        }
    }

    #[test]
    fn test_columns_and_key_position() {
        assert_eq!(Sample::TABLE, "Sample");
        assert_eq!(Sample::KEY_INDEX, 0);

        let names: Vec<&str> = Sample::COLUMNS.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["id", "name", "weight", "count", "tags"]);

        assert_eq!(Sample::COLUMNS[0].kind, FieldKind::Integer);
        assert_eq!(Sample::COLUMNS[1].kind, FieldKind::Text);
        assert_eq!(Sample::COLUMNS[2].kind, FieldKind::Real);
        assert_eq!(Sample::COLUMNS[3].kind, FieldKind::Integer);
        assert_eq!(Sample::COLUMNS[4].kind, FieldKind::Encoded);
    }

    #[test]
    fn test_values_round_trip() {
        let sample = Sample {
            id: RowId::new(7),
            name: "seven".into(),
            weight: 1.5,
            count: 3,
            tags: vec!["a".into(), "b".into()],
        };

        let values = sample.values().unwrap();
        assert_eq!(values.len(), Sample::COLUMNS.len());

        let back = Sample::from_values(values).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_from_values_short_row() {
        let err = Sample::from_values(vec![Value::Integer(1)]).unwrap_err();
        assert!(err.to_string().contains("missing value"));
    }

    #[test]
    fn test_integer_range_check() {
        let err = u32::from_sql(Value::Integer(-1)).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        assert_eq!(u64::from_sql(Value::Integer(42)).unwrap(), 42);
    }

    #[test]
    fn test_row_id_unset() {
        assert!(!RowId::UNSET.is_set());
        assert!(RowId::new(1).is_set());
        assert_eq!(RowId::default(), RowId::UNSET);
    }
}
