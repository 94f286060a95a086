//! Text codecs - extended field types in TEXT columns
//!
//! Lists and enums have no native SQLite storage class; they round-trip
//! through [`TextCodec`] as compact JSON in a TEXT column. A type that does
//! not implement the codec simply is not a valid encoded field, which makes
//! schema generation fall through to the built-in kinds or fail to compile.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Round-trippable text form of a field type.
///
/// `decode(encode(v)) == v` must hold for every value the field can carry.
pub trait TextCodec: Sized {
    fn encode(&self) -> Result<String>;
    fn decode(text: &str) -> Result<Self>;
}

/// JSON encoding used by `text_encoded!` implementations
pub fn json_encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Codec(e.to_string()))
}

/// JSON decoding used by `text_encoded!` implementations
pub fn json_decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::Codec(e.to_string()))
}

/// Wires a `Serialize + Deserialize` type into [`TextCodec`] and
/// [`crate::FieldType`], persisting it as its JSON text form.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use rowcache::text_encoded;
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct Rating(u8);
///
/// text_encoded!(Rating);
/// ```
#[macro_export]
macro_rules! text_encoded {
    ($t:ty) => {
        impl $crate::codec::TextCodec for $t {
            fn encode(&self) -> $crate::Result<::std::string::String> {
                $crate::codec::json_encode(self)
            }

            fn decode(text: &str) -> $crate::Result<Self> {
                $crate::codec::json_decode(text)
            }
        }

        impl $crate::entity::FieldType for $t {
            const KIND: $crate::entity::FieldKind = $crate::entity::FieldKind::Encoded;

            fn to_sql(&self) -> $crate::Result<$crate::entity::Value> {
                ::std::result::Result::Ok($crate::entity::Value::Text(
                    $crate::codec::TextCodec::encode(self)?,
                ))
            }

            fn from_sql(value: $crate::entity::Value) -> $crate::Result<Self> {
                match value {
                    $crate::entity::Value::Text(text) => {
                        $crate::codec::TextCodec::decode(&text)
                    }
                    other => ::std::result::Result::Err($crate::Error::Codec(
                        ::std::format!("expected TEXT for encoded column, got {other:?}"),
                    )),
                }
            }
        }
    };
}

// List fields used by the bundled entities
text_encoded!(Vec<u64>);
text_encoded!(Vec<String>);
