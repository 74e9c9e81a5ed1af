//! Custom serde Serializer that turns any `Serialize` value into a
//! [`ConfigTree`], validating map keys on the way.
//!
//! Config files are deserialized into their format's generic document type
//! (`toml::Table`, `serde_json::Value`) and then serialized through here, so
//! every source ends up as the same tagged tree. Rust tuples serialize as
//! [`Value::Tuple`], which is how fixed-arity sequences enter a tree built
//! programmatically.

use std::fmt;

use serde::ser::{self, Serialize};

use crate::error::DotfigError;
use crate::flatten::dotted;
use crate::value::{ConfigTree, Value};

/// Serialize `source` into a config tree.
///
/// The root must serialize as a map or struct. Keys must be non-empty strings
/// that contain no `.` or `=` and do not start with `-`; anything else is
/// [`DotfigError::MalformedConfigKey`].
pub fn to_tree<S: Serialize + ?Sized>(source: &S) -> Result<ConfigTree, DotfigError> {
    let value = source.serialize(ValueSerializer {
        path: String::new(),
    })?;
    match value {
        Value::Map(tree) => Ok(tree),
        other => Err(DotfigError::InvalidValue {
            key: "<root>".into(),
            reason: format!("config root must be a mapping, found {}", other.type_name()),
        }),
    }
}

#[derive(Debug)]
enum TreeError {
    MalformedKey { key: String, reason: String },
    Unsupported(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::MalformedKey { key, reason } => write!(f, "malformed key '{key}': {reason}"),
            TreeError::Unsupported(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TreeError {}

impl ser::Error for TreeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        TreeError::Unsupported(msg.to_string())
    }
}

impl From<TreeError> for DotfigError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::MalformedKey { key, reason } => {
                DotfigError::MalformedConfigKey { key, reason }
            }
            TreeError::Unsupported(reason) => DotfigError::InvalidValue {
                key: "<config>".into(),
                reason,
            },
        }
    }
}

fn check_key(path: &str, key: &str) -> Result<(), TreeError> {
    let reason = if key.is_empty() {
        "keys must not be empty"
    } else if key.contains('.') {
        "keys must not contain '.', it separates nesting levels"
    } else if key.starts_with('-') {
        "keys must not start with '-', they would not form a valid flag"
    } else if key.contains('=') {
        "keys must not contain '=', it separates a flag from its value"
    } else {
        return Ok(());
    };
    Err(TreeError::MalformedKey {
        key: dotted(path, key),
        reason: reason.into(),
    })
}

struct ValueSerializer {
    path: String,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = TreeError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = MapBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, Self::Error> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<Value, Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<Value, Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<Value, Self::Error> {
        Ok(Value::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<Value, Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<Value, Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<Value, Self::Error> {
        let v = i64::try_from(v).map_err(|_| {
            TreeError::Unsupported(format!("integer {v} at '{}' is out of range", self.path))
        })?;
        Ok(Value::Int(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, Self::Error> {
        self.serialize_f64(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<Value, Self::Error> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, Self::Error> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Self::Error> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Value, Self::Error> {
        Err(TreeError::Unsupported(format!(
            "bytes at '{}' are not supported",
            self.path
        )))
    }

    fn serialize_none(self) -> Result<Value, Self::Error> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Self::Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Self::Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, Self::Error> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Value, Self::Error> {
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SeqBuilder {
            path: self.path,
            items: Vec::with_capacity(len.unwrap_or(0)),
            fixed: false,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(SeqBuilder {
            path: self.path,
            items: Vec::with_capacity(len),
            fixed: true,
        })
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_tuple(len)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.serialize_tuple(len)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(MapBuilder {
            path: self.path,
            map: ConfigTree::new(),
            current_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        // toml's datetime serializes as a private marker struct.
        if name.starts_with("$__toml_private") {
            return Err(TreeError::Unsupported(format!(
                "datetime at '{}' is not a supported value type",
                self.path
            )));
        }
        self.serialize_map(None)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.serialize_map(None)
    }
}

// --- Maps and structs ---

struct MapBuilder {
    path: String,
    map: ConfigTree,
    current_key: Option<String>,
}

impl MapBuilder {
    fn insert<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<(), TreeError> {
        check_key(&self.path, &key)?;
        let value = value.serialize(ValueSerializer {
            path: dotted(&self.path, &key),
        })?;
        self.map.insert(key, value);
        Ok(())
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = TreeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        let key = key.serialize(KeySerializer).map_err(|rejected| TreeError::MalformedKey {
            key: if self.path.is_empty() {
                "<root>".into()
            } else {
                self.path.clone()
            },
            reason: rejected.into(),
        })?;
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self.current_key.take().ok_or_else(|| {
            TreeError::Unsupported("map value serialized without a key".into())
        })?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        Ok(Value::Map(self.map))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = TreeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        Ok(Value::Map(self.map))
    }
}

impl ser::SerializeStructVariant for MapBuilder {
    type Ok = Value;
    type Error = TreeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        Ok(Value::Map(self.map))
    }
}

// --- Sequences and tuples ---

struct SeqBuilder {
    path: String,
    items: Vec<Value>,
    fixed: bool,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = TreeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let path = format!("{}[{}]", self.path, self.items.len());
        self.items.push(value.serialize(ValueSerializer { path })?);
        Ok(())
    }

    fn end(self) -> Result<Value, Self::Error> {
        if self.fixed {
            Ok(Value::Tuple(self.items))
        } else {
            Ok(Value::Seq(self.items))
        }
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = TreeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = TreeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Value;
    type Error = TreeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

// --- Key serializer (only string keys are accepted) ---

/// Error is the rejection reason; the map builder attaches the path.
#[derive(Debug)]
struct KeyRejected(String);

impl fmt::Display for KeyRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for KeyRejected {}

impl ser::Error for KeyRejected {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        KeyRejected(msg.to_string())
    }
}

impl From<KeyRejected> for String {
    fn from(err: KeyRejected) -> Self {
        err.0
    }
}

fn non_string(kind: &str) -> KeyRejected {
    KeyRejected(format!("map keys must be strings, found {kind}"))
}

struct KeySerializer;

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = KeyRejected;
    type SerializeSeq = ser::Impossible<String, KeyRejected>;
    type SerializeTuple = ser::Impossible<String, KeyRejected>;
    type SerializeTupleStruct = ser::Impossible<String, KeyRejected>;
    type SerializeTupleVariant = ser::Impossible<String, KeyRejected>;
    type SerializeMap = ser::Impossible<String, KeyRejected>;
    type SerializeStruct = ser::Impossible<String, KeyRejected>;
    type SerializeStructVariant = ser::Impossible<String, KeyRejected>;

    fn serialize_str(self, v: &str) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        v: &'static str,
    ) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        v: &T,
    ) -> Result<String, Self::Error> {
        v.serialize(self)
    }

    fn serialize_bool(self, _: bool) -> Result<String, Self::Error> {
        Err(non_string("boolean"))
    }
    fn serialize_i8(self, _: i8) -> Result<String, Self::Error> {
        Err(non_string("integer"))
    }
    fn serialize_i16(self, _: i16) -> Result<String, Self::Error> {
        Err(non_string("integer"))
    }
    fn serialize_i32(self, _: i32) -> Result<String, Self::Error> {
        Err(non_string("integer"))
    }
    fn serialize_i64(self, _: i64) -> Result<String, Self::Error> {
        Err(non_string("integer"))
    }
    fn serialize_u8(self, _: u8) -> Result<String, Self::Error> {
        Err(non_string("integer"))
    }
    fn serialize_u16(self, _: u16) -> Result<String, Self::Error> {
        Err(non_string("integer"))
    }
    fn serialize_u32(self, _: u32) -> Result<String, Self::Error> {
        Err(non_string("integer"))
    }
    fn serialize_u64(self, _: u64) -> Result<String, Self::Error> {
        Err(non_string("integer"))
    }
    fn serialize_f32(self, _: f32) -> Result<String, Self::Error> {
        Err(non_string("float"))
    }
    fn serialize_f64(self, _: f64) -> Result<String, Self::Error> {
        Err(non_string("float"))
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<String, Self::Error> {
        Err(non_string("bytes"))
    }
    fn serialize_none(self) -> Result<String, Self::Error> {
        Err(non_string("null"))
    }
    fn serialize_some<T: Serialize + ?Sized>(self, v: &T) -> Result<String, Self::Error> {
        v.serialize(self)
    }
    fn serialize_unit(self) -> Result<String, Self::Error> {
        Err(non_string("null"))
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<String, Self::Error> {
        Err(non_string("unit struct"))
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<String, Self::Error> {
        Err(non_string("enum"))
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(non_string("sequence"))
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(non_string("tuple"))
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(non_string("tuple"))
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(non_string("tuple"))
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(non_string("mapping"))
    }
    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(non_string("struct"))
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(non_string("struct"))
    }
}
