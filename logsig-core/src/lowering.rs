//! Depth-limited lowering of `Serialize` values into the JSON data model.
//!
//! Mirrors `serde_json::to_value`, but counts nesting while it walks so that a
//! self-referential or unbounded `Serialize` impl fails with
//! [`HashError::UnhashableInput`] instead of exhausting the stack. Transparent
//! wrappers (`Option`, newtypes) count as a level.

use crate::objecthash::{HashError, MAX_DEPTH};
use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};

type Result<T> = std::result::Result<T, HashError>;

/// Lower `value` to a JSON value tree no deeper than [`MAX_DEPTH`].
pub(crate) fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    lower(value, 0)
}

fn lower<T: Serialize + ?Sized>(value: &T, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(unhashable(format!("nesting exceeds {} levels", MAX_DEPTH)));
    }
    value.serialize(Lowering { depth })
}

fn unhashable(message: impl Into<String>) -> HashError {
    HashError::UnhashableInput(message.into())
}

fn variant_object(variant: &'static str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(variant.to_string(), value);
    Value::Object(object)
}

/// Map keys follow the JSON model: strings as-is, numbers and booleans in
/// their textual form, anything else rejected.
fn key_string(key: Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(unhashable("map key must be a string")),
    }
}

struct Lowering {
    depth: usize,
}

impl ser::Serializer for Lowering {
    type Ok = Value;
    type Error = HashError;

    type SerializeSeq = SeqLowering;
    type SerializeTuple = SeqLowering;
    type SerializeTupleStruct = SeqLowering;
    type SerializeTupleVariant = SeqLowering;
    type SerializeMap = MapLowering;
    type SerializeStruct = MapLowering;
    type SerializeStructVariant = MapLowering;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        if let Ok(v) = u64::try_from(v) {
            Ok(Value::Number(v.into()))
        } else if let Ok(v) = i64::try_from(v) {
            Ok(Value::Number(v.into()))
        } else {
            Err(unhashable(format!("number {} out of range", v)))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        u64::try_from(v)
            .map(|v| Value::Number(v.into()))
            .map_err(|_| unhashable(format!("number {} out of range", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| unhashable(format!("non-finite float {}", v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|b| Value::Number((*b).into())).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        lower(value, self.depth + 1)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        lower(value, self.depth + 1)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        Ok(variant_object(variant, lower(value, self.depth + 1)?))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<SeqLowering> {
        Ok(SeqLowering::new(self.depth + 1, None))
    }

    fn serialize_tuple(self, _len: usize) -> Result<SeqLowering> {
        Ok(SeqLowering::new(self.depth + 1, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<SeqLowering> {
        Ok(SeqLowering::new(self.depth + 1, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SeqLowering> {
        Ok(SeqLowering::new(self.depth + 2, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapLowering> {
        Ok(MapLowering::new(self.depth + 1, None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<MapLowering> {
        Ok(MapLowering::new(self.depth + 1, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<MapLowering> {
        Ok(MapLowering::new(self.depth + 2, Some(variant)))
    }
}

struct SeqLowering {
    child_depth: usize,
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl SeqLowering {
    fn new(child_depth: usize, variant: Option<&'static str>) -> Self {
        Self {
            child_depth,
            variant,
            items: Vec::new(),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(lower(value, self.child_depth)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let array = Value::Array(self.items);
        match self.variant {
            Some(variant) => variant_object(variant, array),
            None => array,
        }
    }
}

impl ser::SerializeSeq for SeqLowering {
    type Ok = Value;
    type Error = HashError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqLowering {
    type Ok = Value;
    type Error = HashError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqLowering {
    type Ok = Value;
    type Error = HashError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqLowering {
    type Ok = Value;
    type Error = HashError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

struct MapLowering {
    child_depth: usize,
    variant: Option<&'static str>,
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl MapLowering {
    fn new(child_depth: usize, variant: Option<&'static str>) -> Self {
        Self {
            child_depth,
            variant,
            map: Map::new(),
            next_key: None,
        }
    }

    fn insert<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<()> {
        let value = lower(value, self.child_depth)?;
        self.map.insert(key, value);
        Ok(())
    }

    fn finish(self) -> Value {
        let object = Value::Object(self.map);
        match self.variant {
            Some(variant) => variant_object(variant, object),
            None => object,
        }
    }
}

impl ser::SerializeMap for MapLowering {
    type Ok = Value;
    type Error = HashError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(key_string(lower(key, self.child_depth)?)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| unhashable("map value without a key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for MapLowering {
    type Ok = Value;
    type Error = HashError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for MapLowering {
    type Ok = Value;
    type Error = HashError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}
