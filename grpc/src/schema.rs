//! Shared codec capability for the `node_read_service.v1` messages.
//!
//! Every message gets the same operations (binary and proto3 JSON decode and
//! encode) from one trait, [`WireMessage`]. A message type only supplies its
//! [`MessageDescriptor`]: the proto type name plus one [`FieldDescriptor`] per
//! field. The descriptors drive strict JSON decoding and are checked against
//! the compiled descriptor set in tests, so field numbers cannot drift.
//!
//! ## Encodings
//!
//! | Direction | Binary                  | JSON                                   |
//! |-----------|-------------------------|----------------------------------------|
//! | decode    | `from_binary[_with]`    | `from_json[_with]`, `from_json_str[_with]` |
//! | encode    | `to_binary`             | `to_json`, `to_json_string`            |
//!
//! JSON follows the proto3 mapping: keys are camelCase on output and either
//! camelCase or the proto name on input, 64-bit integers are written as
//! strings and read from strings or numbers, default values are omitted.

use prost::Message;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;
use crate::proto::{
    GetFullMempoolRequest, GetFullMempoolResponse, GetNodeTypeRequest, GetNodeTypeResponse, Token,
    TransactionRecord,
};

/// Default upper bound on binary input, matching the gRPC transport default.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Options for binary decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryReadOptions {
    /// Inputs longer than this are rejected before decoding
    pub max_message_size: usize,
}

impl Default for BinaryReadOptions {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Options for JSON decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonReadOptions {
    /// Skip keys that name no field (proto3 default). When `false`, any
    /// unknown key at any nesting level fails the decode.
    pub ignore_unknown_fields: bool,
}

impl Default for JsonReadOptions {
    fn default() -> Self {
        Self {
            ignore_unknown_fields: true,
        }
    }
}

impl JsonReadOptions {
    /// Options that reject unknown fields.
    pub fn strict() -> Self {
        Self {
            ignore_unknown_fields: false,
        }
    }
}

/// Scalar protobuf types used by this package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Bool,
    Int64,
    Uint64,
    Uint32,
}

/// Shape of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Singular scalar, zero value when unset
    Scalar(ScalarType),
    /// Singular submessage, explicitly absent when unset
    Message(&'static MessageDescriptor),
    /// Ordered sequence of submessages
    RepeatedMessage(&'static MessageDescriptor),
    /// `map<key, value>`, keys unique
    Map { key: ScalarType, value: ScalarType },
}

/// Static description of one message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field number on the wire
    pub number: u32,
    /// Name declared in the `.proto` file
    pub name: &'static str,
    /// lowerCamelCase name used by the JSON mapping
    pub json_name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    const fn new(number: u32, name: &'static str, json_name: &'static str, kind: FieldKind) -> Self {
        Self {
            number,
            name,
            json_name,
            kind,
        }
    }

    /// Whether a JSON object key refers to this field.
    pub fn matches_json_key(&self, key: &str) -> bool {
        key == self.json_name || key == self.name
    }
}

/// Static description of a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Fully qualified proto type name
    pub type_name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl MessageDescriptor {
    /// Look up a field by its wire number.
    pub fn field_by_number(&self, number: u32) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.number == number)
    }

    /// Look up a field by JSON key (camelCase or proto name).
    pub fn field_by_json_key(&self, key: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.matches_json_key(key))
    }
}

pub const GET_NODE_TYPE_REQUEST: MessageDescriptor = MessageDescriptor {
    type_name: "node_read_service.v1.GetNodeTypeRequest",
    fields: &[],
};

pub const GET_NODE_TYPE_RESPONSE: MessageDescriptor = MessageDescriptor {
    type_name: "node_read_service.v1.GetNodeTypeResponse",
    fields: &[
        FieldDescriptor::new(1, "id", "id", FieldKind::Scalar(ScalarType::String)),
        FieldDescriptor::new(2, "result", "result", FieldKind::Scalar(ScalarType::String)),
    ],
};

pub const GET_FULL_MEMPOOL_REQUEST: MessageDescriptor = MessageDescriptor {
    type_name: "node_read_service.v1.GetFullMempoolRequest",
    fields: &[],
};

pub const GET_FULL_MEMPOOL_RESPONSE: MessageDescriptor = MessageDescriptor {
    type_name: "node_read_service.v1.GetFullMempoolResponse",
    fields: &[FieldDescriptor::new(
        1,
        "transaction_records",
        "transactionRecords",
        FieldKind::RepeatedMessage(&TRANSACTION_RECORD),
    )],
};

pub const TRANSACTION_RECORD: MessageDescriptor = MessageDescriptor {
    type_name: "node_read_service.v1.TransactionRecord",
    fields: &[
        FieldDescriptor::new(1, "id", "id", FieldKind::Scalar(ScalarType::String)),
        FieldDescriptor::new(2, "timestamp", "timestamp", FieldKind::Scalar(ScalarType::Int64)),
        FieldDescriptor::new(
            3,
            "sender_address",
            "senderAddress",
            FieldKind::Scalar(ScalarType::String),
        ),
        FieldDescriptor::new(
            4,
            "sender_public_key",
            "senderPublicKey",
            FieldKind::Scalar(ScalarType::String),
        ),
        FieldDescriptor::new(
            5,
            "receiver_address",
            "receiverAddress",
            FieldKind::Scalar(ScalarType::String),
        ),
        FieldDescriptor::new(6, "token", "token", FieldKind::Message(&TOKEN)),
        FieldDescriptor::new(7, "amount", "amount", FieldKind::Scalar(ScalarType::Uint64)),
        FieldDescriptor::new(8, "signature", "signature", FieldKind::Scalar(ScalarType::String)),
        FieldDescriptor::new(
            9,
            "validators",
            "validators",
            FieldKind::Map {
                key: ScalarType::String,
                value: ScalarType::Bool,
            },
        ),
        FieldDescriptor::new(10, "nonce", "nonce", FieldKind::Scalar(ScalarType::Uint64)),
    ],
};

pub const TOKEN: MessageDescriptor = MessageDescriptor {
    type_name: "node_read_service.v1.Token",
    fields: &[
        FieldDescriptor::new(1, "name", "name", FieldKind::Scalar(ScalarType::String)),
        FieldDescriptor::new(2, "symbol", "symbol", FieldKind::Scalar(ScalarType::String)),
        FieldDescriptor::new(3, "decimals", "decimals", FieldKind::Scalar(ScalarType::Uint32)),
    ],
};

/// Every message descriptor in the package.
pub const ALL_MESSAGES: &[&MessageDescriptor] = &[
    &GET_NODE_TYPE_REQUEST,
    &GET_NODE_TYPE_RESPONSE,
    &GET_FULL_MEMPOOL_REQUEST,
    &GET_FULL_MEMPOOL_RESPONSE,
    &TRANSACTION_RECORD,
    &TOKEN,
];

/// Binary and JSON codec shared by every `node_read_service.v1` message.
///
/// All methods are provided; implementors only name their descriptor.
pub trait WireMessage: Message + Default + Serialize + DeserializeOwned {
    const DESCRIPTOR: &'static MessageDescriptor;

    /// Fully qualified proto type name.
    fn type_name() -> &'static str {
        Self::DESCRIPTOR.type_name
    }

    /// Decode from protobuf binary with default options.
    fn from_binary(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_binary_with(bytes, &BinaryReadOptions::default())
    }

    /// Decode from protobuf binary.
    ///
    /// Unknown fields are skipped. Truncated or malformed input fails as a
    /// whole; no partially decoded value is returned.
    fn from_binary_with(bytes: &[u8], options: &BinaryReadOptions) -> Result<Self, DecodeError> {
        if bytes.len() > options.max_message_size {
            return Err(DecodeError::MessageTooLarge {
                size: bytes.len(),
                limit: options.max_message_size,
            });
        }
        Ok(Self::decode(bytes)?)
    }

    /// Decode from a parsed JSON value with default options.
    fn from_json(value: Value) -> Result<Self, DecodeError> {
        Self::from_json_with(value, &JsonReadOptions::default())
    }

    /// Decode from a parsed JSON value.
    ///
    /// `null` on any field reads as the field's default, and integer fields
    /// accept integral numbers in float or exponent form (`1.0`, `1e2`).
    fn from_json_with(mut value: Value, options: &JsonReadOptions) -> Result<Self, DecodeError> {
        if !options.ignore_unknown_fields {
            reject_unknown_fields(Self::DESCRIPTOR, &value)?;
        }
        normalize_json(Self::DESCRIPTOR, &mut value);
        Ok(serde_json::from_value(value)?)
    }

    /// Decode from JSON text with default options.
    fn from_json_str(json: &str) -> Result<Self, DecodeError> {
        Self::from_json_str_with(json, &JsonReadOptions::default())
    }

    /// Decode from JSON text. Duplicate object keys resolve to the last value.
    fn from_json_str_with(json: &str, options: &JsonReadOptions) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_with(value, options)
    }

    /// Encode to protobuf binary.
    fn to_binary(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Encode to a canonical proto3 JSON value.
    fn to_json(&self) -> Value {
        // Generated serializers only emit string keys and finite scalars.
        serde_json::to_value(self).expect("proto3 JSON serialization is infallible")
    }

    /// Encode to canonical proto3 JSON text.
    fn to_json_string(&self) -> String {
        serde_json::to_string(self).expect("proto3 JSON serialization is infallible")
    }
}

/// Walk a JSON value and fail on the first key no descriptor field claims.
///
/// Only object shapes are inspected; type mismatches are left for the
/// deserializer to report.
fn reject_unknown_fields(descriptor: &MessageDescriptor, value: &Value) -> Result<(), DecodeError> {
    let Value::Object(object) = value else {
        return Ok(());
    };

    for (key, field_value) in object {
        let field =
            descriptor
                .field_by_json_key(key)
                .ok_or_else(|| DecodeError::UnknownField {
                    message: descriptor.type_name,
                    field: key.clone(),
                })?;

        match (field.kind, field_value) {
            (FieldKind::Message(nested), _) => reject_unknown_fields(nested, field_value)?,
            (FieldKind::RepeatedMessage(nested), Value::Array(items)) => {
                for item in items {
                    reject_unknown_fields(nested, item)?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Rewrite JSON input into the shape the generated deserializers accept:
/// `null` fields are dropped and integral floats on integer fields become
/// integers. Keys no descriptor field claims are left alone.
fn normalize_json(descriptor: &MessageDescriptor, value: &mut Value) {
    let Value::Object(object) = value else {
        return;
    };

    object.retain(|_, field_value| !field_value.is_null());

    for (key, field_value) in object.iter_mut() {
        let Some(field) = descriptor.field_by_json_key(key) else {
            continue;
        };

        match field.kind {
            FieldKind::Scalar(scalar) => normalize_integer(scalar, field_value),
            FieldKind::Message(nested) => normalize_json(nested, field_value),
            FieldKind::RepeatedMessage(nested) => {
                if let Value::Array(items) = field_value {
                    for item in items {
                        normalize_json(nested, item);
                    }
                }
            }
            FieldKind::Map { .. } => {}
        }
    }
}

/// Turn an integral float (`1e2`, `100.0`) into an integer for integer
/// fields. Fractional or out-of-range values are kept so the deserializer
/// reports them.
fn normalize_integer(scalar: ScalarType, value: &mut Value) {
    let Value::Number(number) = value else {
        return;
    };
    if number.is_i64() || number.is_u64() {
        return;
    }
    let Some(float) = number.as_f64() else {
        return;
    };
    if float.fract() != 0.0 {
        return;
    }

    let integer = match scalar {
        ScalarType::Int64 if float >= i64::MIN as f64 && float < i64::MAX as f64 => {
            Value::from(float as i64)
        }
        ScalarType::Uint64 | ScalarType::Uint32 if float >= 0.0 && float < u64::MAX as f64 => {
            Value::from(float as u64)
        }
        _ => return,
    };
    *value = integer;
}

macro_rules! wire_message {
    ($($message:ty => $descriptor:ident),* $(,)?) => {
        $(
            impl WireMessage for $message {
                const DESCRIPTOR: &'static MessageDescriptor = &$descriptor;
            }
        )*
    };
}

wire_message! {
    GetNodeTypeRequest => GET_NODE_TYPE_REQUEST,
    GetNodeTypeResponse => GET_NODE_TYPE_RESPONSE,
    GetFullMempoolRequest => GET_FULL_MEMPOOL_REQUEST,
    GetFullMempoolResponse => GET_FULL_MEMPOOL_RESPONSE,
    TransactionRecord => TRANSACTION_RECORD,
    Token => TOKEN,
}

impl Token {
    /// Create token metadata.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

impl TransactionRecord {
    /// Addresses of validators that approved this transaction, sorted.
    pub fn approving_validators(&self) -> Vec<&str> {
        let mut approved: Vec<&str> = self
            .validators
            .iter()
            .filter(|(_, approved)| **approved)
            .map(|(address, _)| address.as_str())
            .collect();
        approved.sort_unstable();
        approved
    }
}
