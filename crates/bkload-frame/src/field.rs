//! Scalar field encoders/decoders.
//!
//! A payload is an ordered list of [`Field`]s. Each field has a fixed byte
//! width and a [`FieldKind`] that converts between an engineering-unit
//! [`Value`] and little-endian bytes. One generic routine serves every
//! command; new commands are new data, not new code.

use bytes::{BufMut, BytesMut};

use crate::codec::PAYLOAD_LEN;
use crate::error::{DecodeError, EncodeError};

/// Named integer constants for an enumerated field.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDomain {
    /// Enumeration name used in diagnostics.
    pub name: &'static str,
    /// `(constant name, wire value)` pairs.
    pub variants: &'static [(&'static str, u64)],
}

impl EnumDomain {
    /// Returns true if `value` is one of the domain's constants.
    pub fn contains(&self, value: u64) -> bool {
        self.variants.iter().any(|&(_, v)| v == value)
    }

    /// Constant name for a wire value.
    pub fn name_of(&self, value: u64) -> Option<&'static str> {
        self.variants
            .iter()
            .find(|&&(_, v)| v == value)
            .map(|&(name, _)| name)
    }

    /// Wire value for a constant name (case-insensitive).
    pub fn value_of(&self, name: &str) -> Option<u64> {
        self.variants
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, v)| v)
    }
}

/// Named boolean flags packed LSB-first into the low `bits` of an integer.
#[derive(Debug, PartialEq, Eq)]
pub struct FlagSet {
    /// Flag set name used in diagnostics.
    pub name: &'static str,
    /// Number of bits owned by the set.
    pub bits: u32,
    /// `flags[i]` names bit `i`. May be shorter than `bits`.
    pub flags: &'static [&'static str],
}

impl FlagSet {
    /// Mask of the bits owned by the set.
    pub fn mask(&self) -> u32 {
        if self.bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.bits) - 1
        }
    }

    /// Names of the flags set in `bits`, LSB first.
    pub fn names(&self, bits: u32) -> Vec<&'static str> {
        self.flags
            .iter()
            .enumerate()
            .filter(|&(i, _)| bits & (1 << i) != 0)
            .map(|(_, &name)| name)
            .collect()
    }

    /// Bits for a list of flag names (case-insensitive). `None` on an unknown name.
    pub fn bits_of<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<u32> {
        names.into_iter().try_fold(0u32, |acc, name| {
            self.flags
                .iter()
                .position(|flag| flag.eq_ignore_ascii_case(name))
                .map(|i| acc | (1 << i))
        })
    }
}

/// How a field's bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Unsigned integer passed through unchanged.
    Raw,
    /// 0 = false, 1 = true.
    Bool,
    /// Fixed-point value: wire integer = round(value × factor).
    Scaled(f64),
    /// Integer restricted to the domain's constants.
    Enum(&'static EnumDomain),
    /// Bit-packed flag set.
    Flags(&'static FlagSet),
    /// NUL-padded byte string.
    Text,
}

/// A named, fixed-width payload field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Width in bytes.
    pub width: usize,
}

impl Field {
    pub const fn raw(name: &'static str, width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Raw,
            width,
        }
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Bool,
            width: 1,
        }
    }

    pub const fn scaled(name: &'static str, width: usize, factor: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Scaled(factor),
            width,
        }
    }

    pub const fn enumerated(name: &'static str, width: usize, domain: &'static EnumDomain) -> Self {
        Self {
            name,
            kind: FieldKind::Enum(domain),
            width,
        }
    }

    pub const fn flags(name: &'static str, width: usize, set: &'static FlagSet) -> Self {
        Self {
            name,
            kind: FieldKind::Flags(set),
            width,
        }
    }

    pub const fn text(name: &'static str, width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            width,
        }
    }

    /// Largest integer the field's width can hold.
    pub fn max_raw(&self) -> u64 {
        if self.width >= 8 {
            u64::MAX
        } else {
            (1u64 << (8 * self.width)) - 1
        }
    }

    /// Encode `value` into exactly `self.width` bytes appended to `dst`.
    pub fn encode(&self, value: &Value, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let raw = match (self.kind, value) {
            (FieldKind::Raw, Value::Int(v)) => self.check_range(*v)?,
            (FieldKind::Bool, Value::Bool(b)) => u64::from(*b),
            (FieldKind::Scaled(factor), Value::Float(x)) => self.scale(*x, factor)?,
            (FieldKind::Scaled(factor), Value::Int(v)) => self.scale(*v as f64, factor)?,
            (FieldKind::Enum(domain), Value::Enum(v) | Value::Int(v)) => {
                if !domain.contains(*v) {
                    return Err(EncodeError::InvalidEnumValue {
                        field: self.name,
                        domain: domain.name,
                        value: *v,
                    });
                }
                self.check_range(*v)?
            }
            (FieldKind::Flags(set), Value::Flags(bits)) => {
                if bits & !set.mask() != 0 {
                    return Err(self.out_of_range(format!("0x{bits:X}")));
                }
                self.check_range(u64::from(*bits))?
            }
            (FieldKind::Text, Value::Text(bytes)) => {
                if bytes.len() > self.width {
                    return Err(self.out_of_range(format!("{} bytes", bytes.len())));
                }
                dst.put_slice(bytes);
                dst.put_bytes(0, self.width - bytes.len());
                return Ok(());
            }
            (kind, _) => {
                return Err(EncodeError::TypeMismatch {
                    field: self.name,
                    expected: kind_expectation(kind),
                })
            }
        };

        put_le(dst, raw, self.width);
        Ok(())
    }

    /// Decode exactly `self.width` bytes from the front of `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src` is shorter than the field.
    pub fn decode(&self, src: &[u8], options: DecodeOptions) -> Result<Value, DecodeError> {
        let bytes = &src[..self.width];
        let raw = read_le(bytes);
        match self.kind {
            FieldKind::Raw => Ok(Value::Int(raw)),
            FieldKind::Bool => match raw {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                _ if options.lenient_bool => Ok(Value::Bool(true)),
                other => Err(DecodeError::InvalidBool {
                    field: self.name,
                    value: other as u8,
                }),
            },
            FieldKind::Scaled(factor) => Ok(Value::Float(raw as f64 / factor)),
            FieldKind::Enum(domain) => {
                if domain.contains(raw) {
                    Ok(Value::Enum(raw))
                } else {
                    Err(DecodeError::InvalidEnumValue {
                        field: self.name,
                        domain: domain.name,
                        value: raw,
                    })
                }
            }
            // Bits above the set's width are reserved and dropped.
            FieldKind::Flags(set) => Ok(Value::Flags(raw as u32 & set.mask())),
            FieldKind::Text => Ok(Value::Text(bytes.to_vec())),
        }
    }

    /// Human-readable rendering of a value of this field.
    pub fn format(&self, value: &Value) -> String {
        match (self.kind, value) {
            (FieldKind::Enum(domain), Value::Enum(v) | Value::Int(v)) => domain
                .name_of(*v)
                .map(str::to_string)
                .unwrap_or_else(|| v.to_string()),
            (FieldKind::Flags(set), Value::Flags(bits)) => {
                let names = set.names(*bits);
                if names.is_empty() {
                    "none".to_string()
                } else {
                    names.join("|")
                }
            }
            _ => value.to_string(),
        }
    }

    fn check_range(&self, v: u64) -> Result<u64, EncodeError> {
        if v > self.max_raw() {
            return Err(self.out_of_range(v.to_string()));
        }
        Ok(v)
    }

    /// Round half to even, then range-check against the width.
    fn scale(&self, x: f64, factor: f64) -> Result<u64, EncodeError> {
        if !x.is_finite() {
            return Err(EncodeError::NotFinite { field: self.name });
        }
        let scaled = (x * factor).round_ties_even();
        if scaled < 0.0 || scaled > self.max_raw() as f64 {
            return Err(self.out_of_range(x.to_string()));
        }
        Ok(scaled as u64)
    }

    fn out_of_range(&self, value: String) -> EncodeError {
        EncodeError::OutOfRange {
            field: self.name,
            value,
            width: self.width,
        }
    }
}

fn kind_expectation(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Raw => "an integer",
        FieldKind::Bool => "a boolean",
        FieldKind::Scaled(_) => "a number",
        FieldKind::Enum(_) => "an enumeration value",
        FieldKind::Flags(_) => "a flag set",
        FieldKind::Text => "text",
    }
}

fn put_le(dst: &mut BytesMut, value: u64, width: usize) {
    for i in 0..width {
        let byte = if i < 8 { (value >> (8 * i)) as u8 } else { 0 };
        dst.put_u8(byte);
    }
}

fn read_le(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (u64::from(b) << (8 * i)))
}

/// A field value in engineering units.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(u64),
    Bool(bool),
    Float(f64),
    Enum(u64),
    Flags(u32),
    Text(Vec<u8>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) | Value::Enum(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Flags(bits) => write!(f, "0x{bits:X}"),
            Value::Text(bytes) => write!(f, "{}", text_lossy(bytes)),
        }
    }
}

/// Text bytes as a string with NUL padding and surrounding blanks removed.
pub fn text_lossy(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

/// Leniency knobs for inbound decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Accept any nonzero byte as `true`. When false only 0/1 are valid.
    pub lenient_bool: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { lenient_bool: true }
    }
}

/// Total width of a field layout in bytes.
pub fn layout_width(fields: &[Field]) -> usize {
    fields.iter().map(|f| f.width).sum()
}

/// Encode `values` in layout order and zero-pad to the payload length.
pub fn encode_payload(
    command: &'static str,
    fields: &[Field],
    values: &[Value],
) -> Result<[u8; PAYLOAD_LEN], EncodeError> {
    if fields.len() != values.len() {
        return Err(EncodeError::FieldCount {
            command,
            expected: fields.len(),
            actual: values.len(),
        });
    }

    let mut buf = BytesMut::with_capacity(PAYLOAD_LEN);
    for (field, value) in fields.iter().zip(values) {
        field.encode(value, &mut buf)?;
    }
    if buf.len() > PAYLOAD_LEN {
        return Err(EncodeError::PayloadLength {
            expected: PAYLOAD_LEN,
            actual: buf.len(),
        });
    }
    buf.put_bytes(0, PAYLOAD_LEN - buf.len());

    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&buf);
    Ok(payload)
}

/// Decode a payload into one value per field. Trailing padding is ignored.
pub fn decode_payload(
    fields: &[Field],
    payload: &[u8; PAYLOAD_LEN],
    options: DecodeOptions,
) -> Result<Vec<Value>, DecodeError> {
    let width = layout_width(fields);
    if width > PAYLOAD_LEN {
        return Err(DecodeError::LayoutTooWide {
            width,
            available: PAYLOAD_LEN,
        });
    }

    let mut offset = 0usize;
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        values.push(field.decode(&payload[offset..], options)?);
        offset += field.width;
    }
    Ok(values)
}
