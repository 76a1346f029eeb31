use bkload_transport::TransportError;

/// Errors raised while validating an inbound frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The buffer is not exactly one frame long.
    #[error("frame must be {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// The first byte is not the frame magic.
    #[error("invalid frame magic 0x{0:02X} (expected 0xAA)")]
    InvalidMagic(u8),

    /// The stored checksum does not match the frame contents.
    #[error("checksum mismatch (stored 0x{stored:02X}, computed 0x{computed:02X})")]
    ChecksumMismatch { stored: u8, computed: u8 },

    /// The frame carries a different identifier than the one awaited.
    #[error("unexpected identifier 0x{actual:02X} (expected 0x{expected:02X})")]
    UnexpectedId { expected: u8, actual: u8 },

    /// The transport failed while moving the frame.
    #[error("frame I/O error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors raised while building outbound bytes. Always a caller bug.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// The payload region was handed the wrong number of bytes.
    #[error("payload must be {expected} bytes, got {actual}")]
    PayloadLength { expected: usize, actual: usize },

    /// The definition has no command identifier (response-only).
    #[error("{0} is response-only and cannot be transmitted")]
    NotTransmittable(&'static str),

    /// The definition has no response identifier, so it cannot be queried.
    #[error("{0} has no response and cannot be queried")]
    NotQueryable(&'static str),

    /// Wrong number of values for the field layout.
    #[error("{command} takes {expected} field(s), got {actual}")]
    FieldCount {
        command: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The value variant does not suit the field kind.
    #[error("field {field} expects {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    /// The value does not fit the field's declared width.
    #[error("field {field}: {value} does not fit in {width} byte(s)")]
    OutOfRange {
        field: &'static str,
        value: String,
        width: usize,
    },

    /// A scaled value was NaN or infinite.
    #[error("field {field}: value must be finite")]
    NotFinite { field: &'static str },

    /// The integer has no constant in the field's enumeration.
    #[error("field {field}: {value} is not a valid {domain}")]
    InvalidEnumValue {
        field: &'static str,
        domain: &'static str,
        value: u64,
    },
}

/// Errors raised while interpreting a validated payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The integer has no constant in the field's enumeration.
    #[error("field {field}: {value} (0x{value:02X}) is not a valid {domain}")]
    InvalidEnumValue {
        field: &'static str,
        domain: &'static str,
        value: u64,
    },

    /// Strict boolean decoding saw something other than 0 or 1.
    #[error("field {field}: {value} is not a valid boolean")]
    InvalidBool { field: &'static str, value: u8 },

    /// Wrong number of decoded values for a typed packet.
    #[error("{command} expects {expected} field(s), got {actual}")]
    FieldCount {
        command: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A decoded value has the wrong variant for a typed packet field.
    #[error("field {field} expects {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    /// The definition has no response identifier.
    #[error("{0} has no response and cannot be decoded")]
    NotDecodable(&'static str),

    /// The field layout is wider than the payload it is read from.
    #[error("field layout needs {width} bytes but the payload holds {available}")]
    LayoutTooWide { width: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
