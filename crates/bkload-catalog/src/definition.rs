use bkload_frame::{
    decode_frame, decode_payload, encode_payload, layout_width, DecodeError, DecodeOptions,
    EncodeError, Field, Frame, Value, FRAME_LEN, PAYLOAD_LEN,
};

use crate::error::PacketError;

/// Which directions a definition travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Host → load only; acknowledged by a Status frame.
    CommandOnly,
    /// Host → load, and readable back through its response identifier.
    CommandWithResponse,
    /// Load → host only.
    ResponseOnly,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::CommandOnly => "command",
            Shape::CommandWithResponse => "command+response",
            Shape::ResponseOnly => "response",
        }
    }
}

/// Static description of one catalog entry.
#[derive(Debug, PartialEq)]
pub struct CommandDef {
    pub name: &'static str,
    /// Identifier used when the host sends this entry.
    pub command_id: Option<u8>,
    /// Identifier the load answers with.
    pub response_id: Option<u8>,
    /// Payload layout. Widths sum to at most 21 bytes.
    pub fields: &'static [Field],
}

/// Values decoded from one frame, with the address it carried.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub address: u8,
    pub values: Vec<Value>,
}

impl CommandDef {
    pub const fn command(name: &'static str, id: u8, fields: &'static [Field]) -> Self {
        Self {
            name,
            command_id: Some(id),
            response_id: None,
            fields,
        }
    }

    pub const fn with_response(
        name: &'static str,
        id: u8,
        response_id: u8,
        fields: &'static [Field],
    ) -> Self {
        Self {
            name,
            command_id: Some(id),
            response_id: Some(response_id),
            fields,
        }
    }

    pub const fn response(name: &'static str, response_id: u8, fields: &'static [Field]) -> Self {
        Self {
            name,
            command_id: None,
            response_id: Some(response_id),
            fields,
        }
    }

    pub fn shape(&self) -> Shape {
        match (self.command_id, self.response_id) {
            (Some(_), Some(_)) => Shape::CommandWithResponse,
            (None, Some(_)) => Shape::ResponseOnly,
            _ => Shape::CommandOnly,
        }
    }

    /// Bytes of payload actually used by the layout.
    pub fn payload_width(&self) -> usize {
        layout_width(self.fields)
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Encode a command frame for transmission.
    pub fn encode(&self, address: u8, values: &[Value]) -> Result<[u8; FRAME_LEN], EncodeError> {
        let id = self
            .command_id
            .ok_or(EncodeError::NotTransmittable(self.name))?;
        let payload = encode_payload(self.name, self.fields, values)?;
        Ok(Frame::new(address, id, payload).to_bytes())
    }

    /// Encode a frame as the load would send it, under the response identifier.
    pub fn encode_response(
        &self,
        address: u8,
        values: &[Value],
    ) -> Result<[u8; FRAME_LEN], EncodeError> {
        let id = self.response_id.ok_or(EncodeError::NotQueryable(self.name))?;
        let payload = encode_payload(self.name, self.fields, values)?;
        Ok(Frame::new(address, id, payload).to_bytes())
    }

    /// Read-back request: the response identifier with an all-zero payload.
    pub fn request(&self, address: u8) -> Result<[u8; FRAME_LEN], EncodeError> {
        let id = self.response_id.ok_or(EncodeError::NotQueryable(self.name))?;
        Ok(Frame::new(address, id, [0; PAYLOAD_LEN]).to_bytes())
    }

    /// Validate a response frame and decode its payload.
    pub fn decode(&self, bytes: &[u8], options: DecodeOptions) -> Result<Decoded, PacketError> {
        let id = self.response_id.ok_or(DecodeError::NotDecodable(self.name))?;
        let frame = decode_frame(bytes, Some(id))?;
        let values = self.decode_payload(&frame, options)?;
        Ok(Decoded {
            address: frame.address,
            values,
        })
    }

    /// Validate a command frame (host → load) and decode its payload.
    pub fn decode_command(
        &self,
        bytes: &[u8],
        options: DecodeOptions,
    ) -> Result<Decoded, PacketError> {
        let id = self
            .command_id
            .ok_or(EncodeError::NotTransmittable(self.name))?;
        let frame = decode_frame(bytes, Some(id))?;
        let values = self.decode_payload(&frame, options)?;
        Ok(Decoded {
            address: frame.address,
            values,
        })
    }

    /// Decode the payload of an already validated frame.
    pub fn decode_payload(
        &self,
        frame: &Frame,
        options: DecodeOptions,
    ) -> Result<Vec<Value>, DecodeError> {
        decode_payload(self.fields, &frame.payload, options)
    }

    /// Render decoded values as `name=value` pairs.
    pub fn describe(&self, values: &[Value]) -> Vec<(&'static str, String)> {
        self.fields
            .iter()
            .zip(values)
            .map(|(field, value)| (field.name, field.format(value)))
            .collect()
    }
}
