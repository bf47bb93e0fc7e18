//! Document encoding and decoding.
//!
//! The two traits are the capability seam consumed by the code component
//! (and by anything else that needs a nested wire document), substitutable
//! in tests. [`BsonEncoder`]/[`BsonDecoder`] are the concrete realization:
//! little-endian BSON documents, an `i32` total size followed by tagged
//! elements with C-string keys and a terminating `0x00`.

use crate::{BinData, Code, HostValue, MarshalError, ObjectId, Regex, UtcDate};

/// Encodes an ordered field list into a wire document.
pub trait DocumentEncoder {
    fn encode_document(
        &mut self,
        fields: &[(String, HostValue)],
    ) -> Result<Vec<u8>, MarshalError>;
}

/// Decodes a wire document back into an ordered field list.
pub trait DocumentDecoder {
    fn decode_document(&mut self, data: &[u8]) -> Result<Vec<(String, HostValue)>, MarshalError>;
}

/// BSON document encoder.
pub struct BsonEncoder;

impl Default for BsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonEncoder {
    pub fn new() -> Self {
        BsonEncoder
    }

    /// Encodes a document and returns the encoded bytes.
    pub fn encode(&mut self, fields: &[(String, HostValue)]) -> Result<Vec<u8>, MarshalError> {
        let mut body = Vec::new();
        for (key, value) in fields {
            self.write_element(&mut body, key, value)?;
        }
        Ok(frame_document(body))
    }

    fn write_element(
        &mut self,
        out: &mut Vec<u8>,
        key: &str,
        value: &HostValue,
    ) -> Result<(), MarshalError> {
        match value {
            HostValue::Float(v) => {
                self.write_header(out, 0x01, key)?;
                out.extend_from_slice(&v.to_le_bytes());
            }
            HostValue::Str(s) => {
                self.write_header(out, 0x02, key)?;
                write_string(out, s);
            }
            HostValue::Document(fields) => {
                self.write_header(out, 0x03, key)?;
                let doc = self.encode(fields)?;
                out.extend_from_slice(&doc);
            }
            HostValue::Array(items) => {
                self.write_header(out, 0x04, key)?;
                let mut body = Vec::new();
                for (index, item) in items.iter().enumerate() {
                    self.write_element(&mut body, &index.to_string(), item)?;
                }
                out.extend_from_slice(&frame_document(body));
            }
            HostValue::Bytes(bytes) => {
                self.write_header(out, 0x05, key)?;
                write_binary(out, bytes, crate::subtype::GENERIC);
            }
            HostValue::BinData(bin) => {
                self.write_header(out, 0x05, key)?;
                write_binary(out, bin.bytes(), bin.subtype());
            }
            HostValue::ObjectId(id) => {
                self.write_header(out, 0x07, key)?;
                out.extend_from_slice(id.as_bytes());
            }
            HostValue::Bool(b) => {
                self.write_header(out, 0x08, key)?;
                out.push(u8::from(*b));
            }
            HostValue::Date(date) => {
                self.write_header(out, 0x09, key)?;
                out.extend_from_slice(&date.to_millis().to_le_bytes());
            }
            HostValue::Null => {
                self.write_header(out, 0x0a, key)?;
            }
            HostValue::Regex(re) => {
                self.write_header(out, 0x0b, key)?;
                // pattern and flags are NUL-free by construction
                write_cstring(out, re.pattern())?;
                write_cstring(out, re.flags())?;
            }
            HostValue::Code(code) => {
                self.write_header(out, 0x0f, key)?;
                self.write_code_with_scope(out, code)?;
            }
            HostValue::Int(n) => {
                if let Ok(narrow) = i32::try_from(*n) {
                    self.write_header(out, 0x10, key)?;
                    out.extend_from_slice(&narrow.to_le_bytes());
                } else {
                    self.write_header(out, 0x12, key)?;
                    out.extend_from_slice(&n.to_le_bytes());
                }
            }
        }
        Ok(())
    }

    fn write_header(
        &mut self,
        out: &mut Vec<u8>,
        tag: u8,
        key: &str,
    ) -> Result<(), MarshalError> {
        out.push(tag);
        write_cstring(out, key)
    }

    /// Code-with-scope: `i32` total size, the code string, then the scope
    /// document produced through the encoder seam.
    fn write_code_with_scope(
        &mut self,
        out: &mut Vec<u8>,
        code: &Code,
    ) -> Result<(), MarshalError> {
        let scope = code.encode_scope(self)?;
        let mut payload = Vec::new();
        write_string(&mut payload, code.code());
        payload.extend_from_slice(&scope);
        out.extend_from_slice(&((payload.len() + 4) as i32).to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(())
    }
}

impl DocumentEncoder for BsonEncoder {
    fn encode_document(
        &mut self,
        fields: &[(String, HostValue)],
    ) -> Result<Vec<u8>, MarshalError> {
        self.encode(fields)
    }
}

fn frame_document(body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 5);
    out.extend_from_slice(&((body.len() + 5) as i32).to_le_bytes());
    out.extend_from_slice(&body);
    out.push(0);
    out
}

fn write_cstring(out: &mut Vec<u8>, s: &str) -> Result<(), MarshalError> {
    if s.as_bytes().contains(&0) {
        return Err(MarshalError::EmbeddedNul("c-string"));
    }
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    Ok(())
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    out.extend_from_slice(&((bytes.len() + 1) as i32).to_le_bytes());
    out.extend_from_slice(bytes);
    out.push(0);
}

fn write_binary(out: &mut Vec<u8>, bytes: &[u8], subtype: u8) {
    out.extend_from_slice(&(bytes.len() as i32).to_le_bytes());
    out.push(subtype);
    out.extend_from_slice(bytes);
}

/// BSON document decoder.
pub struct BsonDecoder {
    data: Vec<u8>,
    x: usize,
}

impl Default for BsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonDecoder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            x: 0,
        }
    }

    /// Decodes a BSON document from bytes.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<(String, HostValue)>, MarshalError> {
        self.data = data.to_vec();
        self.x = 0;
        self.read_document()
    }

    fn ensure(&self, n: usize) -> Result<(), MarshalError> {
        if self.x + n > self.data.len() {
            return Err(MarshalError::UnexpectedEof);
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8, MarshalError> {
        self.ensure(1)?;
        let val = self.data[self.x];
        self.x += 1;
        Ok(val)
    }

    fn i32_le(&mut self) -> Result<i32, MarshalError> {
        self.ensure(4)?;
        let val = i32::from_le_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    fn i64_le(&mut self) -> Result<i64, MarshalError> {
        self.ensure(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.data[self.x..self.x + 8]);
        self.x += 8;
        Ok(i64::from_le_bytes(raw))
    }

    fn f64_le(&mut self) -> Result<f64, MarshalError> {
        self.ensure(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.data[self.x..self.x + 8]);
        self.x += 8;
        Ok(f64::from_le_bytes(raw))
    }

    fn buf(&mut self, n: usize) -> Result<Vec<u8>, MarshalError> {
        self.ensure(n)?;
        let data = self.data[self.x..self.x + n].to_vec();
        self.x += n;
        Ok(data)
    }

    fn utf8(&mut self, n: usize) -> Result<String, MarshalError> {
        let bytes = self.buf(n)?;
        String::from_utf8(bytes).map_err(|_| MarshalError::InvalidUtf8)
    }

    fn read_document(&mut self) -> Result<Vec<(String, HostValue)>, MarshalError> {
        let document_size = self.i32_le()?;
        if document_size < 5 {
            return Err(MarshalError::InvalidSize(document_size));
        }
        self.ensure(document_size as usize - 4)?;
        let end = self.x + document_size as usize - 4 - 1; // terminator index
        let mut fields = Vec::new();

        while self.x < end {
            let tag = self.u8()?;
            if tag == 0 {
                break;
            }
            let key = self.read_cstring()?;
            let value = self.read_element_value(tag)?;
            fields.push((key, value));
        }

        // skip past the terminating null
        self.x = end + 1;
        Ok(fields)
    }

    fn read_cstring(&mut self) -> Result<String, MarshalError> {
        let start = self.x;
        while self.x < self.data.len() && self.data[self.x] != 0 {
            self.x += 1;
        }
        if self.x == self.data.len() {
            return Err(MarshalError::UnexpectedEof);
        }
        let s = String::from_utf8(self.data[start..self.x].to_vec())
            .map_err(|_| MarshalError::InvalidUtf8)?;
        self.x += 1; // skip null terminator
        Ok(s)
    }

    fn read_string(&mut self) -> Result<String, MarshalError> {
        let length = self.i32_le()?;
        if length < 1 {
            return Err(MarshalError::InvalidSize(length));
        }
        let s = self.utf8(length as usize - 1)?; // length includes the null
        self.u8()?; // null terminator
        Ok(s)
    }

    fn read_element_value(&mut self, tag: u8) -> Result<HostValue, MarshalError> {
        Ok(match tag {
            0x01 => HostValue::Float(self.f64_le()?),
            0x02 => HostValue::Str(self.read_string()?),
            0x03 => HostValue::Document(self.read_document()?),
            0x04 => HostValue::Array(self.read_array()?),
            0x05 => HostValue::BinData(self.read_binary()?),
            0x07 => HostValue::ObjectId(self.read_object_id()?),
            0x08 => HostValue::Bool(self.u8()? == 1),
            0x09 => HostValue::Date(UtcDate::from_millis(self.i64_le()?)),
            0x0a => HostValue::Null,
            0x0b => HostValue::Regex(self.read_regex()?),
            0x0d => HostValue::Code(Code::new(self.read_string()?)),
            0x0f => HostValue::Code(self.read_code_with_scope()?),
            0x10 => HostValue::Int(self.i32_le()? as i64),
            0x12 => HostValue::Int(self.i64_le()?),
            _ => return Err(MarshalError::UnsupportedType(tag)),
        })
    }

    fn read_array(&mut self) -> Result<Vec<HostValue>, MarshalError> {
        let fields = self.read_document()?;
        // order by numeric key, then drop the keys
        let mut indexed: Vec<(usize, HostValue)> = fields
            .into_iter()
            .map(|(k, v)| (k.parse::<usize>().unwrap_or(0), v))
            .collect();
        indexed.sort_by_key(|(i, _)| *i);
        Ok(indexed.into_iter().map(|(_, v)| v).collect())
    }

    fn read_binary(&mut self) -> Result<BinData, MarshalError> {
        let length = self.i32_le()?;
        if length < 0 {
            return Err(MarshalError::InvalidSize(length));
        }
        let subtype = self.u8()?;
        let bytes = self.buf(length as usize)?;
        Ok(BinData::new(bytes, subtype))
    }

    fn read_object_id(&mut self) -> Result<ObjectId, MarshalError> {
        let raw = self.buf(12)?;
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&raw);
        Ok(ObjectId::from_bytes(bytes))
    }

    fn read_regex(&mut self) -> Result<Regex, MarshalError> {
        let pattern = self.read_cstring()?;
        let flags = self.read_cstring()?;
        Regex::new(pattern, flags)
    }

    fn read_code_with_scope(&mut self) -> Result<Code, MarshalError> {
        let total = self.i32_le()?;
        if total < 4 {
            return Err(MarshalError::InvalidSize(total));
        }
        let code = self.read_string()?;
        let scope = self.read_document()?;
        Ok(Code::with_scope(code, scope))
    }
}

impl DocumentDecoder for BsonDecoder {
    fn decode_document(&mut self, data: &[u8]) -> Result<Vec<(String, HostValue)>, MarshalError> {
        self.decode(data)
    }
}
