#![allow(clippy::len_without_is_empty)]

use crate::error::ParseErr;
use bytes::{BufMut, Bytes, BytesMut};
use std::ops::Deref;

pub mod address_attr;
pub mod errcode_attr;
pub mod xor_address;

#[derive(Debug, Clone)]
pub struct RawAttr {
    pub attr_type: u16,
    pub attr_len: u16,
    pub value: Bytes,
}

impl RawAttr {
    pub fn new(attr_type: u16, value: Bytes) -> Self {
        Self {
            attr_type,
            attr_len: value.len() as u16,
            value,
        }
    }

    // 4字节的type/len + value + 补齐到4字节的padding
    pub fn len(&self) -> usize {
        4 + pad4(self.attr_len as usize)
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());

        buf.put_u16(self.attr_type);
        buf.put_u16(self.attr_len);
        buf.put_slice(&self.value);
        buf.put_bytes(0, pad4(self.value.len()) - self.value.len());

        buf.freeze()
    }

    pub fn unpack(buf_bytes: Bytes) -> Result<Self, ParseErr> {
        let buf = buf_bytes.deref();

        if buf.len() < 4 {
            return Err(ParseErr::MalformedResponse(format!(
                "attr buf len:{}",
                buf.len()
            )));
        }

        let mut index = 0_usize;
        let attr_type = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        let attr_len = u16::from_be_bytes([buf[index], buf[index + 1]]);

        if buf.len() < attr_len as usize + 4 {
            return Err(ParseErr::MalformedResponse(format!(
                "attr buf len:{} < {}",
                buf.len(),
                attr_len as usize + 4
            )));
        }

        // padding不进value
        index += 2;
        let mut value = BytesMut::with_capacity(attr_len as usize);
        value.put_slice(&buf[index..index + attr_len as usize]);

        let value = value.freeze();

        Ok(Self {
            attr_type,
            attr_len,
            value,
        })
    }
}

pub(crate) fn pad4(len: usize) -> usize {
    (len + 3) / 4 * 4
}
