#![allow(clippy::len_without_is_empty)]

use crate::constants::*;
use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ParseErr;
use std::ops::Deref;

pub type TransId = [u8; TRANS_ID_LEN];

// rfc 5389, 6
#[derive(Debug, Clone)]
pub struct Header {
    pub msg_type: u16,

    // 不包括header的20字节
    pub msg_len: u16,

    pub trans_id: TransId,
}

impl Header {
    pub fn new(msg_type: u16, msg_len: u16, trans_id: TransId) -> Self {
        Self {
            msg_type,
            msg_len,
            trans_id,
        }
    }

    pub fn len(&self) -> usize {
        HEADER_LEN
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN);
        buf.put_u16(self.msg_type);
        buf.put_u16(self.msg_len);
        buf.put_slice(&MAGIC_COOKIE);
        buf.put_slice(&self.trans_id);
        buf.freeze()
    }

    pub fn unpack(buf_bytes: Bytes) -> Result<Self, ParseErr> {
        let buf = buf_bytes.deref();

        if buf.len() < HEADER_LEN {
            return Err(ParseErr::MalformedResponse(format!(
                "header buf len:{} < {}",
                buf.len(),
                HEADER_LEN
            )));
        }

        let mut index = 0_usize;
        let msg_type = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        let msg_len = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        if buf[index..index + 4] != MAGIC_COOKIE {
            return Err(ParseErr::MalformedResponse(format!(
                "bad magic cookie: {:02X?}",
                &buf[index..index + 4]
            )));
        }

        index += 4;
        let mut trans_id = [0_u8; TRANS_ID_LEN];
        trans_id.copy_from_slice(&buf[index..index + TRANS_ID_LEN]);

        Ok(Self {
            msg_type,
            msg_len,
            trans_id,
        })
    }
}
