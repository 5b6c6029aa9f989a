use std::ops::Deref;

use crate::attrs::RawAttr;
use crate::constants::ATTR_ERROR_CODE;
use crate::error::ParseErr;
use bytes::{BufMut, BytesMut};

// class:  3 bit        1-6
// number: 8 bit        0-99

#[derive(Debug, Clone)]
pub struct ErrcodeAttr {
    pub code: u16,
    pub msg: String,
}

impl ErrcodeAttr {
    pub fn new(code: u16, msg: &str) -> Self {
        Self {
            code,
            msg: msg.to_string(),
        }
    }
}

impl From<ErrcodeAttr> for RawAttr {
    fn from(attr: ErrcodeAttr) -> Self {
        let class = (attr.code / 100) as u8;
        let number = (attr.code % 100) as u8;

        let mut bytes_buf = BytesMut::with_capacity(4 + attr.msg.len());
        bytes_buf.put_u16(0);
        bytes_buf.put_u8(class);
        bytes_buf.put_u8(number);
        bytes_buf.put_slice(attr.msg.as_bytes());

        let value = bytes_buf.freeze();
        RawAttr::new(ATTR_ERROR_CODE, value)
    }
}

impl TryFrom<RawAttr> for ErrcodeAttr {
    type Error = ParseErr;

    fn try_from(base_attr: RawAttr) -> Result<Self, Self::Error> {
        if base_attr.value.len() < 4 {
            return Err(ParseErr::MalformedResponse(format!(
                "err_code attr buf len:{} < 4",
                base_attr.value.len()
            )));
        }

        // 从 value中解析
        let value = base_attr.value.deref();

        let class = value[2] as u16;
        let number = value[3] as u16;
        let code = class * 100 + number;

        let msg = String::from_utf8_lossy(&value[4..]).trim().to_string();

        Ok(Self { code, msg })
    }
}
