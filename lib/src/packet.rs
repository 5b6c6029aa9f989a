use crate::attrs::address_attr::AddressAttr;
use crate::attrs::errcode_attr::ErrcodeAttr;
use crate::attrs::xor_address::XorMappedAddress;
use crate::attrs::{pad4, RawAttr};
use crate::constants::*;
use crate::error::ParseErr;
use crate::header::Header;
use bytes::{BufMut, Bytes, BytesMut};
use log::debug;
use std::net::SocketAddr;

// 是否是一个正确的stun包
// 验证message length和magic cookie
// 属性按TLV遍历, value补齐到4字节

#[derive(Debug, Clone)]
pub struct Packet {
    pub header: Header,
    pub attrs: Vec<RawAttr>,
}

impl Packet {
    pub fn new(header: Header, attrs: Vec<RawAttr>) -> Self {
        let mut packet = Self { header, attrs };
        packet.update_header_len();
        packet
    }

    fn update_header_len(&mut self) {
        let total = self.attrs.iter().fold(0_usize, |acc, x| acc + x.len());
        self.header.msg_len = total as u16;
    }

    pub fn add_attr(&mut self, attr: RawAttr) {
        self.attrs.push(attr);
        self.update_header_len();
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_slice(&self.header.pack());
        for v in self.attrs.iter() {
            buf.put_slice(&v.pack());
        }

        buf.freeze()
    }

    pub fn unpack(mut buf_bytes: Bytes) -> Result<Self, ParseErr> {
        if buf_bytes.len() < HEADER_LEN {
            return Err(ParseErr::MalformedResponse(format!(
                "header buf len:{} < {}",
                buf_bytes.len(),
                HEADER_LEN
            )));
        }

        let header_buf = buf_bytes.split_to(HEADER_LEN);
        let header = Header::unpack(header_buf)?;

        if header.msg_len as usize != buf_bytes.len() {
            return Err(ParseErr::MalformedResponse(format!(
                "header len:{} != {}",
                header.msg_len,
                buf_bytes.len()
            )));
        }

        let mut attr_list = vec![];

        let mut max_attr = 32_usize;

        while buf_bytes.len() >= 4 {
            if max_attr == 0 {
                return Err(ParseErr::MalformedResponse("too many attrs".to_string()));
            }

            let attr_len = u16::from_be_bytes([buf_bytes[2], buf_bytes[3]]) as usize;
            let attr_total = pad4(attr_len) + 4;

            if buf_bytes.len() < attr_total {
                return Err(ParseErr::MalformedResponse(format!(
                    "attr buf len:{} < {}",
                    buf_bytes.len(),
                    attr_total
                )));
            }
            let attr_buf = buf_bytes.split_to(attr_total);
            let attr = RawAttr::unpack(attr_buf)?;
            debug!("attr type:{:#06x} len:{}", attr.attr_type, attr.attr_len);
            attr_list.push(attr);

            max_attr -= 1;
        }

        if !buf_bytes.is_empty() {
            return Err(ParseErr::MalformedResponse(format!(
                "trailing bytes:{}",
                buf_bytes.len()
            )));
        }

        Ok(Packet::new(header, attr_list))
    }

    // xor变种不受NAT改写影响, 两者都在时用xor的
    pub fn mapped_address(&self) -> Result<SocketAddr, ParseErr> {
        let mut plain: Option<&RawAttr> = None;

        for attr in self.attrs.iter() {
            match attr.attr_type {
                ATTR_XOR_MAPPED_ADDRESS | ATTR_XOR_MAPPED_ADDRESS_ALT => {
                    let xor =
                        XorMappedAddress::from_base_attr(attr.clone(), &self.header.trans_id)?;
                    return Ok(xor.address);
                }
                ATTR_MAPPED_ADDRESS => {
                    if plain.is_none() {
                        plain = Some(attr);
                    }
                }
                _ => {}
            }
        }

        match plain {
            Some(v) => {
                let attr: AddressAttr = v.clone().try_into()?;
                Ok(attr.address)
            }
            None => Err(ParseErr::NoMappedAddress),
        }
    }

    pub fn error_code(&self) -> Option<(u16, String)> {
        for attr in self.attrs.iter() {
            if attr.attr_type == ATTR_ERROR_CODE {
                if let Ok(v) = ErrcodeAttr::try_from(attr.clone()) {
                    return Some((v.code, v.msg));
                }
            }
        }

        None
    }
}
