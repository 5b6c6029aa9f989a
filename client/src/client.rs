use bytes::Bytes;
use log::debug;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use stun_probe::constants::{
    MESSAGE_TYPE_BIND_ERR_RES, MESSAGE_TYPE_BIND_REQ, MESSAGE_TYPE_BIND_RES,
};
use stun_probe::error::ParseErr;
use stun_probe::header::{Header, TransId};
use stun_probe::packet::Packet;
use stun_probe::util::{new_trans_id, print_bytes};
use tokio::net::{lookup_host, UdpSocket};

// 单次binding响应, 1024足够
const RECV_BUF_LEN: usize = 1024;

#[derive(Debug)]
pub enum ProbeError {
    // host:port解析不出地址
    ResolutionFailed(String),

    // bind/send/recv 失败
    TransportError(String),

    // 响应解析失败
    Parse(ParseErr),

    // 服务端返回binding error response
    ServerError(u16, String),

    // 响应的trans_id和请求的不一致
    TransactionMismatch,
}

impl From<io::Error> for ProbeError {
    fn from(e: io::Error) -> Self {
        ProbeError::TransportError(format!("{}", e))
    }
}

impl From<ParseErr> for ProbeError {
    fn from(e: ParseErr) -> Self {
        ProbeError::Parse(e)
    }
}

//--------------------------------------
#[derive(Debug)]
pub struct ProbeReport {
    // 请求发到的地址
    pub sent_to: SocketAddr,

    // 响应从哪个地址回来
    pub recv_from: SocketAddr,

    // 服务端看到的地址
    pub mapped_address: SocketAddr,
}

//---------------------------------------
pub async fn resolve_server(host: &str, port: u16) -> Result<SocketAddr, ProbeError> {
    let mut addrs = match lookup_host((host, port)).await {
        Ok(v) => v,
        Err(e) => {
            return Err(ProbeError::ResolutionFailed(format!(
                "{}:{}, {}",
                host, port, e
            )));
        }
    };

    match addrs.next() {
        Some(v) => Ok(v),
        None => Err(ProbeError::ResolutionFailed(format!(
            "no address for {}:{}",
            host, port
        ))),
    }
}

// 绑定和server同族的通配地址, local_port=0 交给系统选
pub async fn bind_local(server: SocketAddr, local_port: u16) -> Result<UdpSocket, ProbeError> {
    let local = match server {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), local_port),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), local_port),
    };

    let sock = UdpSocket::bind(local).await?;
    Ok(sock)
}

fn new_request(trans_id: TransId) -> Packet {
    let header = Header::new(MESSAGE_TYPE_BIND_REQ, 0, trans_id);
    Packet::new(header, vec![])
}

pub async fn probe(sock: &UdpSocket, server: SocketAddr) -> Result<ProbeReport, ProbeError> {
    let trans_id = new_trans_id();
    let mut recv_buf = vec![0u8; RECV_BUF_LEN];

    let req = new_request(trans_id);
    let buf = req.pack();
    debug!("request len: {}", buf.len());
    debug!(
        "{:?} --> {}\n{}",
        sock.local_addr()?,
        server,
        print_bytes(&buf, " ", 8)
    );

    let sent = sock.send_to(&buf, server).await?;
    debug!("sent: {}", sent);

    let (len, remote_addr) = sock.recv_from(&mut recv_buf).await?;
    let buf = Bytes::copy_from_slice(&recv_buf[..len]);
    debug!("recv len: {}", buf.len());
    debug!(
        "{:?} <-- {}\n{}",
        sock.local_addr()?,
        remote_addr,
        print_bytes(&buf, " ", 8)
    );

    let response = Packet::unpack(buf)?;

    match response.header.msg_type {
        MESSAGE_TYPE_BIND_RES => {}
        MESSAGE_TYPE_BIND_ERR_RES => {
            let (code, msg) = response.error_code().unwrap_or((0, String::new()));
            return Err(ProbeError::ServerError(code, msg));
        }
        v => {
            return Err(ProbeError::Parse(ParseErr::MalformedResponse(format!(
                "not a binding response, msg_type: {:#06x}",
                v
            ))));
        }
    }

    let mapped_address = response.mapped_address()?;

    if response.header.trans_id != trans_id {
        return Err(ProbeError::TransactionMismatch);
    }

    Ok(ProbeReport {
        sent_to: server,
        recv_from: remote_addr,
        mapped_address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stun_probe::attrs::address_attr::AddressAttr;
    use stun_probe::attrs::errcode_attr::ErrcodeAttr;
    use stun_probe::attrs::xor_address::XorMappedAddress;
    use stun_probe::constants::ATTR_MAPPED_ADDRESS;

    // 回环上的假server, 收一个请求回一个响应
    async fn fake_server<F>(make_response: F) -> (SocketAddr, tokio::task::JoinHandle<()>)
    where
        F: FnOnce(TransId, SocketAddr) -> Packet + Send + 'static,
    {
        let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = sock.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; 1024];
            let (len, remote) = sock.recv_from(&mut buf).await.unwrap();
            let req = Packet::unpack(Bytes::copy_from_slice(&buf[..len])).unwrap();
            assert_eq!(req.header.msg_type, MESSAGE_TYPE_BIND_REQ);

            let res = make_response(req.header.trans_id, remote);
            sock.send_to(&res.pack(), remote).await.unwrap();
        });

        (addr, handle)
    }

    #[tokio::test]
    async fn test_probe_ok() {
        let (server, handle) = fake_server(|trans_id, remote| {
            let header = Header::new(MESSAGE_TYPE_BIND_RES, 0, trans_id);
            let mut res = Packet::new(header, vec![]);
            res.add_attr(AddressAttr::new(ATTR_MAPPED_ADDRESS, remote).into());
            res.add_attr(XorMappedAddress::new(trans_id, remote).into());
            res
        })
        .await;

        let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let local = sock.local_addr().unwrap();

        let report = probe(&sock, server).await.unwrap();
        assert_eq!(report.sent_to, server);
        assert_eq!(report.recv_from, server);
        assert_eq!(report.mapped_address, local);

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_trans_id_mismatch() {
        let (server, handle) = fake_server(|_trans_id, remote| {
            // 回一个无关的trans_id
            let header = Header::new(MESSAGE_TYPE_BIND_RES, 0, new_trans_id());
            let mut res = Packet::new(header, vec![]);
            res.add_attr(AddressAttr::new(ATTR_MAPPED_ADDRESS, remote).into());
            res
        })
        .await;

        let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let err = probe(&sock, server).await.unwrap_err();
        assert!(matches!(err, ProbeError::TransactionMismatch));

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_no_mapped_address() {
        let (server, handle) = fake_server(|trans_id, _remote| {
            let header = Header::new(MESSAGE_TYPE_BIND_RES, 0, trans_id);
            Packet::new(header, vec![])
        })
        .await;

        let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let err = probe(&sock, server).await.unwrap_err();
        assert!(matches!(err, ProbeError::Parse(ParseErr::NoMappedAddress)));

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_error_response() {
        let (server, handle) = fake_server(|trans_id, _remote| {
            let header = Header::new(MESSAGE_TYPE_BIND_ERR_RES, 0, trans_id);
            let mut res = Packet::new(header, vec![]);
            res.add_attr(ErrcodeAttr::new(400, "bad request").into());
            res
        })
        .await;

        let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let err = probe(&sock, server).await.unwrap_err();
        match err {
            ProbeError::ServerError(code, msg) => {
                assert_eq!(code, 400);
                assert_eq!(msg, "bad request");
            }
            v => panic!("unexpected: {:?}", v),
        }

        handle.await.unwrap();
    }
}
