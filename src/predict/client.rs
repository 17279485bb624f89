use std::ffi::CString;
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::error::PredictError;
use super::parsing::{parse_list, parse_qth, parse_sat, parse_time};
use super::types::{GroundStation, SatelliteObservation};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_SERVICE: &str = "predict";

const REPLY_TIMEOUT: Duration = Duration::from_secs(1);
const MAX_DATAGRAM: usize = 1024;

/// `getservbyname` hands out a pointer into static storage.
static SERVICES_DB: Mutex<()> = Mutex::new(());

/// Request/response access to a prediction server.
pub trait Predict {
    /// Sends one command and returns the raw reply text.
    fn send_command(&self, command: &str) -> Result<String, PredictError>;

    fn get_qth(&self) -> Result<GroundStation, PredictError> {
        parse_qth(&self.send_command("GET_QTH")?)
    }

    fn get_list(&self) -> Result<Vec<String>, PredictError> {
        Ok(parse_list(&self.send_command("GET_LIST")?))
    }

    fn get_sat(&self, name: &str) -> Result<SatelliteObservation, PredictError> {
        parse_sat(&self.send_command(&format!("GET_SAT {}", name))?)
    }

    fn get_time(&self) -> Result<i64, PredictError> {
        parse_time(&self.send_command("GET_TIME")?)
    }
}

/// UDP client; every command uses a fresh socket.
#[derive(Debug, Clone)]
pub struct PredictClient {
    host: String,
    service: String,
    timeout: Duration,
}

impl PredictClient {
    pub fn new(host: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            service: service.into(),
            timeout: REPLY_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server address for the configured host and service.
    pub fn server_addr(&self) -> Result<SocketAddr, PredictError> {
        let port = resolve_port(&self.service)?;
        resolve_host(&self.host, port)
    }
}

impl Predict for PredictClient {
    fn send_command(&self, command: &str) -> Result<String, PredictError> {
        let addr = self.server_addr()?;

        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_read_timeout(Some(self.timeout))?;
        socket.send_to(format!("{}\n", command).as_bytes(), addr)?;
        log::trace!("-> {} {:?}", addr, command);

        let mut buf = [0u8; MAX_DATAGRAM];
        let (len, _) = socket.recv_from(&mut buf).map_err(|e| match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                PredictError::Timeout(command.to_string())
            }
            _ => PredictError::Io(e),
        })?;

        let reply = std::str::from_utf8(&buf[..len])
            .map_err(|_| PredictError::Decode(command.to_string()))?;
        log::trace!("<- {} {} bytes", addr, len);
        Ok(reply.to_string())
    }
}

/// Port for a UDP service name, falling back to reading the name as a number.
pub fn resolve_port(service: &str) -> Result<u16, PredictError> {
    lookup_service(service)
        .or_else(|| service.trim().parse().ok())
        .ok_or_else(|| PredictError::UnknownService {
            service: service.to_string(),
        })
}

fn lookup_service(service: &str) -> Option<u16> {
    let name = CString::new(service).ok()?;
    let proto = CString::new("udp").ok()?;

    let _guard = SERVICES_DB.lock().unwrap_or_else(PoisonError::into_inner);
    // SAFETY: both arguments are NUL-terminated and outlive the call; the
    // lock keeps other lookups out until the port is copied.
    unsafe {
        let entry = libc::getservbyname(name.as_ptr(), proto.as_ptr());
        if entry.is_null() {
            None
        } else {
            Some(u16::from_be((*entry).s_port as u16))
        }
    }
}

fn resolve_host(host: &str, port: u16) -> Result<SocketAddr, PredictError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| PredictError::Resolve {
            host: host.to_string(),
            source,
        })?;
    addrs
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| PredictError::NoAddress(host.to_string()))
}
