//! AS608 / R30x optical fingerprint sensor driver.
//!
//! Packet protocol over a byte [`Transport`] (UART2, 57600 8N1):
//!
//! ```text
//! ┌────────┬───────────┬─────┬──────────┬──────────────────┬──────────┐
//! │ EF 01  │ address   │ pid │ length   │ payload          │ checksum │
//! │ 2 B    │ 4 B (BE)  │ 1 B │ 2 B (BE) │ length - 2 bytes │ 2 B (BE) │
//! └────────┴───────────┴─────┴──────────┴──────────────────┴──────────┘
//! ```
//!
//! `length` counts payload plus checksum.  The checksum is the 16-bit sum
//! of pid, both length bytes and every payload byte.  Commands carry pid
//! `0x01` with an instruction byte first; acknowledgements carry pid
//! `0x07` with a confirmation code first.
//!
//! The driver implements [`BiometricPort`] directly.  Every command is a
//! single request / acknowledgement exchange with a bounded wait.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{BiometricPort, TemplateBuffer};
use crate::bridge::transport::{Transport, write_all};
use crate::error::BiometricError;
use crate::protocol::{MAX_TEMPLATE_SLOT, VoterIdentity};

pub const HEADER: [u8; 2] = [0xEF, 0x01];
pub const DEFAULT_ADDRESS: u32 = 0xFFFF_FFFF;
pub const DEFAULT_PASSWORD: u32 = 0;

pub const PID_COMMAND: u8 = 0x01;
pub const PID_ACK: u8 = 0x07;

/// Header, address, pid and length.
pub const PREAMBLE_LEN: usize = 9;
/// Largest packet this driver sends or accepts.
pub const MAX_PACKET_LEN: usize = 64;

/// Library slots searched, starting at 0. Covers every enrollable slot.
pub const SEARCH_COUNT: u16 = MAX_TEMPLATE_SLOT + 1;

/// How long to wait for an acknowledgement.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 1_000;

/// Instruction codes.
pub mod opcode {
    pub const GEN_IMG: u8 = 0x01;
    pub const IMG_2_TZ: u8 = 0x02;
    pub const SEARCH: u8 = 0x04;
    pub const REG_MODEL: u8 = 0x05;
    pub const STORE: u8 = 0x06;
    pub const EMPTY: u8 = 0x0D;
    pub const VFY_PWD: u8 = 0x13;
}

/// Confirmation codes.
pub mod code {
    pub const OK: u8 = 0x00;
    pub const PACKET_RECV_ERR: u8 = 0x01;
    pub const NO_FINGER: u8 = 0x02;
    pub const IMAGE_FAIL: u8 = 0x03;
    pub const IMAGE_MESSY: u8 = 0x06;
    pub const FEATURE_FAIL: u8 = 0x07;
    pub const NOT_FOUND: u8 = 0x09;
    pub const ENROLL_MISMATCH: u8 = 0x0A;
    pub const BAD_LOCATION: u8 = 0x0B;
    pub const DB_CLEAR_FAIL: u8 = 0x11;
    pub const WRONG_PASSWORD: u8 = 0x13;
    pub const INVALID_IMAGE: u8 = 0x15;
    pub const FLASH_ERR: u8 = 0x18;
}

// ---------------------------------------------------------------------------
// Packet codec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Fewer bytes than the header promises.
    Truncated,
    BadHeader,
    /// Length field below 2 or above [`MAX_PACKET_LEN`].
    BadLength,
    BadChecksum,
}

/// A decoded packet borrowing its payload from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub address: u32,
    pub pid: u8,
    pub payload: &'a [u8],
}

pub fn checksum(pid: u8, length: u16, payload: &[u8]) -> u16 {
    let [hi, lo] = length.to_be_bytes();
    payload
        .iter()
        .fold(u16::from(pid) + u16::from(hi) + u16::from(lo), |acc, &b| acc.wrapping_add(u16::from(b)))
}

/// Encode a packet into `out`.  Returns the number of bytes written, or
/// `None` if `out` is too small.
pub fn encode_packet(address: u32, pid: u8, payload: &[u8], out: &mut [u8]) -> Option<usize> {
    let total = PREAMBLE_LEN + payload.len() + 2;
    if total > out.len() || total > MAX_PACKET_LEN {
        return None;
    }
    let length = (payload.len() + 2) as u16;

    out[0..2].copy_from_slice(&HEADER);
    out[2..6].copy_from_slice(&address.to_be_bytes());
    out[6] = pid;
    out[7..9].copy_from_slice(&length.to_be_bytes());
    out[PREAMBLE_LEN..PREAMBLE_LEN + payload.len()].copy_from_slice(payload);
    out[total - 2..total].copy_from_slice(&checksum(pid, length, payload).to_be_bytes());
    Some(total)
}

/// Payload length announced by a preamble, validated against the limits.
pub fn announced_len(preamble: &[u8]) -> Result<usize, PacketError> {
    if preamble.len() < PREAMBLE_LEN {
        return Err(PacketError::Truncated);
    }
    if preamble[0..2] != HEADER {
        return Err(PacketError::BadHeader);
    }
    let length = usize::from(u16::from_be_bytes([preamble[7], preamble[8]]));
    if length < 2 || PREAMBLE_LEN + length > MAX_PACKET_LEN {
        return Err(PacketError::BadLength);
    }
    Ok(length)
}

/// Decode one complete packet from the start of `buf`.
pub fn parse_packet(buf: &[u8]) -> Result<Packet<'_>, PacketError> {
    let length = announced_len(buf)?;
    let total = PREAMBLE_LEN + length;
    if buf.len() < total {
        return Err(PacketError::Truncated);
    }
    let pid = buf[6];
    let payload = &buf[PREAMBLE_LEN..total - 2];
    let expected = u16::from_be_bytes([buf[total - 2], buf[total - 1]]);
    if checksum(pid, length as u16, payload) != expected {
        return Err(PacketError::BadChecksum);
    }
    Ok(Packet {
        address: u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]),
        pid,
        payload,
    })
}

/// Map a confirmation code to the driver result.
pub fn check_code(confirmation: u8) -> Result<(), BiometricError> {
    match confirmation {
        code::OK => Ok(()),
        code::PACKET_RECV_ERR => Err(BiometricError::Communication),
        code::NO_FINGER => Err(BiometricError::NoFinger),
        code::IMAGE_FAIL | code::INVALID_IMAGE => Err(BiometricError::ImageFailed),
        code::IMAGE_MESSY | code::FEATURE_FAIL => Err(BiometricError::FeatureFailed),
        code::ENROLL_MISMATCH => Err(BiometricError::EnrollMismatch),
        code::BAD_LOCATION => Err(BiometricError::BadLocation),
        code::DB_CLEAR_FAIL => Err(BiometricError::ClearFailed),
        code::WRONG_PASSWORD => Err(BiometricError::WrongPassword),
        code::FLASH_ERR => Err(BiometricError::FlashError),
        other => Err(BiometricError::Unexpected(other)),
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Confirmation code plus up to 16 parameter bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ack {
    code: u8,
    params: heapless::Vec<u8, 16>,
}

pub struct As608<T: Transport, D: DelayNs> {
    transport: T,
    delay: D,
    address: u32,
    password: u32,
    response_timeout_ms: u32,
}

impl<T: Transport, D: DelayNs> As608<T, D> {
    pub fn new(transport: T, delay: D) -> Self {
        Self {
            transport,
            delay,
            address: DEFAULT_ADDRESS,
            password: DEFAULT_PASSWORD,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }

    pub fn with_password(mut self, password: u32) -> Self {
        self.password = password;
        self
    }

    pub fn with_response_timeout(mut self, ms: u32) -> Self {
        self.response_timeout_ms = ms;
        self
    }

    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }

    /// Send one instruction and wait for its acknowledgement.
    fn command(&mut self, payload: &[u8]) -> Result<Ack, BiometricError> {
        let mut out = [0u8; MAX_PACKET_LEN];
        let len = encode_packet(self.address, PID_COMMAND, payload, &mut out).ok_or(BiometricError::Communication)?;

        self.drain_input();
        write_all(&mut self.transport, &out[..len]).map_err(|e| {
            log::warn!("AS608 write failed: {:?}", e);
            BiometricError::Communication
        })?;

        let mut buf = [0u8; MAX_PACKET_LEN];
        self.read_exact(&mut buf[..PREAMBLE_LEN])?;
        let length = announced_len(&buf[..PREAMBLE_LEN]).map_err(|e| {
            log::warn!("AS608 bad preamble: {:?}", e);
            BiometricError::Communication
        })?;
        self.read_exact(&mut buf[PREAMBLE_LEN..PREAMBLE_LEN + length])?;

        let packet = parse_packet(&buf[..PREAMBLE_LEN + length]).map_err(|e| {
            log::warn!("AS608 bad packet: {:?}", e);
            BiometricError::Communication
        })?;
        if packet.pid != PID_ACK {
            return Err(BiometricError::Communication);
        }
        let (&code, params) = packet.payload.split_first().ok_or(BiometricError::Communication)?;
        Ok(Ack {
            code,
            params: heapless::Vec::from_slice(&params[..params.len().min(16)]).unwrap_or_default(),
        })
    }

    fn simple(&mut self, payload: &[u8]) -> Result<(), BiometricError> {
        let ack = self.command(payload)?;
        check_code(ack.code)
    }

    /// Fill `buf` completely or give up after the response timeout.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BiometricError> {
        let mut filled = 0;
        let mut waited_ms = 0;
        while filled < buf.len() {
            match self.transport.read(&mut buf[filled..]) {
                Ok(0) => {
                    if waited_ms >= self.response_timeout_ms {
                        return Err(BiometricError::Communication);
                    }
                    self.delay.delay_ms(1);
                    waited_ms += 1;
                }
                Ok(n) => filled += n,
                Err(e) => {
                    log::warn!("AS608 read failed: {:?}", e);
                    return Err(BiometricError::Communication);
                }
            }
        }
        Ok(())
    }

    /// Discard stale bytes left over from an earlier timed-out exchange.
    fn drain_input(&mut self) {
        let mut scratch = [0u8; 16];
        while let Ok(n) = self.transport.read(&mut scratch) {
            if n == 0 {
                break;
            }
        }
    }
}

impl<T: Transport, D: DelayNs> BiometricPort for As608<T, D> {
    fn verify_sensor(&mut self) -> Result<(), BiometricError> {
        let [a, b, c, d] = self.password.to_be_bytes();
        self.simple(&[opcode::VFY_PWD, a, b, c, d])
    }

    fn capture_image(&mut self) -> Result<(), BiometricError> {
        self.simple(&[opcode::GEN_IMG])
    }

    fn image_to_template(&mut self, buffer: TemplateBuffer) -> Result<(), BiometricError> {
        self.simple(&[opcode::IMG_2_TZ, buffer as u8])
    }

    fn search(&mut self) -> Result<Option<VoterIdentity>, BiometricError> {
        let [count_hi, count_lo] = SEARCH_COUNT.to_be_bytes();
        let ack = self.command(&[opcode::SEARCH, TemplateBuffer::One as u8, 0x00, 0x00, count_hi, count_lo])?;
        match ack.code {
            code::OK => {
                if ack.params.len() < 4 {
                    return Err(BiometricError::Communication);
                }
                let slot = u16::from_be_bytes([ack.params[0], ack.params[1]]);
                let score = u16::from_be_bytes([ack.params[2], ack.params[3]]);
                log::debug!("AS608 match: slot {} score {}", slot, score);
                Ok(Some(VoterIdentity(slot)))
            }
            code::NOT_FOUND => Ok(None),
            other => check_code(other).map(|()| None),
        }
    }

    fn create_model(&mut self) -> Result<(), BiometricError> {
        self.simple(&[opcode::REG_MODEL])
    }

    fn store_model(&mut self, slot: u16) -> Result<(), BiometricError> {
        let [hi, lo] = slot.to_be_bytes();
        self.simple(&[opcode::STORE, TemplateBuffer::One as u8, hi, lo])
    }

    fn clear_templates(&mut self) -> Result<(), BiometricError> {
        self.simple(&[opcode::EMPTY])
    }
}
