//! Fixed-layout request/response codec for the cross-core link.
//!
//! Wire format (native byte order, C struct layout):
//! ```text
//! request  ┌──────────────────┬──────────────────┬─────────────────┐
//!          │ request_code u32 │ message_len u32  │ body (len B)    │
//!          └──────────────────┴──────────────────┴─────────────────┘
//! response ┌──────────────────┬──────────────────┬─────────────────┐
//!          │ return_code u32  │ message_len u32  │ body (len B)    │
//!          └──────────────────┴──────────────────┴─────────────────┘
//! ```
//!
//! | Code | Request            | Body                                     |
//! |------|--------------------|------------------------------------------|
//! | 1    | set-config + start | pin, min width, max count, flag u8 + pad |
//! | 2    | reset count        | pin, init value                          |
//! | 3    | read count         | pin                → u32                 |
//! | 4    | read on-time       | pin                → u32                 |
//! | 5    | read all levels    | pin (ignored)      → u8 per input        |
//! | 6    | read pin level     | pin                → u8                  |
//! | 7    | write pin level    | pin, level                               |
//! | 8    | set output config  | 11 × u32                                 |
//! | 255  | read version       | pin (ignored)      → UTF-8, ≤ 256 B      |

use heapless::Vec;

use crate::error::{LinkError, ReturnCode};
use crate::pins::MAX_PINS;
use crate::port::{CounterConfig, DriveConfig, OutputFunction, RelationKind, SingleKind};

pub const HEADER_SIZE: usize = 8;
pub const MAX_VERSION_LEN: usize = 256;

pub const SET_CONFIG_LEN: usize = 16;
pub const RESET_LEN: usize = 8;
pub const PIN_LEN: usize = 4;
pub const WRITE_LEVEL_LEN: usize = 8;
pub const SET_OUTPUT_CONFIG_LEN: usize = 44;

/// Largest message in either direction.
pub const MAX_MESSAGE_SIZE: usize = HEADER_SIZE + MAX_VERSION_LEN;

/// Encodes "no relation input" in the output config body.
const NO_PIN: u32 = u32::MAX;

// ───────────────────────────────────────────────────────────────
// Requests
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum RequestCode {
    SetConfigAndStart = 1,
    ResetCount = 2,
    ReadCount = 3,
    ReadOnTime = 4,
    ReadAllLevels = 5,
    ReadPinLevel = 6,
    WritePinLevel = 7,
    SetOutputConfig = 8,
    ReadVersion = 255,
}

impl RequestCode {
    pub const fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::SetConfigAndStart),
            2 => Some(Self::ResetCount),
            3 => Some(Self::ReadCount),
            4 => Some(Self::ReadOnTime),
            5 => Some(Self::ReadAllLevels),
            6 => Some(Self::ReadPinLevel),
            7 => Some(Self::WritePinLevel),
            8 => Some(Self::SetOutputConfig),
            255 => Some(Self::ReadVersion),
            _ => None,
        }
    }

    /// Body length every request with this code must carry.
    pub const fn body_len(self) -> usize {
        match self {
            Self::SetConfigAndStart => SET_CONFIG_LEN,
            Self::ResetCount | Self::WritePinLevel => RESET_LEN,
            Self::ReadCount | Self::ReadOnTime | Self::ReadAllLevels | Self::ReadPinLevel | Self::ReadVersion => {
                PIN_LEN
            }
            Self::SetOutputConfig => SET_OUTPUT_CONFIG_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    SetConfig { pin: u32, config: CounterConfig },
    ResetCount { pin: u32, init: u32 },
    ReadCount { pin: u32 },
    ReadOnTime { pin: u32 },
    ReadAllLevels,
    ReadPinLevel { pin: u32 },
    WritePinLevel { pin: u32, level: bool },
    SetOutputConfig { pin: u32, config: DriveConfig },
    ReadVersion,
}

impl Request {
    pub const fn code(&self) -> RequestCode {
        match self {
            Self::SetConfig { .. } => RequestCode::SetConfigAndStart,
            Self::ResetCount { .. } => RequestCode::ResetCount,
            Self::ReadCount { .. } => RequestCode::ReadCount,
            Self::ReadOnTime { .. } => RequestCode::ReadOnTime,
            Self::ReadAllLevels => RequestCode::ReadAllLevels,
            Self::ReadPinLevel { .. } => RequestCode::ReadPinLevel,
            Self::WritePinLevel { .. } => RequestCode::WritePinLevel,
            Self::SetOutputConfig { .. } => RequestCode::SetOutputConfig,
            Self::ReadVersion => RequestCode::ReadVersion,
        }
    }
}

/// Encode `request` into `out`. Returns the number of bytes written.
pub fn encode_request(request: &Request, out: &mut [u8]) -> Option<usize> {
    let code = request.code();
    let mut w = Writer::new(out);
    w.u32(code as u32)?;
    w.u32(code.body_len() as u32)?;

    match *request {
        Request::SetConfig { pin, config } => {
            w.u32(pin)?;
            w.u32(config.min_pulse_width)?;
            w.u32(config.max_pulse_count)?;
            w.bytes(&[u8::from(config.count_on_high), 0, 0, 0])?;
        }
        Request::ResetCount { pin, init } => {
            w.u32(pin)?;
            w.u32(init)?;
        }
        Request::ReadCount { pin } | Request::ReadOnTime { pin } | Request::ReadPinLevel { pin } => {
            w.u32(pin)?;
        }
        Request::ReadAllLevels | Request::ReadVersion => w.u32(0)?,
        Request::WritePinLevel { pin, level } => {
            w.u32(pin)?;
            w.u32(u32::from(level))?;
        }
        Request::SetOutputConfig { pin, config } => {
            let (function, kind) = function_codes(config.function);
            w.u32(pin)?;
            w.u32(function)?;
            w.u32(kind)?;
            w.u32(config.relation_pin.unwrap_or(NO_PIN))?;
            w.u32(u32::from(config.trigger_on_high))?;
            w.u32(config.trigger_count)?;
            w.u32(u32::from(config.drive_high))?;
            w.u32(config.delay_secs)?;
            w.u32(config.duration_secs)?;
            w.u32(config.cycle_secs)?;
            w.u32(config.duty_percent)?;
        }
    }
    Some(w.pos)
}

/// Decode a complete request message.
pub fn decode_request(bytes: &[u8]) -> Result<Request, LinkError> {
    let mut r = Reader::new(bytes);
    let raw_code = r.u32()?;
    let len = r.u32()? as usize;
    let code = RequestCode::from_u32(raw_code).ok_or(LinkError::UnknownRequest(raw_code))?;
    if len != code.body_len() {
        return Err(LinkError::BadLength);
    }
    if r.remaining() < len {
        return Err(LinkError::ShortResponse);
    }

    let request = match code {
        RequestCode::SetConfigAndStart => {
            let pin = r.u32()?;
            let min_pulse_width = r.u32()?;
            let max_pulse_count = r.u32()?;
            let flag = r.bytes(4)?;
            Request::SetConfig {
                pin,
                config: CounterConfig {
                    count_on_high: flag_u8(flag[0])?,
                    min_pulse_width,
                    max_pulse_count,
                },
            }
        }
        RequestCode::ResetCount => Request::ResetCount {
            pin: r.u32()?,
            init: r.u32()?,
        },
        RequestCode::ReadCount => Request::ReadCount { pin: r.u32()? },
        RequestCode::ReadOnTime => Request::ReadOnTime { pin: r.u32()? },
        RequestCode::ReadAllLevels => Request::ReadAllLevels,
        RequestCode::ReadPinLevel => Request::ReadPinLevel { pin: r.u32()? },
        RequestCode::WritePinLevel => Request::WritePinLevel {
            pin: r.u32()?,
            level: flag_u32(r.u32()?)?,
        },
        RequestCode::SetOutputConfig => {
            let pin = r.u32()?;
            let function = decode_function(r.u32()?, r.u32()?)?;
            let relation_pin = match r.u32()? {
                NO_PIN => None,
                p => Some(p),
            };
            Request::SetOutputConfig {
                pin,
                config: DriveConfig {
                    function,
                    relation_pin,
                    trigger_on_high: flag_u32(r.u32()?)?,
                    trigger_count: r.u32()?,
                    drive_high: flag_u32(r.u32()?)?,
                    delay_secs: r.u32()?,
                    duration_secs: r.u32()?,
                    cycle_secs: r.u32()?,
                    duty_percent: r.u32()?,
                },
            }
        }
        RequestCode::ReadVersion => Request::ReadVersion,
    };
    Ok(request)
}

fn function_codes(function: OutputFunction) -> (u32, u32) {
    match function {
        OutputFunction::Unselected => (0, 0),
        OutputFunction::Single(kind) => (1, kind.code()),
        OutputFunction::Relation(kind) => (2, kind.code()),
    }
}

fn decode_function(function: u32, kind: u32) -> Result<OutputFunction, LinkError> {
    let kind = u64::from(kind);
    match function {
        0 => Ok(OutputFunction::Unselected),
        1 => SingleKind::from_code(kind)
            .map(OutputFunction::Single)
            .ok_or(LinkError::Malformed),
        2 => RelationKind::from_code(kind)
            .map(OutputFunction::Relation)
            .ok_or(LinkError::Malformed),
        _ => Err(LinkError::Malformed),
    }
}

// ───────────────────────────────────────────────────────────────
// Responses
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Empty,
    Value(u32),
    Levels(Vec<bool, MAX_PINS>),
    Version(&'static str),
}

/// Encode a response. Version strings longer than the body limit are cut.
pub fn encode_response(code: ReturnCode, body: &ResponseBody, out: &mut [u8]) -> Option<usize> {
    let mut w = Writer::new(out);
    w.u32(code as u32)?;
    match body {
        ResponseBody::Empty => w.u32(0)?,
        ResponseBody::Value(v) => {
            w.u32(4)?;
            w.u32(*v)?;
        }
        ResponseBody::Levels(levels) => {
            w.u32(levels.len() as u32)?;
            for &level in levels {
                w.bytes(&[u8::from(level)])?;
            }
        }
        ResponseBody::Version(version) => {
            let bytes = &version.as_bytes()[..version.len().min(MAX_VERSION_LEN)];
            w.u32(bytes.len() as u32)?;
            w.bytes(bytes)?;
        }
    }
    Some(w.pos)
}

/// Split a response into its return code and body.
///
/// A non-success return code is surfaced as [`LinkError::Rejected`].
pub fn decode_response(bytes: &[u8]) -> Result<&[u8], LinkError> {
    let mut r = Reader::new(bytes);
    let raw_code = r.u32()?;
    let len = r.u32()? as usize;
    let code = ReturnCode::from_u32(raw_code).ok_or(LinkError::Malformed)?;
    if len > MAX_VERSION_LEN {
        return Err(LinkError::BadLength);
    }
    let body = r.bytes(len)?;
    match code {
        ReturnCode::Success => Ok(body),
        rejected => Err(LinkError::Rejected(rejected)),
    }
}

/// Body of a read-count / read-on-time response.
pub fn body_value(body: &[u8]) -> Result<u32, LinkError> {
    let bytes: [u8; 4] = body.try_into().map_err(|_| LinkError::BadLength)?;
    Ok(u32::from_ne_bytes(bytes))
}

/// Body of a read-all-levels / read-pin-level response.
pub fn body_levels(body: &[u8]) -> Result<Vec<bool, MAX_PINS>, LinkError> {
    if body.len() > MAX_PINS {
        return Err(LinkError::BadLength);
    }
    body.iter().map(|&b| flag_u8(b)).collect()
}

/// Body of a read-version response.
pub fn body_version(body: &[u8]) -> Result<&str, LinkError> {
    core::str::from_utf8(body).map_err(|_| LinkError::Malformed)
}

// ───────────────────────────────────────────────────────────────
// Cursor helpers
// ───────────────────────────────────────────────────────────────

fn flag_u8(b: u8) -> Result<bool, LinkError> {
    match b {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(LinkError::Malformed),
    }
}

fn flag_u32(v: u32) -> Result<bool, LinkError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(LinkError::Malformed),
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes(&mut self, data: &[u8]) -> Option<()> {
        let end = self.pos.checked_add(data.len())?;
        self.buf.get_mut(self.pos..end)?.copy_from_slice(data);
        self.pos = end;
        Some(())
    }

    fn u32(&mut self, v: u32) -> Option<()> {
        self.bytes(&v.to_ne_bytes())
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], LinkError> {
        let end = self.pos.checked_add(n).ok_or(LinkError::ShortResponse)?;
        let out = self.buf.get(self.pos..end).ok_or(LinkError::ShortResponse)?;
        self.pos = end;
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32, LinkError> {
        let b = self.bytes(4)?;
        Ok(u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
    }
}
