//! Link engine: serves request messages on the real-time core.
//!
//! **Transport-decoupled**: the engine does not own a transport. Callers
//! feed one request message via [`serve`] and receive the serialized
//! response in `out`. Every request gets exactly one response, including
//! malformed ones:
//!
//! | Failure                    | Return code      |
//! |----------------------------|------------------|
//! | request code not in table  | `UnknownRequest` |
//! | short body / bad length    | `BadRequest`     |
//! | pin not owned by the core  | `InvalidPin`     |

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::drivers::rt_core::RtCore;
use crate::error::{LinkError, ReturnCode};

use super::codec::{ResponseBody, decode_request, encode_response};

/// Decode `request`, run it against `core`, encode the answer into `out`.
///
/// Returns the response length, or 0 when `out` cannot hold a response.
pub fn serve<I: InputPin, O: OutputPin>(core: &mut RtCore<I, O>, request: &[u8], out: &mut [u8]) -> usize {
    let (code, body) = match decode_request(request) {
        Ok(req) => {
            debug!("link request {:?}", req.code());
            match core.handle(&req) {
                Ok(body) => (ReturnCode::Success, body),
                Err(code) => {
                    warn!("link request {:?} failed: {:?}", req.code(), code);
                    (code, ResponseBody::Empty)
                }
            }
        }
        Err(LinkError::UnknownRequest(raw)) => {
            warn!("link: unknown request code {}", raw);
            (ReturnCode::UnknownRequest, ResponseBody::Empty)
        }
        Err(e) => {
            warn!("link: bad request: {}", e);
            (ReturnCode::BadRequest, ResponseBody::Empty)
        }
    };
    encode_response(code, &body, out).unwrap_or(0)
}
