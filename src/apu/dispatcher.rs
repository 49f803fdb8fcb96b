//! Register write routing.
//!
//! Maps a written address to the handler that must react to it. The table is
//! data rather than control flow so the noise channel can be routed by adding
//! rows once it has a trigger handler.

use super::channel_state::ChannelId;
use super::registers::Register;

/// Handler a register write is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Channel 1 live update (NR10-NR13)
    Square1Update,
    /// Trigger handler for a channel (NRx4)
    Trigger(ChannelId),
}

/// Address to handler routing table
pub const ROUTES: [(Register, Route); 7] = [
    (Register::Nr10, Route::Square1Update),
    (Register::Nr11, Route::Square1Update),
    (Register::Nr12, Route::Square1Update),
    (Register::Nr13, Route::Square1Update),
    (Register::Nr14, Route::Trigger(ChannelId::Square1)),
    (Register::Nr24, Route::Trigger(ChannelId::Square2)),
    (Register::Nr34, Route::Trigger(ChannelId::Wave)),
];

/// Look up the handler for a write to `addr`
///
/// Writes to every other address only update the register store.
pub fn route(addr: u16) -> Option<Route> {
    ROUTES
        .iter()
        .find(|(reg, _)| reg.addr() == addr)
        .map(|&(_, route)| route)
}
