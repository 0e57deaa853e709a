//! MIDI controller numbers.
//!
//! Controllers below 32 that carry 14-bit values have their LSB partner at
//! `number + 32`; the engine treats both halves the same way.

/// Controller numbers the engine interprets itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Controller {
    BankSelect = 0x00,
    ModulationWheel = 0x01,
    Breath = 0x02,
    ChannelVolume = 0x07,
    Balance = 0x08,
    Pan = 0x0A,
    Expression = 0x0B,
    ReverbSend = 0x5B,
    ChorusSend = 0x5D,
    AllSoundOff = 0x78,
    ResetAllControllers = 0x79,
    AllNotesOff = 0x7B,
}

impl Controller {
    #[inline]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// The LSB partner of a 14-bit controller.
    #[inline]
    pub const fn lsb(self) -> u8 {
        self as u8 + 32
    }
}

/// Built-in plugin controls driven from reserved controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedControl {
    DryWet,
    Volume,
    Balance,
}

const RESERVED: [(Controller, ReservedControl); 4] = [
    (Controller::Breath, ReservedControl::DryWet),
    (Controller::ChannelVolume, ReservedControl::Volume),
    (Controller::Balance, ReservedControl::Balance),
    (Controller::Pan, ReservedControl::Balance),
];

/// Looks up the built-in control a controller number drives, if any.
pub fn reserved_control(controller: u16) -> Option<ReservedControl> {
    RESERVED.iter().find_map(|&(cc, control)| {
        (controller == cc.number() as u16 || controller == cc.lsb() as u16).then_some(control)
    })
}

/// First controller number that is a channel-mode message.
pub const FIRST_CHANNEL_MODE_CONTROLLER: i16 = Controller::AllSoundOff as i16;

/// Whether a parameter may be bound to `cc`.
///
/// Bank select and channel-mode messages are excluded.
#[inline]
pub fn is_bindable_controller(cc: i16) -> bool {
    cc > 0 && cc < FIRST_CHANNEL_MODE_CONTROLLER
}
