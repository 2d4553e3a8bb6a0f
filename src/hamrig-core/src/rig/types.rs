// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Value types shared by the native boundary, the capability set and the
//! session API. Integer representations match the native library's.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric rig model identifier (`rig_model_t`).
pub type ModelId = i32;

/// Model number of the simulated rig every library build ships.
pub const DUMMY_MODEL: ModelId = 1;

/// Passband width in Hz. `0` selects the rig's normal width for the mode.
pub type Passband = i64;

pub const PASSBAND_NORMAL: Passband = 0;

macro_rules! bitmask {
    ($(#[$meta:meta])* $name:ident($repr:ty) { $($(#[$cmeta:meta])* $konst:ident = $value:expr,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub $repr);

        impl $name {
            pub const NONE: Self = Self(0);
            $($(#[$cmeta])* pub const $konst: Self = Self($value);)*

            const NAMED: &'static [(&'static str, $name)] = &[$((stringify!($konst), Self::$konst),)*];

            pub fn bits(self) -> $repr {
                self.0
            }

            pub fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn contains(self, other: Self) -> bool {
                other.0 != 0 && self.0 & other.0 == other.0
            }

            /// Named flags set in this mask, lowest bit first.
            pub fn names(self) -> Vec<&'static str> {
                Self::NAMED
                    .iter()
                    .filter(|(_, flag)| self.contains(*flag))
                    .map(|(name, _)| *name)
                    .collect()
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }
    };
}

bitmask! {
    /// Operating mode mask (`rmode_t`).
    RigMode(u32) {
        AM = 1 << 0,
        CW = 1 << 1,
        USB = 1 << 2,
        LSB = 1 << 3,
        RTTY = 1 << 4,
        FM = 1 << 5,
        WFM = 1 << 6,
        CWR = 1 << 7,
        RTTYR = 1 << 8,
        AMS = 1 << 9,
        PKTLSB = 1 << 10,
        PKTUSB = 1 << 11,
        PKTFM = 1 << 12,
        ECSSUSB = 1 << 13,
        ECSSLSB = 1 << 14,
        FAX = 1 << 15,
        SAM = 1 << 16,
        SAL = 1 << 17,
        SAH = 1 << 18,
        DSB = 1 << 19,
    }
}

impl fmt::Display for RigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

bitmask! {
    /// Level selector (`setting_t`).
    Level(u64) {
        PREAMP = 1 << 0,
        ATT = 1 << 1,
        VOXDELAY = 1 << 2,
        AF = 1 << 3,
        RF = 1 << 4,
        SQL = 1 << 5,
        IF = 1 << 6,
        APF = 1 << 7,
        NR = 1 << 8,
        PBT_IN = 1 << 9,
        PBT_OUT = 1 << 10,
        CWPITCH = 1 << 11,
        RFPOWER = 1 << 12,
        MICGAIN = 1 << 13,
        KEYSPD = 1 << 14,
        NOTCHF = 1 << 15,
        COMP = 1 << 16,
        AGC = 1 << 17,
        BKINDL = 1 << 18,
        BALANCE = 1 << 19,
        METER = 1 << 20,
        VOXGAIN = 1 << 21,
        ANTIVOX = 1 << 22,
        SLOPE_LOW = 1 << 23,
        SLOPE_HIGH = 1 << 24,
        BKIN_DLYMS = 1 << 25,
        RAWSTR = 1 << 26,
        SQLSTAT = 1 << 27,
        SWR = 1 << 28,
        ALC = 1 << 29,
        STRENGTH = 1 << 30,
    }
}

impl Level {
    const FLOAT: u64 = Self::AF.0
        | Self::RF.0
        | Self::SQL.0
        | Self::APF.0
        | Self::NR.0
        | Self::PBT_IN.0
        | Self::PBT_OUT.0
        | Self::RFPOWER.0
        | Self::MICGAIN.0
        | Self::COMP.0
        | Self::BALANCE.0
        | Self::SWR.0
        | Self::ALC.0
        | Self::VOXGAIN.0
        | Self::ANTIVOX.0;

    /// Whether the native library carries this level as a float.
    pub fn is_float(self) -> bool {
        self.0 & Self::FLOAT != 0
    }
}

bitmask! {
    /// Rig-wide parameter selector (`setting_t`).
    Parm(u64) {
        ANN = 1 << 0,
        APO = 1 << 1,
        BACKLIGHT = 1 << 2,
        BEEP = 1 << 4,
        TIME = 1 << 5,
        BAT = 1 << 6,
        KEYLIGHT = 1 << 7,
    }
}

impl Parm {
    pub fn is_float(self) -> bool {
        self.0 & (Self::BACKLIGHT.0 | Self::BAT.0) != 0
    }
}

bitmask! {
    /// On/off function selector (`setting_t`).
    Func(u64) {
        FAGC = 1 << 0,
        NB = 1 << 1,
        COMP = 1 << 2,
        VOX = 1 << 3,
        TONE = 1 << 4,
        TSQL = 1 << 5,
        SBKIN = 1 << 6,
        FBKIN = 1 << 7,
        ANF = 1 << 8,
        NR = 1 << 9,
        AIP = 1 << 10,
        APF = 1 << 11,
        MON = 1 << 12,
        MN = 1 << 13,
        RF = 1 << 14,
        ARO = 1 << 15,
        LOCK = 1 << 16,
        MUTE = 1 << 17,
    }
}

bitmask! {
    /// VFO operation (`vfo_op_t`).
    VfoOp(u32) {
        CPY = 1 << 0,
        XCHG = 1 << 1,
        FROM_VFO = 1 << 2,
        TO_VFO = 1 << 3,
        MCL = 1 << 4,
        UP = 1 << 5,
        DOWN = 1 << 6,
        BAND_UP = 1 << 7,
        BAND_DOWN = 1 << 8,
        LEFT = 1 << 9,
        RIGHT = 1 << 10,
        TUNE = 1 << 11,
        TOGGLE = 1 << 12,
    }
}

bitmask! {
    /// Scan operation (`scan_t`).
    ScanOp(u32) {
        MEM = 1 << 0,
        SLCT = 1 << 1,
        PRIO = 1 << 2,
        PROG = 1 << 3,
        DELTA = 1 << 4,
        VFO = 1 << 5,
        PLT = 1 << 6,
        STOP = 1 << 7,
    }
}

bitmask! {
    /// Announce capability mask (`ann_t`).
    Announce(u32) {
        FREQ = 1 << 0,
        RXMODE = 1 << 1,
        CW = 1 << 2,
        ENG = 1 << 3,
        JAP = 1 << 4,
    }
}

/// VFO selector (`vfo_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vfo(pub i32);

impl Vfo {
    pub const NONE: Self = Self(0);
    pub const A: Self = Self(1 << 0);
    pub const B: Self = Self(1 << 1);
    pub const C: Self = Self(1 << 2);
    pub const SUB: Self = Self(1 << 25);
    pub const MAIN: Self = Self(1 << 26);
    pub const VFO: Self = Self(1 << 27);
    pub const MEM: Self = Self(1 << 28);
    pub const CURRENT: Self = Self(1 << 29);
    pub const TX_FLAG: i32 = 1 << 30;
    /// Split transmit VFO, an alias of the current VFO with the TX flag.
    pub const TX: Self = Self((1 << 29) | (1 << 30));
    pub const RX: Self = Self::CURRENT;

    /// The Nth physical VFO.
    pub fn nth(n: u32) -> Self {
        Self(1 << n)
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl Default for Vfo {
    fn default() -> Self {
        Self::CURRENT
    }
}

macro_rules! native_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr,)* } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            /// Map a native integer, falling back to the default variant.
            pub fn from_raw(raw: i32) -> Self {
                match raw {
                    $(v if v == $value => Self::$variant,)*
                    _ => Self::$default,
                }
            }

            pub fn raw(self) -> i32 {
                match self {
                    $(Self::$variant => $value,)*
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

/// PTT state (`ptt_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PttState {
    #[default]
    Off,
    On,
    OnMic,
    OnData,
}

impl PttState {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::On,
            2 => Self::OnMic,
            3 => Self::OnData,
            _ => Self::Off,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::OnMic => 2,
            Self::OnData => 3,
        }
    }

    pub fn is_transmitting(self) -> bool {
        self != Self::Off
    }
}

/// Squelch/carrier detect state (`dcd_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DcdState {
    Closed,
    Open,
}

impl DcdState {
    pub fn from_raw(raw: i32) -> Self {
        if raw == 0 {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

/// Repeater offset direction (`rptr_shift_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeaterShift {
    None,
    Minus,
    Plus,
}

impl RepeaterShift {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Minus,
            2 => Self::Plus,
            _ => Self::None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Minus => 1,
            Self::Plus => 2,
        }
    }
}

/// Split state (`split_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    Off,
    On,
}

impl Split {
    pub fn from_raw(raw: i32) -> Self {
        if raw == 0 {
            Self::Off
        } else {
            Self::On
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }
}

/// Power state (`powerstat_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    Off,
    On,
    Standby,
}

impl PowerState {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::On,
            2 => Self::Standby,
            _ => Self::Off,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Standby => 2,
        }
    }
}

/// Reset flavour (`reset_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetKind {
    None,
    Soft,
    Vfo,
    MemoryClear,
    Master,
}

impl ResetKind {
    pub fn raw(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Soft => 1 << 0,
            Self::Vfo => 1 << 1,
            Self::MemoryClear => 1 << 2,
            Self::Master => 1 << 3,
        }
    }
}

/// Level or parameter value (`value_t` restricted to its numeric members).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Float(f32),
}

impl Value {
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(_) => None,
        }
    }
}

native_enum! {
    /// Port type a model talks over (`rig_port_t`).
    RigPort {
        None = 0,
        Serial = 1,
        Network = 2,
        Device = 3,
        Packet = 4,
        Dtmf = 5,
        IrdaUltra = 6,
        Rpc = 7,
        Parallel = 8,
        Usb = 9,
        UdpNetwork = 10,
        Cm108 = 11,
        Gpio = 12,
        GpioInverted = 13,
    } default None
}

native_enum! {
    SerialParity {
        None = 0,
        Odd = 1,
        Even = 2,
        Mark = 3,
        Space = 4,
    } default None
}

native_enum! {
    SerialHandshake {
        None = 0,
        XonXoff = 1,
        Hardware = 2,
    } default None
}

impl SerialHandshake {
    /// Value accepted by the `serial_handshake` configuration token.
    pub fn conf_value(self) -> &'static str {
        match self {
            Self::XonXoff => "XONXOFF",
            Self::Hardware => "Hardware",
            _ => "None",
        }
    }
}

impl SerialParity {
    pub fn conf_value(self) -> &'static str {
        match self {
            Self::Odd => "Odd",
            Self::Even => "Even",
            Self::Mark => "Mark",
            Self::Space => "Space",
            _ => "None",
        }
    }
}

native_enum! {
    /// Maturity of a model's backend (`rig_status_e`).
    BackendStatus {
        Alpha = 0,
        Untested = 1,
        Beta = 2,
        Stable = 3,
        Buggy = 4,
    } default Alpha
}

native_enum! {
    PttType {
        None = 0,
        Rig = 1,
        SerialDtr = 2,
        SerialRts = 3,
        Parallel = 4,
        RigMicData = 5,
        Cm108 = 6,
    } default None
}

native_enum! {
    DcdType {
        None = 0,
        Rig = 1,
        SerialDsr = 2,
        SerialCts = 3,
        SerialCar = 4,
        Parallel = 5,
        Cm108 = 6,
    } default None
}

native_enum! {
    /// Memory channel kind (`chan_type_t`). `None` terminates channel lists.
    ChannelType {
        None = 0,
        Memory = 1,
        Edge = 2,
        Call = 3,
        MemoryPad = 4,
        Satellite = 5,
        Band = 6,
        Priority = 7,
    } default None
}

native_enum! {
    Transceive {
        Off = 0,
        Rig = 1,
        Poll = 2,
    } default Off
}

/// Rig type flags (`rig_type`), kept raw since models combine them freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RigType(pub i32);

impl RigType {
    pub const RECEIVER: i32 = 1 << 1;
    pub const TRANSMITTER: i32 = 1 << 2;
    pub const SCANNER: i32 = 1 << 3;
    pub const MOBILE: i32 = 1 << 4;
    pub const HANDHELD: i32 = 1 << 5;
    pub const COMPUTER: i32 = 1 << 6;
    pub const TRUNKING: i32 = 1 << 7;
    pub const TUNER: i32 = 1 << 11;

    pub fn can_transmit(self) -> bool {
        self.0 & Self::TRANSMITTER != 0
    }

    pub fn can_receive(self) -> bool {
        self.0 & Self::RECEIVER != 0
    }
}

/// Configuration token id (`token_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfToken(pub i64);

impl ConfToken {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Configuration token names understood by every native backend.
pub mod conf {
    pub const RIG_PATHNAME: &str = "rig_pathname";
    pub const SERIAL_SPEED: &str = "serial_speed";
    pub const DATA_BITS: &str = "data_bits";
    pub const STOP_BITS: &str = "stop_bits";
    pub const SERIAL_PARITY: &str = "serial_parity";
    pub const SERIAL_HANDSHAKE: &str = "serial_handshake";
    pub const WRITE_DELAY: &str = "write_delay";
    pub const POST_WRITE_DELAY: &str = "post_write_delay";
    pub const TIMEOUT: &str = "timeout";
    pub const RETRY: &str = "retry";
}

/// Explicit serial line settings for [`crate::RigSession::open_serial`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialSettings {
    pub baud: u32,
    pub handshake: SerialHandshake,
    pub data_bits: u8,
    pub stop_bits: u8,
}

impl SerialSettings {
    pub fn new(baud: u32) -> Self {
        Self {
            baud,
            handshake: SerialHandshake::None,
            data_bits: 8,
            stop_bits: 1,
        }
    }
}

/// Standard POSIX line rates, ascending.
///
/// Only rates a POSIX serial driver accepts are tried. 14400, 28800, 56000,
/// 128000 and 256000 are left out, so a rig whose declared maximum is 128000
/// or 256000 is tried no higher than 115200.
pub const STANDARD_BAUD_RATES: [u32; 8] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_value_kinds() {
        assert!(Level::AF.is_float());
        assert!(Level::SWR.is_float());
        assert!(Level::ANTIVOX.is_float());
        assert!(!Level::AGC.is_float());
        assert!(!Level::PREAMP.is_float());
        assert!(Parm::BAT.is_float());
        assert!(Parm::BACKLIGHT.is_float());
        assert!(!Parm::BEEP.is_float());
    }

    #[test]
    fn test_mode_mask_display() {
        assert_eq!((RigMode::USB | RigMode::LSB).to_string(), "USB|LSB");
        assert_eq!(RigMode::NONE.to_string(), "NONE");
        assert!((RigMode::USB | RigMode::CW).contains(RigMode::CW));
        assert!(!RigMode::USB.contains(RigMode::NONE));
    }

    #[test]
    fn test_vfo_aliases() {
        assert_eq!(Vfo::A.raw(), 1);
        assert_eq!(Vfo::nth(2), Vfo::C);
        assert_eq!(Vfo::TX.raw(), Vfo::CURRENT.raw() | Vfo::TX_FLAG);
        assert_eq!(Vfo::default(), Vfo::CURRENT);
    }

    #[test]
    fn test_native_enum_fallback() {
        assert_eq!(RigPort::from_raw(1), RigPort::Serial);
        assert_eq!(RigPort::from_raw(99), RigPort::None);
        assert_eq!(RigPort::Network.raw(), 2);
        assert_eq!(RigPort::default().raw(), 0);
        assert_eq!(SerialHandshake::XonXoff.conf_value(), "XONXOFF");
        assert_eq!(PttState::from_raw(1), PttState::On);
        assert!(PttState::OnData.is_transmitting());
    }
}
