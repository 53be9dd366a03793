//! ES Trigger Setting conditions and the notification decision.
//!
//! The decision only looks at channel 0; the remaining channels ride
//! along in the value record but never gate a notification on their own.

/// Value notification condition (ES Trigger Setting descriptor, byte 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerCondition {
    /// Notifications disabled.
    Inactive,
    /// Notify on every update; the interval is kept by the cycle cadence.
    FixedTimeInterval,
    /// Notify no more often than the operand interval. Not evaluated here.
    NoLessThanSpecifiedTime,
    /// Notify when channel 0 differs from the last accepted value.
    ValueChanged,
    LessThanReference,
    LessOrEqualReference,
    GreaterThanReference,
    GreaterOrEqualReference,
    EqualToReference,
    NotEqualToReference,
    /// Any code outside 0x00..=0x09. Never notifies.
    Unrecognized(u8),
}

impl TriggerCondition {
    /// Wire code of the condition.
    pub const fn code(self) -> u8 {
        match self {
            TriggerCondition::Inactive => 0x00,
            TriggerCondition::FixedTimeInterval => 0x01,
            TriggerCondition::NoLessThanSpecifiedTime => 0x02,
            TriggerCondition::ValueChanged => 0x03,
            TriggerCondition::LessThanReference => 0x04,
            TriggerCondition::LessOrEqualReference => 0x05,
            TriggerCondition::GreaterThanReference => 0x06,
            TriggerCondition::GreaterOrEqualReference => 0x07,
            TriggerCondition::EqualToReference => 0x08,
            TriggerCondition::NotEqualToReference => 0x09,
            TriggerCondition::Unrecognized(code) => code,
        }
    }

    /// Which operand the condition carries on the wire.
    pub const fn operand_kind(self) -> OperandKind {
        match self {
            TriggerCondition::Inactive | TriggerCondition::ValueChanged => OperandKind::None,
            TriggerCondition::FixedTimeInterval | TriggerCondition::NoLessThanSpecifiedTime => {
                OperandKind::Interval
            }
            _ => OperandKind::Reference,
        }
    }
}

impl From<u8> for TriggerCondition {
    fn from(code: u8) -> Self {
        match code {
            0x00 => TriggerCondition::Inactive,
            0x01 => TriggerCondition::FixedTimeInterval,
            0x02 => TriggerCondition::NoLessThanSpecifiedTime,
            0x03 => TriggerCondition::ValueChanged,
            0x04 => TriggerCondition::LessThanReference,
            0x05 => TriggerCondition::LessOrEqualReference,
            0x06 => TriggerCondition::GreaterThanReference,
            0x07 => TriggerCondition::GreaterOrEqualReference,
            0x08 => TriggerCondition::EqualToReference,
            0x09 => TriggerCondition::NotEqualToReference,
            other => TriggerCondition::Unrecognized(other),
        }
    }
}

/// Shape of the operand following the condition byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperandKind {
    None,
    /// Unsigned 24-bit milliseconds.
    Interval,
    /// Signed 16-bit reference value.
    Reference,
}

/// Operand value, tagged by its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerOperand {
    None,
    Interval(u32),
    Reference(i16),
}

/// Decide whether an update from `old` to `new` must be pushed to the peer.
///
/// Pure: no hidden state, only channel 0 is compared. An empty reading
/// never notifies.
pub fn should_notify(condition: TriggerCondition, old: &[i16], new: &[i16], reference: i16) -> bool {
    let Some(&value) = new.first() else {
        return false;
    };

    match condition {
        TriggerCondition::Inactive => false,
        TriggerCondition::FixedTimeInterval => true,
        // Needs elapsed-time bookkeeping per sensor; not tracked.
        TriggerCondition::NoLessThanSpecifiedTime => false,
        TriggerCondition::ValueChanged => old.first().map_or(true, |&prev| prev != value),
        TriggerCondition::LessThanReference => value < reference,
        TriggerCondition::LessOrEqualReference => value <= reference,
        TriggerCondition::GreaterThanReference => value > reference,
        TriggerCondition::GreaterOrEqualReference => value >= reference,
        TriggerCondition::EqualToReference => value == reference,
        TriggerCondition::NotEqualToReference => value != reference,
        TriggerCondition::Unrecognized(_) => false,
    }
}
