use crate::weight::Weight;

/// One decoded measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reading {
    pub weight: Weight,
    /// Device reports the value has settled.
    pub stable: bool,
}

impl Reading {
    pub fn new(weight: Weight, stable: bool) -> Self {
        Self { weight, stable }
    }
}

/// Where a session is in its one-way `Created → Open → Closed` life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    Created = 0,
    Open = 1,
    Closed = 2,
}

impl Lifecycle {
    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            0 => Lifecycle::Created,
            1 => Lifecycle::Open,
            _ => Lifecycle::Closed,
        }
    }
}
