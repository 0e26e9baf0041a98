//! Remote call descriptors.
//!
//! A `RemoteCallDescriptor` names one remote invocation: which service,
//! which method, the encoded argument payload and the fee it may burn.
//! Descriptors are immutable once built and owned by the plan node that
//! references them.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::CodecError;

/// Fee units charged against an orchestration's attached budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gas(pub u64);

impl Gas {
    /// One tera-gas.
    pub const TERA: u64 = 1_000_000_000_000;

    pub const ZERO: Gas = Gas(0);

    /// Build from a whole number of tera-gas.
    pub const fn from_tgas(tgas: u64) -> Self {
        Gas(tgas * Self::TERA)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn checked_sub(self, other: Gas) -> Option<Gas> {
        self.0.checked_sub(other.0).map(Gas)
    }
}

impl Add for Gas {
    type Output = Gas;

    fn add(self, rhs: Gas) -> Gas {
        Gas(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Gas {
    type Output = Gas;

    fn sub(self, rhs: Gas) -> Gas {
        Gas(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % Self::TERA == 0 {
            write!(f, "{} TGas", self.0 / Self::TERA)
        } else {
            write!(f, "{} gas", self.0)
        }
    }
}

/// Address of a remote service (an account name on the substrate).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ServiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One remote invocation: target, method, argument payload, fee budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCallDescriptor {
    target: ServiceId,
    method: String,
    payload: Vec<u8>,
    fee: Gas,
}

impl RemoteCallDescriptor {
    /// Descriptor with an already-encoded payload.
    pub fn new(
        target: impl Into<ServiceId>,
        method: impl Into<String>,
        payload: Vec<u8>,
        fee: Gas,
    ) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
            payload,
            fee,
        }
    }

    /// Descriptor with no arguments.
    pub fn no_args(target: impl Into<ServiceId>, method: impl Into<String>, fee: Gas) -> Self {
        Self::new(target, method, Vec::new(), fee)
    }

    /// Descriptor whose arguments are encoded with the crate codec.
    pub fn with_args<T: Serialize + ?Sized>(
        target: impl Into<ServiceId>,
        method: impl Into<String>,
        args: &T,
        fee: Gas,
    ) -> Result<Self, CodecError> {
        Ok(Self::new(target, method, codec::encode(args)?, fee))
    }

    pub fn target(&self) -> &ServiceId {
        &self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn fee(&self) -> Gas {
        self.fee
    }
}

impl fmt::Display for RemoteCallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.target, self.method)
    }
}
