//! Account and validator addresses

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::VM_RESERVED_ADDRESS;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The system address that stands in for the VM as block proposer
    pub fn vm_reserved() -> Self {
        Self(VM_RESERVED_ADDRESS.to_string())
    }

    pub fn is_vm_reserved(&self) -> bool {
        self.0 == VM_RESERVED_ADDRESS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Address {
    fn from(address: String) -> Self {
        Self(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_reserved() {
        assert!(Address::vm_reserved().is_vm_reserved());
        assert!(!Address::from("time1validator").is_vm_reserved());
    }
}
