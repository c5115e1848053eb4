use std::fmt;

use serde::{Deserialize, Serialize};

/// A named runtime permission the host platform may grant or deny.
///
/// `AccessFineLocation` is required on the legacy tier, the scan/connect pair on the modern tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    AccessFineLocation,
    BluetoothScan,
    BluetoothConnect,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AccessFineLocation => "access_fine_location",
            Permission::BluetoothScan => "bluetooth_scan",
            Permission::BluetoothConnect => "bluetooth_connect",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grant status of a single permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionGrant {
    Granted,
    Denied,
}

impl PermissionGrant {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionGrant::Granted)
    }
}

/// The user's answer to a hardware enable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnableDecision {
    Accepted,
    Rejected,
    /// The dialog was dismissed without an answer.
    Cancelled,
}

impl EnableDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, EnableDecision::Accepted)
    }
}
