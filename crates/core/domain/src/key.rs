//! 设备与站点的自然主键。

use crate::error::InvalidMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 设备主键：设备名 + 站点（registry）。两者均非空。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceKey {
    pub name: String,
    pub site: String,
}

impl DeviceKey {
    pub fn new(name: impl Into<String>, site: impl Into<String>) -> Result<Self, InvalidMessage> {
        let name = name.into();
        let site = site.into();
        if name.is_empty() {
            return Err(InvalidMessage::new("name"));
        }
        if site.is_empty() {
            return Err(InvalidMessage::new("site"));
        }
        Ok(Self { name, site })
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.site, self.name)
    }
}

/// 站点主键。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteKey {
    pub name: String,
}

impl SiteKey {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidMessage> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidMessage::new("site"));
        }
        Ok(Self { name })
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
