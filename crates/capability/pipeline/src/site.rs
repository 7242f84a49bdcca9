//! 站点文档构建。
//!
//! status / pointset / errors 在新消息未提供时沿用旧值；
//! summary / devices / timestamp / version / last_updated 取最新消息。

use domain::{InvalidMessage, Site, SiteEvent, SiteValidation};

pub fn build_site(event: &SiteEvent, existing: Option<Site>) -> Result<Site, InvalidMessage> {
    let payload = &event.payload;
    let timestamp = payload
        .timestamp()
        .ok_or_else(|| InvalidMessage::new("timestamp"))?;
    let version = payload
        .version
        .clone()
        .filter(|version| !version.is_empty())
        .ok_or_else(|| InvalidMessage::new("version"))?;

    let (previous, previous_error_devices) = match existing {
        Some(site) => (site.validation, site.error_devices),
        None => (None, None),
    };
    let (status, pointset, errors) = match previous {
        Some(previous) => (previous.status, previous.pointset, previous.errors),
        None => (None, None, None),
    };

    // 无 summary 时沿用旧的 errorDevices
    let error_devices = match &payload.summary {
        Some(summary) => summary.error_devices.clone(),
        None => previous_error_devices,
    };

    let validation = SiteValidation {
        timestamp,
        version,
        last_updated: payload.last_updated.clone(),
        summary: payload.summary.clone(),
        devices: payload.devices.clone(),
        status: payload.status.clone().or(status),
        pointset: payload.pointset.clone().or(pointset),
        errors: payload.errors.clone().or(errors),
    };
    Site::new(event.key.name.clone(), Some(validation), error_devices)
}
