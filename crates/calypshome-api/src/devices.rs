// Device listing
//
// `POST /ajax` with `Accept: application/json` returns every group the
// account can see. The first element of the top-level array holds the
// groups; device objects are flattened out of them in server order.

use tracing::{debug, warn};

use crate::client::CalypshomeClient;
use crate::error::Error;
use crate::models::{Device, RawGroup, devices_from_groups};
use crate::transport::ApiRequest;

pub(crate) const AJAX_PATH: &str = "/ajax";

impl CalypshomeClient {
    /// List all window coverings, in the order the gateway returns them.
    ///
    /// Fails as a whole with [`Error::Protocol`] if the payload does not
    /// have the expected shape.
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        let request = ApiRequest::post(AJAX_PATH).accept_json();
        let resp = self.call(&request).await?;

        if !resp.status.is_success() {
            warn!(status = resp.status.as_u16(), "device listing rejected");
            return Err(Error::protocol(
                format!("unexpected HTTP {} from {AJAX_PATH}", resp.status),
                &resp.body,
            ));
        }

        let devices = decode_devices(&resp.body)?;
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Find a device by numeric id or by name (case-insensitive).
    pub async fn find_device(&self, query: &str) -> Result<Option<Device>, Error> {
        let devices = self.list_devices().await?;
        Ok(select_device(devices, query))
    }
}

fn select_device(devices: Vec<Device>, query: &str) -> Option<Device> {
    let query = query.trim();
    let by_id = query.parse::<i64>().ok();
    devices.into_iter().find(|d| {
        by_id == Some(d.id) || d.name().is_some_and(|n| n.eq_ignore_ascii_case(query))
    })
}

/// Decode the `/ajax` body into its groups.
pub(crate) fn decode_groups(body: &[u8]) -> Result<Vec<RawGroup>, Error> {
    let top: Vec<serde_json::Value> = serde_json::from_slice(body)
        .map_err(|e| Error::protocol(format!("payload is not a JSON array: {e}"), body))?;

    let first = top
        .into_iter()
        .next()
        .ok_or_else(|| Error::protocol("payload array is empty", body))?;

    serde_json::from_value(first)
        .map_err(|e| Error::protocol(format!("unexpected group list shape: {e}"), body))
}

/// Decode the `/ajax` body into devices. Nothing is returned if any
/// device-bearing group is malformed.
pub(crate) fn decode_devices(body: &[u8]) -> Result<Vec<Device>, Error> {
    let groups = decode_groups(body)?;
    devices_from_groups(groups)
        .map_err(|e| Error::protocol(format!("unexpected device entry: {e}"), body))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::RawObject;

    #[test]
    fn rejects_non_array_payload() {
        let err = decode_groups(br#"{"groups": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn rejects_empty_array() {
        let err = decode_groups(b"[]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn rejects_objects_missing_fields() {
        let body = br#"[[{"alias":"Home","isconnected":true,"objects":[{"id":1}]}]]"#;
        let err = decode_devices(body).unwrap_err();
        assert!(matches!(err, Error::Protocol { ref body, .. } if body.contains("alias")));
    }

    #[test]
    fn ignores_trailing_elements_and_unknown_fields() {
        let body = br#"[[{"alias":"Home","isconnected":true,"extra":1,
            "objects":[{"id":1,"gw":"G","statuss":[],"type":"blind"}]}], {"meta": true}]"#;
        let devices = decode_devices(body).unwrap();
        assert_eq!(devices.len(), 1);
    }

    #[test]
    fn system_entries_of_any_shape_are_skipped() {
        let body = br#"[[{"alias":"System","objects":[{"id":"sys-1","type":"weather"}]},
            {"alias":"Home","objects":[{"id":7,"gw":"GW1","statuss":[]}]}]]"#;
        let devices = decode_devices(body).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, 7);
    }

    #[test]
    fn rejects_group_without_alias() {
        let err = decode_groups(br#"[[{"objects":[]}]]"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn selects_by_id_or_name() {
        let devices = vec![
            Device::from(RawObject {
                id: 7,
                gw: "GW1".into(),
                statuses: vec![crate::models::RawStatus {
                    statusname: "a/__user_name".into(),
                    status: "Office".into(),
                }],
            }),
            Device::from(RawObject {
                id: 8,
                gw: "GW1".into(),
                statuses: vec![],
            }),
        ];

        assert_eq!(select_device(devices.clone(), "8").map(|d| d.id), Some(8));
        assert_eq!(select_device(devices.clone(), "office").map(|d| d.id), Some(7));
        assert!(select_device(devices, "garage").is_none());
    }
}
