//! Open Charge Map POI DTOs.
//!
//! Only the fields the regional snapshot keeps are modelled; serde drops the
//! rest. Nearby queries bypass these types and forward the raw JSON.
//! Field names follow the upstream PascalCase so minimized payloads stay
//! drop-in compatible for clients written against the upstream API.

use serde::{Deserialize, Serialize};

/// A charging station as returned by `/poi`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationPoi {
    #[serde(rename = "ID")]
    pub id: i64,

    #[serde(rename = "AddressInfo", default)]
    pub address_info: Option<AddressInfo>,

    #[serde(rename = "OperatorInfo", default)]
    pub operator_info: Option<OperatorInfo>,

    /// Upstream sends `null` for stations without connection data.
    #[serde(rename = "Connections", default)]
    pub connections: Option<Vec<Connection>>,
}

/// Location block of a POI.
///
/// Community-submitted records sometimes lack coordinates; those pass
/// through as `null` rather than failing the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInfo {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,

    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,

    #[serde(rename = "AddressLine1", default)]
    pub address_line1: Option<String>,
}

/// Network operator block of a POI.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorInfo {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
}

/// A single connector.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    #[serde(rename = "PowerKW", default)]
    pub power_kw: Option<f64>,

    #[serde(rename = "CurrentTypeID", default)]
    pub current_type_id: Option<i64>,
}

/// Minimized station sent to clients by the regional snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimalStation {
    #[serde(rename = "ID")]
    pub id: i64,

    #[serde(rename = "AddressInfo")]
    pub address_info: MinimalAddress,

    #[serde(rename = "OperatorInfo", skip_serializing_if = "Option::is_none")]
    pub operator_info: Option<MinimalOperator>,

    #[serde(rename = "Connections")]
    pub connections: Vec<MinimalConnection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimalAddress {
    #[serde(rename = "Title")]
    pub title: Option<String>,

    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,

    #[serde(rename = "AddressLine1")]
    pub address_line1: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimalOperator {
    #[serde(rename = "Title")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimalConnection {
    #[serde(rename = "PowerKW")]
    pub power_kw: Option<f64>,

    #[serde(rename = "CurrentTypeID")]
    pub current_type_id: Option<i64>,
}

impl From<StationPoi> for MinimalStation {
    fn from(poi: StationPoi) -> Self {
        // An operator block without a title carries nothing worth sending.
        let operator_info = poi
            .operator_info
            .and_then(|op| op.title)
            .map(|title| MinimalOperator { title });

        let connections = poi
            .connections
            .unwrap_or_default()
            .into_iter()
            .map(|c| MinimalConnection {
                power_kw: c.power_kw,
                current_type_id: c.current_type_id,
            })
            .collect();

        let address = poi.address_info.unwrap_or_default();

        MinimalStation {
            id: poi.id,
            address_info: MinimalAddress {
                title: address.title,
                latitude: address.latitude,
                longitude: address.longitude,
                address_line1: address.address_line1,
            },
            operator_info,
            connections,
        }
    }
}

/// Strip a batch of upstream POIs down to the fields clients need.
pub fn minimize(pois: Vec<StationPoi>) -> Vec<MinimalStation> {
    pois.into_iter().map(MinimalStation::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_poi() -> serde_json::Value {
        json!({
            "ID": 12345,
            "UUID": "0b8d-...",
            "DataProviderID": 1,
            "UsageCost": "7.5 TL/kWh",
            "NumberOfPoints": 4,
            "StatusTypeID": 50,
            "DateLastVerified": "2024-05-01T00:00:00Z",
            "AddressInfo": {
                "ID": 999,
                "Title": "Kadikoy Charging Hub",
                "AddressLine1": "Moda Cd. 12",
                "AddressLine2": "Kat 2",
                "Town": "Istanbul",
                "Postcode": "34710",
                "CountryID": 196,
                "Latitude": 40.987,
                "Longitude": 29.027,
                "ContactTelephone1": "+90 ..."
            },
            "OperatorInfo": {
                "ID": 3534,
                "Title": "ZES",
                "WebsiteURL": "https://zes.net",
                "IsPrivateIndividual": false
            },
            "Connections": [
                {
                    "ID": 1,
                    "ConnectionTypeID": 33,
                    "PowerKW": 180.0,
                    "CurrentTypeID": 30,
                    "Amps": 200,
                    "Voltage": 900,
                    "Quantity": 2
                },
                {
                    "ID": 2,
                    "ConnectionTypeID": 25,
                    "PowerKW": 22.0,
                    "CurrentTypeID": 20,
                    "StatusTypeID": 50
                }
            ]
        })
    }

    #[test]
    fn minimization_keeps_only_whitelisted_fields() {
        let poi: StationPoi = serde_json::from_value(full_poi()).unwrap();
        let minimal = serde_json::to_value(MinimalStation::from(poi)).unwrap();

        assert_eq!(
            minimal,
            json!({
                "ID": 12345,
                "AddressInfo": {
                    "Title": "Kadikoy Charging Hub",
                    "Latitude": 40.987,
                    "Longitude": 29.027,
                    "AddressLine1": "Moda Cd. 12"
                },
                "OperatorInfo": { "Title": "ZES" },
                "Connections": [
                    { "PowerKW": 180.0, "CurrentTypeID": 30 },
                    { "PowerKW": 22.0, "CurrentTypeID": 20 }
                ]
            })
        );
    }

    #[test]
    fn connection_fields_are_stripped() {
        let poi: StationPoi = serde_json::from_value(full_poi()).unwrap();
        let minimal = serde_json::to_value(MinimalStation::from(poi)).unwrap();

        for connection in minimal["Connections"].as_array().unwrap() {
            let keys: Vec<&String> = connection.as_object().unwrap().keys().collect();
            assert_eq!(keys.len(), 2);
            assert!(connection.get("PowerKW").is_some());
            assert!(connection.get("CurrentTypeID").is_some());
        }
    }

    #[test]
    fn missing_operator_is_omitted() {
        let mut raw = full_poi();
        raw.as_object_mut().unwrap().remove("OperatorInfo");
        let poi: StationPoi = serde_json::from_value(raw).unwrap();
        let minimal = serde_json::to_value(MinimalStation::from(poi)).unwrap();

        assert!(minimal.get("OperatorInfo").is_none());
    }

    #[test]
    fn untitled_operator_is_omitted() {
        let mut raw = full_poi();
        raw["OperatorInfo"] = json!({ "ID": 1 });
        let poi: StationPoi = serde_json::from_value(raw).unwrap();
        assert!(MinimalStation::from(poi).operator_info.is_none());
    }

    #[test]
    fn null_connections_become_empty() {
        let mut raw = full_poi();
        raw["Connections"] = serde_json::Value::Null;
        let poi: StationPoi = serde_json::from_value(raw).unwrap();
        assert!(MinimalStation::from(poi).connections.is_empty());
    }

    #[test]
    fn missing_connector_values_stay_null() {
        let mut raw = full_poi();
        raw["Connections"] = json!([{ "ID": 7, "ConnectionTypeID": 2 }]);
        let poi: StationPoi = serde_json::from_value(raw).unwrap();
        let minimal = serde_json::to_value(MinimalStation::from(poi)).unwrap();

        assert_eq!(
            minimal["Connections"],
            json!([{ "PowerKW": null, "CurrentTypeID": null }])
        );
    }

    #[test]
    fn missing_coordinates_stay_null() {
        let mut raw = full_poi();
        raw["AddressInfo"] = json!({ "Title": "Unplaced" });
        let poi: StationPoi = serde_json::from_value(raw).unwrap();
        let minimal = serde_json::to_value(MinimalStation::from(poi)).unwrap();

        assert_eq!(
            minimal["AddressInfo"],
            json!({
                "Title": "Unplaced",
                "Latitude": null,
                "Longitude": null,
                "AddressLine1": null
            })
        );
    }

    #[test]
    fn missing_address_block_is_all_null() {
        let mut raw = full_poi();
        raw.as_object_mut().unwrap().remove("AddressInfo");
        let poi: StationPoi = serde_json::from_value(raw).unwrap();
        let minimal = MinimalStation::from(poi);

        assert_eq!(minimal.id, 12345);
        assert_eq!(minimal.address_info.latitude, None);
        assert_eq!(minimal.address_info.title, None);
    }

    #[test]
    fn minimize_preserves_order() {
        let mut second = full_poi();
        second["ID"] = json!(2);
        let pois: Vec<StationPoi> =
            serde_json::from_value(json!([full_poi(), second])).unwrap();

        let ids: Vec<i64> = minimize(pois).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![12345, 2]);
    }
}
