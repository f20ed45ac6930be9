//! Data transfer objects for web responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::StationView;

/// A listing and how fresh it is.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// The listing
    pub data: T,

    /// Timestamp of the data, or null if nothing has been seen yet
    pub updated: Option<DateTime<Utc>>,
}

impl Envelope<Vec<StationView>> {
    /// Wrap stations, stamped with the stalest feed among them.
    pub fn stations(data: Vec<StationView>) -> Self {
        let updated = oldest_update(&data);
        Self { data, updated }
    }
}

/// The oldest non-null `last_update` among `stations`.
///
/// A listing is only as fresh as its stalest station.
pub fn oldest_update(stations: &[StationView]) -> Option<DateTime<Utc>> {
    stations.iter().filter_map(|s| s.last_update).min()
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, StationInfo};
    use serde_json::json;

    fn view(id: &str, last_update: Option<i64>) -> StationView {
        let info = StationInfo {
            name: format!("Station {id}"),
            location: Coordinates(40.7, -73.9),
            stops: vec![format!("{id}N")],
            extra: Default::default(),
        };
        let mut view = StationView::new(id, &info, None);
        view.last_update = last_update.and_then(|t| DateTime::from_timestamp(t, 0));
        view
    }

    #[test]
    fn updated_is_oldest_non_null() {
        let stations = vec![
            view("1", Some(1_700_000_300)),
            view("2", None),
            view("3", Some(1_700_000_000)),
        ];

        assert_eq!(
            oldest_update(&stations),
            DateTime::from_timestamp(1_700_000_000, 0)
        );
    }

    #[test]
    fn updated_is_null_without_feed_data() {
        assert_eq!(oldest_update(&[view("1", None), view("2", None)]), None);
        assert_eq!(oldest_update(&[]), None);
    }

    #[test]
    fn envelope_json_shape() {
        let envelope = Envelope::stations(vec![view("1", Some(1_700_000_000))]);

        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["updated"], json!("2023-11-14T22:13:20Z"));
        assert_eq!(json["data"][0]["id"], json!("1"));
        assert_eq!(json["data"][0]["N"], json!([]));
        assert_eq!(json["data"][0]["S"], json!([]));
    }
}
