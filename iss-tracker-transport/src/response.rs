use chrono::DateTime;
use iss_tracker_logic::{Coordinate, FetchError, FetchResult, Fix};
use serde::Deserialize;

/// Value of `message` on a good response
const SUCCESS_MESSAGE: &str = "success";

/// Body of `GET /iss-now.json`
#[derive(Debug, Clone, Deserialize)]
pub struct IssNowResponse {
    /// Unix time the position was sampled at
    pub timestamp: i64,
    pub message: String,
    pub iss_position: IssPosition,
}

/// The API sends both components as strings
#[derive(Debug, Clone, Deserialize)]
pub struct IssPosition {
    pub latitude: String,
    pub longitude: String,
}

fn parse_component(field: &'static str, value: &str) -> Result<f64, FetchError> {
    value.trim().parse().map_err(|_| FetchError::Parse {
        field,
        value: value.to_string(),
    })
}

impl IssNowResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(body).map_err(|why| FetchError::Decode(why.to_string()))
    }

    pub fn into_fix(self) -> FetchResult {
        if self.message != SUCCESS_MESSAGE {
            return Err(FetchError::Decode(format!(
                "endpoint reported {:?}",
                self.message
            )));
        }

        let latitude = parse_component("latitude", &self.iss_position.latitude)?;
        let longitude = parse_component("longitude", &self.iss_position.longitude)?;
        let coordinate = Coordinate::new(latitude, longitude)?;

        let observed_at = DateTime::from_timestamp(self.timestamp, 0).ok_or_else(|| {
            FetchError::Decode(format!("timestamp {} out of range", self.timestamp))
        })?;

        Ok(Fix {
            coordinate,
            observed_at,
        })
    }
}

/// Turn a response body into a [Fix]
pub fn decode_fix(body: &[u8]) -> FetchResult {
    IssNowResponse::from_slice(body)?.into_fix()
}

#[cfg(test)]
mod tests {
    use iss_tracker_logic::CoordinateError;

    use super::*;

    fn body(lat: &str, long: &str) -> String {
        format!(
            r#"{{"timestamp":1,"message":"success","iss_position":{{"longitude":"{long}","latitude":"{lat}"}}}}"#
        )
    }

    #[test]
    fn test_decode_example() {
        let fix = decode_fix(body("-3.2", "10.5").as_bytes()).expect("Failed to decode");

        assert_eq!(fix.coordinate, Coordinate::new(-3.2, 10.5).unwrap());
        assert_eq!(fix.observed_at.timestamp(), 1);
    }

    #[test]
    fn test_decode_real_response() {
        let raw = br#"{"message": "success", "timestamp": 1717171717, "iss_position": {"latitude": "51.2433", "longitude": "-172.8160"}}"#;
        let fix = decode_fix(raw).expect("Failed to decode");

        assert_eq!(fix.coordinate.latitude(), 51.2433);
        assert_eq!(fix.coordinate.longitude(), -172.8160);
    }

    #[test]
    fn test_missing_position() {
        let raw = br#"{"timestamp":1,"message":"success"}"#;
        let err = decode_fix(raw).unwrap_err();
        assert!(
            matches!(&err, FetchError::Decode(msg) if msg.contains("iss_position")),
            "Unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_malformed_json() {
        for raw in [&b"<html>502 Bad Gateway</html>"[..], b"", b"{\"timestamp\":"] {
            assert!(
                matches!(decode_fix(raw), Err(FetchError::Decode(_))),
                "{:?} should not decode",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[test]
    fn test_numbers_instead_of_strings() {
        let raw = br#"{"timestamp":1,"message":"success","iss_position":{"longitude":10.5,"latitude":-3.2}}"#;
        assert!(matches!(decode_fix(raw), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_non_numeric() {
        assert_eq!(
            decode_fix(body("north", "10.5").as_bytes()),
            Err(FetchError::Parse {
                field: "latitude",
                value: "north".to_string()
            })
        );
        assert!(matches!(
            decode_fix(body("1.0", "").as_bytes()),
            Err(FetchError::Parse {
                field: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            decode_fix(body("91.0", "0.0").as_bytes()),
            Err(FetchError::OutOfRange(CoordinateError::Latitude(91.0)))
        );
        assert!(matches!(
            decode_fix(body("0.0", "NaN").as_bytes()),
            Err(FetchError::OutOfRange(CoordinateError::Longitude(_)))
        ));
    }

    #[test]
    fn test_failure_message() {
        let raw = br#"{"timestamp":1,"message":"failure","iss_position":{"longitude":"1","latitude":"1"}}"#;
        assert!(matches!(decode_fix(raw), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_valid_responses_stay_in_range() {
        for lat in (-90..=90).step_by(15) {
            for long in (-180..=180).step_by(30) {
                let fix = decode_fix(body(&format!("{lat}.0"), &format!("{long}.0")).as_bytes())
                    .expect("Failed to decode");
                assert!((-90.0..=90.0).contains(&fix.coordinate.latitude()));
                assert!((-180.0..=180.0).contains(&fix.coordinate.longitude()));
            }
        }
    }
}
