use serde::{Deserialize, Deserializer};

/// A latitude/longitude pair in decimal degrees. Both values are always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Returns `None` unless both components are finite numbers.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if lat.is_finite() && lng.is_finite() {
            Some(Self { lat, lng })
        } else {
            None
        }
    }
}

/// What the user typed: an IP address, a domain, or nothing at all.
///
/// Nothing is validated locally; the provider decides whether the address is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationQuery(String);

impl LocationQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// The `ipAddress` parameter to send, or `None` to let the provider use the
    /// caller's own network address.
    pub fn address(&self) -> Option<&str> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

impl From<&str> for LocationQuery {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for LocationQuery {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

// Body returned by the geolocation provider. Only the consumed subset is modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderResponse {
    pub ip: Option<String>,
    pub isp: Option<String>,
    pub location: Option<ProviderLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderLocation {
    #[serde(default, deserialize_with = "lenient_number")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lng: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

// Anything that isn't a JSON number (strings, null, objects) reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

/// Canonical, normalized result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationResult {
    pub ip: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
    pub coordinate: Option<Coordinate>,
}

impl LocationResult {
    /// Normalizes a provider body. Bodies without a usable coordinate are rejected.
    pub fn from_response(response: ProviderResponse) -> Option<Self> {
        let location = response.location?;
        let coordinate = Coordinate::new(location.lat?, location.lng?)?;

        Some(Self {
            ip: response.ip.unwrap_or_default(),
            city: location.city,
            country: location.country,
            timezone: location.timezone,
            isp: response.isp,
            coordinate: Some(coordinate),
        })
    }

    /// `city, country`, dropping whichever part is missing or blank.
    pub fn place_label(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ProviderResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn normalizes_full_response() {
        let response = parse(
            r#"{"ip":"1.2.3.4","isp":"ExampleISP","location":{"lat":51.5,"lng":-0.1,"city":"London","country":"GB","timezone":"+1"}}"#,
        );
        let result = LocationResult::from_response(response).unwrap();

        assert_eq!(result.ip, "1.2.3.4");
        assert_eq!(result.isp.as_deref(), Some("ExampleISP"));
        assert_eq!(result.city.as_deref(), Some("London"));
        assert_eq!(result.country.as_deref(), Some("GB"));
        assert_eq!(result.timezone.as_deref(), Some("+1"));
        assert_eq!(result.coordinate, Some(Coordinate { lat: 51.5, lng: -0.1 }));
    }

    #[test]
    fn absent_fields_stay_absent() {
        let response = parse(r#"{"ip":"8.8.8.8","location":{"lat":37.4,"lng":-122.1}}"#);
        let result = LocationResult::from_response(response).unwrap();

        assert_eq!(result.city, None);
        assert_eq!(result.country, None);
        assert_eq!(result.timezone, None);
        assert_eq!(result.isp, None);
    }

    #[test]
    fn rejects_missing_or_non_numeric_coordinates() {
        for body in [
            r#"{"ip":"1.2.3.4"}"#,
            r#"{"ip":"1.2.3.4","location":{"lat":51.5}}"#,
            r#"{"ip":"1.2.3.4","location":{"lng":-0.1}}"#,
            r#"{"ip":"1.2.3.4","location":{"lat":"51.5","lng":"-0.1"}}"#,
            r#"{"ip":"1.2.3.4","location":{"lat":null,"lng":-0.1}}"#,
        ] {
            assert!(LocationResult::from_response(parse(body)).is_none(), "{body}");
        }
    }

    #[test]
    fn zero_is_a_valid_coordinate() {
        let response = parse(r#"{"ip":"0.0.0.0","location":{"lat":0,"lng":0}}"#);
        let result = LocationResult::from_response(response).unwrap();
        assert_eq!(result.coordinate, Some(Coordinate { lat: 0.0, lng: 0.0 }));
    }

    #[test]
    fn coordinate_rejects_non_finite() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn place_label_omits_missing_parts() {
        let mut result = LocationResult {
            ip: "1.2.3.4".into(),
            city: Some("London".into()),
            country: Some("GB".into()),
            timezone: None,
            isp: None,
            coordinate: None,
        };
        assert_eq!(result.place_label().as_deref(), Some("London, GB"));

        result.city = None;
        assert_eq!(result.place_label().as_deref(), Some("GB"));

        result.city = Some("London".into());
        result.country = Some(String::new());
        assert_eq!(result.place_label().as_deref(), Some("London"));

        result.city = None;
        assert_eq!(result.place_label(), None);
    }

    #[test]
    fn blank_query_means_own_address() {
        assert_eq!(LocationQuery::from("").address(), None);
        assert_eq!(LocationQuery::from("   ").address(), None);
        assert_eq!(LocationQuery::from(" 8.8.8.8 ").address(), Some("8.8.8.8"));
        assert_eq!(LocationQuery::from("example.com").address(), Some("example.com"));
    }
}
