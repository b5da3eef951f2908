//! `geo:` URIs (RFC 5870).

use std::fmt;

use crate::error::{VCardError, VCardResult};

/// The coordinate reference system assumed when none is given.
pub const DEFAULT_CRS: &str = "wgs84";

/// A parsed geo URI.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoUri {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    /// Coordinate reference system; `None` means [`DEFAULT_CRS`].
    pub crs: Option<String>,
    /// Uncertainty in meters (`u` parameter).
    pub uncertainty: Option<f64>,
    /// Other parameters, in order of appearance, percent-decoded.
    pub parameters: Vec<(String, String)>,
}

impl GeoUri {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            crs: None,
            uncertainty: None,
            parameters: Vec::new(),
        }
    }

    /// Parses `geo:lat,lon[,alt][;crs=..][;u=..][;name=value]*`.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] if the scheme, coordinates or a
    /// numeric parameter are malformed.
    pub fn parse(uri: &str) -> VCardResult<Self> {
        let invalid = || VCardError::InvalidValue(format!("invalid geo URI: {uri}"));
        let scheme = uri.get(..4).ok_or_else(invalid)?;
        if !scheme.eq_ignore_ascii_case("geo:") {
            return Err(invalid());
        }

        let mut parts = uri[4..].split(';');
        let coords: Vec<&str> = parts.next().ok_or_else(invalid)?.split(',').collect();
        if !(2..=3).contains(&coords.len()) {
            return Err(invalid());
        }
        let mut geo = Self::new(
            parse_number(coords[0]).ok_or_else(invalid)?,
            parse_number(coords[1]).ok_or_else(invalid)?,
        );
        if let Some(alt) = coords.get(2) {
            geo.altitude = Some(parse_number(alt).ok_or_else(invalid)?);
        }

        for param in parts.filter(|p| !p.is_empty()) {
            let (name, value) = param.split_once('=').unwrap_or((param, ""));
            let value = percent_decode(value);
            if name.eq_ignore_ascii_case("crs") {
                geo.crs = Some(value);
            } else if name.eq_ignore_ascii_case("u") {
                geo.uncertainty = Some(parse_number(&value).ok_or_else(invalid)?);
            } else {
                geo.parameters.push((name.to_string(), value));
            }
        }

        Ok(geo)
    }

    /// Parses the legacy `lat;lon` (3.0) or `lat,lon` (2.1) form.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] if the value is not two numbers.
    pub fn parse_pair(value: &str) -> VCardResult<Self> {
        let invalid = || VCardError::InvalidValue(format!("invalid geo coordinates: {value}"));
        let (lat, lon) = value
            .split_once(';')
            .or_else(|| value.split_once(','))
            .ok_or_else(invalid)?;
        Ok(Self::new(
            parse_number(lat).ok_or_else(invalid)?,
            parse_number(lon).ok_or_else(invalid)?,
        ))
    }

    /// Formats the URI, omitting the default reference system.
    #[must_use]
    pub fn to_uri(&self) -> String {
        let mut out = format!(
            "geo:{},{}",
            format_number(self.latitude),
            format_number(self.longitude)
        );
        if let Some(alt) = self.altitude {
            out.push(',');
            out.push_str(&format_number(alt));
        }
        if let Some(crs) = &self.crs
            && !crs.eq_ignore_ascii_case(DEFAULT_CRS)
        {
            out.push_str(";crs=");
            out.push_str(&percent_encode(crs));
        }
        if let Some(u) = self.uncertainty {
            out.push_str(";u=");
            out.push_str(&format_number(u));
        }
        for (name, value) in &self.parameters {
            out.push(';');
            out.push_str(name);
            out.push('=');
            out.push_str(&percent_encode(value));
        }
        out
    }
}

impl fmt::Display for GeoUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// Parses an ASCII decimal number; locale never applies.
fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let valid = !s.is_empty()
        && s.bytes()
            .enumerate()
            .all(|(i, b)| b.is_ascii_digit() || b == b'.' || (i == 0 && matches!(b, b'-' | b'+')));
    if valid { s.parse().ok() } else { None }
}

/// Formats with up to six fractional digits, trailing zeros trimmed.
#[must_use]
pub fn format_number(value: f64) -> String {
    let fixed = format!("{value:.6}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "[]:&+$-._~!'()*".contains(c)
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if is_param_char(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{b:02X}"));
            }
        }
    }
    out
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = value.get(i + 1..i + 3)
            && let Ok(b) = u8::from_str_radix(hex, 16)
        {
            out.push(b);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_simple_coordinates() {
        let geo = GeoUri::new(46.772_673, -71.282_945);
        assert_eq!(geo.to_uri(), "geo:46.772673,-71.282945");
    }

    #[test]
    fn default_crs_is_suppressed() {
        let mut geo = GeoUri::new(1.0, 2.5);
        geo.crs = Some("WGS84".into());
        assert_eq!(geo.to_uri(), "geo:1,2.5");
        geo.crs = Some("nad27".into());
        assert_eq!(geo.to_uri(), "geo:1,2.5;crs=nad27");
    }

    #[test]
    fn parse_full_uri() {
        let geo = GeoUri::parse("geo:12.34,56.78,-21.43;crs=wgs84;u=12;x-name=a%20b").unwrap();
        assert!((geo.latitude - 12.34).abs() < f64::EPSILON);
        assert_eq!(geo.altitude, Some(-21.43));
        assert_eq!(geo.crs.as_deref(), Some("wgs84"));
        assert_eq!(geo.uncertainty, Some(12.0));
        assert_eq!(geo.parameters, vec![("x-name".to_string(), "a b".to_string())]);
        assert_eq!(geo.to_uri(), "geo:12.34,56.78,-21.43;u=12;x-name=a%20b");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["46.7,-71.2", "geo:46.7", "geo:a,b", "geo:1,2,3,4", "geo:1,2;u=x"] {
            assert!(GeoUri::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn legacy_pairs() {
        assert_eq!(
            GeoUri::parse_pair("37.386013;-122.082932").unwrap(),
            GeoUri::new(37.386_013, -122.082_932)
        );
        assert_eq!(GeoUri::parse_pair("1.5,2").unwrap(), GeoUri::new(1.5, 2.0));
        assert!(GeoUri::parse_pair("1.5").is_err());
    }

    #[test]
    fn number_formatting_is_fixed_point() {
        assert_eq!(format_number(0.000_000_1), "0");
        assert_eq!(format_number(-0.000_000_1), "0");
        assert_eq!(format_number(1e7), "10000000");
        assert_eq!(format_number(-12.5), "-12.5");
    }
}
