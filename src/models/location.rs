//! Verified coordinates for a place name

use serde::{Deserialize, Serialize};

/// Result of a successful place verification.
///
/// The orchestration core only reads presence and `display_name`; the
/// coordinates themselves are handed to downstream collaborators.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Human-readable label for the resolved location
    pub display_name: String,
}

impl Coordinates {
    /// Create new coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, display_name: String) -> Self {
        Self {
            latitude,
            longitude,
            display_name,
        }
    }

    /// Format coordinates as a compact string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinates() {
        let coordinates = Coordinates::new(35.6895, 139.6917, "Tokyo".to_string());
        assert_eq!(coordinates.format_coordinates(), "35.6895, 139.6917");
    }
}
