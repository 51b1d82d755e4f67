// 🎚️ Parameters - The five user-adjustable inputs and their slider bounds

use crate::catalog::{Catalog, DEFAULT_ALTITUDE_COST};
use serde::{Deserialize, Serialize};

// Snapping tolerance for values that sit on a grid point up to float noise
const GRID_EPSILON: f64 = 1e-9;

// ============================================================================
// SLIDER RANGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        SliderRange { min, max, step }
    }

    /// Bound a value to [min, max]. Values between grid points are kept.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    /// Next grid point strictly above `value`, capped at `max`
    pub fn increment(&self, value: f64) -> f64 {
        let value = self.clamp(value);
        let position = self.grid_position(value);
        let next = self.min + (position.floor() + 1.0) * self.step;
        next.min(self.max)
    }

    /// Previous grid point strictly below `value`, floored at `min`
    pub fn decrement(&self, value: f64) -> f64 {
        let value = self.clamp(value);
        let position = self.grid_position(value);
        let previous = self.min + (position.ceil() - 1.0) * self.step;
        previous.max(self.min)
    }

    /// Fraction of the way from min to max, for gauges
    pub fn ratio(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return 1.0;
        }
        (self.clamp(value) - self.min) / (self.max - self.min)
    }

    fn grid_position(&self, value: f64) -> f64 {
        let position = (value - self.min) / self.step;
        let nearest = position.round();
        if (position - nearest).abs() < GRID_EPSILON {
            nearest
        } else {
            position
        }
    }
}

// ============================================================================
// PARAMETER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    TargetSurplus,
    RoyaleAttendance,
    SoireeAttendance,
    AltitudeAttendance,
    AltitudeCost,
}

impl Parameter {
    /// On-screen order
    pub const ALL: [Parameter; 5] = [
        Parameter::TargetSurplus,
        Parameter::RoyaleAttendance,
        Parameter::SoireeAttendance,
        Parameter::AltitudeAttendance,
        Parameter::AltitudeCost,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::TargetSurplus => "Target Surplus",
            Parameter::RoyaleAttendance => "Royale Attendance",
            Parameter::SoireeAttendance => "Soiree Attendance",
            Parameter::AltitudeAttendance => "Altitude Attendance",
            Parameter::AltitudeCost => "Altitude Costs",
        }
    }

    pub fn range(&self, class_size: u32) -> SliderRange {
        let class_size = class_size as f64;
        match self {
            Parameter::TargetSurplus => SliderRange::new(0.0, 15000.0, 500.0),
            Parameter::RoyaleAttendance => SliderRange::new(500.0, class_size, 50.0),
            Parameter::SoireeAttendance => SliderRange::new(500.0, class_size, 50.0),
            Parameter::AltitudeAttendance => SliderRange::new(200.0, class_size, 50.0),
            Parameter::AltitudeCost => SliderRange::new(5000.0, 20000.0, 500.0),
        }
    }

    pub fn is_attendance(&self) -> bool {
        matches!(
            self,
            Parameter::RoyaleAttendance | Parameter::SoireeAttendance | Parameter::AltitudeAttendance
        )
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub royale_attendance: u32,
    pub soiree_attendance: u32,
    pub altitude_attendance: u32,
    pub altitude_cost: f64,
    pub target_surplus: f64,
}

impl Parameters {
    /// Starting values for a catalog
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Parameters {
            altitude_cost: catalog.default_altitude_cost,
            ..Self::default()
        }
    }

    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::TargetSurplus => self.target_surplus,
            Parameter::RoyaleAttendance => self.royale_attendance as f64,
            Parameter::SoireeAttendance => self.soiree_attendance as f64,
            Parameter::AltitudeAttendance => self.altitude_attendance as f64,
            Parameter::AltitudeCost => self.altitude_cost,
        }
    }

    /// Raw assignment; attendances are rounded to whole students
    pub fn set(&mut self, parameter: Parameter, value: f64) {
        match parameter {
            Parameter::TargetSurplus => self.target_surplus = value,
            Parameter::RoyaleAttendance => self.royale_attendance = to_count(value),
            Parameter::SoireeAttendance => self.soiree_attendance = to_count(value),
            Parameter::AltitudeAttendance => self.altitude_attendance = to_count(value),
            Parameter::AltitudeCost => self.altitude_cost = value,
        }
    }

    /// Every field bounded to its slider range
    pub fn clamped(&self, catalog: &Catalog) -> Self {
        let mut clamped = *self;
        for parameter in Parameter::ALL {
            let range = parameter.range(catalog.class_size);
            clamped.set(parameter, range.clamp(self.get(parameter)));
        }
        clamped
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            royale_attendance: 1000,
            soiree_attendance: 1200,
            altitude_attendance: 500,
            altitude_cost: DEFAULT_ALTITUDE_COST,
            target_surplus: 5000.0,
        }
    }
}

/// Percent of the class attending
pub fn attendance_share(count: u32, class_size: u32) -> f64 {
    if class_size == 0 {
        return 0.0;
    }
    count as f64 / class_size as f64 * 100.0
}

fn to_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.round().min(u32::MAX as f64) as u32
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_catalog() {
        let catalog = Catalog::senior_week();
        let params = Parameters::for_catalog(&catalog);

        assert_eq!(params, Parameters::default());
        assert_eq!(params.altitude_cost, 11102.67);
    }

    #[test]
    fn test_default_altitude_cost_follows_catalog() {
        let catalog = Catalog::senior_week();

        assert_eq!(catalog.default_altitude_cost, DEFAULT_ALTITUDE_COST);
        assert_eq!(Parameters::default().altitude_cost, catalog.default_altitude_cost);
    }

    #[test]
    fn test_clamp_bounds_only() {
        let range = Parameter::AltitudeCost.range(1965);

        assert_eq!(range.clamp(1000.0), 5000.0);
        assert_eq!(range.clamp(25000.0), 20000.0);
        assert_eq!(range.clamp(11102.67), 11102.67);
        assert_eq!(range.clamp(f64::NAN), 5000.0);
    }

    #[test]
    fn test_step_from_grid_point() {
        let range = Parameter::RoyaleAttendance.range(1965);

        assert_eq!(range.increment(1000.0), 1050.0);
        assert_eq!(range.decrement(1000.0), 950.0);
        assert_eq!(range.decrement(500.0), 500.0);
    }

    #[test]
    fn test_step_from_off_grid_value() {
        let range = Parameter::AltitudeCost.range(1965);

        assert_eq!(range.increment(11102.67), 11500.0);
        assert_eq!(range.decrement(11102.67), 11000.0);
    }

    #[test]
    fn test_class_size_max_is_reachable() {
        let range = Parameter::SoireeAttendance.range(1965);

        // 1950 is the last grid point below the class size
        assert_eq!(range.increment(1950.0), 1965.0);
        assert_eq!(range.increment(1965.0), 1965.0);
        assert_eq!(range.decrement(1965.0), 1950.0);
    }

    #[test]
    fn test_clamped_parameters() {
        let catalog = Catalog::senior_week();
        let params = Parameters {
            royale_attendance: 0,
            soiree_attendance: 5000,
            altitude_attendance: 100,
            altitude_cost: 50000.0,
            target_surplus: -10.0,
        };

        let clamped = params.clamped(&catalog);

        assert_eq!(clamped.royale_attendance, 500);
        assert_eq!(clamped.soiree_attendance, 1965);
        assert_eq!(clamped.altitude_attendance, 200);
        assert_eq!(clamped.altitude_cost, 20000.0);
        assert_eq!(clamped.target_surplus, 0.0);
    }

    #[test]
    fn test_get_set_roundtrip() {
        let mut params = Parameters::default();

        params.set(Parameter::AltitudeAttendance, 649.6);
        assert_eq!(params.altitude_attendance, 650);
        assert_eq!(params.get(Parameter::AltitudeAttendance), 650.0);

        params.set(Parameter::TargetSurplus, 7500.0);
        assert_eq!(params.get(Parameter::TargetSurplus), 7500.0);
    }

    #[test]
    fn test_attendance_share() {
        let share = attendance_share(1000, 1965);
        assert_eq!(format!("{:.1}", share), "50.9");
        assert_eq!(attendance_share(10, 0), 0.0);
    }

    #[test]
    fn test_missing_fields_default() {
        let params: Parameters = serde_json::from_str(r#"{"royale_attendance": 1500}"#).unwrap();

        assert_eq!(params.royale_attendance, 1500);
        assert_eq!(params.soiree_attendance, 1200);
        assert_eq!(params.target_surplus, 5000.0);
    }
}
