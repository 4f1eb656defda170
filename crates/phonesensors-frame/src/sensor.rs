//! The closed set of sensor kinds a snapshot carries.
//!
//! Vector sensors (motion, orientation, magnetic field) have three columns.
//! Environmental sensors are scalar.

use serde::Serialize;

/// One physical or derived sensor quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorKind {
    /// Raw acceleration including gravity.
    Acceleration,
    /// Gravity component of acceleration.
    GravAcceleration,
    /// Acceleration with gravity removed.
    LinAcceleration,
    /// Ambient geomagnetic field.
    MagneticField,
    /// Angular velocity.
    RotVelocity,
    /// Device orientation as a rotation vector.
    RotationVector,
    /// Illuminance.
    Light,
    /// Ambient air temperature.
    AmbientTemperature,
    /// Ambient air pressure.
    Pressure,
    /// Distance to the nearest object.
    Proximity,
    /// Relative ambient humidity.
    RelativeHumidity,
}

impl SensorKind {
    /// Number of sensor kinds.
    pub const COUNT: usize = 11;

    /// Every sensor kind, in snapshot order.
    pub const ALL: [SensorKind; Self::COUNT] = [
        SensorKind::Acceleration,
        SensorKind::GravAcceleration,
        SensorKind::LinAcceleration,
        SensorKind::MagneticField,
        SensorKind::RotVelocity,
        SensorKind::RotationVector,
        SensorKind::Light,
        SensorKind::AmbientTemperature,
        SensorKind::Pressure,
        SensorKind::Proximity,
        SensorKind::RelativeHumidity,
    ];

    /// Number of columns one sample of this kind occupies.
    pub const fn dims(self) -> usize {
        match self {
            SensorKind::Acceleration
            | SensorKind::GravAcceleration
            | SensorKind::LinAcceleration
            | SensorKind::MagneticField
            | SensorKind::RotVelocity
            | SensorKind::RotationVector => crate::channel::VECTOR_DIMS,
            SensorKind::Light
            | SensorKind::AmbientTemperature
            | SensorKind::Pressure
            | SensorKind::Proximity
            | SensorKind::RelativeHumidity => 1,
        }
    }

    /// Returns true if samples of this kind are vectors.
    pub const fn is_vector(self) -> bool {
        self.dims() > 1
    }

    /// Human-readable name used in summaries.
    pub const fn name(self) -> &'static str {
        match self {
            SensorKind::Acceleration => "ACCELERATION",
            SensorKind::GravAcceleration => "GRAV_ACCELERATION",
            SensorKind::LinAcceleration => "LIN_ACCELERATION",
            SensorKind::MagneticField => "MAGNETIC_FIELD",
            SensorKind::RotVelocity => "ROT_VELOCITY",
            SensorKind::RotationVector => "ROTATION_VECTOR",
            SensorKind::Light => "LIGHT",
            SensorKind::AmbientTemperature => "AMBIENT_TEMPERATURE",
            SensorKind::Pressure => "PRESSURE",
            SensorKind::Proximity => "PROXIMITY",
            SensorKind::RelativeHumidity => "RELATIVE_HUMIDITY",
        }
    }

    /// Position of this kind within a snapshot.
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
