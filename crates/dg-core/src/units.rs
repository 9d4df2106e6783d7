// dg-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, MassRate as UomMassRate,
    ThermodynamicTemperature as UomThermodynamicTemperature, Velocity as UomVelocity,
    Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type MassRate = UomMassRate;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;

/// Meters to statute miles, for reporting zone distances.
pub const METERS_TO_MILES: f64 = 0.000_621_371;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}
