//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::Float;
use nalgebra::{SVector, Vector3};
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Velocity of a reference frame, in units of c
pub type Beta = Vector3<Float>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Build a 4-momentum from its energy and spatial components
pub fn from_e_p(e: Float, px: Float, py: Float, pz: Float) -> Momentum {
    Momentum::new(px, py, pz, e)
}

/// Build the 4-momentum of an on-shell particle of a given mass
pub fn on_shell(mass: Float, p: Vector3<Float>) -> Momentum {
    let e = sqrt(p.norm_squared() + mass * mass);
    from_e_p(e, p.x, p.y, p.z)
}

/// Minkowski square E² - |p|²
pub fn mass_squared(p: &Momentum) -> Float {
    p[E] * p[E] - p.xyz().norm_squared()
}

/// Invariant mass (Minkowski norm) of a 4-momentum
///
/// Space-like vectors get a negative mass -sqrt(|p|² - E²), as in the
/// analysis libraries physicists are used to.
///
pub fn invariant_mass(p: &Momentum) -> Float {
    let m2 = mass_squared(p);
    if m2 >= 0. {
        sqrt(m2)
    } else {
        -sqrt(-m2)
    }
}

/// Momentum component perpendicular to the beam (Z) axis
pub fn transverse_momentum(p: &Momentum) -> Float {
    sqrt(p[X] * p[X] + p[Y] * p[Y])
}

/// Velocity of the rest frame of a time-like 4-momentum
pub fn beta(p: &Momentum) -> Beta {
    p.xyz() / p[E]
}

/// Lorentz-boost a 4-momentum by a velocity `beta`
pub fn boost(p: &Momentum, beta: &Beta) -> Momentum {
    let b2 = beta.norm_squared();
    if b2 == 0. {
        return *p;
    }
    let gamma = 1. / sqrt(1. - b2);
    let p3 = p.xyz();
    let bp = beta.dot(&p3);
    let p3 = p3 + beta * ((gamma - 1.) * bp / b2 + gamma * p[E]);
    from_e_p(gamma * (p[E] + bp), p3.x, p3.y, p3.z)
}
