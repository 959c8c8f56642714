//! Pure numeric kernel functions of distance and smoothing radius (§4.1).
//!
//! These are translated 1:1 from the teacher's `sfs_*` kernel family
//! (`sim_sfs_impl.rs`), with the scaling factors generalized from the
//! teacher's 2D coefficients to the 3D ones in §3 of the spec.

use crate::config::KernelCoefficients;

/// `v² · K_spiky2` for `d < h`, else 0.
pub fn density_kernel(coeffs: &KernelCoefficients, distance: f32) -> f32 {
    if distance < coeffs.h {
        let v = coeffs.h - distance;
        v * v * coeffs.spiky2
    } else {
        0.0
    }
}

/// `v³ · K_spiky3` for `d < h`, else 0.
pub fn near_density_kernel(coeffs: &KernelCoefficients, distance: f32) -> f32 {
    if distance < coeffs.h {
        let v = coeffs.h - distance;
        v * v * v * coeffs.spiky3
    } else {
        0.0
    }
}

/// `-v · K_spiky2_grad` for `d ≤ h`, else 0.
pub fn density_derivative(coeffs: &KernelCoefficients, distance: f32) -> f32 {
    if distance <= coeffs.h {
        let v = coeffs.h - distance;
        -v * coeffs.spiky2_grad
    } else {
        0.0
    }
}

/// `-v² · K_spiky3_grad` for `d ≤ h`, else 0.
pub fn near_density_derivative(coeffs: &KernelCoefficients, distance: f32) -> f32 {
    if distance <= coeffs.h {
        let v = coeffs.h - distance;
        -v * v * coeffs.spiky3_grad
    } else {
        0.0
    }
}

/// `(h² − d²)³ · 315/(64π h⁹)` for `d < h`, else 0. Used by the viscosity pass.
pub fn poly6(coeffs: &KernelCoefficients, distance: f32) -> f32 {
    if distance < coeffs.h {
        let v = coeffs.h * coeffs.h - distance * distance;
        v * v * v * coeffs.poly6
    } else {
        0.0
    }
}

pub fn pressure_from_density(density: f32, target_density: f32, pressure_multiplier: f32) -> f32 {
    (density - target_density) * pressure_multiplier
}

pub fn near_pressure_from_density(near_density: f32, near_pressure_multiplier: f32) -> f32 {
    near_density * near_pressure_multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn coeffs() -> KernelCoefficients {
        KernelCoefficients::new(0.2)
    }

    #[test]
    fn density_kernel_support() {
        let c = coeffs();
        assert_relative_eq!(density_kernel(&c, c.h), 0.0);
        assert_relative_eq!(density_kernel(&c, 0.0), c.h * c.h * c.spiky2);
        assert_eq!(density_kernel(&c, c.h + 0.01), 0.0);
    }

    #[test]
    fn near_density_kernel_support() {
        let c = coeffs();
        assert_relative_eq!(near_density_kernel(&c, c.h), 0.0);
        assert_relative_eq!(near_density_kernel(&c, 0.0), c.h * c.h * c.h * c.spiky3);
    }

    #[test]
    fn kernels_are_monotonically_non_increasing() {
        let c = coeffs();
        let samples: Vec<f32> = (0..=100).map(|i| i as f32 / 100.0 * c.h).collect();
        for pair in samples.windows(2) {
            assert!(density_kernel(&c, pair[0]) >= density_kernel(&c, pair[1]) - 1e-6);
            assert!(near_density_kernel(&c, pair[0]) >= near_density_kernel(&c, pair[1]) - 1e-6);
            assert!(poly6(&c, pair[0]) >= poly6(&c, pair[1]) - 1e-6);
        }
    }

    #[test]
    fn density_kernel_integrates_to_analytic_coefficient() {
        // Numeric integration of density_kernel over a ball of radius h in 3D:
        // ∫ v² K_spiky2 dV = K_spiky2 · 4π ∫₀ʰ (h-r)² r² dr.
        // With K_spiky2 = 15/(2π h⁵) the analytic result is 1.0.
        let c = coeffs();
        let steps = 20_000;
        let dr = c.h / steps as f32;
        let mut integral = 0.0;
        for i in 0..steps {
            let r = (i as f32 + 0.5) * dr;
            integral += density_kernel(&c, r) * 4.0 * std::f32::consts::PI * r * r * dr;
        }
        assert_relative_eq!(integral, 1.0, epsilon = 0.01);
    }

    #[test]
    fn pressure_from_density_is_linear_in_deviation() {
        assert_relative_eq!(pressure_from_density(1000.0, 1000.0, 30.0), 0.0);
        assert_relative_eq!(pressure_from_density(1010.0, 1000.0, 30.0), 300.0);
    }

    #[test]
    fn near_pressure_from_density_scales_by_multiplier() {
        assert_relative_eq!(near_pressure_from_density(2.0, 25.0), 50.0);
    }
}
