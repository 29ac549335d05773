//! Net present value and Internal Rate of Return
//!
//! Cash flows are annual and indexed from period 0 (the acquisition).

use crate::assumptions::IrrSettings;
use crate::error::{EngineResult, ProjectionError};

/// Calculate NPV at a given annual rate
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / ((1.0 + rate).powi(t as i32 + 1));
        }
    }

    (npv, dnpv)
}

/// Solve for the rate at which the NPV of `cashflows` is zero.
///
/// The root must be bracketed by `settings.lower` and `settings.upper`.
/// Newton-Raphson steps are taken while they stay inside the shrinking
/// bracket; otherwise the step falls back to bisection. Terminates within
/// `settings.max_iterations` evaluations.
pub fn solve_irr(cashflows: &[f64], settings: &IrrSettings) -> EngineResult<f64> {
    let (mut low, mut high) = (settings.lower, settings.upper);
    let npv_low = npv_at_rate(cashflows, low);
    let npv_high = npv_at_rate(cashflows, high);

    if npv_low.abs() < settings.tolerance {
        return Ok(low);
    }
    if npv_high.abs() < settings.tolerance {
        return Ok(high);
    }

    // No sign change means no root inside the interval
    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        return Err(ProjectionError::NoConvergence {
            iterations: 0,
            residual: npv_low.abs().min(npv_high.abs()),
        });
    }

    let low_is_negative = npv_low < 0.0;
    let mut rate = 0.5 * (low + high);
    let mut residual = f64::INFINITY;

    for _ in 0..settings.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);
        residual = npv.abs();

        if residual < settings.tolerance {
            return Ok(rate);
        }

        // Keep the root bracketed
        if (npv < 0.0) == low_is_negative {
            low = rate;
        } else {
            high = rate;
        }

        let newton = if dnpv.abs() > 1e-20 { rate - npv / dnpv } else { f64::NAN };
        let next = if newton > low && newton < high {
            newton
        } else {
            0.5 * (low + high)
        };

        // Bracket collapsed to machine precision
        if (next - rate).abs() <= f64::EPSILON * (1.0 + rate.abs()) {
            return Ok(next);
        }

        rate = next;
    }

    Err(ProjectionError::NoConvergence {
        iterations: settings.max_iterations,
        residual,
    })
}
