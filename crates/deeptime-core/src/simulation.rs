//! Baseline physical and ecological model.
//!
//! [`step_baseline`] advances the continuous planetary variables by a span
//! of simulated years, independent of any player action. Rates are given
//! per million years and scaled by `dt_years / 1e6`, with a single explicit
//! step per call. The relaxation constants span millions of years, so a tick
//! of a few hundred thousand years stays well inside the stable range.
//!
//! # Clamping
//!
//! The stepper clamps temperature, pH, ice fraction, and extinction risk
//! inline. Everything else (biodiversity included) is left to
//! [`clamp_global_state`], which the caller must run after stepping.

use deeptime_types::GameState;

/// Years per million years, the unit all model rates are expressed in.
pub const YEARS_PER_MYR: f64 = 1_000_000.0;

/// Years per billion years.
const YEARS_PER_GYR: f64 = 1_000_000_000.0;

/// Mean temperature with pre-industrial greenhouse levels and no ice.
const BASELINE_TEMP_C: f64 = 14.0;

/// Reference CO2 concentration for the greenhouse term.
const REFERENCE_CO2_PPM: f64 = 280.0;

/// Reference CH4 concentration for the greenhouse term.
const REFERENCE_CH4_PPM: f64 = 700.0;

/// Clamp `value` into `[lo, hi]`.
///
/// Unlike [`f64::clamp`] this never panics: if `lo > hi` the lower bound
/// wins, matching `max(lo, min(hi, value))`.
pub(crate) fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

/// Convert elapsed real seconds into simulated years.
///
/// Pure unit conversion. The result is not bounded; callers decide what a
/// sensible tick length is.
pub fn compute_dt_years(dt_real_seconds: f64, years_per_second: f64, speed_multiplier: f64) -> f64 {
    dt_real_seconds * years_per_second * speed_multiplier
}

/// Advance the planet's continuous variables by `dt_years`.
///
/// This is the only function that advances `state.time_years`.
pub fn step_baseline(state: &mut GameState, dt_years: f64) {
    let dt_myr = dt_years / YEARS_PER_MYR;

    // The star brightens with absolute age and with elapsed run time.
    let earth_age_gyr = (state.earth_age_years + state.time_years) / YEARS_PER_GYR;
    state.hidden.stellar_brightening_factor =
        1.0 + (earth_age_gyr - 1.0) * 0.01 + (state.time_years / YEARS_PER_GYR) * 0.01;

    let co2_ratio = state.global.atmos.co2_ppm.max(1.0) / REFERENCE_CO2_PPM;
    let ch4_ratio = state.global.atmos.ch4_ppm.max(1.0) / REFERENCE_CH4_PPM;

    // Temperature is recomputed from scratch each step, not integrated.
    let greenhouse = 4.5 * co2_ratio.ln() + 0.8 * ch4_ratio.ln();
    let albedo = 12.0 * state.global.ice_fraction;
    let solar = 6.0 * (state.hidden.stellar_brightening_factor - 1.0);
    state.global.mean_temp_c = clamp(BASELINE_TEMP_C + greenhouse - albedo + solar, -100.0, 100.0);

    let ph_rate = 0.002 * ((state.hidden.nutrient_flux - 50.0) / 50.0) - 0.004 * co2_ratio.ln();
    state.global.ocean_ph = clamp(state.global.ocean_ph + ph_rate * dt_myr, 0.0, 14.0);

    let target_ice = clamp((20.0 - state.global.mean_temp_c) / 70.0, 0.0, 1.0);
    state.global.ice_fraction = clamp(
        state.global.ice_fraction + (target_ice - state.global.ice_fraction) * 0.05 * dt_myr,
        0.0,
        1.0,
    );

    let volatility = clamp(
        state.resources.entropy_debt / 2.0 + state.global.extinction_risk / 3.0,
        0.0,
        100.0,
    );
    state.global.extinction_risk = clamp(
        state.global.extinction_risk + (volatility - state.global.extinction_risk) * 0.02 * dt_myr,
        0.0,
        100.0,
    );

    let growth = (state.global.habitability - state.global.extinction_risk) * 0.01;
    state.global.biodiversity_index += growth * dt_myr;

    state.time_years += dt_years;
}

/// Clamp every visible planetary scalar back into its domain.
///
/// Idempotent; safe to call any number of times.
pub fn clamp_global_state(state: &mut GameState) {
    let global = &mut state.global;
    global.ocean_ph = clamp(global.ocean_ph, 0.0, 14.0);
    global.atmos.o2_percent = clamp(global.atmos.o2_percent, 0.0, 35.0);
    global.mean_temp_c = clamp(global.mean_temp_c, -100.0, 100.0);
    global.water_fraction = clamp(global.water_fraction, 0.0, 1.0);
    global.ice_fraction = clamp(global.ice_fraction, 0.0, 1.0);
    global.land_fraction = clamp(global.land_fraction, 0.0, 1.0);
    global.biodiversity_index = clamp(global.biodiversity_index, 0.0, 100.0);
    global.extinction_risk = clamp(global.extinction_risk, 0.0, 100.0);
    global.habitability = clamp(global.habitability, 0.0, 100.0);
    global.complexity_potential = clamp(global.complexity_potential, 0.0, 100.0);
}
