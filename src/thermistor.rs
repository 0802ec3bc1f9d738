// thermistor.rs

//! NTC thermistor model for the sensor's voltage divider.
//!
//! The device samples the divider with a 12-bit ADC and stores its alert
//! threshold as a raw code, so the dashboard needs both directions:
//! code to Celsius for display, Celsius to code when the operator saves.

/// Raw 12-bit ADC sample, nominally 0..=4095.
pub type AdcCode = u16;

/// Returned by [`adc_to_celsius`] when the divider voltage is outside the
/// range the model can represent. Never a real reading.
pub const NO_TEMP_C: f64 = -999.0;

pub const ADC_MAX: f64 = 4095.0;
pub const V_REF: f64 = 3.3;

const V_MIN: f64 = 0.001;
const V_MAX: f64 = 3.299;

const R_SERIES: f64 = 47000.0;

// Steinhart-Hart coefficients
const SH_A: f64 = 0.001129148;
const SH_B: f64 = 0.000234125;
const SH_C: f64 = 0.0000000876741;

const KELVIN_OFFSET: f64 = 273.15;

pub const SEARCH_LOW: AdcCode = 10;
pub const SEARCH_HIGH: AdcCode = 4096;
pub const SEARCH_MAX_ITER: usize = 30;
const SEARCH_INITIAL_DIFF: f64 = 4096.0;

/// Convert a raw ADC code to degrees Celsius.
///
/// Codes whose voltage falls within a millivolt of either rail yield
/// [`NO_TEMP_C`] instead of NaN or infinity.
pub fn adc_to_celsius(adc: AdcCode) -> f64 {
    let v = (adc as f64 * V_REF) / ADC_MAX;
    if v <= V_MIN || v >= V_MAX {
        return NO_TEMP_C;
    }

    let r_ntc = (v * R_SERIES) / (V_REF - v);

    let ln_r = r_ntc.ln();
    let inv_t = SH_A + SH_B * ln_r + SH_C * ln_r * ln_r * ln_r;
    let t_k = 1.0 / inv_t;
    t_k - KELVIN_OFFSET
}

/// Find the ADC code whose temperature is closest to `target_c`.
pub fn celsius_to_adc(target_c: f64) -> AdcCode {
    search_adc(target_c, adc_to_celsius)
}

/// Bounded bisection over ADC codes using `oracle` as the forward model.
///
/// Steps assume temperature falls as the code rises. The result is the best
/// candidate among the (at most [`SEARCH_MAX_ITER`]) codes actually probed;
/// on equal distance the earlier probe wins. Unreachable targets fall back
/// to whatever came closest, which may be [`SEARCH_LOW`] itself.
pub fn search_adc<F>(target_c: f64, mut oracle: F) -> AdcCode
where
    F: FnMut(AdcCode) -> f64,
{
    let mut low = SEARCH_LOW as i32;
    let mut high = SEARCH_HIGH as i32;

    let mut best_adc = low;
    let mut best_diff = SEARCH_INITIAL_DIFF;

    for _ in 0..SEARCH_MAX_ITER {
        let mid = (low + high) / 2;
        let t_mid = oracle(mid as AdcCode);

        let diff = (t_mid - target_c).abs();
        if diff < best_diff {
            best_diff = diff;
            best_adc = mid;
        }

        if t_mid > target_c {
            low = mid + 1;
        } else {
            high = mid - 1;
        }

        if low > high {
            break;
        }
    }

    best_adc as AdcCode
}

/// True unless `t` is the out-of-range sentinel.
pub fn is_valid_temp(t: f64) -> bool {
    t != NO_TEMP_C
}


// EOF
