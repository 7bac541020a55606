//! combines the electron and hole Ramo currents into the final output
//! waveform: accumulate current to charge, diffusion-convolve, down-
//! sample, and RC-shape. Grounded on `get_signal`'s post-processing in
//! `calc_signal.c`, after the two `make_signal` drift calls.

/// accumulates per-step induced current into induced charge in place:
/// `signal[j] = sum(signal[0..=j])`
pub fn accumulate_charge(signal: &mut [f64]) {
    let mut running = 0.0;
    for s in signal.iter_mut() {
        running += *s;
        *s = running;
    }
}

/// convolves `signal` with a truncated Gaussian of width derived from
/// the final diffusion spread `sigma_final` and drift speed
/// `speed_final_mm_per_ns`, skipped when the resulting span is too
/// short to matter. `dt_calc` is the simulation step size in ns.
///
/// the outer stride `step = max(1, dt_span / 5)` trades convolution
/// accuracy for speed by only evaluating every `step`-th lag rather
/// than every lag out to `dt_span`; this crate keeps that same
/// stride choice rather than convolving at every lag.
pub fn diffuse(signal: &mut [f64], dt_calc: f64, sigma_final: f64, speed_final_mm_per_ns: f64) {
    if sigma_final <= 0.001 || speed_final_mm_per_ns <= 0.0 {
        return;
    }

    let dt_span = (1.5 + sigma_final / (dt_calc * speed_final_mm_per_ns)).ceil() as i64;
    if dt_span <= 1 {
        return;
    }

    let w = dt_span as f64 / 2.355;
    let step = (dt_span / 5).max(1);

    let n = signal.len();
    let mut tmp = signal.to_vec();
    let mut sum = vec![1.0_f64; n]; // the central tap (k=0) always contributes with weight 1

    let mut k = step;
    while k < 2 * dt_span {
        let y = (-((k as f64 / w).powi(2))).exp();
        for j in 0..n {
            let j_plus_k = j as i64 + k;
            if j_plus_k >= 0 && (j_plus_k as usize) < n {
                tmp[j] += signal[j_plus_k as usize] * y;
                sum[j] += y;
            }
            let jk = j + k as usize;
            if jk < n {
                tmp[jk] += signal[j] * y;
                sum[jk] += y;
            }
        }
        k += step;
    }

    for j in 0..n {
        signal[j] = tmp[j] / sum[j];
    }
}

/// down-samples `signal` (length `t_calc`) to a coarser output time
/// base by block-averaging `comp_f` consecutive input samples per
/// output sample
pub fn downsample(signal: &[f64], comp_f: usize) -> Vec<f64> {
    if comp_f <= 1 {
        return signal.to_vec();
    }
    let t_out = signal.len() / comp_f;
    let mut out = vec![0.0; t_out];
    for (j, slot) in out.iter_mut().enumerate() {
        let start = j * comp_f;
        let sum: f64 = signal[start..start + comp_f].iter().sum();
        *slot = sum / comp_f as f64;
    }
    out
}

/// single-pole RC integration, alias-safe: `s_out` may point at the
/// same buffer as `s_in`. `tau` is `tau_preamp / dt_out`; values below
/// 1 are treated as no shaping (output is `s_in` delayed one sample).
pub fn rc_integrate(s_in: &[f64], s_out: &mut [f64], tau: f64) {
    let n = s_in.len().min(s_out.len());
    if n == 0 {
        return;
    }

    if tau < 1.0 {
        let mut s_in_old = s_in[0];
        s_out[0] = 0.0;
        for j in 1..n {
            let next_old = s_in[j];
            s_out[j] = s_in_old;
            s_in_old = next_old;
        }
        return;
    }

    let mut s_in_old = s_in[0];
    let mut y_old = 0.0;
    s_out[0] = 0.0;
    for j in 1..n {
        let next_old = s_in[j];
        y_old += (s_in_old - y_old) / tau;
        s_out[j] = y_old;
        s_in_old = next_old;
    }
}

/// in-place RC integration over a single buffer, the shape the original
/// call site actually uses (`rc_integrate(s, s, tau)`); built on the
/// same single-scratch-variable technique as [`rc_integrate`] so the two
/// agree exactly regardless of whether the caller passes one buffer or
/// two.
pub fn rc_integrate_in_place(buf: &mut [f64], tau: f64) {
    let snapshot = buf.to_vec();
    rc_integrate(&snapshot, buf, tau);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_charge_is_a_running_sum() {
        let mut s = vec![1.0, 2.0, 3.0];
        accumulate_charge(&mut s);
        assert_eq!(s, vec![1.0, 3.0, 6.0]);
    }

    #[test]
    fn diffuse_is_noop_for_tiny_cloud() {
        let mut s = vec![0.0, 1.0, 1.0, 1.0, 0.0];
        let before = s.clone();
        diffuse(&mut s, 1.0, 0.0001, 0.05);
        assert_eq!(s, before);
    }

    #[test]
    fn diffuse_preserves_total_charge_roughly() {
        let mut s = vec![0.0; 40];
        s[20] = 1.0;
        let before_sum: f64 = s.iter().sum();
        diffuse(&mut s, 1.0, 2.0, 0.05);
        let after_sum: f64 = s.iter().sum();
        assert!((before_sum - after_sum).abs() < 0.5);
    }

    #[test]
    fn downsample_averages_blocks() {
        let s = vec![1.0, 1.0, 3.0, 3.0];
        let out = downsample(&s, 2);
        assert_eq!(out, vec![1.0, 3.0]);
    }

    #[test]
    fn downsample_identity_for_comp_f_one() {
        let s = vec![1.0, 2.0, 3.0];
        assert_eq!(downsample(&s, 1), s);
    }

    #[test]
    fn rc_integrate_step_response_approaches_one() {
        let s_in = vec![1.0; 500];
        let mut s_out = vec![0.0; 500];
        rc_integrate(&s_in, &mut s_out, 10.0);
        assert!(s_out[499] > 0.99);
    }

    #[test]
    fn rc_integrate_in_place_matches_separate_buffers() {
        let input = vec![0.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let mut separate_out = vec![0.0; input.len()];
        rc_integrate(&input, &mut separate_out, 3.0);

        let mut in_place = input.clone();
        rc_integrate_in_place(&mut in_place, 3.0);

        assert_eq!(in_place, separate_out);
    }

    #[test]
    fn rc_integrate_below_threshold_is_a_one_step_delay() {
        let s_in = vec![0.0, 2.0, 5.0, 7.0];
        let mut s_out = vec![0.0; 4];
        rc_integrate(&s_in, &mut s_out, 0.5);
        assert_eq!(s_out, vec![0.0, 0.0, 2.0, 5.0]);
    }
}
