//! hand-rolled `keyword value` config file parser, mapping onto the
//! `MJD_Siggen_Setup`-equivalent `Config` struct. Grounded on the
//! free-form config format `mjd_fieldgen.c`/`mjd_siggen.c` read (not a
//! structured format `serde` would model well), matching the
//! dependency-light style of this crate's other plain-argument
//! constructors.

use crate::error::{SiggenError, SiggenResult};
use crate::geometry::{Geometry, ImpurityProfile};
use std::collections::HashMap;
use std::io::BufRead;

/// everything the orchestrator needs to run one detector simulation;
/// mirrors the fields of `MJD_Siggen_Setup` that this crate consumes
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub geometry: Geometry,
    pub impurity: ImpurityProfile,
    pub v_bias: f64,
    pub grid: f64,
    pub xtal_temp: f64,
    pub preamp_tau_ns: f64,
    pub dt_calc_ns: f64,
    pub dt_out_ns: f64,
    pub t_calc_steps: usize,
    pub velocity_table_path: Option<String>,
    /// charge-cloud radius in mm, seeding the diffusion convolution's
    /// initial sigma^2; diffusion is skipped below 0.001 mm
    pub cloud_size: f64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            geometry: Geometry {
                xtal_length: 0.0,
                xtal_radius: 0.0,
                top_bullet_radius: 0.0,
                bottom_bullet_radius: 0.0,
                pc_length: 0.0,
                pc_radius: 0.0,
                taper_length: 0.0,
                wrap_around_radius: 0.0,
                ditch_depth: 0.0,
                ditch_thickness: 0.0,
                li_thickness: 0.0,
            },
            impurity: ImpurityProfile::new(0.0, 0.0),
            v_bias: 0.0,
            grid: 0.5,
            xtal_temp: crate::constants::REF_TEMP_K,
            preamp_tau_ns: 0.0,
            dt_calc_ns: 1.0,
            dt_out_ns: 10.0,
            t_calc_steps: 4000,
            velocity_table_path: None,
            cloud_size: 0.0,
        }
    }
}

impl Config {
    /// parses a `keyword value` text file; unrecognized keywords are
    /// ignored (the original format tolerates fields this crate has no
    /// use for, e.g. drift velocity anisotropy coefficients)
    pub fn from_reader<R: BufRead>(reader: R) -> SiggenResult<Config> {
        let mut values: HashMap<String, String> = HashMap::new();
        for line in reader.lines() {
            let line = line.map_err(|e| SiggenError::Config(format!("{e}")))?;
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, char::is_whitespace);
            let key = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            values.insert(key.to_string(), value.to_string());
        }

        let f = |k: &str, default: f64| -> SiggenResult<f64> {
            match values.get(k) {
                Some(v) => v.parse().map_err(|_| SiggenError::Config(format!("bad numeric value for {k}: {v}"))),
                None => Ok(default),
            }
        };

        let mut cfg = Config::default();
        cfg.geometry.xtal_length = f("xtal_length", cfg.geometry.xtal_length)?;
        cfg.geometry.xtal_radius = f("xtal_radius", cfg.geometry.xtal_radius)?;
        cfg.geometry.top_bullet_radius = f("top_bullet_radius", cfg.geometry.top_bullet_radius)?;
        cfg.geometry.bottom_bullet_radius = f("bottom_bullet_radius", cfg.geometry.bottom_bullet_radius)?;
        cfg.geometry.pc_length = f("pc_length", cfg.geometry.pc_length)?;
        cfg.geometry.pc_radius = f("pc_radius", cfg.geometry.pc_radius)?;
        cfg.geometry.taper_length = f("taper_length", cfg.geometry.taper_length)?;
        cfg.geometry.wrap_around_radius = f("wrap_around_radius", cfg.geometry.wrap_around_radius)?;
        cfg.geometry.ditch_depth = f("ditch_depth", cfg.geometry.ditch_depth)?;
        cfg.geometry.ditch_thickness = f("ditch_thickness", cfg.geometry.ditch_thickness)?;
        cfg.geometry.li_thickness = f("li_thickness", cfg.geometry.li_thickness)?;

        cfg.impurity.n0 = f("impurity_z0", cfg.impurity.n0)?;
        cfg.impurity.gradient = f("impurity_gradient", cfg.impurity.gradient)?;

        cfg.v_bias = f("xtal_HV", cfg.v_bias)?;
        cfg.grid = f("grid", cfg.grid)?;
        cfg.xtal_temp = f("xtal_temp", cfg.xtal_temp)?;
        cfg.preamp_tau_ns = f("preamp_tau", cfg.preamp_tau_ns)?;
        cfg.dt_calc_ns = f("step_time_calc", cfg.dt_calc_ns)?;
        cfg.dt_out_ns = f("step_time_out", cfg.dt_out_ns)?;
        cfg.t_calc_steps = f("ntsteps_calc", cfg.t_calc_steps as f64)? as usize;
        cfg.velocity_table_path = values.get("drift_name").cloned();
        cfg.cloud_size = f("cloud_size", cfg.cloud_size)?;

        if !(crate::constants::MIN_TEMP_K..=crate::constants::MAX_TEMP_K).contains(&cfg.xtal_temp) {
            return Err(SiggenError::Config(format!(
                "xtal_temp {} outside the allowed range [{}, {}]",
                cfg.xtal_temp,
                crate::constants::MIN_TEMP_K,
                crate::constants::MAX_TEMP_K
            )));
        }

        Ok(cfg)
    }
}
