//! field-solver CLI driver: parses the `-c/-b/-w/-p` flags, runs the
//! bias and weighting-potential solves, and writes the legacy field/WP/
//! undepleted-map files. Grounded on the argv loop in `mjd_fieldgen.c`'s
//! `main()`.

use gedet_siggen::field::Grid2;
use gedet_siggen::io::{write_field_file, write_undepleted_map, write_wp_file, DepletionState};
use gedet_siggen::{Config, FieldSolver};
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

struct Args {
    config_path: String,
    bias_override: Option<f64>,
    write_level: u8,
    print_level: u8,
}

fn parse_args() -> Result<Args, String> {
    let mut config_path = None;
    let mut bias_override = None;
    let mut write_level = 1u8;
    let mut print_level = 0u8;

    let mut argv = std::env::args().skip(1);
    while let Some(flag) = argv.next() {
        let mut value = || argv.next().ok_or_else(|| format!("{flag} requires a value"));
        match flag.as_str() {
            "-c" => config_path = Some(value()?),
            "-b" => {
                bias_override = Some(value()?.parse::<f64>().map_err(|_| "bad -b value".to_string())?)
            }
            "-w" => write_level = value()?.parse::<u8>().map_err(|_| "bad -w value".to_string())?,
            "-p" => print_level = value()?.parse::<u8>().map_err(|_| "bad -p value".to_string())?,
            other => return Err(format!("unrecognized flag: {other}")),
        }
    }

    Ok(Args {
        config_path: config_path.ok_or_else(|| "missing required -c <config>".to_string())?,
        bias_override,
        write_level,
        print_level,
    })
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    let file = File::open(&args.config_path).map_err(|e| format!("cannot open {}: {e}", args.config_path))?;
    let mut config = Config::from_reader(BufReader::new(file)).map_err(|e| e.to_string())?;
    if let Some(bias) = args.bias_override {
        config.v_bias = bias;
    }

    let solver = FieldSolver::new(config.geometry, config.impurity, config.v_bias, config.grid);
    let solved = solver.solve().map_err(|e| e.to_string())?;

    println!("capacitance (volume integral): {:.4} pF", solved.capacitance.volume_integral);
    match solved.capacitance.surface_integral {
        Some(c) => println!("capacitance (surface integral): {:.4} pF", c),
        None => println!("capacitance (surface integral): n/a (not fully depleted)"),
    }

    if args.write_level >= 1 {
        let field_file = File::create("fields.dat").map_err(|e| e.to_string())?;
        write_field_file(field_file, &solved.dims, &solved.bias_potential, &solved.e_field).map_err(|e| e.to_string())?;
    }
    if args.write_level >= 2 {
        let wp_file = File::create("wp.dat").map_err(|e| e.to_string())?;
        write_wp_file(wp_file, &solved.dims, &solved.weighting_potential).map_err(|e| e.to_string())?;
    }

    if args.print_level >= 1 {
        // written once from the coarsest grid's own detection, matching
        // the original's `if (istep == 0)` gate
        let map = undepleted_map(&solved.coarsest_undepleted, &solved.coarsest_dims);
        let out_file = File::create("undepleted.txt").map_err(|e| e.to_string())?;
        write_undepleted_map(out_file, &solved.coarsest_dims, &map).map_err(|e| e.to_string())?;
    }

    Ok(())
}

fn undepleted_map(undepleted: &Grid2<f64>, dims: &gedet_siggen::grid::GridDims) -> Vec<Vec<DepletionState>> {
    let mut rows = Vec::with_capacity(dims.r + 1);
    for r in 0..=dims.r {
        let mut row = Vec::with_capacity(dims.l + 1);
        for z in 0..=dims.l {
            row.push(if undepleted[(z, r)] > 0.5 { DepletionState::Undepleted } else { DepletionState::Depleted });
        }
        rows.push(row);
    }
    rows
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fieldgen: {e}");
            ExitCode::FAILURE
        }
    }
}
