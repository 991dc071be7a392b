//! Runs a few operations as a suite and writes every run to its own `.dat` file.
//!
//! Files land in `RB_OUTPUT_DIR`, or the working directory if it is unset.

use rough_bench::{Bench, FileOutput, FormatOptions, Output, Suite};
use std::{collections::HashMap, hint::black_box};

fn main() {
    tracing_subscriber::fmt().init();

    let mut map = HashMap::new();
    let mut vec = Vec::new();
    let mut suite = Suite::new()
        .add("vec push", || {
            for i in 0..100_000 {
                vec.push(black_box(i));
            }
            vec.clear();
        })
        .add("hashmap insert", || {
            for i in 0..100_000 {
                map.insert(black_box(i), i);
            }
            map.clear();
        });

    let options = FormatOptions::new()
        .header(true)
        .every_run(true)
        .comma_between_runs(true)
        .mean_and_std_dev(true)
        .output(Output::File(FileOutput {
            append: true,
            random_suffix: false,
        }));
    let report = Bench::from_env().run_many(&mut suite, 20, options).unwrap();
    println!("{report}");
}
