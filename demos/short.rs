use rough_bench::{Bench, FormatOptions};

fn main() {
    let mut bench = Bench::new();
    let options = FormatOptions::new().header(true).mean_and_std_dev(true);
    bench
        .run("sum", 10, options, || {
            (0..100_000u64).map(std::hint::black_box).sum::<u64>();
        })
        .unwrap();
}
