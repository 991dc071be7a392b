use rough_bench::{Bench, FormatOptions, flags};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let options = FormatOptions::from_env().unwrap_or(FormatOptions::from_bits(
        flags::HEADER
            | flags::RESULT_FOR_EVERY_RUN
            | flags::ONE_LINE_PER_RESULT
            | flags::UNIT
            | flags::MEAN_AND_STANDARD_DEVIATION,
    ));
    let mut bench = Bench::from_env();
    let mut words: Vec<String> = (0..50_000).map(|i| format!("{:x}", i * 7919 % 50_021)).collect();
    bench
        .run("sort strings", 5, options, || {
            words.sort_unstable();
            words.reverse();
        })
        .unwrap();
}
