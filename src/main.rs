fn main() {
    if let Err(err) = trip_aggregator::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
