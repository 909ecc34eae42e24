fn main() {
    if let Err(err) = order_intake::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
