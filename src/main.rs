fn main() {
    if let Err(err) = svg_stream_writer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
