fn main() {
    #[cfg(feature = "cli")]
    screencodec::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("screencodec: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
