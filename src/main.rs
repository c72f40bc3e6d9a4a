use clap::Parser;

use flowtag::app::Application;
use flowtag::cli::Opts;
use flowtag::trace;

fn main() {
    let opts = Opts::parse();

    trace::init();

    std::process::exit(Application::new(opts).run());
}
