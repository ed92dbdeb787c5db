pub mod seq;
pub mod ext;
pub mod stage;
pub mod command;

mod err;
pub use err::{Error, Result};

fn init_logger(debug: bool) {
    use fern::{
        Dispatch,
        colors::{Color, ColoredLevelConfig},
    };
    let colors = ColoredLevelConfig::default()
        .info(Color::Green)
        .debug(Color::Cyan);
    let res = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {:>5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .level(if debug { log::LevelFilter::Trace } else { log::LevelFilter::Debug })
        .chain(std::io::stderr())
        .apply();
    if let Err(e) = res {
        eprintln!("Cannot initialize logger: {}", e);
    }
}

fn main() {
    let args: Vec<_> = std::env::args().collect();
    init_logger(command::debug_requested(&args));
    if let Err(e) = command::run(&args) {
        log::error!("{}", e.display());
        std::process::exit(e.exit_code());
    }
}
