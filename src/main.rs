use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use physicalc::{Config, Session};
use physicalc::session::Response;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut session = Session::from_config(&config)?;
    info!(
        units = session.units().units().len(),
        constants = session.constants().len(),
        "tables loaded"
    );

    println!("PhysiCalc {}", env!("CARGO_PKG_VERSION"));
    println!("Type \"help\" for usage.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", config.prompt);
        stdout.flush()?;

        let Some(line) = lines.next() else {
            debug!("end of input");
            break;
        };
        let line = line?;

        match session.execute(&line) {
            Ok(Response::Quit) => break,
            Ok(response) => {
                if let Some(text) = session.render(&response, config.output)? {
                    println!("{}", text);
                }
            }
            Err(e) => println!("Math Error: {}", e),
        }
    }

    Ok(())
}
