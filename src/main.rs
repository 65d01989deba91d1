use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::{info, LevelFilter};

use formfill::{FillError, FormFiller};

const TEMPLATE_PATH: &str = "adac_template.pdf";
const OUTPUT_DIR: &str = "filled_forms";
const CONTRACT_COUNT: usize = 10;
const LOG_FILE: &str = "form_filler.log";

/// Duplicates every log line to stderr and the append-only log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn init_logging() -> Result<(), FillError> {
    let file = File::options().append(true).create(true).open(LOG_FILE)?;
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .target(env_logger::Target::Pipe(Box::new(Tee { file })))
        .init();
    Ok(())
}

fn main() -> Result<(), FillError> {
    init_logging()?;
    info!("starting contract generation");

    let mut filler = FormFiller::new();
    let report = filler.generate_batch(
        Path::new(TEMPLATE_PATH),
        Path::new(OUTPUT_DIR),
        CONTRACT_COUNT,
    )?;

    info!(
        "contract generation finished: {} written, {} failed",
        report.written.len(),
        report.failures.len()
    );
    Ok(())
}
