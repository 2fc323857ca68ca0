use dab_receiver::dab_receiver::{DabReceiver, DabReceiverSettings, FrameReport};
use ofdm::ofdm_demodulator::OfdmDemodulatorSettings;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct AppArguments {
    /// Raw I/Q file where I and Q are unsigned 8bit samples at 2.048MHz
    input_filepath: String,
    /// Stop after decoding this many frames
    #[arg(long)]
    max_frames: Option<usize>,
    /// Disable the fine frequency correction in the OFDM demodulator
    #[arg(long)]
    no_frequency_correction: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), String> {
    let args = AppArguments::parse();
    init_tracing();

    let settings = DabReceiverSettings {
        max_frames: args.max_frames,
        demodulator: OfdmDemodulatorSettings {
            frequency_correction_is_enabled: !args.no_frequency_correction,
        },
    };
    let mut receiver = DabReceiver::open_file(&args.input_filepath, settings)
        .map_err(|err| err.to_string())?;
    info!(input_filepath = %args.input_filepath, "Opened input file");

    receiver.subscribe_frame(|report: &FrameReport<'_>| {
        println!("PRS start index found at sample {}.", report.prs_start_index);
        for (i, nb_error_bits) in report.fic_block_errors().enumerate() {
            println!("The number of error bits is {} for the FIC block {}.", nb_error_bits, i);
        }
    });

    receiver.run();
    println!("File ended.");
    Ok(())
}
