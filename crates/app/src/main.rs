use anyhow::Context;
use tracing_subscriber::EnvFilter;

use shelftag_ocr::{BarcodeDecoder, LabelPipeline, OcrBackend};
use shelftag_storage::RecordStore;

mod config;
mod session;
mod shell;

use shell::TerminalShell;

enum Mode {
    Scan,
    Manual,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // shelftag [scan|manual] [profile]
    let mut args = std::env::args().skip(1);
    let mode = match args.next().as_deref() {
        None | Some("scan") => Mode::Scan,
        Some("manual") => Mode::Manual,
        Some(other) => anyhow::bail!("Unknown mode '{other}', expected `scan` or `manual`"),
    };
    let profile_name = args.next();

    let project_dirs = directories::ProjectDirs::from("com", "shelftag", "Shelftag")
        .context("Failed to get app directory")?;
    let data_dir = project_dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

    let app_config = config::load(&data_dir)?;
    let profile = app_config.profile(profile_name.as_deref())?;
    tracing::info!(profile = %profile.name, strategy = %profile.strategy, "label profile selected");

    let store = RecordStore::new(config::database_path(&data_dir, profile), profile.table.clone());
    store
        .ensure_schema()
        .await
        .context("Failed to set up the database")?;

    let mut shell = TerminalShell::new(std::io::stdin().lock(), std::io::stdout());

    match mode {
        Mode::Scan => {
            // Engines are built once here and handed to the pipeline.
            let pipeline = LabelPipeline::new(recognizer(), barcode_decoder(), &profile.strategy);
            session::run_scan_session(&mut shell, &pipeline, &store).await;
        }
        Mode::Manual => {
            session::run_manual_session(&mut shell, &store).await;
        }
    }

    Ok(())
}

#[cfg(feature = "tesseract")]
fn recognizer() -> Box<dyn OcrBackend> {
    use shelftag_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    Box::new(TesseractRecognizer::new(None, "eng"))
}

#[cfg(not(feature = "tesseract"))]
fn recognizer() -> Box<dyn OcrBackend> {
    tracing::warn!("Built without the `tesseract` feature; every scan will fail to recognize text");
    Box::new(shelftag_ocr::UnavailableRecognizer)
}

#[cfg(feature = "zxing")]
fn barcode_decoder() -> Box<dyn BarcodeDecoder> {
    Box::new(shelftag_ocr::decoder::zxing_backend::ZxingDecoder)
}

#[cfg(not(feature = "zxing"))]
fn barcode_decoder() -> Box<dyn BarcodeDecoder> {
    tracing::warn!("Built without the `zxing` feature; barcodes will be reported as unknown");
    Box::new(shelftag_ocr::NullBarcodeDecoder)
}
