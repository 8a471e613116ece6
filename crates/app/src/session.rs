use std::path::Path;

use shelftag_core::{Barcode, NewScanRecord, ParsedLabel, ScanRecord};
use shelftag_ocr::{BarcodeDecoder, LabelPipeline, OcrBackend};
use shelftag_storage::RecordStore;

use crate::shell::{InteractionShell, ManualEntry, Notice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Saved(ScanRecord),
    Discarded,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub saved: usize,
    pub discarded: usize,
    pub failed: usize,
}

impl SessionSummary {
    fn record(&mut self, outcome: &ScanOutcome) {
        match outcome {
            ScanOutcome::Saved(_) => self.saved += 1,
            ScanOutcome::Discarded => self.discarded += 1,
            ScanOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl ManualEntry {
    /// Every typed-in field, barcode included, is stored as entered.
    pub fn into_label(self) -> (ParsedLabel, Barcode) {
        let label = ParsedLabel::manual(self.product_name, self.weight, self.price_per_piece);
        let barcode = Barcode::Entered(self.barcode);
        (label, barcode)
    }
}

/// Scan images until the user stops picking them.
pub async fn run_scan_session<S, R, B>(
    shell: &mut S,
    pipeline: &LabelPipeline<R, B>,
    store: &RecordStore,
) -> SessionSummary
where
    S: InteractionShell,
    R: OcrBackend,
    B: BarcodeDecoder,
{
    let mut summary = SessionSummary::default();
    while let Some(path) = shell.pick_image() {
        let outcome = scan_once(shell, pipeline, store, &path).await;
        summary.record(&outcome);
    }
    tracing::info!(?summary, "scan session finished");
    summary
}

/// Collect hand-entered labels until the user quits.
pub async fn run_manual_session<S: InteractionShell>(
    shell: &mut S,
    store: &RecordStore,
) -> SessionSummary {
    let mut summary = SessionSummary::default();
    while let Some(entry) = shell.read_manual_entry() {
        let (label, barcode) = entry.into_label();
        let outcome = review_and_store(shell, store, &label, &barcode).await;
        summary.record(&outcome);
    }
    tracing::info!(?summary, "manual session finished");
    summary
}

/// Full pipeline for one picked image: process → show → confirm → store.
pub async fn scan_once<S, R, B>(
    shell: &mut S,
    pipeline: &LabelPipeline<R, B>,
    store: &RecordStore,
    path: &Path,
) -> ScanOutcome
where
    S: InteractionShell,
    R: OcrBackend,
    B: BarcodeDecoder,
{
    let scan = match pipeline.process_file(path).await {
        Ok(scan) => scan,
        Err(e) => {
            tracing::warn!("Label pipeline error for {}: {e}", path.display());
            let message = format!("Failed to process the image.\nError: {e}");
            shell.notify(&Notice::Failed(message.clone()));
            return ScanOutcome::Failed(message);
        }
    };
    if !scan.label.is_complete() || scan.barcode.is_unknown() {
        tracing::info!("Some label fields were not recognized in {}", path.display());
    }
    review_and_store(shell, store, &scan.label, &scan.barcode).await
}

async fn review_and_store<S: InteractionShell>(
    shell: &mut S,
    store: &RecordStore,
    label: &ParsedLabel,
    barcode: &Barcode,
) -> ScanOutcome {
    shell.show_fields(label, barcode);

    if !shell.confirm(label, barcode) {
        shell.notify(&Notice::NotSaved);
        return ScanOutcome::Discarded;
    }

    match store.append(&NewScanRecord::from_scan(label, barcode)).await {
        Ok(record) => {
            shell.notify(&Notice::Saved(record.clone()));
            ScanOutcome::Saved(record)
        }
        Err(e) => {
            tracing::error!("Failed to store scan: {e}");
            let message = format!("Failed to save the data.\nError: {e}");
            shell.notify(&Notice::Failed(message.clone()));
            ScanOutcome::Failed(message)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
