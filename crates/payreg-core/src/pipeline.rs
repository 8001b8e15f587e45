//! Pipeline orchestrator: extract → validate → submit.
//!
//! The three adapters are injected, so tests can substitute stubs. A run is
//! strictly sequential and never retries; every exit is reported through
//! [`PipelineOutcome`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::analysis::{ApprovalPolicy, InvoiceAnalyzer};
use crate::form::{FormSubmitter, SubmissionPayload, SubmissionReport};
use crate::models::config::PipelineConfig;
use crate::models::record::{InvoiceRecord, RecordStatus};
use crate::ocr::TextExtractor;

/// States a run moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    Validating,
    Approved,
    Rejected,
    Submitting,
    Done,
    Aborted,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Extracting => "extracting",
            PipelineStage::Validating => "validating",
            PipelineStage::Approved => "approved",
            PipelineStage::Rejected => "rejected",
            PipelineStage::Submitting => "submitting",
            PipelineStage::Done => "done",
            PipelineStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why a run stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Text extraction returned nothing.
    OcrFailed,
    /// The analyzer reported an error.
    AnalysisFailed(String),
    /// The approved invoice could not be submitted because the form is missing.
    FormMissing(PathBuf),
    /// The browser step failed.
    SubmissionFailed(String),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::OcrFailed => write!(f, "text extraction failed"),
            AbortReason::AnalysisFailed(e) => write!(f, "invoice analysis failed: {}", e),
            AbortReason::FormMissing(path) => {
                write!(f, "form document '{}' not found", path.display())
            }
            AbortReason::SubmissionFailed(e) => write!(f, "form submission failed: {}", e),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The invoice was approved and submitted.
    Completed {
        record: InvoiceRecord,
        report: SubmissionReport,
    },
    /// The policy rejected the invoice; nothing was submitted.
    Rejected {
        record: InvoiceRecord,
        reason: String,
    },
    /// An infrastructure or service failure stopped the run.
    Aborted {
        stage: PipelineStage,
        reason: AbortReason,
        record: Option<InvoiceRecord>,
    },
}

impl PipelineOutcome {
    /// The record produced by the run, if analysis got that far.
    pub fn record(&self) -> Option<&InvoiceRecord> {
        match self {
            PipelineOutcome::Completed { record, .. } | PipelineOutcome::Rejected { record, .. } => {
                Some(record)
            }
            PipelineOutcome::Aborted { record, .. } => record.as_ref(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, PipelineOutcome::Completed { .. })
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Stages visited, in order.
    pub stages: Vec<PipelineStage>,
    pub outcome: PipelineOutcome,
}

/// The orchestrator.
pub struct Pipeline<T, A, S> {
    extractor: T,
    analyzer: A,
    submitter: S,
    policy: ApprovalPolicy,
    inputs: PipelineConfig,
}

impl<T, A, S> Pipeline<T, A, S>
where
    T: TextExtractor,
    A: InvoiceAnalyzer,
    S: FormSubmitter,
{
    pub fn new(extractor: T, analyzer: A, submitter: S) -> Self {
        Self {
            extractor,
            analyzer,
            submitter,
            policy: ApprovalPolicy::default(),
            inputs: PipelineConfig::default(),
        }
    }

    pub fn with_policy(mut self, policy: ApprovalPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_inputs(mut self, inputs: PipelineConfig) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn image_path(&self) -> &Path {
        &self.inputs.invoice_image
    }

    pub fn form_path(&self) -> &Path {
        &self.inputs.form_html
    }

    /// Run the whole sequence once.
    pub async fn run(&self) -> PipelineReport {
        let start = Instant::now();
        let mut stages = Vec::new();
        let outcome = self.run_stages(&mut stages).await;

        match &outcome {
            PipelineOutcome::Completed { record, .. } => info!(
                "Pipeline done: invoice {} registered in {}ms",
                record.invoice_number,
                start.elapsed().as_millis()
            ),
            PipelineOutcome::Rejected { reason, .. } => {
                info!("Pipeline stopped: invoice rejected ({})", reason)
            }
            PipelineOutcome::Aborted { stage, reason, .. } => {
                warn!("Pipeline aborted while {}: {}", stage, reason)
            }
        }

        PipelineReport { stages, outcome }
    }

    async fn run_stages(&self, stages: &mut Vec<PipelineStage>) -> PipelineOutcome {
        let mut enter = |stage: PipelineStage| {
            info!("Pipeline stage: {}", stage);
            stages.push(stage);
        };

        enter(PipelineStage::Extracting);
        let raw_text = self.extractor.extract_text(self.image_path());
        if raw_text.trim().is_empty() {
            enter(PipelineStage::Aborted);
            return PipelineOutcome::Aborted {
                stage: PipelineStage::Extracting,
                reason: AbortReason::OcrFailed,
                record: None,
            };
        }

        enter(PipelineStage::Validating);
        let record = self.analyzer.analyze_invoice(&raw_text).await;
        // The analyzer's own approval is advisory; the local policy decides
        let record = self.policy.apply(record);

        match record.status() {
            RecordStatus::Failed(error) => {
                let reason = AbortReason::AnalysisFailed(error.to_string());
                enter(PipelineStage::Aborted);
                return PipelineOutcome::Aborted {
                    stage: PipelineStage::Validating,
                    reason,
                    record: Some(record),
                };
            }
            RecordStatus::Rejected(reason) => {
                let reason = reason.to_string();
                enter(PipelineStage::Rejected);
                return PipelineOutcome::Rejected { record, reason };
            }
            RecordStatus::Approved => enter(PipelineStage::Approved),
        }

        let form = self.form_path();
        if !form.exists() {
            enter(PipelineStage::Aborted);
            return PipelineOutcome::Aborted {
                stage: PipelineStage::Approved,
                reason: AbortReason::FormMissing(form.to_path_buf()),
                record: Some(record),
            };
        }

        enter(PipelineStage::Submitting);
        let payload = SubmissionPayload::from(&record);
        match self.submitter.submit_form(&payload, form).await {
            Ok(report) => {
                enter(PipelineStage::Done);
                PipelineOutcome::Completed { record, report }
            }
            Err(e) => {
                enter(PipelineStage::Aborted);
                PipelineOutcome::Aborted {
                    stage: PipelineStage::Submitting,
                    reason: AbortReason::SubmissionFailed(e.to_string()),
                    record: Some(record),
                }
            }
        }
    }
}
