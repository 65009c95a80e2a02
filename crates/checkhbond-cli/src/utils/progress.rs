use checkhbond::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Renders engine progress events as an indicatif bar on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0).with_style(Self::bar_style());
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PassStart { residue_type } => {
                    pb.reset();
                    pb.set_message(format!("residue {residue_type}"));
                }
                Progress::CorpusStart { total_structures } => {
                    pb.set_length(total_structures);
                }
                Progress::StructureDone => {
                    pb.inc(1);
                }
                Progress::PassFinish => {
                    pb.finish_and_clear();
                }
                Progress::Message(text) => {
                    pb.println(text);
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner} {msg} [{bar:40.cyan/blue}] {pos}/{len} structures",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
    }
}
