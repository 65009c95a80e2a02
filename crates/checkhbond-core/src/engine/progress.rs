/// Progress events emitted by long-running engine operations (corpus
/// accumulation, mainly). The library stays UI-free; front ends install a
/// callback and render however they like.
#[derive(Debug, Clone)]
pub enum Progress {
    /// A residue-type pass begins.
    PassStart { residue_type: String },
    /// A pass begins iterating this many corpus structures.
    CorpusStart { total_structures: u64 },
    /// One corpus structure finished processing.
    StructureDone,
    /// The current residue-type pass finished.
    PassFinish,
    /// Free-form status information.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::PassFinish);
    }

    #[test]
    fn callback_receives_events() {
        let seen: Mutex<Vec<String>> = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event| {
                seen.lock().unwrap().push(format!("{event:?}"));
            }));
            reporter.report(Progress::PassStart {
                residue_type: "SER".to_string(),
            });
            reporter.report(Progress::StructureDone);
        }
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
