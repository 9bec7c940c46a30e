// self
use crate::obs::{Stage, StageOutcome};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_stage_outcome(stage: Stage, outcome: StageOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"aigc_image_task_stage_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_stage_outcome_noop_without_metrics() {
		record_stage_outcome(Stage::Submit, StageOutcome::Rejected);
	}

	#[cfg(feature = "metrics")]
	#[test]
	fn record_stage_outcome_increments_labeled_counter() {
		// std
		use std::sync::Arc;
		// crates.io
		use metrics::{
			Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString,
			Unit,
		};
		use parking_lot::Mutex;

		type Captured = Arc<Mutex<Vec<(String, Vec<(String, String)>, u64)>>>;

		struct CapturedCounter {
			index: usize,
			captured: Captured,
		}
		impl CounterFn for CapturedCounter {
			fn increment(&self, value: u64) {
				self.captured.lock()[self.index].2 += value;
			}

			fn absolute(&self, value: u64) {
				self.captured.lock()[self.index].2 = value;
			}
		}

		#[derive(Default)]
		struct CapturingRecorder {
			captured: Captured,
		}
		impl Recorder for CapturingRecorder {
			fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
				let labels = key
					.labels()
					.map(|label| (label.key().to_owned(), label.value().to_owned()))
					.collect();
				let index = {
					let mut captured = self.captured.lock();

					captured.push((key.name().to_owned(), labels, 0));

					captured.len() - 1
				};

				Counter::from_arc(Arc::new(CapturedCounter { index, captured: self.captured.clone() }))
			}

			fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
				Gauge::noop()
			}

			fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
				Histogram::noop()
			}
		}

		let recorder = CapturingRecorder::default();

		metrics::with_local_recorder(&recorder, || {
			record_stage_outcome(Stage::Poll, StageOutcome::Success);
		});

		let captured = recorder.captured.lock();

		assert_eq!(captured.len(), 1);
		assert_eq!(captured[0].0, "aigc_image_task_stage_total");
		assert_eq!(
			captured[0].1,
			[("stage".to_owned(), "poll".to_owned()), ("outcome".to_owned(), "success".to_owned())]
		);
		assert_eq!(captured[0].2, 1);
	}
}
