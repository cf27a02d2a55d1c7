use crate::probe::ResourceProbe;
use crate::validate::classify::classify_single;
use crate::validate::report::ReportTarget;
use crate::validate::verdict::Verdict;
use crate::validate::ExpectedShape;

/// Cluster names seen when the job was submitted and where it executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOrigin {
    pub submitted: String,
    pub executed: String,
}

impl ClusterOrigin {
    pub fn mismatch(&self) -> Option<String> {
        (self.submitted != self.executed).then(|| {
            format!(
                "`row cluster --name` does not match at submission ({}) and execution ({}).",
                self.submitted, self.executed
            )
        })
    }
}

/// Validates serial, threaded and single process GPU jobs.
pub struct SingleProcessValidator<'a, P> {
    probe: &'a P,
    origin: Option<ClusterOrigin>,
}

impl<'a, P: ResourceProbe> SingleProcessValidator<'a, P> {
    pub fn new(probe: &'a P) -> Self {
        Self {
            probe,
            origin: None,
        }
    }

    /// Also fails the job when it executes on another cluster than it was
    /// submitted from.
    pub fn with_origin(mut self, origin: Option<ClusterOrigin>) -> Self {
        self.origin = origin;
        self
    }

    pub fn validate(&self, expected: &ExpectedShape, target: &ReportTarget) -> crate::Result<Verdict> {
        let report = self.probe.report(expected.probed_gpu_arch())?;
        log::debug!("Observed binding: {report:?}");
        let mut verdict = classify_single(&report, expected);
        if let Some(message) = self.origin.as_ref().and_then(ClusterOrigin::mismatch) {
            verdict.fail(message);
        }
        target.write(&verdict)?;
        Ok(verdict)
    }
}
