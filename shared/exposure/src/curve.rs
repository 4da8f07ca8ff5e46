use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposurePoint {
    pub round: u64,
    pub expected: f64,
}

/// Expected number of distinct nodes touched, one point per round starting
/// at round 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExposureCurve {
    points: Vec<ExposurePoint>,
}

impl ExposureCurve {
    pub fn new(points: Vec<ExposurePoint>) -> Self {
        ExposureCurve { points }
    }

    pub fn points(&self) -> &[ExposurePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn at(&self, round: u64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.round == round)
            .map(|p| p.expected)
    }

    pub fn last(&self) -> Option<&ExposurePoint> {
        self.points.last()
    }
}

impl fmt::Display for ExposureCurve {
    /// Tab separated, one decimal digit, with a header line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "round\texpectedExposure")?;
        for point in &self.points {
            writeln!(f, "{}\t{:.1}", point.round, point.expected)?;
        }
        Ok(())
    }
}
