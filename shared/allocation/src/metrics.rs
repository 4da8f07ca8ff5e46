use crate::PolicyKind;
use std::fmt;
use std::str::FromStr;

/// Outcome of replaying one trace under one policy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TcbSummary {
    /// Mean distinct users per node, over nodes that served anyone.
    pub per_node: f64,
    /// Mean distinct nodes per user, over users that were served.
    pub per_user: f64,
    pub nodes_used: usize,
    pub users_served: usize,
}

impl TcbSummary {
    pub fn value(&self, view: TcbView) -> f64 {
        match view {
            TcbView::PerNode => self.per_node,
            TcbView::PerUser => self.per_user,
        }
    }
}

/// Which average a comparison table reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TcbView {
    #[default]
    PerNode,
    PerUser,
}

impl FromStr for TcbView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-node" => Ok(TcbView::PerNode),
            "per-user" => Ok(TcbView::PerUser),
            other => Err(format!("unknown view {other:?}, expected per-node or per-user")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonRow {
    pub trial_size: usize,
    pub max_utilization: TcbSummary,
    pub random_pick: TcbSummary,
    pub round_robin: TcbSummary,
    pub least_tcb: TcbSummary,
}

impl ComparisonRow {
    pub fn get(&self, policy: PolicyKind) -> &TcbSummary {
        match policy {
            PolicyKind::MaxUtilization => &self.max_utilization,
            PolicyKind::RandomPick => &self.random_pick,
            PolicyKind::RoundRobin => &self.round_robin,
            PolicyKind::LeastTcb => &self.least_tcb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonTable {
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn render(&self, view: TcbView) -> String {
        let mut out = String::from("trialSize");
        for policy in PolicyKind::ALL {
            out.push('\t');
            out.push_str(policy.column());
        }
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.trial_size.to_string());
            for policy in PolicyKind::ALL {
                out.push_str(&format!("\t{:.1}", row.get(policy).value(view)));
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(TcbView::PerNode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(per_node: f64, per_user: f64) -> TcbSummary {
        TcbSummary {
            per_node,
            per_user,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_views() {
        let table = ComparisonTable {
            rows: vec![ComparisonRow {
                trial_size: 50,
                max_utilization: summary(9.84, 5.0),
                random_pick: summary(1.04, 5.1),
                round_robin: summary(1.0, 5.0),
                least_tcb: summary(1.0, 5.0),
            }],
        };
        assert_eq!(
            table.to_string(),
            "trialSize\tmaxUtilization\trandomPick\troundRobin\tleastTCB\n50\t9.8\t1.0\t1.0\t1.0\n"
        );
        assert_eq!(
            table.render(TcbView::PerUser),
            "trialSize\tmaxUtilization\trandomPick\troundRobin\tleastTCB\n50\t5.0\t5.1\t5.0\t5.0\n"
        );
    }

    #[test]
    fn test_parse_view() {
        assert_eq!("per-user".parse::<TcbView>(), Ok(TcbView::PerUser));
        assert!("nodes".parse::<TcbView>().is_err());
    }
}
