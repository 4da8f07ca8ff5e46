/// Memo of `P(touched, round)` cells.
///
/// A cell is `None` until it has been computed; once written it is never
/// overwritten. Rows are allocated lazily as rounds are reached.
#[derive(Debug, Clone)]
pub struct ProbabilityTable {
    nodes: u64,
    // rows[round - 1][touched]
    rows: Vec<Vec<Option<f64>>>,
}

impl ProbabilityTable {
    pub fn new(nodes: u64) -> Self {
        ProbabilityTable {
            nodes,
            rows: Vec::new(),
        }
    }

    pub fn get(&self, touched: u64, round: u64) -> Option<f64> {
        if round == 0 || touched > self.nodes {
            return None;
        }
        self.rows
            .get(round as usize - 1)
            .and_then(|row| row[touched as usize])
    }

    /// Stores a freshly computed cell. Returns the value held by the table,
    /// which is the earlier one if the cell was already filled.
    pub fn record(&mut self, touched: u64, round: u64, probability: f64) -> f64 {
        assert!(round >= 1, "rounds start at 1");
        assert!(touched <= self.nodes, "touched count beyond pool size");
        let width = self.nodes as usize + 1;
        while self.rows.len() < round as usize {
            self.rows.push(vec![None; width]);
        }
        *self.rows[round as usize - 1][touched as usize].get_or_insert(probability)
    }

    /// Highest round with at least one allocated row.
    pub fn rounds(&self) -> u64 {
        self.rows.len() as u64
    }

    pub fn filled_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_some()).count())
            .sum()
    }
}
