//! Presentation Tree
//!
//! Owned mirror of what is on screen: per-column ordered card entries plus
//! id lookup. The reconciler mutates it, the counter monitor and team
//! filter read it. Replaces ad-hoc document queries as the source of truth.

/// One live card node, mirroring exactly one card id.
#[derive(Debug, Clone)]
pub struct Entry<N> {
    pub id: u64,
    pub status: String,
    /// Team classification captured at populate time, for the team filter.
    pub team: Option<String>,
    pub node: N,
}

#[derive(Debug, Clone)]
struct Column<N> {
    key: String,
    entries: Vec<Entry<N>>,
}

/// Columns in display order, each holding its entries in display order.
#[derive(Debug, Clone)]
pub struct PresentationTree<N> {
    columns: Vec<Column<N>>,
}

impl<N: Clone> PresentationTree<N> {
    pub fn new(column_keys: &[&str]) -> Self {
        PresentationTree {
            columns: column_keys
                .iter()
                .map(|key| Column { key: (*key).to_string(), entries: Vec::new() })
                .collect(),
        }
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn column_entries(&self, key: &str) -> &[Entry<N>] {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry<N>> {
        self.columns.iter().flat_map(|c| c.entries.iter())
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<u64> {
        self.entries().map(|e| e.id).collect()
    }

    pub fn get(&self, id: u64) -> Option<&Entry<N>> {
        self.entries().find(|e| e.id == id)
    }

    /// Column key the entry currently sits in.
    pub fn status_of(&self, id: u64) -> Option<&str> {
        self.get(id).map(|e| e.status.as_str())
    }

    /// Ordinal position of the entry within its column.
    pub fn position(&self, id: u64) -> Option<usize> {
        self.columns
            .iter()
            .find_map(|c| c.entries.iter().position(|e| e.id == id))
    }

    pub fn set_team(&mut self, id: u64, team: Option<String>) {
        if let Some(entry) = self
            .columns
            .iter_mut()
            .flat_map(|c| c.entries.iter_mut())
            .find(|e| e.id == id)
        {
            entry.team = team;
        }
    }

    /// Insert an entry at `pos` within the keyed column, clamped to the
    /// column length. Unknown keys grow a new trailing column.
    pub fn insert(&mut self, key: &str, pos: usize, entry: Entry<N>) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.key == key) {
            let at = pos.min(column.entries.len());
            column.entries.insert(at, entry);
            return;
        }
        self.columns.push(Column { key: key.to_string(), entries: vec![entry] });
    }

    pub fn remove(&mut self, id: u64) -> Option<Entry<N>> {
        for column in &mut self.columns {
            if let Some(at) = column.entries.iter().position(|e| e.id == id) {
                return Some(column.entries.remove(at));
            }
        }
        None
    }
}
